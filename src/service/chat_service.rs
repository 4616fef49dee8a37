use std::sync::Arc;

use tracing::{info, warn};

use crate::agent::{FailureKind, Responder, TranscriptEntry};
use crate::db::conversation_repository::ConversationRepository;
use crate::db::message_repository::MessageRepository;
use crate::errors::AppError;
use crate::models::{
    ChatRequest, ChatResponse, Conversation, ConversationWithMessages, Message, MessageRole,
};

pub const EMPTY_REPLY: &str = "Sorry, I could not generate a response.";
pub const QUOTA_REPLY: &str =
    "Sorry, the AI service is temporarily unavailable due to quota limits. Please try again later.";
pub const RATE_LIMIT_REPLY: &str = "Sorry, too many requests. Please wait a moment and try again.";
pub const UNAUTHORIZED_REPLY: &str =
    "Sorry, there's an authentication issue with the AI service. Please check your API key.";
pub const MISSING_API_KEY_REPLY: &str =
    "Sorry, the API key is not configured properly. Please check your environment variables.";
pub const GENERIC_FAILURE_REPLY: &str =
    "Sorry, I encountered an error while processing your request. Please try again.";

/// User-facing text persisted in place of a reply the model could not produce.
pub fn fallback_reply(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::QuotaExceeded => QUOTA_REPLY,
        FailureKind::RateLimited => RATE_LIMIT_REPLY,
        FailureKind::Unauthorized => UNAUTHORIZED_REPLY,
        FailureKind::MissingApiKey => MISSING_API_KEY_REPLY,
        FailureKind::Other => GENERIC_FAILURE_REPLY,
    }
}

#[derive(Clone)]
pub struct ChatService {
    conversation_repo: ConversationRepository,
    message_repo: MessageRepository,
    responder: Arc<dyn Responder>,
}

impl ChatService {
    pub fn new(
        conversation_repo: ConversationRepository,
        message_repo: MessageRepository,
        responder: Arc<dyn Responder>,
    ) -> Self {
        Self { conversation_repo, message_repo, responder }
    }

    pub async fn get_conversations(&self) -> Result<Vec<ConversationWithMessages>, AppError> {
        self.conversation_repo.find_all_with_latest_message().await
    }

    pub async fn get_conversation(&self, id: &str) -> Result<ConversationWithMessages, AppError> {
        let conversation = self
            .conversation_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ConversationNotFound { id: id.to_string() })?;
        let messages = self.message_repo.find_by_conversation_id(id).await?;
        Ok(ConversationWithMessages { conversation, messages })
    }

    pub async fn delete_conversation(&self, id: &str) -> Result<(), AppError> {
        if !self.conversation_repo.delete(id).await? {
            return Err(AppError::Unexpected(format!("No conversation {id} to delete")));
        }
        info!("Deleted conversation {id}");
        Ok(())
    }

    /// Runs one chat turn: resolves or creates the conversation, stores the
    /// user message, asks the responder for a reply and stores that too.
    ///
    /// Upstream failures never fail the turn; a fallback reply is stored and
    /// returned instead.
    pub async fn handle_turn(&self, request: ChatRequest) -> Result<ChatResponse, AppError> {
        // ── Validation ────────────────────────────────────────────────────────
        if request.message.is_empty() {
            return Err(AppError::EmptyField { field_name: "Message".to_string() });
        }

        // ── Resolve or create conversation ────────────────────────────────────
        let requested_id = request.conversation_id.filter(|id| !id.is_empty());

        let (conversation, history) = match requested_id {
            Some(id) => {
                let conversation = self
                    .conversation_repo
                    .find_by_id(&id)
                    .await?
                    .ok_or(AppError::ConversationNotFound { id: id.clone() })?;
                let history = self.message_repo.find_by_conversation_id(&id).await?;
                (conversation, history)
            }
            None => {
                let conversation = Conversation::from_first_message(&request.message);
                let conversation = self.conversation_repo.save(&conversation).await?;
                info!("Created conversation {}", conversation.id);
                (conversation, Vec::new())
            }
        };

        // ── Persist user message before generation ────────────────────────────
        let user_message =
            Message::new(conversation.id.clone(), MessageRole::User, request.message);
        self.message_repo.save(&user_message).await?;

        // ── Generate ──────────────────────────────────────────────────────────
        let transcript: Vec<TranscriptEntry> = history
            .iter()
            .chain(std::iter::once(&user_message))
            .map(TranscriptEntry::from)
            .collect();

        let reply = match self.responder.generate(&transcript).await {
            Ok(text) if text.is_empty() => EMPTY_REPLY.to_string(),
            Ok(text) => text,
            Err(e) => {
                warn!("Falling back for conversation {}: {e}", conversation.id);
                fallback_reply(e.kind).to_string()
            }
        };

        // ── Persist assistant reply ───────────────────────────────────────────
        let assistant_message =
            Message::new(conversation.id.clone(), MessageRole::Assistant, reply);
        self.message_repo.save(&assistant_message).await?;

        Ok(ChatResponse {
            message: assistant_message.content,
            conversation_id: conversation.id,
        })
    }
}
