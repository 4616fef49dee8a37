use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Titles are cut to this many characters before the ellipsis is appended.
pub const TITLE_MAX_CHARS: usize = 50;
const TITLE_ELLIPSIS: &str = "...";

/// Current time at the microsecond precision the store keeps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(id: String, title: Option<String>) -> Self {
        let created_at = now();
        Self { id, title, created_at, updated_at: created_at }
    }

    /// Starts a new conversation whose title is derived from its first message.
    pub fn from_first_message(message: &str) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), Some(title_from_message(message)))
    }
}

/// First [`TITLE_MAX_CHARS`] characters of `message`, with `...` appended only
/// when something was cut off.
pub fn title_from_message(message: &str) -> String {
    let mut chars = message.chars();
    let head: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}{TITLE_ELLIPSIS}")
    } else {
        head
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }

    /// Speaker label used when the transcript is flattened into a prompt.
    pub fn label(&self) -> &'static str {
        match self {
            MessageRole::User => "User",
            MessageRole::Assistant => "Assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for MessageRole {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(conversation_id: String, role: MessageRole, content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id,
            role,
            content,
            created_at: now(),
        }
    }
}

/// A conversation together with some of its messages.
///
/// `GET /conversations/{id}` carries the full thread in ascending order;
/// `GET /conversations` carries only the latest message as a preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationWithMessages {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub message: String,
    pub conversation_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_message_becomes_title_verbatim() {
        assert_eq!(title_from_message("Hello there"), "Hello there");
    }

    #[test]
    fn exactly_fifty_chars_is_not_truncated() {
        let msg = "a".repeat(50);
        assert_eq!(title_from_message(&msg), msg);
    }

    #[test]
    fn long_message_is_truncated_with_ellipsis() {
        let msg = "b".repeat(51);
        let title = title_from_message(&msg);
        assert_eq!(title, format!("{}...", "b".repeat(50)));
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        let msg = "é".repeat(60);
        let title = title_from_message(&msg);
        assert_eq!(title.chars().count(), 53);
        assert!(title.starts_with(&"é".repeat(50)));
    }

    #[test]
    fn role_round_trips_through_storage_text() {
        for role in [MessageRole::User, MessageRole::Assistant] {
            assert_eq!(MessageRole::try_from(role.as_str().to_string()), Ok(role));
        }
        assert!(MessageRole::try_from("system".to_string()).is_err());
    }

    #[test]
    fn chat_request_accepts_missing_fields() {
        let req: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(req.message.is_empty());
        assert!(req.conversation_id.is_none());

        let req: ChatRequest =
            serde_json::from_str(r#"{"message":"hi","conversationId":"c1"}"#).unwrap();
        assert_eq!(req.message, "hi");
        assert_eq!(req.conversation_id.as_deref(), Some("c1"));
    }

    #[test]
    fn conversation_serializes_camel_case_with_messages() {
        let conversation = Conversation::new("c1".to_string(), None);
        let message = Message::new("c1".to_string(), MessageRole::User, "hi".to_string());
        let body = ConversationWithMessages { conversation, messages: vec![message] };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["id"], "c1");
        assert!(json["title"].is_null());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert_eq!(json["messages"][0]["conversationId"], "c1");
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
