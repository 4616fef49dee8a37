pub mod gemini;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Message, MessageRole};

pub use gemini::GeminiResponder;

/// One turn of the conversation as handed to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub role: MessageRole,
    pub content: String,
}

impl TranscriptEntry {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }
}

impl From<&Message> for TranscriptEntry {
    fn from(m: &Message) -> Self {
        Self::new(m.role, m.content.clone())
    }
}

/// Flattens a transcript into a single prompt: `"<Role>: <content>"` per
/// entry, separated by blank lines.
pub fn render_prompt(transcript: &[TranscriptEntry]) -> String {
    transcript
        .iter()
        .map(|entry| format!("{}: {}", entry.role.label(), entry.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Why the upstream model did not produce a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    QuotaExceeded,
    RateLimited,
    Unauthorized,
    MissingApiKey,
    Other,
}

#[derive(Debug, Error)]
#[error("Generation failed ({kind:?}): {message}")]
pub struct ResponderError {
    pub kind: FailureKind,
    pub message: String,
}

impl ResponderError {
    /// Builds an error from a raw upstream failure, classifying it.
    pub fn from_upstream(message: impl Into<String>, status: Option<u16>) -> Self {
        let message = message.into();
        let kind = classify_failure(&message, status);
        Self { kind, message }
    }
}

/// The only place raw upstream errors are inspected. Rules are checked in
/// order and the first match wins.
pub fn classify_failure(message: &str, status: Option<u16>) -> FailureKind {
    if message.contains("quota") {
        FailureKind::QuotaExceeded
    } else if message.contains("429") || status == Some(429) {
        FailureKind::RateLimited
    } else if message.contains("401") || status == Some(401) {
        FailureKind::Unauthorized
    } else if message.contains("API key") {
        FailureKind::MissingApiKey
    } else {
        FailureKind::Other
    }
}

/// Produces the assistant's reply for a transcript. One call, no retries.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn generate(&self, transcript: &[TranscriptEntry]) -> Result<String, ResponderError>;
}
