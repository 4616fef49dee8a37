use async_trait::async_trait;
use rig::completion::Prompt;
use rig::prelude::CompletionClient;
use rig::providers::gemini;
use tracing::{debug, error};

use super::{render_prompt, Responder, ResponderError, TranscriptEntry};
use crate::errors::AppError;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// [`Responder`] backed by the Google Gemini API through rig.
///
/// Built once at startup and shared by every request. The whole transcript
/// is sent as one prompt; rig's own HTTP client defaults govern timeouts.
pub struct GeminiResponder {
    client: gemini::Client,
    model: String,
}

impl GeminiResponder {
    pub fn new(api_key: &str, model: &str) -> Result<Self, AppError> {
        if api_key.trim().is_empty() {
            return Err(AppError::MissingConfig { name: "GEMINI_API_KEY".to_string() });
        }
        let client = gemini::Client::builder()
            .api_key(api_key.to_string())
            .build()
            .map_err(|e| AppError::Unexpected(format!("Failed to build Gemini client: {e}")))?;
        Ok(Self { client, model: model.to_string() })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Responder for GeminiResponder {
    async fn generate(&self, transcript: &[TranscriptEntry]) -> Result<String, ResponderError> {
        let agent = self.client.agent(&self.model).build();
        let prompt = render_prompt(transcript);
        debug!("Sending {} transcript entries to {}", transcript.len(), self.model);

        agent.prompt(prompt.as_str()).await.map_err(|e| {
            error!("Gemini API error: {e}");
            ResponderError::from_upstream(e.to_string(), None)
        })
    }
}
