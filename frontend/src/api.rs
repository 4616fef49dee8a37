use gloo_net::http::{Request, Response};

use crate::models::{ChatRequest, ChatResponse, Conversation, ErrorBody};

/// Base URL of the backend API server.
const API_BASE: &str = "http://localhost:3000";

/// Fetches the conversation list, most recently updated first.
pub async fn fetch_conversations() -> Result<Vec<Conversation>, String> {
    let resp = Request::get(&format!("{API_BASE}/conversations"))
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;

    let resp = ensure_ok(resp).await?;
    resp.json::<Vec<Conversation>>()
        .await
        .map_err(|e| format!("Parse error: {e}"))
}

/// Fetches one conversation with its full message thread.
pub async fn fetch_conversation(conversation_id: &str) -> Result<Conversation, String> {
    let resp = Request::get(&format!("{API_BASE}/conversations/{conversation_id}"))
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;

    let resp = ensure_ok(resp).await?;
    resp.json::<Conversation>()
        .await
        .map_err(|e| format!("Parse error: {e}"))
}

/// Sends one chat turn and waits for the full reply.
pub async fn send_chat(
    message: &str,
    conversation_id: Option<&str>,
) -> Result<ChatResponse, String> {
    let body = ChatRequest {
        message: message.to_string(),
        conversation_id: conversation_id.map(|s| s.to_string()),
    };

    let resp = Request::post(&format!("{API_BASE}/chat"))
        .json(&body)
        .map_err(|e| format!("Serialize error: {e}"))?
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;

    let resp = ensure_ok(resp).await?;
    resp.json::<ChatResponse>()
        .await
        .map_err(|e| format!("Parse error: {e}"))
}

pub async fn delete_conversation(conversation_id: &str) -> Result<(), String> {
    let resp = Request::delete(&format!("{API_BASE}/conversations/{conversation_id}"))
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;

    ensure_ok(resp).await.map(|_| ())
}

/// Turns a non-2xx response into the server's `{ "error": ... }` text.
async fn ensure_ok(resp: Response) -> Result<Response, String> {
    if resp.ok() {
        return Ok(resp);
    }
    let status = resp.status();
    match resp.json::<ErrorBody>().await {
        Ok(body) => Err(body.error),
        Err(_) => Err(format!("Server error: {status}")),
    }
}
