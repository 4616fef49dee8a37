use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use crate::errors::AppError;
use crate::models::{ChatRequest, DeleteResponse, ErrorBody};
use crate::service::chat_service::ChatService;

const INTERNAL_ERROR_BODY: &str = "Internal server error";

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST `/chat`: runs one chat turn
pub async fn chat_handler(
    State(svc): State<ChatService>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            return error_response(&AppError::InvalidRequest(rejection.body_text()));
        }
    };

    match svc.handle_turn(request).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => error_response(&err),
    }
}

/// GET `/conversations`: most recent first, each with its latest message
pub async fn list_conversations_handler(State(svc): State<ChatService>) -> Response {
    match svc.get_conversations().await {
        Ok(convs) => Json(convs).into_response(),
        Err(err) => error_response(&err),
    }
}

/// GET `/conversations/{id}`: full thread, oldest message first
pub async fn get_conversation_handler(
    Path(id): Path<String>,
    State(svc): State<ChatService>,
) -> Response {
    match svc.get_conversation(&id).await {
        Ok(conv) => Json(conv).into_response(),
        Err(err) => error_response(&err),
    }
}

/// DELETE `/conversations/{id}`: removes the conversation and its messages
pub async fn delete_conversation_handler(
    Path(id): Path<String>,
    State(svc): State<ChatService>,
) -> Response {
    match svc.delete_conversation(&id).await {
        Ok(()) => Json(DeleteResponse { success: true }).into_response(),
        Err(err) => error_response(&err),
    }
}

// ── Helper ────────────────────────────────────────────────────────────────────

fn error_response(err: &AppError) -> Response {
    let (status, message) = if err.is_validation() {
        (StatusCode::BAD_REQUEST, err.to_string())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, err.to_string())
    } else {
        error!("Request failed: {err}");
        (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY.to_string())
    };

    (status, Json(ErrorBody { error: message })).into_response()
}
