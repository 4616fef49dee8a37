pub mod api_routes;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::service::chat_service::ChatService;
use api_routes::{
    chat_handler, delete_conversation_handler, get_conversation_handler,
    list_conversations_handler,
};

/// JSON API consumed by the frontend.
pub fn router(chat_service: ChatService) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/conversations", get(list_conversations_handler))
        .route(
            "/conversations/{id}",
            get(get_conversation_handler).delete(delete_conversation_handler),
        )
        // frontend is served from its own origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(chat_service)
}
