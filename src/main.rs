mod agent;
mod config;
mod db;
mod errors;
mod models;
mod routes;
mod service;

use std::sync::Arc;

use tracing::info;

use crate::agent::GeminiResponder;
use crate::config::AppConfig;
use crate::db::conversation_repository::ConversationRepository;
use crate::db::message_repository::MessageRepository;
use crate::service::chat_service::ChatService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (development convenience)
    dotenvy::dotenv().ok();

    // Initialise tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemini_chat=debug,tower_http=debug".into()),
        )
        .init();

    // A missing API key stops the process here.
    let config = AppConfig::from_env()?;

    // ── Database ──────────────────────────────────────────────────────────────
    let pool = db::connect(&config.database_url).await?;

    // ── Dependency wiring ─────────────────────────────────────────────────────
    let responder = GeminiResponder::new(&config.gemini_api_key, &config.gemini_model)?;
    info!("Using Gemini model {}", responder.model());

    let conversation_repo = ConversationRepository::new(pool.clone());
    let message_repo = MessageRepository::new(pool);
    let chat_service = ChatService::new(conversation_repo, message_repo, Arc::new(responder));

    let app = routes::router(chat_service);

    // ── Listen ────────────────────────────────────────────────────────────────
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{addr}/");

    axum::serve(listener, app).await?;
    Ok(())
}
