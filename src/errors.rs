use thiserror::Error;

/// Top-level application error.
/// All variants carry a human-readable message for display/logging.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Database errors ──────────────────────────────────────────────────────
    #[error("Database connection failed: {0}")]
    DatabaseConnectionFailed(#[source] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationFailed(#[source] sqlx::migrate::MigrateError),

    #[error("Database query failed: {message}")]
    DatabaseQueryFailed {
        message: String,
        #[source]
        source: sqlx::Error,
    },

    // ── Validation errors ────────────────────────────────────────────────────
    #[error("{field_name} is required")]
    EmptyField { field_name: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // ── Conversation errors ──────────────────────────────────────────────────
    #[error("Conversation not found")]
    ConversationNotFound { id: String },

    // ── Configuration errors ─────────────────────────────────────────────────
    #[error("Missing {name} environment variable")]
    MissingConfig { name: String },

    #[error("Invalid value for {name}: {reason}")]
    InvalidConfig { name: String, reason: String },

    // ── System errors ────────────────────────────────────────────────────────
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn db_query(message: impl Into<String>, source: sqlx::Error) -> Self {
        AppError::DatabaseQueryFailed { message: message.into(), source }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::ConversationNotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::EmptyField { .. } | AppError::InvalidRequest(_))
    }
}
