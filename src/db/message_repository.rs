use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::error;

use crate::db::{format_timestamp, parse_timestamp};
use crate::errors::AppError;
use crate::models::{Message, MessageRole};

#[derive(Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Messages of one conversation, oldest first.
    pub async fn find_by_conversation_id(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<Message>, AppError> {
        let rows = sqlx::query(
            "SELECT id, conversation_id, role, content, created_at
             FROM messages
             WHERE conversation_id = ?
             ORDER BY created_at ASC, rowid ASC",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to fetch messages for conversation {conversation_id}: {e}");
            AppError::db_query(
                format!("Failed to fetch messages for conversation {conversation_id}"),
                e,
            )
        })?;

        rows.iter().map(message_from_row).collect()
    }

    /// Appends a message and bumps the owning conversation's `updated_at`
    /// in the same transaction.
    pub async fn save(&self, message: &Message) -> Result<Message, AppError> {
        let created_at = format_timestamp(&message.created_at);

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to open transaction for message {}: {e}", message.id);
            AppError::db_query("Failed to save message", e)
        })?;

        sqlx::query(
            "INSERT INTO messages (id, conversation_id, role, content, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&message.id)
        .bind(&message.conversation_id)
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(&created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to save message {}: {e}", message.id);
            AppError::db_query("Failed to save message", e)
        })?;

        sqlx::query("UPDATE conversations SET updated_at = ? WHERE id = ?")
            .bind(&created_at)
            .bind(&message.conversation_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to update conversation timestamp {}: {e}", message.conversation_id);
                AppError::db_query("Failed to update conversation", e)
            })?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit message {}: {e}", message.id);
            AppError::db_query("Failed to save message", e)
        })?;

        Ok(message.clone())
    }
}

fn message_from_row(row: &SqliteRow) -> Result<Message, AppError> {
    let role_str: String = row
        .try_get("role")
        .map_err(|e| AppError::db_query("Failed to read role", e))?;
    let role = MessageRole::try_from(role_str)
        .map_err(|e| AppError::Unexpected(format!("Unknown message role: {e}")))?;
    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| AppError::db_query("Failed to read created_at", e))?;
    Ok(Message {
        id: row
            .try_get("id")
            .map_err(|e| AppError::db_query("Failed to read id", e))?,
        conversation_id: row
            .try_get("conversation_id")
            .map_err(|e| AppError::db_query("Failed to read conversation_id", e))?,
        role,
        content: row
            .try_get("content")
            .map_err(|e| AppError::db_query("Failed to read content", e))?,
        created_at: parse_timestamp(&created_at)?,
    })
}
