use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::error;

use crate::db::{format_timestamp, parse_timestamp};
use crate::errors::AppError;
use crate::models::{Conversation, ConversationWithMessages, Message, MessageRole};

#[derive(Clone)]
pub struct ConversationRepository {
    pool: SqlitePool,
}

impl ConversationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All conversations, most recently updated first, each carrying only its
    /// latest message.
    pub async fn find_all_with_latest_message(
        &self,
    ) -> Result<Vec<ConversationWithMessages>, AppError> {
        let rows = sqlx::query(
            "SELECT c.id, c.title, c.created_at, c.updated_at,
                    m.id AS m_id, m.role AS m_role, m.content AS m_content,
                    m.created_at AS m_created_at
             FROM conversations c
             LEFT JOIN messages m ON m.id = (
                 SELECT id FROM messages
                 WHERE conversation_id = c.id
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT 1
             )
             ORDER BY c.updated_at DESC, c.rowid DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to fetch all conversations: {e}");
            AppError::db_query("Failed to fetch conversations", e)
        })?;

        rows.iter()
            .map(|row| {
                let conversation = conversation_from_row(row)?;
                let messages = latest_message_from_row(row, &conversation.id)?
                    .into_iter()
                    .collect();
                Ok(ConversationWithMessages { conversation, messages })
            })
            .collect()
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Conversation>, AppError> {
        let row = sqlx::query(
            "SELECT id, title, created_at, updated_at FROM conversations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to find conversation {id}: {e}");
            AppError::db_query(format!("Failed to find conversation {id}"), e)
        })?;

        row.as_ref().map(conversation_from_row).transpose()
    }

    pub async fn save(&self, conversation: &Conversation) -> Result<Conversation, AppError> {
        sqlx::query(
            "INSERT INTO conversations (id, title, created_at, updated_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&conversation.id)
        .bind(&conversation.title)
        .bind(format_timestamp(&conversation.created_at))
        .bind(format_timestamp(&conversation.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to save conversation {}: {e}", conversation.id);
            AppError::db_query("Failed to save conversation", e)
        })?;
        Ok(conversation.clone())
    }

    /// Deletes a conversation; its messages go with it through the foreign key
    /// cascade. Returns `false` when no such conversation existed.
    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to delete conversation {id}: {e}");
                AppError::db_query(format!("Failed to delete conversation {id}"), e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}

fn conversation_from_row(row: &SqliteRow) -> Result<Conversation, AppError> {
    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| AppError::db_query("Failed to read created_at", e))?;
    let updated_at: String = row
        .try_get("updated_at")
        .map_err(|e| AppError::db_query("Failed to read updated_at", e))?;
    Ok(Conversation {
        id: row
            .try_get("id")
            .map_err(|e| AppError::db_query("Failed to read id", e))?,
        title: row
            .try_get("title")
            .map_err(|e| AppError::db_query("Failed to read title", e))?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

// The LEFT JOIN yields NULL message columns for a conversation without messages.
fn latest_message_from_row(
    row: &SqliteRow,
    conversation_id: &str,
) -> Result<Option<Message>, AppError> {
    let id: Option<String> = row
        .try_get("m_id")
        .map_err(|e| AppError::db_query("Failed to read m_id", e))?;
    let Some(id) = id else {
        return Ok(None);
    };

    let role_str: String = row
        .try_get("m_role")
        .map_err(|e| AppError::db_query("Failed to read m_role", e))?;
    let created_at: String = row
        .try_get("m_created_at")
        .map_err(|e| AppError::db_query("Failed to read m_created_at", e))?;
    Ok(Some(Message {
        id,
        conversation_id: conversation_id.to_string(),
        role: MessageRole::try_from(role_str)
            .map_err(|e| AppError::Unexpected(format!("Unknown message role: {e}")))?,
        content: row
            .try_get("m_content")
            .map_err(|e| AppError::db_query("Failed to read m_content", e))?,
        created_at: parse_timestamp(&created_at)?,
    }))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::db::message_repository::MessageRepository;
    use crate::db::test_pool;

    fn message_at(conversation: &Conversation, role: MessageRole, content: &str, offset_secs: i64) -> Message {
        let mut msg = Message::new(conversation.id.clone(), role, content.to_string());
        msg.created_at = conversation.created_at + Duration::seconds(offset_secs);
        msg
    }

    #[tokio::test]
    async fn save_and_find_by_id() {
        let (_dir, pool) = test_pool().await;
        let repo = ConversationRepository::new(pool);

        let conv = Conversation::new("c1".to_string(), Some("Greetings".to_string()));
        repo.save(&conv).await.unwrap();

        let found = repo.find_by_id("c1").await.unwrap().unwrap();
        assert_eq!(found, conv);
        assert!(repo.find_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_orders_by_recency_with_latest_message_only() {
        let (_dir, pool) = test_pool().await;
        let repo = ConversationRepository::new(pool.clone());
        let messages = MessageRepository::new(pool);

        let older = Conversation::new("older".to_string(), Some("A".to_string()));
        repo.save(&older).await.unwrap();
        messages.save(&message_at(&older, MessageRole::User, "a-question", 1)).await.unwrap();
        messages.save(&message_at(&older, MessageRole::Assistant, "a-answer", 2)).await.unwrap();

        let newer = Conversation::new("newer".to_string(), Some("B".to_string()));
        repo.save(&newer).await.unwrap();
        messages.save(&message_at(&newer, MessageRole::User, "b-question", 10)).await.unwrap();

        let empty = Conversation::new("empty".to_string(), None);
        repo.save(&empty).await.unwrap();

        let list = repo.find_all_with_latest_message().await.unwrap();
        let ids: Vec<&str> = list.iter().map(|c| c.conversation.id.as_str()).collect();
        assert_eq!(ids, vec!["newer", "older", "empty"]);

        assert_eq!(list[0].messages.len(), 1);
        assert_eq!(list[0].messages[0].content, "b-question");
        assert_eq!(list[1].messages.len(), 1);
        assert_eq!(list[1].messages[0].content, "a-answer");
        assert_eq!(list[1].messages[0].role, MessageRole::Assistant);
        assert!(list[2].messages.is_empty());
        assert!(list[2].conversation.title.is_none());
    }

    #[tokio::test]
    async fn delete_cascades_to_messages() {
        let (_dir, pool) = test_pool().await;
        let repo = ConversationRepository::new(pool.clone());
        let messages = MessageRepository::new(pool.clone());

        let conv = Conversation::new("c1".to_string(), None);
        repo.save(&conv).await.unwrap();
        messages.save(&message_at(&conv, MessageRole::User, "hi", 1)).await.unwrap();
        messages.save(&message_at(&conv, MessageRole::Assistant, "hello", 2)).await.unwrap();

        assert!(repo.delete("c1").await.unwrap());
        assert!(repo.find_by_id("c1").await.unwrap().is_none());

        let (remaining,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM messages WHERE conversation_id = 'c1'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(remaining, 0);

        assert!(!repo.delete("c1").await.unwrap());
    }
}
