//! Chat session and message repository (PostgreSQL).

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use dochub_core::error::{AppError, ErrorKind};
use dochub_core::result::AppResult;
use dochub_entity::chat::{ChatMessage, ChatSession, CreateChatMessage};

use crate::store::ChatStore;

/// Repository for the chat tables.
#[derive(Debug, Clone)]
pub struct ChatRepository {
    pool: PgPool,
}

impl ChatRepository {
    /// Create a new chat repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatStore for ChatRepository {
    async fn create_session(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
        title: &str,
    ) -> AppResult<ChatSession> {
        sqlx::query_as::<_, ChatSession>(
            "INSERT INTO chat_sessions (workspace_id, user_id, title) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(workspace_id)
        .bind(user_id)
        .bind(title)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create session", e))
    }

    async fn find_session(&self, id: Uuid) -> AppResult<Option<ChatSession>> {
        sqlx::query_as::<_, ChatSession>("SELECT * FROM chat_sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find session", e))
    }

    async fn list_sessions(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Vec<ChatSession>> {
        sqlx::query_as::<_, ChatSession>(
            "SELECT * FROM chat_sessions WHERE workspace_id = $1 AND user_id = $2 \
             ORDER BY updated_at DESC",
        )
        .bind(workspace_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list sessions", e))
    }

    async fn delete_session(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM chat_sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete session", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_message(&self, data: &CreateChatMessage) -> AppResult<ChatMessage> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let message = sqlx::query_as::<_, ChatMessage>(
            "INSERT INTO chat_messages (id, session_id, role, content, metadata) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(data.id)
        .bind(data.session_id)
        .bind(data.role)
        .bind(&data.content)
        .bind(&data.metadata)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to store message", e))?;

        sqlx::query("UPDATE chat_sessions SET updated_at = NOW() WHERE id = $1")
            .bind(data.session_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to touch session", e)
            })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;
        Ok(message)
    }

    async fn list_messages(&self, session_id: Uuid) -> AppResult<Vec<ChatMessage>> {
        sqlx::query_as::<_, ChatMessage>(
            "SELECT * FROM chat_messages WHERE session_id = $1 ORDER BY created_at ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list messages", e))
    }

    async fn recent_messages(
        &self,
        session_id: Uuid,
        limit: usize,
    ) -> AppResult<Vec<ChatMessage>> {
        sqlx::query_as::<_, ChatMessage>(
            "SELECT * FROM ( \
                SELECT * FROM chat_messages WHERE session_id = $1 \
                ORDER BY created_at DESC LIMIT $2 \
             ) recent ORDER BY created_at ASC",
        )
        .bind(session_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load recent messages", e)
        })
    }
}
