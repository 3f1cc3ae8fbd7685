//! Workspace repository (PostgreSQL).

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use dochub_core::error::{AppError, ErrorKind};
use dochub_core::result::AppResult;
use dochub_entity::workspace::{CreateWorkspace, Workspace};

use crate::store::WorkspaceStore;

/// Repository for workspace rows.
#[derive(Debug, Clone)]
pub struct WorkspaceRepository {
    pool: PgPool,
}

impl WorkspaceRepository {
    /// Create a new workspace repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkspaceStore for WorkspaceRepository {
    async fn create_workspace(&self, data: &CreateWorkspace) -> AppResult<Workspace> {
        sqlx::query_as::<_, Workspace>(
            "INSERT INTO workspaces (owner_id, name, description, repository) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(data.owner_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.repository)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create workspace", e))
    }

    async fn find_workspace(&self, id: Uuid) -> AppResult<Option<Workspace>> {
        sqlx::query_as::<_, Workspace>("SELECT * FROM workspaces WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find workspace", e))
    }

    async fn list_workspaces(&self, owner_id: Uuid) -> AppResult<Vec<Workspace>> {
        sqlx::query_as::<_, Workspace>(
            "SELECT * FROM workspaces WHERE owner_id = $1 ORDER BY created_at ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list workspaces", e))
    }

    async fn delete_workspace(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM workspaces WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete workspace", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
