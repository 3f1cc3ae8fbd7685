//! Documentation item repository (PostgreSQL).

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use dochub_core::error::{AppError, ErrorKind};
use dochub_core::result::AppResult;
use dochub_entity::document::placement::{
    child_path, ensure_room_to_shift, next_sibling_order, resolve_parent,
};
use dochub_entity::document::{CreateDocumentItem, DocumentItem, RelocateItem, SiblingPlacement};

use crate::store::DocumentStore;

/// Unique index guarding `(workspace_id, path)`.
const PATH_CONSTRAINT: &str = "documentation_items_workspace_path_key";

/// Upper bound on the ancestor walk; deeper chains indicate corrupt data.
const MAX_ANCESTOR_DEPTH: i32 = 4096;

/// Repository for documentation item CRUD and subtree maintenance.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    /// Create a new document repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction holding the workspace's advisory lock. Tree checks
    /// and writes from every server process run under it.
    async fn begin_locked(&self, workspace_id: Uuid) -> AppResult<Transaction<'_, Postgres>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
            .bind(workspace_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to lock workspace", e)
            })?;

        Ok(tx)
    }
}

/// Map a write error, turning path index violations into `Conflict`.
fn write_error(e: sqlx::Error, path: &str, context: &str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(PATH_CONSTRAINT) => {
            AppError::conflict(format!("An item at path '{path}' already exists"))
        }
        _ => AppError::with_source(ErrorKind::Database, context.to_string(), e),
    }
}

fn commit_error(e: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
}

/// Load and check the parent of a new or moved item inside the write
/// transaction. `None` at root.
async fn checked_parent(
    conn: &mut PgConnection,
    workspace_id: Uuid,
    parent_id: Option<Uuid>,
    moving: Option<Uuid>,
) -> AppResult<Option<DocumentItem>> {
    let Some(parent_id) = parent_id else {
        return Ok(None);
    };

    let chain = sqlx::query_as::<_, DocumentItem>(
        "WITH RECURSIVE ancestors AS ( \
            SELECT d.*, 0 AS depth FROM documentation_items d \
            WHERE d.workspace_id = $1 AND d.id = $2 \
            UNION ALL \
            SELECT p.*, a.depth + 1 FROM documentation_items p \
            INNER JOIN ancestors a ON p.id = a.parent_id \
            WHERE p.workspace_id = $1 AND a.depth < $3 \
         ) SELECT * FROM ancestors ORDER BY depth ASC",
    )
    .bind(workspace_id)
    .bind(parent_id)
    .bind(MAX_ANCESTOR_DEPTH)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find ancestors", e))?;

    resolve_parent(&chain, moving).map(|p| Some(p.clone()))
}

/// Highest `order_index` among the children of `parent_id`, except one item.
async fn max_sibling_order(
    conn: &mut PgConnection,
    workspace_id: Uuid,
    parent_id: Option<Uuid>,
    except: Option<Uuid>,
) -> AppResult<Option<i32>> {
    sqlx::query_scalar::<_, Option<i32>>(
        "SELECT MAX(order_index) FROM documentation_items \
         WHERE workspace_id = $1 AND parent_id IS NOT DISTINCT FROM $2 \
         AND id IS DISTINCT FROM $3",
    )
    .bind(workspace_id)
    .bind(parent_id)
    .bind(except)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read sibling order", e))
}

#[async_trait]
impl DocumentStore for DocumentRepository {
    async fn find_item(&self, workspace_id: Uuid, id: Uuid) -> AppResult<Option<DocumentItem>> {
        sqlx::query_as::<_, DocumentItem>(
            "SELECT * FROM documentation_items WHERE workspace_id = $1 AND id = $2",
        )
        .bind(workspace_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find item", e))
    }

    async fn find_by_path(
        &self,
        workspace_id: Uuid,
        path: &str,
    ) -> AppResult<Option<DocumentItem>> {
        sqlx::query_as::<_, DocumentItem>(
            "SELECT * FROM documentation_items WHERE workspace_id = $1 AND path = $2",
        )
        .bind(workspace_id)
        .bind(path)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find item by path", e)
        })
    }

    async fn list_items(&self, workspace_id: Uuid) -> AppResult<Vec<DocumentItem>> {
        sqlx::query_as::<_, DocumentItem>(
            "SELECT * FROM documentation_items WHERE workspace_id = $1 \
             ORDER BY order_index ASC, created_at ASC",
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list items", e))
    }

    async fn insert_item(&self, data: &CreateDocumentItem) -> AppResult<DocumentItem> {
        let mut tx = self.begin_locked(data.workspace_id).await?;

        let parent = checked_parent(&mut *tx, data.workspace_id, data.parent_id, None).await?;
        let path = child_path(parent.as_ref(), &data.name);
        let order_index = next_sibling_order(
            max_sibling_order(&mut *tx, data.workspace_id, data.parent_id, None).await?,
        )?;

        let item = sqlx::query_as::<_, DocumentItem>(
            "INSERT INTO documentation_items \
             (workspace_id, parent_id, name, item_type, path, content, file_extension, \
              order_index, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(data.workspace_id)
        .bind(data.parent_id)
        .bind(&data.name)
        .bind(data.item_type)
        .bind(&path)
        .bind(&data.content)
        .bind(&data.file_extension)
        .bind(order_index)
        .bind(&data.metadata)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| write_error(e, &path, "Failed to create item"))?;

        tx.commit().await.map_err(commit_error)?;
        Ok(item)
    }

    async fn relocate_item(&self, change: &RelocateItem) -> AppResult<DocumentItem> {
        let ws = change.workspace_id;
        let mut tx = self.begin_locked(ws).await?;

        let current = sqlx::query_as::<_, DocumentItem>(
            "SELECT * FROM documentation_items WHERE workspace_id = $1 AND id = $2",
        )
        .bind(ws)
        .bind(change.item_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find item", e))?
        .ok_or_else(|| AppError::not_found(format!("Item {} not found", change.item_id)))?;

        let parent = checked_parent(&mut *tx, ws, change.parent_id, Some(current.id)).await?;
        let new_path = child_path(parent.as_ref(), &change.name);

        let siblings_max =
            max_sibling_order(&mut *tx, ws, change.parent_id, Some(current.id)).await?;
        let order_index = match change.placement {
            SiblingPlacement::Keep => current.order_index,
            SiblingPlacement::Last => next_sibling_order(siblings_max)?,
            SiblingPlacement::At(index) => {
                ensure_room_to_shift(siblings_max)?;
                let shifted = sqlx::query(
                    "UPDATE documentation_items SET order_index = order_index + 1 \
                     WHERE workspace_id = $1 AND parent_id IS NOT DISTINCT FROM $2 \
                     AND order_index >= $3 AND id <> $4",
                )
                .bind(ws)
                .bind(change.parent_id)
                .bind(index)
                .bind(current.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to shift sibling order", e)
                })?;
                tracing::debug!(
                    item_id = %current.id,
                    shifted = shifted.rows_affected(),
                    "Made room among siblings"
                );
                index
            }
        };

        let item = sqlx::query_as::<_, DocumentItem>(
            "UPDATE documentation_items \
             SET parent_id = $3, name = $4, path = $5, order_index = $6, updated_at = NOW() \
             WHERE workspace_id = $1 AND id = $2 RETURNING *",
        )
        .bind(ws)
        .bind(current.id)
        .bind(change.parent_id)
        .bind(&change.name)
        .bind(&new_path)
        .bind(order_index)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| write_error(e, &new_path, "Failed to update item"))?;

        if new_path != current.path {
            let rewritten = sqlx::query(
                "UPDATE documentation_items \
                 SET path = $3 || substr(path, char_length($2) + 1), updated_at = NOW() \
                 WHERE workspace_id = $1 AND left(path, char_length($2) + 1) = $2 || '/'",
            )
            .bind(ws)
            .bind(&current.path)
            .bind(&new_path)
            .execute(&mut *tx)
            .await
            .map_err(|e| write_error(e, &new_path, "Failed to rewrite descendant paths"))?;

            tracing::debug!(
                workspace_id = %ws,
                item_id = %current.id,
                descendants = rewritten.rows_affected(),
                "Rewrote descendant paths"
            );
        }

        tx.commit().await.map_err(commit_error)?;
        Ok(item)
    }

    async fn update_content(
        &self,
        workspace_id: Uuid,
        id: Uuid,
        content: &str,
        metadata: &serde_json::Value,
    ) -> AppResult<DocumentItem> {
        sqlx::query_as::<_, DocumentItem>(
            "UPDATE documentation_items SET content = $3, metadata = $4, updated_at = NOW() \
             WHERE workspace_id = $1 AND id = $2 RETURNING *",
        )
        .bind(workspace_id)
        .bind(id)
        .bind(content)
        .bind(metadata)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update content", e))?
        .ok_or_else(|| AppError::not_found(format!("Item {id} not found")))
    }

    async fn delete_item(&self, workspace_id: Uuid, id: Uuid) -> AppResult<bool> {
        let mut tx = self.begin_locked(workspace_id).await?;

        // Children go with the parent through ON DELETE CASCADE.
        let result =
            sqlx::query("DELETE FROM documentation_items WHERE workspace_id = $1 AND id = $2")
                .bind(workspace_id)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to delete item", e)
                })?;

        tx.commit().await.map_err(commit_error)?;
        Ok(result.rows_affected() > 0)
    }
}
