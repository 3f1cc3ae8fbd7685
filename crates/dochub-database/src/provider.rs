//! Store bundle that dispatches to the configured provider.

use std::sync::Arc;

use tracing::info;

use dochub_core::config::DatabaseConfig;
use dochub_core::error::AppError;
use dochub_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::migration::run_migrations;
use crate::repositories::{ChatRepository, DocumentRepository, WorkspaceRepository};
use crate::store::{ChatStore, DocumentStore, WorkspaceStore};

/// The row stores used by the services.
///
/// The provider is selected at construction time based on configuration.
/// Cloning is cheap; all clones share the same backing store.
#[derive(Debug, Clone)]
pub struct Store {
    /// Workspace rows.
    pub workspaces: Arc<dyn WorkspaceStore>,
    /// Documentation item rows.
    pub documents: Arc<dyn DocumentStore>,
    /// Chat session and message rows.
    pub chats: Arc<dyn ChatStore>,
    pool: Option<DatabasePool>,
}

impl Store {
    /// Build the store named by `config.provider`.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        match config.provider.as_str() {
            "postgres" => {
                info!("Initializing PostgreSQL store");
                let pool = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    run_migrations(pool.pool()).await?;
                }
                Ok(Self::postgres(pool))
            }
            "memory" => {
                info!("Initializing in-memory store");
                Ok(Self::memory())
            }
            other => Err(AppError::configuration(format!(
                "Unknown database provider: '{other}'. Supported: postgres, memory"
            ))),
        }
    }

    /// PostgreSQL-backed store over an existing pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        Self {
            workspaces: Arc::new(WorkspaceRepository::new(pg.clone())),
            documents: Arc::new(DocumentRepository::new(pg.clone())),
            chats: Arc::new(ChatRepository::new(pg)),
            pool: Some(pool),
        }
    }

    /// Fresh in-memory store.
    pub fn memory() -> Self {
        let store = MemoryStore::new();
        Self {
            workspaces: Arc::new(store.clone()),
            documents: Arc::new(store.clone()),
            chats: Arc::new(store),
            pool: None,
        }
    }

    /// Name of the active provider, for logs and the health endpoint.
    pub fn provider_name(&self) -> &'static str {
        if self.pool.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }

    /// Check that the backing store is reachable.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(pool) => pool.health_check().await,
            None => Ok(true),
        }
    }

    /// Release backing connections.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
