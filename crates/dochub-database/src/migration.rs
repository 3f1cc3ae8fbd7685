//! Schema migrations embedded from `migrations/`.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use dochub_core::error::{AppError, ErrorKind};
use dochub_core::result::AppResult;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Apply pending migrations. Returns how many the schema is made of.
pub async fn run_migrations(pool: &PgPool) -> AppResult<usize> {
    let known = MIGRATOR.iter().count();
    info!(known, "Applying documentation schema migrations");

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(ErrorKind::Database, "Failed to apply schema migrations", e)
    })?;

    info!(known, "Documentation schema is up to date");
    Ok(known)
}
