//! Versioned schema migrations. Scripts under `migrations/` are embedded at build time by
//! `sqlx::migrate!` and recorded in `_sqlx_migrations`.

use crate::error::MigrationError;
use sqlx::migrate::Migrator;
use sqlx::PgPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Apply every pending migration. Each script runs in its own transaction under the
/// migrator's advisory lock; applied scripts whose checksum changed, or versions this
/// build does not know, abort the run.
pub async fn apply_migrations(pool: &PgPool) -> Result<(), MigrationError> {
    let latest = MIGRATOR.iter().map(|m| m.version).max().unwrap_or(0);
    tracing::info!(latest, "applying migrations");
    MIGRATOR.run(pool).await?;
    tracing::info!(latest, "schema up to date");
    Ok(())
}
