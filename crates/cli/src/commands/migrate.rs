//! Database migration command.
//!
//! Applies the migrations embedded in `cartwheel-api` to the database named
//! by `CARTWHEEL_DATABASE_URL` (or `DATABASE_URL`).

use cartwheel_api::config::{CatalogConfig, ConfigError};
use cartwheel_api::db;

/// Errors the migrate command can produce.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run catalog database migrations.
///
/// # Errors
///
/// Returns `MigrateError` if configuration is missing, the database is
/// unreachable, or a migration fails to apply.
pub async fn run() -> Result<(), MigrateError> {
    let config = CatalogConfig::from_env()?;

    tracing::info!("Connecting to catalog database...");
    let pool = db::create_pool(&config.database_url).await?;

    tracing::info!("Running catalog migrations...");
    db::MIGRATOR.run(&pool).await?;

    tracing::info!("Catalog migrations complete!");
    Ok(())
}
