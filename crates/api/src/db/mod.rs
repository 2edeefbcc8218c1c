//! Database operations for the catalog.
//!
//! # Tables
//!
//! - `user`, `api_token` - read-only views of the external auth subsystem
//! - `product` - the catalog itself
//! - `review` - one review per (product, author)
//! - `wishlist`, `favorite`, `cart_item` - toggle relations
//!
//! All queries are runtime-checked (`sqlx::query`/`query_as`); migrations
//! are embedded via [`MIGRATOR`] and run by `cw-cli migrate` or at API
//! startup.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

pub mod products;
pub mod relations;
pub mod reviews;
pub mod users;

pub use products::{ProductChanges, ProductFields, ProductFilter, ProductOrdering, ProductRepository};
pub use relations::RelationRepository;
pub use reviews::{ReviewError, ReviewRepository};
pub use users::UserRepository;

/// Embedded migrations from `crates/api/migrations/`.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Errors that can occur during repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate relation row).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// Enables WAL journaling and foreign key enforcement, and creates the
/// database file if it does not exist yet.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be
/// established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = database_url
        .expose_secret()
        .parse::<SqliteConnectOptions>()?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures for repository tests: a migrated in-memory database
    //! and minimal row seeding.

    use cartwheel_core::{ProductId, UserId};
    use sqlx::SqlitePool;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    /// Connect to a fresh in-memory database and apply migrations.
    ///
    /// A single connection is used so every query sees the same in-memory
    /// database for the pool's lifetime.
    pub async fn memory_pool() -> SqlitePool {
        let options = "sqlite::memory:"
            .parse::<SqliteConnectOptions>()
            .expect("valid connection string")
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .expect("connect to in-memory sqlite");

        super::MIGRATOR.run(&pool).await.expect("run migrations");
        pool
    }

    pub async fn seed_user(pool: &SqlitePool, first_name: &str, last_name: &str) -> UserId {
        sqlx::query_scalar(
            "INSERT INTO user (first_name, last_name) VALUES (?1, ?2) RETURNING id",
        )
        .bind(first_name)
        .bind(last_name)
        .fetch_one(pool)
        .await
        .map(UserId::new)
        .expect("seed user")
    }

    pub async fn seed_product(pool: &SqlitePool, title: &str, price_cents: i64) -> ProductId {
        sqlx::query_scalar(
            "INSERT INTO product (title, description, price_cents, category) \
             VALUES (?1, '', ?2, 'misc') RETURNING id",
        )
        .bind(title)
        .bind(price_cents)
        .fetch_one(pool)
        .await
        .map(ProductId::new)
        .expect("seed product")
    }
}
