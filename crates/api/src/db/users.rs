//! User lookups for request authentication.
//!
//! The account subsystem (registration, login, token issuance) lives
//! elsewhere; this repository only resolves a presented token to a user.

use sqlx::SqlitePool;

use super::RepositoryError;
use crate::models::user::CurrentUser;

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Resolve a bearer token to its user.
    ///
    /// Returns `None` for unknown tokens.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_token(&self, token: &str) -> Result<Option<CurrentUser>, RepositoryError> {
        let user = sqlx::query_as::<_, CurrentUser>(
            "SELECT u.id, u.first_name, u.last_name, u.is_staff \
             FROM api_token t \
             JOIN user u ON u.id = t.user_id \
             WHERE t.token = ?1",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{memory_pool, seed_user};

    #[tokio::test]
    async fn resolves_known_token() {
        let pool = memory_pool().await;
        let user_id = seed_user(&pool, "Ada", "Lovelace").await;
        sqlx::query("INSERT INTO api_token (token, user_id) VALUES ('tok-1', ?1)")
            .bind(user_id)
            .execute(&pool)
            .await
            .expect("seed token");

        let repo = UserRepository::new(&pool);
        let user = repo
            .get_by_token("tok-1")
            .await
            .expect("query")
            .expect("user");
        assert_eq!(user.id, user_id);
        assert_eq!(user.first_name, "Ada");
        assert!(!user.is_staff);
    }

    #[tokio::test]
    async fn unknown_token_is_none() {
        let pool = memory_pool().await;

        let repo = UserRepository::new(&pool);
        assert!(repo.get_by_token("nope").await.expect("query").is_none());
    }
}
