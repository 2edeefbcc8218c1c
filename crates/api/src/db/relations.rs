//! The toggle engine for Like, Favorite, and Cart relations.
//!
//! One generic get-or-create-then-branch flow covers all three kinds; the
//! [`ToggleKind`] policy supplies table/column names and the off-transition
//! row policy. Table and column names come from `ToggleKind` constants, so
//! the formatted SQL never contains caller input.

use sqlx::SqlitePool;

use cartwheel_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::relation::{
    OffBehavior, SavedProduct, SavedProductRow, ToggleKind, ToggleOutcome, ToggleState,
};

/// Repository for the user/product toggle relations.
pub struct RelationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RelationRepository<'a> {
    /// Create a new relation repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Flip the relation of `kind` between `user` and `product`.
    ///
    /// The whole read-modify-write runs in one transaction. The insert uses
    /// `ON CONFLICT DO NOTHING`, so a concurrent request racing the
    /// get-or-create is treated as "row already existed" rather than a
    /// fatal unique violation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn toggle(
        &self,
        kind: ToggleKind,
        user: UserId,
        product: ProductId,
    ) -> Result<ToggleOutcome, RepositoryError> {
        let table = kind.table();
        let flag = kind.flag_column();

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!(
            "INSERT INTO {table} (product_id, user_id, {flag}) VALUES (?1, ?2, 0) \
             ON CONFLICT (product_id, user_id) DO NOTHING"
        ))
        .bind(product)
        .bind(user)
        .execute(&mut *tx)
        .await?;

        let currently_on: bool = sqlx::query_scalar(&format!(
            "SELECT {flag} FROM {table} WHERE product_id = ?1 AND user_id = ?2"
        ))
        .bind(product)
        .bind(user)
        .fetch_one(&mut *tx)
        .await?;

        let state = if currently_on {
            match kind.off_behavior() {
                OffBehavior::FlipFlag => {
                    sqlx::query(&format!(
                        "UPDATE {table} SET {flag} = 0 WHERE product_id = ?1 AND user_id = ?2"
                    ))
                    .bind(product)
                    .bind(user)
                    .execute(&mut *tx)
                    .await?;
                }
                OffBehavior::DeleteRow => {
                    sqlx::query(&format!(
                        "DELETE FROM {table} WHERE product_id = ?1 AND user_id = ?2"
                    ))
                    .bind(product)
                    .bind(user)
                    .execute(&mut *tx)
                    .await?;
                }
            }
            ToggleState::Off
        } else {
            sqlx::query(&format!(
                "UPDATE {table} SET {flag} = 1 WHERE product_id = ?1 AND user_id = ?2"
            ))
            .bind(product)
            .bind(user)
            .execute(&mut *tx)
            .await?;
            ToggleState::On
        };

        tx.commit().await?;

        Ok(ToggleOutcome { state })
    }

    /// How many users currently like `product`.
    ///
    /// Counts only rows with the flag set; un-liked rows survive in storage
    /// but don't count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn likes_count(&self, product: ProductId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM wishlist WHERE product_id = ?1 AND is_liked = 1",
        )
        .bind(product)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Products `user` saved through the given relation, with the relation
    /// row id, insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn saved_products(
        &self,
        kind: ToggleKind,
        user: UserId,
    ) -> Result<Vec<SavedProduct>, RepositoryError> {
        let table = kind.table();

        let rows = sqlx::query_as::<_, SavedProductRow>(&format!(
            "SELECT t.id AS relation_id, p.id AS product_id, p.title, p.description, \
                    p.price_cents, p.category, p.image \
             FROM {table} t \
             JOIN product p ON p.id = t.product_id \
             WHERE t.user_id = ?1 \
             ORDER BY t.id"
        ))
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(SavedProduct::from).collect())
    }
}
