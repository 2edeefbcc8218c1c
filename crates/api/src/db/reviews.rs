//! Review repository and validation.
//!
//! Creation enforces the one-review-per-(product, author) invariant and the
//! rating range before touching the row. The unique constraint on
//! `(product_id, author_id)` is the backstop for concurrent creates: an
//! insert-time unique violation surfaces as the same duplicate error the
//! pre-check produces, never as a 5xx.

use chrono::Utc;
use sqlx::SqlitePool;

use cartwheel_core::{ProductId, ReviewId, UserId};

use super::RepositoryError;
use crate::error::AppError;
use crate::models::review::{Review, ReviewWithAuthor, rating_in_range};
use crate::models::user::CurrentUser;

const WITH_AUTHOR_COLUMNS: &str = "r.id, r.product_id, r.author_id, r.rating, r.text, \
                                   r.created_at, u.first_name, u.last_name";

/// Why a review could not be created or updated.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// The author already reviewed this product.
    #[error("you cannot review a product twice")]
    Duplicate,

    /// Rating outside the accepted range.
    #[error("rating must be between 1 and 5")]
    RatingOutOfRange,

    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<ReviewError> for AppError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::Duplicate => Self::validation("product", err.to_string()),
            ReviewError::RatingOutOfRange => Self::validation("rating", err.to_string()),
            ReviewError::Repository(RepositoryError::NotFound) => Self::NotFound("review"),
            ReviewError::Repository(repo) => Self::Database(repo),
        }
    }
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a review for `product_id` authored by the current caller.
    ///
    /// The author always comes from the authenticated request context, never
    /// from the payload.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::Duplicate` if the caller already reviewed this
    /// product, `ReviewError::RatingOutOfRange` for a rating outside [1, 5],
    /// and `ReviewError::Repository` for database failures.
    pub async fn create(
        &self,
        author: &CurrentUser,
        product_id: ProductId,
        rating: i64,
        text: &str,
    ) -> Result<Review, ReviewError> {
        if self.exists_for(product_id, author.id).await? {
            return Err(ReviewError::Duplicate);
        }

        if !rating_in_range(rating) {
            return Err(ReviewError::RatingOutOfRange);
        }

        let review = sqlx::query_as::<_, Review>(
            "INSERT INTO review (product_id, author_id, rating, text, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             RETURNING id, product_id, author_id, rating, text, created_at",
        )
        .bind(product_id)
        .bind(author.id)
        .bind(rating)
        .bind(text)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return ReviewError::Duplicate;
            }
            ReviewError::Repository(RepositoryError::Database(e))
        })?;

        Ok(review)
    }

    /// Whether `author_id` already reviewed `product_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists_for(
        &self,
        product_id: ProductId,
        author_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM review WHERE product_id = ?1 AND author_id = ?2)",
        )
        .bind(product_id)
        .bind(author_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Get a review by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let review = sqlx::query_as::<_, Review>(
            "SELECT id, product_id, author_id, rating, text, created_at \
             FROM review WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(review)
    }

    /// Get a review joined with its author's display fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_author(
        &self,
        id: ReviewId,
    ) -> Result<Option<ReviewWithAuthor>, RepositoryError> {
        let review = sqlx::query_as::<_, ReviewWithAuthor>(&format!(
            "SELECT {WITH_AUTHOR_COLUMNS} FROM review r \
             JOIN user u ON u.id = r.author_id \
             WHERE r.id = ?1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(review)
    }

    /// All reviews for a product, oldest first, with author display fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ReviewWithAuthor>, RepositoryError> {
        let reviews = sqlx::query_as::<_, ReviewWithAuthor>(&format!(
            "SELECT {WITH_AUTHOR_COLUMNS} FROM review r \
             JOIN user u ON u.id = r.author_id \
             WHERE r.product_id = ?1 \
             ORDER BY r.id"
        ))
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(reviews)
    }

    /// Apply rating and/or text changes to a review.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::RatingOutOfRange` for a rating outside [1, 5];
    /// `ReviewError::Repository(RepositoryError::NotFound)` if the review
    /// doesn't exist.
    pub async fn update(
        &self,
        id: ReviewId,
        rating: Option<i64>,
        text: Option<&str>,
    ) -> Result<ReviewWithAuthor, ReviewError> {
        if let Some(rating) = rating
            && !rating_in_range(rating)
        {
            return Err(ReviewError::RatingOutOfRange);
        }

        let result = sqlx::query(
            "UPDATE review SET \
             rating = COALESCE(?2, rating), \
             text = COALESCE(?3, text) \
             WHERE id = ?1",
        )
        .bind(id)
        .bind(rating)
        .bind(text)
        .execute(self.pool)
        .await
        .map_err(RepositoryError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ReviewError::Repository(RepositoryError::NotFound));
        }

        self.get_with_author(id)
            .await?
            .ok_or(ReviewError::Repository(RepositoryError::NotFound))
    }

    /// Delete a review by id.
    ///
    /// # Returns
    ///
    /// Returns `true` if the review was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ReviewId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM review WHERE id = ?1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Mean rating for a product, rounded to one decimal place.
    ///
    /// Products with no reviews rate 0.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn average_rating(&self, product_id: ProductId) -> Result<f64, RepositoryError> {
        let average: Option<f64> =
            sqlx::query_scalar("SELECT AVG(rating) FROM review WHERE product_id = ?1")
                .bind(product_id)
                .fetch_one(self.pool)
                .await?;

        Ok(average.map_or(0.0, |a| (a * 10.0).round() / 10.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{memory_pool, seed_product, seed_user};

    fn caller(id: UserId) -> CurrentUser {
        CurrentUser {
            id,
            first_name: String::new(),
            last_name: String::new(),
            is_staff: false,
        }
    }

    #[tokio::test]
    async fn second_review_by_same_author_is_rejected() {
        let pool = memory_pool().await;
        let author = caller(seed_user(&pool, "Ada", "Lovelace").await);
        let product = seed_product(&pool, "Shirt", 1999).await;

        let repo = ReviewRepository::new(&pool);
        let first = repo
            .create(&author, product, 4, "good")
            .await
            .expect("first review");

        let second = repo.create(&author, product, 5, "changed my mind").await;
        assert!(matches!(second, Err(ReviewError::Duplicate)));

        // The first review is unmodified.
        let stored = repo.get(first.id).await.expect("get").expect("review");
        assert_eq!(stored.rating, 4);
        assert_eq!(stored.text, "good");
    }

    #[tokio::test]
    async fn rating_boundaries() {
        let pool = memory_pool().await;
        let product = seed_product(&pool, "Shirt", 1999).await;
        let repo = ReviewRepository::new(&pool);

        for (user, rating, ok) in [("a", 0, false), ("b", 1, true), ("c", 5, true), ("d", 6, false)]
        {
            let author = caller(seed_user(&pool, user, "").await);
            let result = repo.create(&author, product, rating, "").await;
            if ok {
                assert!(result.is_ok(), "rating {rating} should be accepted");
            } else {
                assert!(
                    matches!(result, Err(ReviewError::RatingOutOfRange)),
                    "rating {rating} should be rejected"
                );
            }
        }
    }

    #[tokio::test]
    async fn average_rating_rounds_to_one_decimal() {
        let pool = memory_pool().await;
        let product = seed_product(&pool, "Shirt", 1999).await;
        let repo = ReviewRepository::new(&pool);

        assert!((repo.average_rating(product).await.expect("avg") - 0.0).abs() < f64::EPSILON);

        for (user, rating) in [("a", 5), ("b", 3), ("c", 4)] {
            let author = caller(seed_user(&pool, user, "").await);
            repo.create(&author, product, rating, "").await.expect("review");
        }

        let average = repo.average_rating(product).await.expect("avg");
        assert!((average - 4.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn update_validates_rating() {
        let pool = memory_pool().await;
        let author = caller(seed_user(&pool, "Ada", "Lovelace").await);
        let product = seed_product(&pool, "Shirt", 1999).await;

        let repo = ReviewRepository::new(&pool);
        let review = repo.create(&author, product, 3, "ok").await.expect("review");

        let result = repo.update(review.id, Some(9), None).await;
        assert!(matches!(result, Err(ReviewError::RatingOutOfRange)));

        let updated = repo
            .update(review.id, Some(5), None)
            .await
            .expect("update");
        assert_eq!(updated.rating, 5);
        assert_eq!(updated.text, "ok");
    }
}
