//! Review domain types.

use chrono::{DateTime, Utc};

use cartwheel_core::{ProductId, ReviewId, UserId};

/// Inclusive rating bounds for a review.
pub const RATING_MIN: i64 = 1;
pub const RATING_MAX: i64 = 5;

/// A product review as stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub author_id: UserId,
    pub rating: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A review joined with its author's display fields.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewWithAuthor {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub author_id: UserId,
    pub rating: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub first_name: String,
    pub last_name: String,
}

/// Whether `rating` is within the accepted range.
#[must_use]
pub const fn rating_in_range(rating: i64) -> bool {
    RATING_MIN <= rating && rating <= RATING_MAX
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds_are_inclusive() {
        assert!(!rating_in_range(0));
        assert!(rating_in_range(1));
        assert!(rating_in_range(5));
        assert!(!rating_in_range(6));
    }
}
