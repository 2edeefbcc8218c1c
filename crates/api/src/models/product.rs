//! Product domain types.

use serde::Serialize;

use cartwheel_core::{Price, ProductId};

/// A catalog product with all of its own fields.
///
/// Aggregates (reviews, rating, likes) are computed per request and attached
/// by the detail representation, not stored here.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    /// Decoded from the `price_cents` column.
    #[sqlx(rename = "price_cents")]
    pub price: Price,
    pub category: String,
    pub image: String,
}

/// Abbreviated product record for list views.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductSummary {
    pub id: ProductId,
    pub title: String,
    #[sqlx(rename = "price_cents")]
    pub price: Price,
    pub image: String,
}
