//! Product repository: listing with filters and ordering, detail lookup,
//! mutation, and substring search.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use cartwheel_core::{Price, ProductId};

use super::RepositoryError;
use crate::models::product::{Product, ProductSummary};

const SUMMARY_COLUMNS: &str = "id, title, price_cents, image";
const DETAIL_COLUMNS: &str = "id, title, description, price_cents, category, image";

/// Conjunctive product list filters; every field is optional.
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Case-insensitive title substring.
    pub title: Option<String>,
    /// Case-insensitive description substring.
    pub description: Option<String>,
    /// Inclusive lower price bound.
    pub price_from: Option<Price>,
    /// Inclusive upper price bound.
    pub price_to: Option<Price>,
}

/// Requested list ordering, parsed from an `ordering` query value with a
/// leading `-` for descending (`title`, `-title`, `price`, `-price`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductOrdering {
    TitleAsc,
    TitleDesc,
    PriceAsc,
    PriceDesc,
}

impl ProductOrdering {
    /// Parse an `ordering` query value; `None` for unknown fields.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "title" => Some(Self::TitleAsc),
            "-title" => Some(Self::TitleDesc),
            "price" => Some(Self::PriceAsc),
            "-price" => Some(Self::PriceDesc),
            _ => None,
        }
    }

    const fn sql(self) -> &'static str {
        match self {
            Self::TitleAsc => "title ASC",
            Self::TitleDesc => "title DESC",
            Self::PriceAsc => "price_cents ASC",
            Self::PriceDesc => "price_cents DESC",
        }
    }
}

/// Field values for creating a product or fully replacing one.
#[derive(Debug, Clone)]
pub struct ProductFields {
    pub title: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub image: String,
}

/// Partial product update; `None` fields are left untouched.
#[derive(Debug, Default, Clone)]
pub struct ProductChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub category: Option<String>,
    pub image: Option<String>,
}

impl ProductChanges {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.image.is_none()
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List products matching `filter`, in the requested order
    /// (insertion order when none is given).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        ordering: Option<ProductOrdering>,
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {SUMMARY_COLUMNS} FROM product WHERE 1 = 1"
        ));

        if let Some(category) = &filter.category {
            query.push(" AND category = ").push_bind(category);
        }
        if let Some(title) = &filter.title {
            query
                .push(" AND title LIKE ")
                .push_bind(like_pattern(title))
                .push(" ESCAPE '\\'");
        }
        if let Some(description) = &filter.description {
            query
                .push(" AND description LIKE ")
                .push_bind(like_pattern(description))
                .push(" ESCAPE '\\'");
        }
        if let Some(price_from) = filter.price_from {
            query
                .push(" AND price_cents >= ")
                .push_bind(price_from.as_cents());
        }
        if let Some(price_to) = filter.price_to {
            query
                .push(" AND price_cents <= ")
                .push_bind(price_to.as_cents());
        }

        query.push(" ORDER BY ");
        query.push(ordering.map_or("id ASC", ProductOrdering::sql));

        let products = query
            .build_query_as::<ProductSummary>()
            .fetch_all(self.pool)
            .await?;

        Ok(products)
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {DETAIL_COLUMNS} FROM product WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, fields: &ProductFields) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO product (title, description, price_cents, category, image, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             RETURNING {DETAIL_COLUMNS}"
        ))
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.price)
        .bind(&fields.category)
        .bind(&fields.image)
        .bind(chrono::Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(product)
    }

    /// Apply `changes` to a product and return the updated row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Product, RepositoryError> {
        if changes.is_empty() {
            return self.get(id).await?.ok_or(RepositoryError::NotFound);
        }

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE product SET ");
        let mut assignments = query.separated(", ");
        if let Some(title) = &changes.title {
            assignments.push("title = ").push_bind_unseparated(title);
        }
        if let Some(description) = &changes.description {
            assignments
                .push("description = ")
                .push_bind_unseparated(description);
        }
        if let Some(price) = changes.price {
            assignments
                .push("price_cents = ")
                .push_bind_unseparated(price.as_cents());
        }
        if let Some(category) = &changes.category {
            assignments
                .push("category = ")
                .push_bind_unseparated(category);
        }
        if let Some(image) = &changes.image {
            assignments.push("image = ").push_bind_unseparated(image);
        }
        query.push(" WHERE id = ").push_bind(id);

        let result = query.build().execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a product by id.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = ?1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Search products whose title OR description contains `needle`,
    /// case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, needle: &str) -> Result<Vec<Product>, RepositoryError> {
        let pattern = like_pattern(needle);
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {DETAIL_COLUMNS} FROM product \
             WHERE title LIKE ?1 ESCAPE '\\' OR description LIKE ?1 ESCAPE '\\' \
             ORDER BY id"
        ))
        .bind(&pattern)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }
}

/// Build a `%needle%` LIKE pattern, escaping LIKE metacharacters so user
/// input matches literally.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
