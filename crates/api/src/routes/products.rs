//! Product route handlers.
//!
//! List and detail are open; mutation and the toggle actions require an
//! authenticated caller. The detail representation enriches the product
//! with its reviews, aggregate rating, and like count.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cartwheel_core::{Price, ProductId};

use crate::db::{
    ProductChanges, ProductFields, ProductFilter, ProductOrdering, ProductRepository,
    RelationRepository, ReviewRepository,
};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::middleware::rate_limit::{ClientIdentity, SEARCH_SCOPE};
use crate::models::product::{Product, ProductSummary};
use crate::models::relation::{ToggleKind, ToggleState};
use crate::state::AppState;

use super::reviews::ReviewView;

/// List filter/ordering query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub category: Option<String>,
    pub title: Option<String>,
    pub desc: Option<String>,
    pub price_from: Option<Decimal>,
    pub price_to: Option<Decimal>,
    pub ordering: Option<String>,
}

/// Search query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Payload for creating a product or fully replacing one.
#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    pub category: String,
    #[serde(default)]
    pub image: String,
}

/// Payload for `PATCH /products/{id}`; every field optional.
#[derive(Debug, Default, Deserialize)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub category: Option<String>,
    pub image: Option<String>,
}

/// Payload for `POST /products/{id}/create_review`.
///
/// The author is never part of the payload; it comes from the request's
/// authentication context.
#[derive(Debug, Deserialize)]
pub struct ReviewPayload {
    pub rating: i64,
    #[serde(default)]
    pub text: String,
}

/// Full product representation with computed aggregates.
#[derive(Debug, Serialize)]
pub struct ProductDetailView {
    #[serde(flatten)]
    pub product: Product,
    pub reviews: Vec<ReviewView>,
    pub rating: f64,
    pub likes: i64,
}

/// Response of the toggle actions.
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub state: ToggleState,
    pub detail: &'static str,
}

/// List products with optional filters and ordering.
///
/// # Errors
///
/// 400 for an unknown `ordering` field or an invalid price bound.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<Vec<ProductSummary>>> {
    let ordering = query
        .ordering
        .as_deref()
        .map(|value| {
            ProductOrdering::parse(value).ok_or_else(|| {
                AppError::validation("ordering", format!("cannot order by {value}"))
            })
        })
        .transpose()?;

    let filter = ProductFilter {
        category: query.category,
        title: query.title,
        description: query.desc,
        price_from: parse_price_bound(query.price_from, "price_from")?,
        price_to: parse_price_bound(query.price_to, "price_to")?,
    };

    let products = ProductRepository::new(state.pool())
        .list(&filter, ordering)
        .await?;

    Ok(Json(products))
}

/// Retrieve one product with reviews and aggregates.
///
/// # Errors
///
/// 404 for unknown products.
pub async fn retrieve(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetailView>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or(AppError::NotFound("product"))?;

    Ok(Json(detail_view(&state, product).await?))
}

/// Create a product.
///
/// # Errors
///
/// 401 for unauthenticated callers.
pub async fn create(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .create(&fields_from(payload))
        .await?;

    Ok(Json(product))
}

/// Replace a product's fields.
///
/// # Errors
///
/// 401 for unauthenticated callers, 404 for unknown products.
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<Product>> {
    let fields = fields_from(payload);
    let changes = ProductChanges {
        title: Some(fields.title),
        description: Some(fields.description),
        price: Some(fields.price),
        category: Some(fields.category),
        image: Some(fields.image),
    };

    let product = product_update(&state, id, &changes).await?;
    Ok(Json(product))
}

/// Apply a partial update to a product.
///
/// # Errors
///
/// 401 for unauthenticated callers, 404 for unknown products.
pub async fn partial_update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(payload): Json<ProductPatch>,
) -> Result<Json<Product>> {
    let changes = ProductChanges {
        title: payload.title,
        description: payload.description,
        price: payload.price,
        category: payload.category,
        image: payload.image,
    };

    let product = product_update(&state, id, &changes).await?;
    Ok(Json(product))
}

/// Delete a product.
///
/// # Errors
///
/// 401 for unauthenticated callers, 404 for unknown products.
pub async fn destroy(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    let deleted = ProductRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("product"));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Create a review for a product; the author is the authenticated caller.
///
/// # Errors
///
/// 404 for unknown products, 400 for a duplicate review or an out-of-range
/// rating.
pub async fn create_review(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(payload): Json<ReviewPayload>,
) -> Result<(StatusCode, Json<ReviewView>)> {
    ensure_product_exists(&state, id).await?;

    let repo = ReviewRepository::new(state.pool());
    let review = repo
        .create(&user, id, payload.rating, &payload.text)
        .await?;

    let enriched = repo
        .get_with_author(review.id)
        .await?
        .ok_or(AppError::NotFound("review"))?;

    Ok((StatusCode::CREATED, Json(ReviewView::from(enriched))))
}

/// Toggle the caller's Like for a product.
///
/// # Errors
///
/// 401 for unauthenticated callers, 404 for unknown products.
pub async fn like(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ToggleResponse>> {
    toggle(&state, ToggleKind::Like, &user, id, "liked", "disliked").await
}

/// Toggle the caller's Favorite for a product.
///
/// # Errors
///
/// 401 for unauthenticated callers, 404 for unknown products.
pub async fn favorite(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ToggleResponse>> {
    toggle(
        &state,
        ToggleKind::Favorite,
        &user,
        id,
        "added to favorites",
        "removed from favorites",
    )
    .await
}

/// Toggle the product in or out of the caller's cart.
///
/// # Errors
///
/// 401 for unauthenticated callers, 404 for unknown products.
pub async fn cart(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ToggleResponse>> {
    toggle(
        &state,
        ToggleKind::Cart,
        &user,
        id,
        "added to cart",
        "removed from cart",
    )
    .await
}

/// Search products by title-or-description substring.
///
/// Rate limited per identity. A missing or empty `q` is a validation
/// error, not a match-all.
///
/// # Errors
///
/// 429 when the caller's search budget is exhausted, 400 for a missing `q`.
pub async fn search(
    State(state): State<AppState>,
    identity: ClientIdentity,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ProductDetailView>>> {
    state.limiter().check(SEARCH_SCOPE, &identity)?;

    let needle = query
        .q
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::validation("q", "this parameter is required"))?;

    let products = ProductRepository::new(state.pool()).search(&needle).await?;

    let mut results = Vec::with_capacity(products.len());
    for product in products {
        results.push(detail_view(&state, product).await?);
    }

    Ok(Json(results))
}

// =============================================================================
// Helpers
// =============================================================================

async fn toggle(
    state: &AppState,
    kind: ToggleKind,
    user: &crate::models::user::CurrentUser,
    product: ProductId,
    on_detail: &'static str,
    off_detail: &'static str,
) -> Result<Json<ToggleResponse>> {
    ensure_product_exists(state, product).await?;

    let outcome = RelationRepository::new(state.pool())
        .toggle(kind, user.id, product)
        .await?;

    let detail = match outcome.state {
        ToggleState::On => on_detail,
        ToggleState::Off => off_detail,
    };

    Ok(Json(ToggleResponse {
        state: outcome.state,
        detail,
    }))
}

async fn ensure_product_exists(state: &AppState, id: ProductId) -> Result<()> {
    let product = ProductRepository::new(state.pool()).get(id).await?;
    if product.is_none() {
        return Err(AppError::NotFound("product"));
    }
    Ok(())
}

/// Assemble the enriched detail representation for one product.
async fn detail_view(state: &AppState, product: Product) -> Result<ProductDetailView> {
    let reviews_repo = ReviewRepository::new(state.pool());
    let relations_repo = RelationRepository::new(state.pool());

    let reviews = reviews_repo
        .list_for_product(product.id)
        .await?
        .into_iter()
        .map(ReviewView::from)
        .collect();
    let rating = reviews_repo.average_rating(product.id).await?;
    let likes = relations_repo.likes_count(product.id).await?;

    Ok(ProductDetailView {
        product,
        reviews,
        rating,
        likes,
    })
}

fn fields_from(payload: ProductPayload) -> ProductFields {
    ProductFields {
        title: payload.title,
        description: payload.description,
        price: payload.price,
        category: payload.category,
        image: payload.image,
    }
}

fn parse_price_bound(value: Option<Decimal>, field: &'static str) -> Result<Option<Price>> {
    value
        .map(|amount| {
            Price::from_decimal(amount).map_err(|e| AppError::validation(field, e.to_string()))
        })
        .transpose()
}

async fn product_update(
    state: &AppState,
    id: ProductId,
    changes: &ProductChanges,
) -> Result<Product> {
    use crate::db::RepositoryError;

    ProductRepository::new(state.pool())
        .update(id, changes)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("product"),
            other => AppError::Database(other),
        })
}
