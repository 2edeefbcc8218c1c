//! HTTP route handlers for the catalog API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (DB ping)
//!
//! # Products
//! GET    /products                 - List (open; filters + ordering)
//! POST   /products                 - Create (auth)
//! GET    /products/search?q=...    - Substring search (open, rate limited)
//! GET    /products/{id}            - Detail with reviews/rating/likes (open)
//! PUT    /products/{id}            - Replace (auth)
//! PATCH  /products/{id}            - Partial update (auth)
//! DELETE /products/{id}            - Delete (auth)
//! POST   /products/{id}/create_review - Review the product (auth)
//! POST   /products/{id}/like       - Toggle Like (auth)
//! POST   /products/{id}/favorite   - Toggle Favorite (auth)
//! POST   /products/{id}/cart       - Toggle cart membership (auth)
//!
//! # Reviews (author or admin)
//! PUT    /reviews/{id}             - Replace
//! PATCH  /reviews/{id}             - Partial update
//! DELETE /reviews/{id}             - Delete
//!
//! # Saved products (auth, caller's rows only)
//! GET  /favorites                  - Favorited products
//! GET  /cart                       - Cart products
//! ```

pub mod products;
pub mod reviews;
pub mod saved;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route("/search", get(products::search))
        .route(
            "/{id}",
            get(products::retrieve)
                .put(products::update)
                .patch(products::partial_update)
                .delete(products::destroy),
        )
        .route("/{id}/create_review", post(products::create_review))
        .route("/{id}/like", post(products::like))
        .route("/{id}/favorite", post(products::favorite))
        .route("/{id}/cart", post(products::cart))
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        axum::routing::put(reviews::update)
            .patch(reviews::partial_update)
            .delete(reviews::destroy),
    )
}

/// Create all routes for the catalog API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/reviews", review_routes())
        .route("/favorites", get(saved::favorites))
        .route("/cart", get(saved::cart))
}
