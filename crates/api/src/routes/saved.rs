//! Listings of the caller's saved products (favorites and cart).
//!
//! Both endpoints require authentication and return only the caller's rows.

use axum::{Json, extract::State};

use crate::db::RelationRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::relation::{SavedProduct, ToggleKind};
use crate::state::AppState;

/// List the caller's favorited products.
///
/// # Errors
///
/// 401 for unauthenticated callers.
pub async fn favorites(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<SavedProduct>>> {
    let saved = RelationRepository::new(state.pool())
        .saved_products(ToggleKind::Favorite, user.id)
        .await?;

    Ok(Json(saved))
}

/// List the products in the caller's cart.
///
/// # Errors
///
/// 401 for unauthenticated callers.
pub async fn cart(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<SavedProduct>>> {
    let saved = RelationRepository::new(state.pool())
        .saved_products(ToggleKind::Cart, user.id)
        .await?;

    Ok(Json(saved))
}
