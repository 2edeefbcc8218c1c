//! Review route handlers and wire representations.
//!
//! Mutation is author-or-admin only; there is no anonymous read surface on
//! these endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cartwheel_core::{ProductId, ReviewId};

use crate::db::ReviewRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::review::ReviewWithAuthor;
use crate::state::AppState;

/// Fixed display label for authors with no name on file.
const ANONYMOUS_LABEL: &str = "Anonymous";

/// Author fields of a review as serialized.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewAuthorView {
    pub first_name: String,
    pub last_name: String,
    /// Trimmed full name, or a fixed anonymous label when both name fields
    /// are empty.
    pub display_name: String,
}

impl ReviewAuthorView {
    fn new(first_name: String, last_name: String) -> Self {
        let display_name = if first_name.is_empty() && last_name.is_empty() {
            ANONYMOUS_LABEL.to_string()
        } else {
            format!("{first_name} {last_name}").trim().to_string()
        };

        Self {
            first_name,
            last_name,
            display_name,
        }
    }
}

/// A review as serialized, with its author attached.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewView {
    pub id: ReviewId,
    pub product: ProductId,
    pub rating: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author: ReviewAuthorView,
}

impl From<ReviewWithAuthor> for ReviewView {
    fn from(review: ReviewWithAuthor) -> Self {
        Self {
            id: review.id,
            product: review.product_id,
            rating: review.rating,
            text: review.text,
            created_at: review.created_at,
            author: ReviewAuthorView::new(review.first_name, review.last_name),
        }
    }
}

/// Full-replace payload for `PUT /reviews/{id}`.
#[derive(Debug, Deserialize)]
pub struct ReviewUpdate {
    pub rating: i64,
    #[serde(default)]
    pub text: String,
}

/// Partial payload for `PATCH /reviews/{id}`.
#[derive(Debug, Deserialize)]
pub struct ReviewPatch {
    pub rating: Option<i64>,
    pub text: Option<String>,
}

/// Replace a review's rating and text.
///
/// # Errors
///
/// 404 for unknown reviews, 403 unless the caller is the author or an
/// admin, 400 for an out-of-range rating.
pub async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
    Json(payload): Json<ReviewUpdate>,
) -> Result<Json<ReviewView>> {
    let repo = ReviewRepository::new(state.pool());
    check_may_edit(&repo, id, &user).await?;

    let updated = repo
        .update(id, Some(payload.rating), Some(&payload.text))
        .await?;

    Ok(Json(ReviewView::from(updated)))
}

/// Apply a partial update to a review.
///
/// # Errors
///
/// Same as [`update`].
pub async fn partial_update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
    Json(payload): Json<ReviewPatch>,
) -> Result<Json<ReviewView>> {
    let repo = ReviewRepository::new(state.pool());
    check_may_edit(&repo, id, &user).await?;

    let updated = repo
        .update(id, payload.rating, payload.text.as_deref())
        .await?;

    Ok(Json(ReviewView::from(updated)))
}

/// Delete a review.
///
/// # Errors
///
/// 404 for unknown reviews, 403 unless the caller is the author or an admin.
pub async fn destroy(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
) -> Result<StatusCode> {
    let repo = ReviewRepository::new(state.pool());
    check_may_edit(&repo, id, &user).await?;

    repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Load the review and enforce the author-or-admin rule.
async fn check_may_edit(
    repo: &ReviewRepository<'_>,
    id: ReviewId,
    user: &crate::models::user::CurrentUser,
) -> Result<()> {
    let review = repo.get(id).await?.ok_or(AppError::NotFound("review"))?;

    if !user.may_edit_review(review.author_id) {
        return Err(AppError::Forbidden);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_joins_names() {
        let author = ReviewAuthorView::new("Ada".to_string(), "Lovelace".to_string());
        assert_eq!(author.display_name, "Ada Lovelace");
    }

    #[test]
    fn display_name_handles_single_name() {
        let author = ReviewAuthorView::new("Ada".to_string(), String::new());
        assert_eq!(author.display_name, "Ada");
    }

    #[test]
    fn nameless_author_gets_anonymous_label() {
        let author = ReviewAuthorView::new(String::new(), String::new());
        assert_eq!(author.display_name, ANONYMOUS_LABEL);
    }
}
