//! User domain types.
//!
//! Accounts are owned by the external auth subsystem; the catalog only ever
//! sees the resolved identity of the current request.

use cartwheel_core::UserId;

/// The authenticated caller, resolved from a bearer token.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CurrentUser {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    /// Admins may mutate any review.
    pub is_staff: bool,
}

impl CurrentUser {
    /// Whether this caller may mutate a review authored by `author_id`.
    #[must_use]
    pub fn may_edit_review(&self, author_id: UserId) -> bool {
        self.is_staff || self.id == author_id
    }
}
