//! Domain types for the catalog.
//!
//! These are validated domain objects decoded straight from database rows;
//! wire-format request/response types live next to their route handlers.

pub mod product;
pub mod relation;
pub mod review;
pub mod user;

pub use product::{Product, ProductSummary};
pub use relation::{OffBehavior, SavedProduct, ToggleKind, ToggleOutcome, ToggleState};
pub use review::{Review, ReviewWithAuthor};
pub use user::CurrentUser;
