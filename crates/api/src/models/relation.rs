//! Toggle relation types.
//!
//! Like, Favorite, and Cart membership are one pattern: a unique row per
//! (product, user) pair flipped on and off by repeated requests. The kinds
//! differ only in storage naming and in what "off" means for the row.

use cartwheel_core::ProductId;
use serde::Serialize;

use super::product::Product;

/// The three user/product toggle relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleKind {
    /// Wishlist membership; un-liking keeps the row as a durable signal.
    Like,
    /// Favorites; the row is removed when toggled off.
    Favorite,
    /// Cart membership; the row is removed when toggled off.
    Cart,
}

/// What toggling off does to the underlying row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffBehavior {
    /// Set the flag column to false, keep the row.
    FlipFlag,
    /// Delete the row entirely.
    DeleteRow,
}

impl ToggleKind {
    /// Table holding this relation.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Like => "wishlist",
            Self::Favorite => "favorite",
            Self::Cart => "cart_item",
        }
    }

    /// Boolean column encoding the on/off state.
    #[must_use]
    pub const fn flag_column(self) -> &'static str {
        match self {
            Self::Like => "is_liked",
            Self::Favorite => "favorite",
            Self::Cart => "added",
        }
    }

    /// Row policy for the off transition.
    #[must_use]
    pub const fn off_behavior(self) -> OffBehavior {
        match self {
            Self::Like => OffBehavior::FlipFlag,
            Self::Favorite | Self::Cart => OffBehavior::DeleteRow,
        }
    }
}

/// Resulting state after a toggle call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleState {
    On,
    Off,
}

/// Outcome of one toggle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub state: ToggleState,
}

/// A product saved through a toggle relation, as returned by the
/// favorites and cart listings.
#[derive(Debug, Clone, Serialize)]
pub struct SavedProduct {
    /// The relation row's own id.
    pub id: i64,
    pub product: Product,
}

/// Row shape for the saved-product listings.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SavedProductRow {
    pub relation_id: i64,
    pub product_id: ProductId,
    pub title: String,
    pub description: String,
    pub price_cents: cartwheel_core::Price,
    pub category: String,
    pub image: String,
}

impl From<SavedProductRow> for SavedProduct {
    fn from(row: SavedProductRow) -> Self {
        Self {
            id: row.relation_id,
            product: Product {
                id: row.product_id,
                title: row.title,
                description: row.description,
                price: row.price_cents,
                category: row.category,
                image: row.image,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_keeps_its_row_on_toggle_off() {
        assert_eq!(ToggleKind::Like.off_behavior(), OffBehavior::FlipFlag);
    }

    #[test]
    fn favorite_and_cart_delete_on_toggle_off() {
        assert_eq!(ToggleKind::Favorite.off_behavior(), OffBehavior::DeleteRow);
        assert_eq!(ToggleKind::Cart.off_behavior(), OffBehavior::DeleteRow);
    }
}
