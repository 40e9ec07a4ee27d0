//! Favorite substitute bookmarks.

use chrono::{DateTime, Utc};

use pur_beurre_core::{ProductId, UserId};

/// A user's bookmark on a substitute product.
///
/// `(user_id, product_id)` is unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteLink {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
}
