//! Favorites registry: the user to substitute-product bookmark relation.

use tracing::instrument;

use pur_beurre_core::{ProductId, UserId};

use crate::db::RepositoryError;
use crate::db::favorites::FavoriteRepository;

/// Favorites registry.
///
/// Add and remove are idempotent; listing is newest first.
pub struct FavoritesRegistry<'a> {
    favorites: &'a dyn FavoriteRepository,
}

impl<'a> FavoritesRegistry<'a> {
    #[must_use]
    pub const fn new(favorites: &'a dyn FavoriteRepository) -> Self {
        Self { favorites }
    }

    /// Bookmark a product. Re-adding is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add_favorite(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        if self.favorites.add(user_id, product_id).await? {
            tracing::info!("favorite added");
        }
        Ok(())
    }

    /// Remove a bookmark. Removing a missing one is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn remove_favorite(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        if self.favorites.remove(user_id, product_id).await? {
            tracing::info!("favorite removed");
        }
        Ok(())
    }

    /// Bookmarked products, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails.
    pub async fn list_favorites(&self, user_id: UserId) -> Result<Vec<ProductId>, RepositoryError> {
        let links = self.favorites.list(user_id).await?;
        Ok(links.into_iter().map(|link| link.product_id).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryFavoriteRepository;

    #[tokio::test]
    async fn test_add_twice_keeps_one_entry() {
        let repo = MemoryFavoriteRepository::new();
        let registry = FavoritesRegistry::new(&repo);
        let user = UserId::new(1);
        let p1 = ProductId::new(3_017_620_422_003);

        registry.add_favorite(user, p1).await.unwrap();
        registry.add_favorite(user, p1).await.unwrap();

        assert_eq!(registry.list_favorites(user).await.unwrap(), vec![p1]);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let repo = MemoryFavoriteRepository::new();
        let registry = FavoritesRegistry::new(&repo);
        let user = UserId::new(1);
        let p1 = ProductId::new(1);

        registry.remove_favorite(user, p1).await.unwrap();
        registry.add_favorite(user, p1).await.unwrap();
        registry.remove_favorite(user, p1).await.unwrap();
        registry.remove_favorite(user, p1).await.unwrap();

        assert!(registry.list_favorites(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_per_user() {
        let repo = MemoryFavoriteRepository::new();
        let registry = FavoritesRegistry::new(&repo);
        let alice = UserId::new(1);
        let bob = UserId::new(2);

        registry.add_favorite(alice, ProductId::new(1)).await.unwrap();
        registry.add_favorite(alice, ProductId::new(2)).await.unwrap();
        registry.add_favorite(bob, ProductId::new(3)).await.unwrap();

        assert_eq!(
            registry.list_favorites(alice).await.unwrap(),
            vec![ProductId::new(2), ProductId::new(1)]
        );
        assert_eq!(
            registry.list_favorites(bob).await.unwrap(),
            vec![ProductId::new(3)]
        );
    }
}
