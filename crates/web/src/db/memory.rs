//! In-memory repositories.
//!
//! Used by unit and integration tests, and by the web service when no database
//! URL is configured. State lives for the lifetime of the value.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use pur_beurre_core::{Email, ProductId, UserId};

use super::{FavoriteRepository, RepositoryError, UserRepository};
use crate::models::favorite::FavoriteLink;
use crate::models::user::{NewUser, User};

#[derive(Debug, Default)]
struct UserTable {
    next_id: i64,
    rows: Vec<(User, String)>,
}

/// In-memory [`UserRepository`].
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    table: RwLock<UserTable>,
}

impl MemoryUserRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        // Held for the whole check-and-insert so concurrent signups serialize.
        let mut table = self.table.write().await;

        if table
            .rows
            .iter()
            .any(|(user, _)| user.email.matches(&new_user.email))
        {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        table.next_id += 1;
        let user = User {
            id: UserId::new(table.next_id),
            email: new_user.email.clone(),
            username: new_user.username.clone(),
            created_at: Utc::now(),
        };
        table
            .rows
            .push((user.clone(), new_user.password_hash.clone()));

        Ok(user)
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .find(|(user, _)| user.id == id)
            .map(|(user, _)| user.clone()))
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .get_password_hash(email)
            .await?
            .map(|(user, _)| user))
    }

    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .find(|(user, _)| user.email.matches(email))
            .cloned())
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let table = self.table.read().await;
        i64::try_from(table.rows.len())
            .map_err(|e| RepositoryError::DataCorruption(format!("account count overflow: {e}")))
    }
}

/// In-memory [`FavoriteRepository`].
///
/// Links are kept in insertion order per user; listing walks them backwards.
#[derive(Debug, Default)]
pub struct MemoryFavoriteRepository {
    links: RwLock<HashMap<UserId, Vec<FavoriteLink>>>,
}

impl MemoryFavoriteRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FavoriteRepository for MemoryFavoriteRepository {
    async fn add(&self, user_id: UserId, product_id: ProductId) -> Result<bool, RepositoryError> {
        let mut links = self.links.write().await;
        let entries = links.entry(user_id).or_default();

        if entries.iter().any(|link| link.product_id == product_id) {
            return Ok(false);
        }

        entries.push(FavoriteLink {
            user_id,
            product_id,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let mut links = self.links.write().await;
        let Some(entries) = links.get_mut(&user_id) else {
            return Ok(false);
        };

        let before = entries.len();
        entries.retain(|link| link.product_id != product_id);
        Ok(entries.len() != before)
    }

    async fn list(&self, user_id: UserId) -> Result<Vec<FavoriteLink>, RepositoryError> {
        let links = self.links.read().await;
        Ok(links
            .get(&user_id)
            .map(|entries| entries.iter().rev().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pur_beurre_core::Username;

    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: Email::parse(email).unwrap(),
            username: Username::parse("tester").unwrap(),
            password_hash: "$argon2id$stub".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let repo = MemoryUserRepository::new();
        let a = repo.create(&new_user("a@example.com")).await.unwrap();
        let b = repo.create(&new_user("b@example.com")).await.unwrap();
        assert!(a.id < b.id);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email_case_insensitively() {
        let repo = MemoryUserRepository::new();
        repo.create(&new_user("test@test.com")).await.unwrap();

        let err = repo.create(&new_user("TEST@Test.com")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_lookup_by_email_and_id() {
        let repo = MemoryUserRepository::new();
        let user = repo.create(&new_user("Jean@Example.com")).await.unwrap();

        let by_email = repo
            .get_by_email(&Email::parse("jean@example.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);

        let (_, hash) = repo
            .get_password_hash(&Email::parse("JEAN@EXAMPLE.COM").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hash, "$argon2id$stub");

        assert_eq!(repo.get_by_id(user.id).await.unwrap(), Some(user));
        assert!(repo.get_by_id(UserId::new(999)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_favorites_add_is_idempotent() {
        let repo = MemoryFavoriteRepository::new();
        let user = UserId::new(1);
        let product = ProductId::new(3_017_620_422_003);

        assert!(repo.add(user, product).await.unwrap());
        assert!(!repo.add(user, product).await.unwrap());
        assert_eq!(repo.list(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_favorites_list_newest_first() {
        let repo = MemoryFavoriteRepository::new();
        let user = UserId::new(1);
        for id in [10, 20, 30] {
            repo.add(user, ProductId::new(id)).await.unwrap();
        }

        let ids: Vec<i64> = repo
            .list(user)
            .await
            .unwrap()
            .iter()
            .map(|link| link.product_id.as_i64())
            .collect();
        assert_eq!(ids, vec![30, 20, 10]);
    }

    #[tokio::test]
    async fn test_favorites_remove() {
        let repo = MemoryFavoriteRepository::new();
        let user = UserId::new(1);
        let other = UserId::new(2);
        let product = ProductId::new(42);

        repo.add(user, product).await.unwrap();
        repo.add(other, product).await.unwrap();

        assert!(repo.remove(user, product).await.unwrap());
        assert!(!repo.remove(user, product).await.unwrap());
        assert!(repo.list(user).await.unwrap().is_empty());
        assert_eq!(repo.list(other).await.unwrap().len(), 1);
    }
}
