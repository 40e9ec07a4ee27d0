//! User store: account creation and password authentication.
//!
//! Passwords are hashed with Argon2id and a per-user random salt; only the PHC
//! string is persisted.

mod error;

pub use error::{AuthError, ValidationError};

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::instrument;

use pur_beurre_core::{Email, UserId, Username};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::{NewUser, User};

/// Hash verified when the email is unknown, so both failure paths cost one
/// Argon2 verification.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("pur-beurre-timing-equalizer").ok());

/// Account store.
///
/// Borrowed from `AppState` per request.
pub struct UserStore<'a> {
    users: &'a dyn UserRepository,
}

impl<'a> UserStore<'a> {
    /// Create a user store over a repository.
    #[must_use]
    pub const fn new(users: &'a dyn UserRepository) -> Self {
        Self { users }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for a malformed email, blank username or
    /// empty password.
    /// Returns `AuthError::DuplicateEmail` if the email is already registered
    /// (compared case-insensitively).
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn create_user(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(ValidationError::from)?;
        let username = Username::parse(username).map_err(ValidationError::from)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&NewUser {
                email,
                username,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::DuplicateEmail,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "account created");
        Ok(user)
    }

    /// Check an email/password pair.
    ///
    /// Unknown email, malformed email and wrong password all return the same
    /// error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the pair does not match an account.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let Ok(email) = Email::parse(email) else {
            burn_dummy_verification(password);
            return Err(AuthError::InvalidCredentials);
        };

        let Some((user, password_hash)) = self.users.get_password_hash(&email).await? else {
            burn_dummy_verification(password);
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Look up an account by email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the lookup fails.
    pub async fn find_by_email(&self, email: &Email) -> Result<Option<User>, AuthError> {
        Ok(self.users.get_by_email(email).await?)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the lookup fails.
    pub async fn get_user(&self, user_id: UserId) -> Result<Option<User>, AuthError> {
        Ok(self.users.get_by_id(user_id).await?)
    }

    /// Number of registered accounts.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the count fails.
    pub async fn count(&self) -> Result<i64, AuthError> {
        Ok(self.users.count().await?)
    }
}

/// Validate password meets requirements.
///
/// Only emptiness is checked; no strength policy is enforced.
const fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

fn burn_dummy_verification(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::MemoryUserRepository;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_signups_for_one_email_create_one_account() {
        let repo = Arc::new(MemoryUserRepository::new());

        let attempts: Vec<_> = (0..16)
            .map(|i| {
                let repo = Arc::clone(&repo);
                let email = if i % 2 == 0 { "racer@test.fr" } else { "RACER@Test.fr" };
                tokio::spawn(async move {
                    UserStore::new(repo.as_ref())
                        .create_user(email, "racer", "test")
                        .await
                })
            })
            .collect();

        let mut created = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(_) => created += 1,
                Err(err) => assert!(matches!(err, AuthError::DuplicateEmail)),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(UserStore::new(repo.as_ref()).count().await.unwrap(), 1);
    }

    #[test]
    fn test_hash_is_salted_and_verifiable() {
        let a = hash_password("test").unwrap();
        let b = hash_password("test").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2id$"));
        assert!(verify_password("test", &a).is_ok());
        assert!(matches!(
            verify_password("wrong", &a),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_create_user_once_then_duplicate() {
        let repo = MemoryUserRepository::new();
        let store = UserStore::new(&repo);

        let user = store
            .create_user("new_user@test.fr", "new_user", "test")
            .await
            .unwrap();
        assert_eq!(user.email.as_str(), "new_user@test.fr");
        assert_eq!(user.username.as_str(), "new_user");

        let err = store
            .create_user("NEW_USER@test.fr", "someone", "other")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_user_validation() {
        let repo = MemoryUserRepository::new();
        let store = UserStore::new(&repo);

        let err = store
            .create_user("new_user@test.fr", "new_user", "")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Validation(ValidationError::EmptyPassword)
        ));

        let err = store
            .create_user("not-an-email", "new_user", "test")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Validation(ValidationError::InvalidEmail(_))
        ));

        let err = store
            .create_user("new_user@test.fr", "   ", "test")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Validation(ValidationError::EmptyUsername)
        ));

        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_password_is_not_stored_verbatim() {
        let repo = MemoryUserRepository::new();
        let store = UserStore::new(&repo);
        store
            .create_user("user@test.fr", "user", "test")
            .await
            .unwrap();

        let (_, hash) = repo
            .get_password_hash(&Email::parse("user@test.fr").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_ne!(hash, "test");
        assert!(!hash.contains("test"));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let repo = MemoryUserRepository::new();
        let store = UserStore::new(&repo);
        let created = store
            .create_user("user@test.fr", "user", "test")
            .await
            .unwrap();

        let user = store.authenticate("USER@test.fr", "test").await.unwrap();
        assert_eq!(user.id, created.id);

        for (email, password) in [
            ("user@test.fr", "wrong_password"),
            ("nobody@test.fr", "wrong_password"),
            ("nobody@test.fr", "test"),
            ("garbage", "test"),
        ] {
            let err = store.authenticate(email, password).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials), "{email}");
        }
    }

    #[tokio::test]
    async fn test_lookups() {
        let repo = MemoryUserRepository::new();
        let store = UserStore::new(&repo);
        let created = store
            .create_user("user@test.fr", "user", "test")
            .await
            .unwrap();

        let found = store
            .find_by_email(&Email::parse("User@Test.fr").unwrap())
            .await
            .unwrap();
        assert_eq!(found, Some(created.clone()));
        assert_eq!(store.get_user(created.id).await.unwrap(), Some(created));
        assert!(store.get_user(UserId::new(404)).await.unwrap().is_none());
    }
}
