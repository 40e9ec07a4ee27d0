//! Persistence for accounts and favorites.
//!
//! # Database: `pur_beurre`
//!
//! ## Tables
//!
//! - `pur_beurre.account` - Site accounts (email, username, Argon2 hash)
//! - `pur_beurre.favorite` - User to product bookmarks
//! - `tower_sessions.session` - Session records (owned by `tower-sessions-sqlx-store`)
//!
//! Without a database, sessions live in a bounded [`MemorySessionStore`].
//!
//! Every repository is an async trait with a `PostgreSQL` implementation and an
//! in-memory one ([`memory`]) used by tests and by the service when no database
//! URL is configured.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p pur-beurre-cli -- migrate
//! ```

pub mod favorites;
pub mod memory;
pub mod sessions;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use favorites::{FavoriteRepository, PgFavoriteRepository};
pub use memory::{MemoryFavoriteRepository, MemoryUserRepository};
pub use sessions::{MemorySessionStore, sweep_expired_sessions};
pub use users::{PgUserRepository, UserRepository};

/// Errors returned by repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
    pub(crate) fn from_insert(err: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict.to_owned());
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    use sqlx::error::{DatabaseError, ErrorKind};

    use super::*;

    #[derive(Debug)]
    struct ConstraintError {
        unique: bool,
    }

    impl fmt::Display for ConstraintError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message())
        }
    }

    impl StdError for ConstraintError {}

    impl DatabaseError for ConstraintError {
        fn message(&self) -> &str {
            "constraint violated"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(if self.unique { "23505" } else { "23503" }))
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            if self.unique {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::ForeignKeyViolation
            }
        }
    }

    #[test]
    fn test_unique_violation_becomes_conflict() {
        let err = sqlx::Error::Database(Box::new(ConstraintError { unique: true }));
        let mapped = RepositoryError::from_insert(err, "email already exists");
        assert!(matches!(mapped, RepositoryError::Conflict(msg) if msg == "email already exists"));
    }

    #[test]
    fn test_other_errors_stay_database_errors() {
        let err = sqlx::Error::Database(Box::new(ConstraintError { unique: false }));
        assert!(matches!(
            RepositoryError::from_insert(err, "email already exists"),
            RepositoryError::Database(_)
        ));

        assert!(matches!(
            RepositoryError::from_insert(sqlx::Error::RowNotFound, "email already exists"),
            RepositoryError::Database(sqlx::Error::RowNotFound)
        ));
    }
}
