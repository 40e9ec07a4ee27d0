//! User domain types.

use chrono::{DateTime, Utc};

use pur_beurre_core::{Email, UserId, Username};

/// A registered account (domain type).
///
/// The password hash is deliberately not part of this type; it only leaves
/// the repository through `UserRepository::get_password_hash`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login email, unique case-insensitively.
    pub email: Email,
    /// Display name.
    pub username: Username,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Data needed to insert a new account.
#[derive(Clone)]
pub struct NewUser {
    pub email: Email,
    pub username: Username,
    /// Argon2id PHC string.
    pub password_hash: String,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// Something a session can be bound to.
pub trait Authenticatable {
    /// Identifier stored in the session record.
    fn auth_id(&self) -> UserId;
}

impl Authenticatable for User {
    fn auth_id(&self) -> UserId {
        self.id
    }
}
