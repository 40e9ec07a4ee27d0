//! Session-related types.

use pur_beurre_core::UserId;

use crate::services::session::SessionToken;

/// State of a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No user bound yet.
    Anonymous,
    /// Bound to a user after login or account creation.
    Authenticated(UserId),
}

impl SessionState {
    /// The bound user, if any.
    #[must_use]
    pub const fn user_id(self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(id) => Some(id),
        }
    }
}

/// The session attached to the current request.
///
/// Inserted into request extensions by the session middleware; handlers receive
/// it explicitly instead of looking up ambient state.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Token presented (or freshly issued) for this request.
    pub token: SessionToken,
    /// Resolved state of that token.
    pub state: SessionState,
}

impl SessionContext {
    /// The authenticated user, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        self.state.user_id()
    }
}

/// Keys inside a session record's data map.
pub mod keys {
    /// Key holding the authenticated user's id (as a decimal string).
    pub const AUTH_USER_ID: &str = "_auth_user_id";
}
