//! Server-side session manager.
//!
//! A session is a record in a [`SessionStore`] keyed by an unguessable 128-bit
//! id, which doubles as the cookie token. A record without an
//! `_auth_user_id` entry is anonymous.
//!
//! Unknown, expired and malformed tokens are never errors: they resolve to
//! `None` and the caller treats the client as anonymous. Only store failures
//! surface as [`SessionError`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tower_sessions::SessionStore;
use tower_sessions::cookie::time::{Duration, OffsetDateTime};
use tower_sessions::session::{Id, Record};
use tracing::instrument;

use pur_beurre_core::UserId;

use crate::db::MemorySessionStore;
use crate::models::session::{SessionState, keys};
use crate::models::user::Authenticatable;

/// Session store failure.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store error: {0}")]
    Store(#[from] tower_sessions::session_store::Error),

    #[error("session lifetime puts the expiry date out of range")]
    ExpiryOutOfRange,
}

/// Returned when a cookie value is not a well-formed session token.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("malformed session token")]
pub struct InvalidSessionToken;

/// Opaque session token carried in the `sessionid` cookie.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(Id);

impl SessionToken {
    /// Underlying store id.
    #[must_use]
    pub const fn id(&self) -> &Id {
        &self.0
    }
}

// Tokens are credentials; keep them out of logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionToken {
    type Err = InvalidSessionToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<Id>()
            .map(Self)
            .map_err(|_| InvalidSessionToken)
    }
}

/// Issues, resolves, rotates and destroys sessions.
#[derive(Debug, Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionManager {
    /// Create a manager over a session store.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Manager backed by a bounded process-local memory store.
    #[must_use]
    pub fn in_memory(ttl: Duration, capacity: u64) -> Self {
        Self::new(Arc::new(MemorySessionStore::new(capacity)), ttl)
    }

    /// Session lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create an anonymous session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the store cannot persist the record.
    #[instrument(skip(self))]
    pub async fn start_session(&self) -> Result<SessionToken, SessionError> {
        let mut record = self.new_record(HashMap::new())?;
        self.store.create(&mut record).await?;
        Ok(SessionToken(record.id))
    }

    /// Bind a user to the session and rotate its token.
    ///
    /// The old record is deleted and its data carried over to a record under a
    /// fresh id, unless it belonged to a different user. An unknown or expired
    /// `token` behaves like a fresh anonymous session. Returns the new token.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the store fails.
    #[instrument(skip(self, token, user), fields(user_id = %user.auth_id()))]
    pub async fn authenticate_session<U>(
        &self,
        token: &SessionToken,
        user: &U,
    ) -> Result<SessionToken, SessionError>
    where
        U: Authenticatable + Sync,
    {
        let user_id = user.auth_id();

        let mut data = match self.load_live(token).await? {
            Some(record) => match decode_state(&record.data) {
                SessionState::Authenticated(owner) if owner != user_id => HashMap::new(),
                _ => record.data,
            },
            None => HashMap::new(),
        };
        data.insert(
            keys::AUTH_USER_ID.to_string(),
            serde_json::Value::String(user_id.to_string()),
        );

        let mut record = self.new_record(data)?;
        self.store.create(&mut record).await?;
        self.store.delete(token.id()).await?;

        tracing::debug!("session rotated");
        Ok(SessionToken(record.id))
    }

    /// State of a live session, or `None` for unknown and expired tokens.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the store fails.
    pub async fn lookup(&self, token: &SessionToken) -> Result<Option<SessionState>, SessionError> {
        Ok(self
            .load_live(token)
            .await?
            .map(|record| decode_state(&record.data)))
    }

    /// The user bound to a session, if any.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the store fails.
    pub async fn resolve(&self, token: &SessionToken) -> Result<Option<UserId>, SessionError> {
        Ok(self.lookup(token).await?.and_then(SessionState::user_id))
    }

    /// Destroy a session. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the store fails.
    #[instrument(skip(self, token))]
    pub async fn end_session(&self, token: &SessionToken) -> Result<(), SessionError> {
        self.store.delete(token.id()).await?;
        Ok(())
    }

    fn new_record(&self, data: HashMap<String, serde_json::Value>) -> Result<Record, SessionError> {
        let expiry_date = OffsetDateTime::now_utc()
            .checked_add(self.ttl)
            .ok_or(SessionError::ExpiryOutOfRange)?;
        Ok(Record {
            id: Id::default(),
            data,
            expiry_date,
        })
    }

    async fn load_live(&self, token: &SessionToken) -> Result<Option<Record>, SessionError> {
        let record = self.store.load(token.id()).await?;
        Ok(record.filter(|r| r.expiry_date > OffsetDateTime::now_utc()))
    }
}

fn decode_state(data: &HashMap<String, serde_json::Value>) -> SessionState {
    let Some(value) = data.get(keys::AUTH_USER_ID) else {
        return SessionState::Anonymous;
    };

    match value.as_str().map(str::parse::<UserId>) {
        Some(Ok(user_id)) => SessionState::Authenticated(user_id),
        _ => {
            tracing::warn!("ignoring malformed user id in session record");
            SessionState::Anonymous
        }
    }
}
