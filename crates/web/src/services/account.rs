//! Account flows: create-account, login and logout.
//!
//! Each flow takes the caller's session token and returns a [`Transition`]
//! describing what the HTTP layer must do next. User mistakes (duplicate email,
//! bad credentials, invalid input) become [`Transition::Rejected`]; only
//! infrastructure failures are returned as [`FlowError`].

use thiserror::Error;
use tracing::instrument;

use super::auth::{AuthError, UserStore};
use super::session::{SessionError, SessionManager, SessionToken};
use crate::models::user::User;

/// Infrastructure failure inside a flow.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Form page a rejected submission goes back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPage {
    Login,
    CreateAccount,
}

/// A rejected submission, with the fields to re-fill (never the password).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub page: FlowPage,
    pub message: String,
    pub email: String,
    pub username: String,
}

/// Outcome of an account flow.
#[derive(Debug)]
pub enum Transition {
    /// The session now belongs to `user` under a rotated `token`.
    SignedIn { user: User, token: SessionToken },
    /// The session was destroyed.
    SignedOut,
    /// Stay on the form and show the message.
    Rejected(Rejection),
}

/// Account flow controller.
pub struct AccountFlow<'a> {
    users: UserStore<'a>,
    sessions: &'a SessionManager,
}

impl<'a> AccountFlow<'a> {
    #[must_use]
    pub const fn new(users: UserStore<'a>, sessions: &'a SessionManager) -> Self {
        Self { users, sessions }
    }

    /// Register an account and sign the session in as the new user.
    ///
    /// # Errors
    ///
    /// Returns `FlowError` on storage or hashing failures.
    #[instrument(skip(self, session, password), fields(email = %email))]
    pub async fn create_account(
        &self,
        session: &SessionToken,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<Transition, FlowError> {
        let user = match self.users.create_user(email, username, password).await {
            Ok(user) => user,
            Err(err) => {
                let Some(message) = err.user_message() else {
                    return Err(err.into());
                };
                tracing::info!(error = %err, "account creation rejected");
                return Ok(Transition::Rejected(Rejection {
                    page: FlowPage::CreateAccount,
                    message,
                    email: email.trim().to_string(),
                    username: username.trim().to_string(),
                }));
            }
        };

        let token = self.sessions.authenticate_session(session, &user).await?;
        Ok(Transition::SignedIn { user, token })
    }

    /// Check credentials and sign the session in.
    ///
    /// # Errors
    ///
    /// Returns `FlowError` on storage failures.
    #[instrument(skip(self, session, password), fields(email = %email))]
    pub async fn login(
        &self,
        session: &SessionToken,
        email: &str,
        password: &str,
    ) -> Result<Transition, FlowError> {
        let user = match self.users.authenticate(email, password).await {
            Ok(user) => user,
            Err(AuthError::InvalidCredentials) => {
                tracing::warn!("login failed: invalid credentials");
                return Ok(Transition::Rejected(Rejection {
                    page: FlowPage::Login,
                    message: AuthError::InvalidCredentials
                        .user_message()
                        .unwrap_or_default(),
                    email: email.trim().to_string(),
                    username: String::new(),
                }));
            }
            Err(err) => return Err(err.into()),
        };

        let token = self.sessions.authenticate_session(session, &user).await?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(Transition::SignedIn { user, token })
    }

    /// Destroy the session.
    ///
    /// # Errors
    ///
    /// Returns `FlowError` if the session store fails.
    #[instrument(skip(self, session))]
    pub async fn logout(&self, session: &SessionToken) -> Result<Transition, FlowError> {
        self.sessions.end_session(session).await?;
        Ok(Transition::SignedOut)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use tower_sessions::cookie::time::Duration;

    use pur_beurre_core::UserId;

    use super::*;
    use crate::db::MemoryUserRepository;

    struct Fixture {
        repo: MemoryUserRepository,
        sessions: SessionManager,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                repo: MemoryUserRepository::new(),
                sessions: SessionManager::in_memory(Duration::hours(1), 1_000),
            }
        }

        fn flow(&self) -> AccountFlow<'_> {
            AccountFlow::new(UserStore::new(&self.repo), &self.sessions)
        }

        async fn user_count(&self) -> i64 {
            UserStore::new(&self.repo).count().await.unwrap()
        }
    }

    fn rejection(transition: Transition) -> Rejection {
        match transition {
            Transition::Rejected(rejection) => rejection,
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_account_signs_in() {
        let fx = Fixture::new();
        let anonymous = fx.sessions.start_session().await.unwrap();
        let before = fx.user_count().await;

        let transition = fx
            .flow()
            .create_account(&anonymous, "new_user@test.fr", "new_user", "test")
            .await
            .unwrap();

        let Transition::SignedIn { user, token } = transition else {
            panic!("expected sign-in");
        };
        assert_eq!(fx.sessions.resolve(&token).await.unwrap(), Some(user.id));
        assert_eq!(fx.sessions.resolve(&anonymous).await.unwrap(), None);
        assert_eq!(fx.user_count().await, before + 1);
    }

    #[tokio::test]
    async fn test_create_account_duplicate_keeps_form_state() {
        let fx = Fixture::new();
        let session = fx.sessions.start_session().await.unwrap();
        fx.flow()
            .create_account(&session, "user@test.fr", "user", "test")
            .await
            .unwrap();

        let session = fx.sessions.start_session().await.unwrap();
        let rejected = rejection(
            fx.flow()
                .create_account(&session, "USER@test.fr", "other", "secret")
                .await
                .unwrap(),
        );

        assert_eq!(rejected.page, FlowPage::CreateAccount);
        assert_eq!(rejected.email, "USER@test.fr");
        assert_eq!(rejected.username, "other");
        assert!(rejected.message.contains("already exists"));
        assert_eq!(fx.sessions.resolve(&session).await.unwrap(), None);
        assert_eq!(fx.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_create_account_empty_password() {
        let fx = Fixture::new();
        let session = fx.sessions.start_session().await.unwrap();

        let rejected = rejection(
            fx.flow()
                .create_account(&session, "new_user@test.fr", "new_user", "")
                .await
                .unwrap(),
        );

        assert_eq!(rejected.page, FlowPage::CreateAccount);
        assert_eq!(fx.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_login_wrong_password_stays_anonymous() {
        let fx = Fixture::new();
        let session = fx.sessions.start_session().await.unwrap();
        fx.flow()
            .create_account(&session, "user@test.fr", "user", "test")
            .await
            .unwrap();

        let anonymous = fx.sessions.start_session().await.unwrap();
        let wrong = rejection(
            fx.flow()
                .login(&anonymous, "user@test.fr", "wrong_password")
                .await
                .unwrap(),
        );
        let unknown = rejection(
            fx.flow()
                .login(&anonymous, "nobody@test.fr", "wrong_password")
                .await
                .unwrap(),
        );

        assert_eq!(wrong.page, FlowPage::Login);
        assert_eq!(wrong.message, unknown.message);
        assert_eq!(fx.sessions.resolve(&anonymous).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_then_logout() {
        let fx = Fixture::new();
        let session = fx.sessions.start_session().await.unwrap();
        let Transition::SignedIn { user: created, .. } = fx
            .flow()
            .create_account(&session, "user@test.fr", "user", "test")
            .await
            .unwrap()
        else {
            panic!("expected sign-in");
        };

        let anonymous = fx.sessions.start_session().await.unwrap();
        let Transition::SignedIn { token, .. } = fx
            .flow()
            .login(&anonymous, "user@test.fr", "test")
            .await
            .unwrap()
        else {
            panic!("expected sign-in");
        };
        assert_eq!(fx.sessions.resolve(&token).await.unwrap(), Some(created.id));

        let transition = fx.flow().logout(&token).await.unwrap();
        assert!(matches!(transition, Transition::SignedOut));
        assert_eq!(fx.sessions.resolve(&token).await.unwrap(), None::<UserId>);
    }
}
