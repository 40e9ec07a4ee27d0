//! Authentication extractors.
//!
//! Both read the [`SessionContext`] installed by the session middleware and
//! load the bound user from the user store.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};

use crate::error::AppError;
use crate::models::session::SessionContext;
use crate::models::user::User;
use crate::state::AppState;

/// Login page unauthenticated visitors are sent to.
pub const LOGIN_PATH: &str = "/login";

/// Extractor that requires an authenticated user.
///
/// If the session is anonymous, returns a redirect to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub User);

/// Error returned when authentication is required but the user is not logged in.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (session middleware missing).
    Unauthorized,
    /// Looking up the user failed.
    Failed(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Failed(err) => err.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let context = parts
            .extensions
            .get::<SessionContext>()
            .ok_or(AuthRejection::Unauthorized)?;

        let user_id = context.user_id().ok_or(AuthRejection::RedirectToLogin)?;

        // A session can outlive its account; treat it as logged out.
        let user = state
            .user_store()
            .get_user(user_id)
            .await
            .map_err(|e| AuthRejection::Failed(e.into()))?
            .ok_or(AuthRejection::RedirectToLogin)?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if the session is
/// anonymous.
pub struct OptionalAuth(pub Option<User>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(user_id) = parts
            .extensions
            .get::<SessionContext>()
            .and_then(SessionContext::user_id)
        else {
            return Ok(Self(None));
        };

        let user = state.user_store().get_user(user_id).await?;
        Ok(Self(user))
    }
}
