//! Session cookie transport.
//!
//! Resolves the `sessionid` cookie through the [`SessionManager`] and hands
//! handlers an explicit [`SessionContext`]. A client without a live session
//! gets a fresh anonymous one.
//!
//! [`SessionManager`]: crate::services::session::SessionManager

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
        request::Parts,
    },
    middleware::Next,
    response::Response,
};
use tower_sessions::cookie::{Cookie, SameSite, time::Duration};

use crate::config::WebConfig;
use crate::error::AppError;
use crate::models::session::{SessionContext, SessionState};
use crate::services::session::SessionToken;
use crate::state::AppState;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "sessionid";

/// Resolve the session for every page request.
///
/// Unknown and expired tokens silently become a new anonymous session. The
/// cookie for a new session is only written if the handler did not already
/// set one (login, logout).
///
/// # Errors
///
/// Returns `AppError::Session` if the session store is unreachable.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let sessions = state.sessions();

    let resolved = match session_token_from_headers(request.headers()) {
        Some(token) => sessions
            .lookup(&token)
            .await?
            .map(|session_state| SessionContext {
                token,
                state: session_state,
            }),
        None => None,
    };

    let (context, fresh) = match resolved {
        Some(context) => (context, false),
        None => {
            let token = sessions.start_session().await?;
            let context = SessionContext {
                token,
                state: SessionState::Anonymous,
            };
            (context, true)
        }
    };

    if let Some(user_id) = context.user_id() {
        tracing::Span::current().record("user_id", tracing::field::display(user_id));
    }

    let token = context.token;
    request.extensions_mut().insert(context);

    let mut response = next.run(request).await;

    if fresh && !sets_session_cookie(response.headers()) {
        append_cookie(
            response.headers_mut(),
            &session_cookie(&token, state.config(), sessions.ttl()),
        );
    }

    Ok(response)
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session middleware not installed".to_string()))
    }
}

/// Extract the session token from the request's `Cookie` headers.
///
/// Malformed values are ignored.
#[must_use]
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<SessionToken> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .and_then(|cookie| cookie.value().parse().ok())
}

/// Build the session cookie for a token.
#[must_use]
pub fn session_cookie(token: &SessionToken, config: &WebConfig, ttl: Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.is_secure())
        .max_age(ttl)
        .build()
}

/// Cookie that makes the client drop its session token.
#[must_use]
pub fn removal_cookie(config: &WebConfig) -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.is_secure())
        .build();
    cookie.make_removal();
    cookie
}

/// Append a `Set-Cookie` header.
pub fn append_cookie(headers: &mut HeaderMap, cookie: &Cookie<'_>) {
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            headers.append(SET_COOKIE, value);
        }
        Err(e) => tracing::error!("invalid Set-Cookie header: {}", e),
    }
}

fn sets_session_cookie(headers: &HeaderMap) -> bool {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| Cookie::parse(value).ok())
        .any(|cookie| cookie.name() == SESSION_COOKIE_NAME)
}
