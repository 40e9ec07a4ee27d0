//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                               - Landing page
//! GET  /health                         - Liveness check
//! GET  /health/ready                   - Readiness check (database ping)
//!
//! # Account
//! GET  /login                          - Login page
//! POST /login                          - Login flow
//! GET  /create-account[/]              - Account creation page
//! POST /create-account[/]              - Account creation flow
//! POST /logout                         - Logout flow (GET accepted)
//!
//! # Favorites (requires auth)
//! GET  /favorites                      - Favorite substitutes, newest first
//! POST /favorites/{product_id}         - Add a favorite
//! POST /favorites/{product_id}/delete  - Remove a favorite
//! ```

pub mod auth;
pub mod favorites;
pub mod health;
pub mod home;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::config::WebConfig;
use crate::middleware::{
    auth_rate_limiter, request_id_middleware, security_headers_middleware, session_middleware,
};
use crate::models::user::User;
use crate::state::AppState;

/// Navbar state handed to every page template.
#[derive(Debug, Clone, Default)]
pub struct NavState {
    pub authenticated: bool,
    pub username: String,
}

impl NavState {
    #[must_use]
    pub fn for_user(user: Option<&User>) -> Self {
        user.map_or_else(Self::default, |user| Self {
            authenticated: true,
            username: user.username.to_string(),
        })
    }
}

/// Create the account routes router.
///
/// The form posts to `/create-account/`; both spellings are served.
pub fn auth_routes(config: &WebConfig) -> Router<AppState> {
    let router = Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route(
            "/create-account",
            get(auth::create_account_page).post(auth::create_account),
        )
        .route(
            "/create-account/",
            get(auth::create_account_page).post(auth::create_account),
        )
        .route("/logout", get(auth::logout).post(auth::logout));

    if config.auth_rate_limit {
        router.route_layer(auth_rate_limiter(config.trust_proxy))
    } else {
        router
    }
}

/// Create the favorites routes router.
pub fn favorites_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(favorites::index))
        .route("/{product_id}", post(favorites::add))
        .route("/{product_id}/delete", post(favorites::remove))
}

/// Create the health check routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Create all page routes, wrapped in session resolution.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .merge(auth_routes(state.config()))
        .nest("/favorites", favorites_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
}

/// The complete application: pages, health checks and the shared middleware.
///
/// Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(routes(&state))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri().path(),
                        request_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
