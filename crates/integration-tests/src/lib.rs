//! Integration tests for Pur Beurre.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process scenarios (no database needed)
//! cargo test -p pur-beurre-integration-tests
//!
//! # Live-server scenarios against a running instance
//! PUR_BEURRE_TEST_URL=http://localhost:8000 cargo test -p pur-beurre-integration-tests -- --ignored
//! ```
//!
//! [`TestApp`] drives the real router over in-memory stores and keeps the
//! `sessionid` cookie between requests like a browser would.

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use tower::ServiceExt;

use pur_beurre_web::config::WebConfig;
use pur_beurre_web::middleware::SESSION_COOKIE_NAME;
use pur_beurre_web::routes;
use pur_beurre_web::services::session::SessionToken;
use pur_beurre_web::state::AppState;

/// A response with its body collected.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Redirect target, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// Value of the `sessionid` cookie set by this response, if any.
    ///
    /// An empty string means the cookie was cleared.
    #[must_use]
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .filter_map(|pair| pair.split_once('='))
            .find(|(name, _)| name.trim() == SESSION_COOKIE_NAME)
            .map(|(_, value)| value.trim().to_string())
    }
}

/// In-process application with a one-cookie jar.
pub struct TestApp {
    state: AppState,
    router: Router,
    session: Option<String>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Fresh application over empty in-memory stores, without rate limiting.
    #[must_use]
    pub fn new() -> Self {
        let config = WebConfig {
            auth_rate_limit: false,
            ..WebConfig::default()
        };
        let state = AppState::in_memory(config);

        Self {
            router: routes::app(state.clone()),
            state,
            session: None,
        }
    }

    /// Shared state, for inspecting stores directly.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Current session token held by the jar.
    ///
    /// # Panics
    ///
    /// Panics if the stored cookie is not a valid token.
    #[must_use]
    pub fn session_token(&self) -> Option<SessionToken> {
        self.session
            .as_deref()
            .map(|value| value.parse().expect("cookie holds a valid session token"))
    }

    /// Replace the cookie sent with the next requests.
    pub fn set_session_cookie(&mut self, value: Option<&str>) {
        self.session = value.map(String::from);
    }

    /// Number of registered accounts.
    ///
    /// # Panics
    ///
    /// Panics if the store fails.
    pub async fn user_count(&self) -> i64 {
        self.state
            .user_store()
            .count()
            .await
            .expect("count users")
    }

    /// `GET` a path.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = self.request("GET", path).body(Body::empty());
        self.send(request).await
    }

    /// `POST` an url-encoded form.
    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let request = self
            .request("POST", path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body));
        self.send(request).await
    }

    /// Create an account through the HTTP flow.
    pub async fn create_account(&mut self, email: &str, username: &str, password: &str) -> TestResponse {
        self.post_form(
            "/create-account/",
            &[("email", email), ("username", username), ("password", password)],
        )
        .await
    }

    /// Log in through the HTTP flow.
    pub async fn login(&mut self, email: &str, password: &str) -> TestResponse {
        self.post_form("/login", &[("email", email), ("password", password)])
            .await
    }

    fn request(&self, method: &str, path: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        match &self.session {
            Some(value) => builder.header(header::COOKIE, format!("{SESSION_COOKIE_NAME}={value}")),
            None => builder,
        }
    }

    async fn send(&mut self, request: Result<Request<Body>, axum::http::Error>) -> TestResponse {
        let request = request.expect("valid request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");

        let response = TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        };

        if let Some(value) = response.session_cookie() {
            self.session = (!value.is_empty()).then_some(value);
        }

        response
    }
}
