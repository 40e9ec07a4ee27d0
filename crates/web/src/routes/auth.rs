//! Account route handlers: login, account creation and logout.
//!
//! Handlers delegate to the account flow controller and translate the
//! resulting [`Transition`] into a redirect (with a cookie change) or a
//! re-rendered form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::error::{Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, append_cookie, removal_cookie, session_cookie};
use crate::models::session::SessionContext;
use crate::routes::NavState;
use crate::services::account::{FlowPage, Rejection, Transition};
use crate::state::AppState;

/// Where successful account flows land.
const LANDING_PATH: &str = "/";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Account creation form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateAccountForm {
    pub email: String,
    pub username: String,
    pub password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub nav: NavState,
    pub error: Option<String>,
    pub email: String,
}

/// Account creation page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/create_account.html")]
pub struct CreateAccountTemplate {
    pub nav: NavState,
    pub error: Option<String>,
    pub email: String,
    pub username: String,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    LoginTemplate {
        nav: NavState::for_user(user.as_ref()),
        error: None,
        email: String::new(),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: SessionContext,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let transition = state
        .account_flow()
        .login(&session.token, &form.email, &form.password)
        .await?;

    Ok(respond(&state, transition, NavState::for_user(user.as_ref())))
}

// =============================================================================
// Account Creation Routes
// =============================================================================

/// Display the account creation page.
pub async fn create_account_page(OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    CreateAccountTemplate {
        nav: NavState::for_user(user.as_ref()),
        error: None,
        email: String::new(),
        username: String::new(),
    }
}

/// Handle account creation form submission.
pub async fn create_account(
    State(state): State<AppState>,
    session: SessionContext,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<CreateAccountForm>,
) -> Result<Response> {
    let transition = state
        .account_flow()
        .create_account(&session.token, &form.email, &form.username, &form.password)
        .await?;

    Ok(respond(&state, transition, NavState::for_user(user.as_ref())))
}

// =============================================================================
// Logout
// =============================================================================

/// Destroy the session and return to the landing page.
pub async fn logout(State(state): State<AppState>, session: SessionContext) -> Result<Response> {
    let transition = state.account_flow().logout(&session.token).await?;
    Ok(respond(&state, transition, NavState::default()))
}

// =============================================================================
// Helpers
// =============================================================================

fn respond(state: &AppState, transition: Transition, nav: NavState) -> Response {
    match transition {
        Transition::SignedIn { user, token } => {
            set_sentry_user(&user.id, Some(user.email.as_str()));
            add_breadcrumb("auth", "Signed in", None);

            let mut response = Redirect::to(LANDING_PATH).into_response();
            append_cookie(
                response.headers_mut(),
                &session_cookie(&token, state.config(), state.sessions().ttl()),
            );
            response
        }
        Transition::SignedOut => {
            clear_sentry_user();
            tracing::info!("user logged out");

            let mut response = Redirect::to(LANDING_PATH).into_response();
            append_cookie(response.headers_mut(), &removal_cookie(state.config()));
            response
        }
        Transition::Rejected(rejection) => render_rejection(rejection, nav),
    }
}

fn render_rejection(rejection: Rejection, nav: NavState) -> Response {
    let Rejection {
        page,
        message,
        email,
        username,
    } = rejection;

    match page {
        FlowPage::Login => LoginTemplate {
            nav,
            error: Some(message),
            email,
        }
        .into_response(),
        FlowPage::CreateAccount => CreateAccountTemplate {
            nav,
            error: Some(message),
            email,
            username,
        }
        .into_response(),
    }
}
