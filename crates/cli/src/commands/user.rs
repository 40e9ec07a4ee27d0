//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! PUR_BEURRE_NEW_USER_PASSWORD=secret pur-beurre user create -e user@test.fr -u user
//! ```
//!
//! The password is taken from the environment so it never shows up in shell
//! history or the process list.

use pur_beurre_web::db::PgUserRepository;
use pur_beurre_web::services::auth::UserStore;
use secrecy::{ExposeSecret, SecretString};

use super::{CommandError, connect};

/// Environment variable holding the new user's password.
pub const PASSWORD_ENV_VAR: &str = "PUR_BEURRE_NEW_USER_PASSWORD";

/// Create a new user.
///
/// # Errors
///
/// Returns `CommandError::MissingEnvVar` if no password is provided, and
/// `CommandError::Auth` for invalid input or an already registered email.
pub async fn create(email: &str, username: &str) -> Result<(), CommandError> {
    let password = std::env::var(PASSWORD_ENV_VAR)
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar(PASSWORD_ENV_VAR))?;

    let pool = connect().await?;
    let repo = PgUserRepository::new(pool);

    let user = UserStore::new(&repo)
        .create_user(email, username, password.expose_secret())
        .await?;

    tracing::info!("Created user {} ({}) with id {}", user.email, user.username, user.id);
    Ok(())
}
