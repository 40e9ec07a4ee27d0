//! CLI subcommands.

pub mod favorites;
pub mod migrate;
pub mod user;

use pur_beurre_web::config::{ConfigError, WebConfig};
use pur_beurre_web::db::{self, RepositoryError};
use pur_beurre_web::services::auth::AuthError;
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying migrations failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Account operation failed.
    #[error("Account error: {0}")]
    Auth(#[from] AuthError),

    /// Repository operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// No account with this email.
    #[error("No user with email: {0}")]
    UnknownUser(String),
}

/// Load configuration and connect to the database.
async fn connect() -> Result<PgPool, CommandError> {
    let config = WebConfig::from_env()?;
    let database_url = config.require_database_url()?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(database_url).await?)
}
