//! Authentication error types.

use thiserror::Error;

use pur_beurre_core::{EmailError, UsernameError};

use crate::db::RepositoryError;

/// Form input rejected before touching the store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Username missing or blank.
    #[error("username is required")]
    EmptyUsername,

    /// Username over the length limit.
    #[error("username too long (max {max} characters)")]
    UsernameTooLong { max: usize },

    /// Password missing.
    #[error("password is required")]
    EmptyPassword,
}

impl From<UsernameError> for ValidationError {
    fn from(err: UsernameError) -> Self {
        match err {
            UsernameError::Empty => Self::EmptyUsername,
            UsernameError::TooLong { max, .. } => Self::UsernameTooLong { max },
        }
    }
}

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// An account with this email already exists.
    #[error("email already registered")]
    DuplicateEmail,

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Rejected input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Message safe to show next to the form, or `None` for server-side failures.
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::DuplicateEmail => Some("An account with this email already exists.".to_string()),
            Self::InvalidCredentials => Some("Invalid email or password.".to_string()),
            Self::Validation(ValidationError::InvalidEmail(_)) => {
                Some("Please enter a valid email address.".to_string())
            }
            Self::Validation(ValidationError::EmptyUsername) => {
                Some("Please choose a username.".to_string())
            }
            Self::Validation(ValidationError::UsernameTooLong { max }) => {
                Some(format!("Username must be at most {max} characters."))
            }
            Self::Validation(ValidationError::EmptyPassword) => {
                Some("Please enter a password.".to_string())
            }
            Self::Repository(_) | Self::PasswordHash => None,
        }
    }
}
