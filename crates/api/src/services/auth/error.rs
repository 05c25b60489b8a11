//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::validation::FieldErrors;

/// Errors from authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email, wrong password, or empty credentials. The three cases
    /// are deliberately collapsed so callers cannot probe which accounts
    /// exist.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email is already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Registration/profile payload failed field validation.
    #[error("validation failed: {0}")]
    Validation(#[from] FieldErrors),

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Database operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
