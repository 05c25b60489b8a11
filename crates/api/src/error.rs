//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`. Client-facing bodies are JSON: validation failures
//! are a field → messages map, everything else is `{"detail": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::validation::FieldErrors;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Payload validation failed; the map is keyed by field name.
    #[error("Validation error: {0}")]
    Validation(#[from] FieldErrors),

    /// Resource absent, or present but owned by another account. The two are
    /// deliberately indistinguishable.
    #[error("Not found")]
    NotFound,

    /// Request carries no valid bearer token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn response_parts(&self) -> (StatusCode, Value) {
        match self {
            Self::Database(err) => repository_parts(err),
            Self::Auth(err) => auth_parts(err),
            Self::Validation(errors) => validation_parts(errors),
            Self::NotFound => (StatusCode::NOT_FOUND, json!({"detail": "Not found."})),
            Self::Unauthorized(detail) => (StatusCode::UNAUTHORIZED, json!({"detail": detail})),
            Self::BadRequest(detail) => (StatusCode::BAD_REQUEST, json!({"detail": detail})),
            Self::Internal(_) => internal_parts(),
        }
    }

    /// Whether this error should be captured to Sentry.
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Internal(_) => true,
            Self::Database(err) | Self::Auth(AuthError::Repository(err)) => matches!(
                err,
                RepositoryError::Database(_)
                    | RepositoryError::DataCorruption(_)
                    | RepositoryError::Conflict(_)
            ),
            Self::Auth(AuthError::PasswordHash) => true,
            _ => false,
        }
    }
}

fn repository_parts(err: &RepositoryError) -> (StatusCode, Value) {
    match err {
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, json!({"detail": "Not found."})),
        RepositoryError::InvalidReference { field } => validation_parts(&FieldErrors::single(
            field,
            "Invalid id - object does not exist.",
        )),
        RepositoryError::Database(_)
        | RepositoryError::DataCorruption(_)
        | RepositoryError::Conflict(_) => internal_parts(),
    }
}

fn auth_parts(err: &AuthError) -> (StatusCode, Value) {
    match err {
        AuthError::InvalidCredentials => (
            StatusCode::BAD_REQUEST,
            json!({"non_field_errors": ["Unable to authenticate with provided credentials."]}),
        ),
        AuthError::UserAlreadyExists => validation_parts(&FieldErrors::single(
            "email",
            "user with this email already exists.",
        )),
        AuthError::Validation(errors) => validation_parts(errors),
        AuthError::Repository(err) => repository_parts(err),
        AuthError::PasswordHash => internal_parts(),
    }
}

fn validation_parts(errors: &FieldErrors) -> (StatusCode, Value) {
    (
        StatusCode::BAD_REQUEST,
        serde_json::to_value(errors).unwrap_or_else(|_| json!({})),
    )
}

fn internal_parts() -> (StatusCode, Value) {
    // Don't expose internal error details to clients
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"detail": "Internal server error."}),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let (status, body) = self.response_parts();
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}
