//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! skillet-cli user create-superuser -e admin@example.com -p changeit -n "Admin Name"
//! ```
//!
//! # Environment Variables
//!
//! - `SKILLET_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)

use thiserror::Error;

use skillet_api::db;
use skillet_api::services::auth::{AuthError, AuthService};

use super::MissingDatabaseUrl;

/// Errors that can occur during user management.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    MissingEnvVar(#[from] MissingDatabaseUrl),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to create user: {0}")]
    Auth(#[from] AuthError),
}

/// Create a new superuser account.
///
/// The account gets both the staff and superuser flags and can sign in to the
/// API like any other user.
///
/// # Errors
///
/// Returns `UserError` if the credentials fail validation, the email is
/// already registered, or the database is unreachable.
pub async fn create_superuser(email: &str, password: &str, name: &str) -> Result<i32, UserError> {
    dotenvy::dotenv().ok();

    let database_url = super::database_url()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Creating superuser: {}", email);
    let user = AuthService::new(&pool)
        .create_superuser(Some(email), Some(password), Some(name))
        .await?;

    tracing::info!("Superuser created with id {}", user.id);
    Ok(user.id.into())
}
