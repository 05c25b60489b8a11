//! Database operations for the Skillet `PostgreSQL` database.
//!
//! # Tables (schema `skillet`)
//!
//! - `user` - Accounts (email is the username, password stored as Argon2 hash)
//! - `auth_token` - One opaque bearer token per user
//! - `tag` / `ingredient` - User-owned lookup records
//! - `recipe` - The primary owned resource
//! - `recipe_tag` / `recipe_ingredient` - Many-to-many association tables
//!
//! All repositories use the runtime sqlx query API with `FromRow` row types
//! converted into domain types, and scope every query to the owning user.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p skillet-cli -- migrate
//! ```

pub mod attributes;
pub mod recipes;
pub mod tokens;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A payload referenced a tag/ingredient id that does not exist.
    ///
    /// `field` names the offending payload field (`tags` or `ingredients`)
    /// so the error can be keyed back to it in the 400 response.
    #[error("invalid reference in field {field}")]
    InvalidReference {
        /// Payload field the bad id came from.
        field: &'static str,
    },
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a foreign-key violation on an association table back to the payload
/// field that supplied the bad id.
fn association_field(constraint: Option<&str>) -> Option<&'static str> {
    let constraint = constraint?;
    if constraint.contains("ingredient") {
        Some("ingredients")
    } else if constraint.contains("tag") {
        Some("tags")
    } else {
        None
    }
}

/// Translate an association-insert failure into `InvalidReference` when it is
/// a foreign-key violation, passing other errors through unchanged.
fn map_association_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_foreign_key_violation()
        && let Some(field) = association_field(db_err.constraint())
    {
        return RepositoryError::InvalidReference { field };
    }
    RepositoryError::Database(e)
}
