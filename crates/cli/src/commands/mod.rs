//! CLI command implementations.

pub mod migrate;
pub mod user;

use secrecy::SecretString;
use thiserror::Error;

/// Required environment variable is missing.
#[derive(Debug, Error)]
#[error("Missing environment variable: SKILLET_DATABASE_URL")]
pub struct MissingDatabaseUrl;

/// Resolve the database URL, preferring `SKILLET_DATABASE_URL` and falling
/// back to the generic `DATABASE_URL`.
fn database_url() -> Result<SecretString, MissingDatabaseUrl> {
    std::env::var("SKILLET_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MissingDatabaseUrl)
}
