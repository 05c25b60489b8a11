//! Auth token repository.
//!
//! Tokens are opaque 40-character hex keys. Each user has at most one; a
//! login reuses the existing key when present, so repeated logins hand back
//! the same token (and a future revocation only has one row to delete).

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use skillet_core::UserId;

use super::RepositoryError;
use crate::models::User;

/// Internal row type for user-joined token lookups.
#[derive(Debug, sqlx::FromRow)]
struct TokenUserRow {
    id: i32,
    email: String,
    name: String,
    is_staff: bool,
    is_superuser: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Repository for auth token database operations.
pub struct TokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TokenRepository<'a> {
    /// Create a new token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find the existing token key for a user, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_for_user(&self, user_id: UserId) -> Result<Option<String>, RepositoryError> {
        let key: Option<(String,)> =
            sqlx::query_as("SELECT key FROM skillet.auth_token WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(self.pool)
                .await?;

        Ok(key.map(|(k,)| k))
    }

    /// Store a freshly generated token key for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has a token.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(&self, key: &str, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO skillet.auth_token (key, user_id) VALUES ($1, $2)")
            .bind(key)
            .bind(user_id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict("user already has a token".to_owned());
                }
                RepositoryError::Database(e)
            })?;

        Ok(())
    }

    /// Resolve a bearer token key to its user.
    ///
    /// Returns `None` for unknown keys; the caller turns that into a 401.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_user(&self, key: &str) -> Result<Option<User>, RepositoryError> {
        let row: Option<TokenUserRow> = sqlx::query_as(
            r#"
            SELECT u.id, u.email, u.name, u.is_staff, u.is_superuser,
                   u.created_at, u.updated_at
            FROM skillet.auth_token t
            JOIN skillet."user" u ON u.id = t.user_id
            WHERE t.key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let email = skillet_core::Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Some(User {
            id: UserId::new(row.id),
            email,
            name: row.name,
            is_staff: row.is_staff,
            is_superuser: row.is_superuser,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }
}
