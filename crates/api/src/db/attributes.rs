//! Generic repository for owned attributes (tags and ingredients).
//!
//! One implementation serves both entity types; [`OwnedAttribute`] supplies
//! the table names. Every query is scoped to the owning user and ordered by
//! name ascending.

use std::marker::PhantomData;

use sqlx::PgPool;

use skillet_core::UserId;

use super::RepositoryError;
use crate::models::OwnedAttribute;

/// Internal row type shared by the tag and ingredient tables.
#[derive(Debug, sqlx::FromRow)]
struct AttributeRow {
    id: i32,
    user_id: i32,
    name: String,
}

/// Repository for owned-attribute database operations.
pub struct AttributeRepository<'a, T> {
    pool: &'a PgPool,
    _entity: PhantomData<T>,
}

impl<'a, T: OwnedAttribute> AttributeRepository<'a, T> {
    /// Create a new attribute repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    /// List the caller's attributes, ordered by name ascending.
    ///
    /// With `assigned_only` the result is restricted to attributes referenced
    /// by at least one of the caller's recipes; an attribute referenced by
    /// several recipes still appears once.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        user_id: UserId,
        assigned_only: bool,
    ) -> Result<Vec<T>, RepositoryError> {
        let sql = if assigned_only {
            format!(
                "SELECT a.id, a.user_id, a.name FROM {table} a \
                 WHERE a.user_id = $1 AND EXISTS (\
                     SELECT 1 FROM {link} l \
                     JOIN skillet.recipe r ON r.id = l.recipe_id \
                     WHERE l.{column} = a.id AND r.user_id = $1\
                 ) \
                 ORDER BY a.name ASC, a.id ASC",
                table = T::TABLE,
                link = T::LINK_TABLE,
                column = T::LINK_COLUMN,
            )
        } else {
            format!(
                "SELECT id, user_id, name FROM {table} \
                 WHERE user_id = $1 \
                 ORDER BY name ASC, id ASC",
                table = T::TABLE,
            )
        };

        let rows: Vec<AttributeRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| T::from_parts(r.id.into(), UserId::new(r.user_id), r.name))
            .collect())
    }

    /// Create a new attribute owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, user_id: UserId, name: &str) -> Result<T, RepositoryError> {
        let sql = format!(
            "INSERT INTO {table} (user_id, name) VALUES ($1, $2) \
             RETURNING id, user_id, name",
            table = T::TABLE,
        );

        let row: AttributeRow = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(name)
            .fetch_one(self.pool)
            .await?;

        Ok(T::from_parts(row.id.into(), UserId::new(row.user_id), row.name))
    }
}
