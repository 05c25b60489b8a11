//! Recipe repository: owner-scoped CRUD plus association management.
//!
//! Association sets are replaced inside the same transaction as the recipe
//! row itself, so an unknown tag/ingredient id aborts the whole operation and
//! the previous association set survives. The ids are resolved by the
//! foreign keys alone, not by owner; see DESIGN.md for why that looseness is
//! kept.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use skillet_core::{IngredientId, Price, RecipeId, TagId, UserId};

use super::{RepositoryError, map_association_error};
use crate::models::{
    Ingredient, NewRecipe, OwnedAttribute, Recipe, RecipeChanges, RecipeDetail, RecipeFilter, Tag,
};

/// Internal row type for `PostgreSQL` recipe queries.
#[derive(Debug, sqlx::FromRow)]
struct RecipeRow {
    id: i32,
    user_id: i32,
    title: String,
    time_minutes: i32,
    price: Price,
    link: Option<String>,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RecipeRow {
    fn into_recipe(self, tag_ids: Vec<TagId>, ingredient_ids: Vec<IngredientId>) -> Recipe {
        Recipe {
            id: RecipeId::new(self.id),
            user_id: UserId::new(self.user_id),
            title: self.title,
            time_minutes: self.time_minutes,
            price: self.price,
            link: self.link,
            image: self.image,
            tag_ids,
            ingredient_ids,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const RECIPE_COLUMNS: &str =
    "id, user_id, title, time_minutes, price, link, image, created_at, updated_at";

/// Repository for recipe database operations.
pub struct RecipeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RecipeRepository<'a> {
    /// Create a new recipe repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the caller's recipes, ordered by title ascending (insertion order
    /// breaks ties), optionally filtered by associated tag/ingredient ids.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        user_id: UserId,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, RepositoryError> {
        let mut sql =
            format!("SELECT {RECIPE_COLUMNS} FROM skillet.recipe r WHERE r.user_id = $1");
        let mut next_arg = 1;

        if filter.tags.is_some() {
            next_arg += 1;
            sql.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM skillet.recipe_tag rt \
                 WHERE rt.recipe_id = r.id AND rt.tag_id = ANY(${next_arg}))"
            ));
        }
        if filter.ingredients.is_some() {
            next_arg += 1;
            sql.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM skillet.recipe_ingredient ri \
                 WHERE ri.recipe_id = r.id AND ri.ingredient_id = ANY(${next_arg}))"
            ));
        }
        sql.push_str(" ORDER BY r.title ASC, r.id ASC");

        let mut query = sqlx::query_as::<_, RecipeRow>(&sql).bind(user_id);
        if let Some(tags) = &filter.tags {
            let ids: Vec<i32> = tags.iter().map(|t| t.as_i32()).collect();
            query = query.bind(ids);
        }
        if let Some(ingredients) = &filter.ingredients {
            let ids: Vec<i32> = ingredients.iter().map(|i| i.as_i32()).collect();
            query = query.bind(ids);
        }

        let rows = query.fetch_all(self.pool).await?;

        let recipe_ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut tag_links = self.load_links::<Tag>(&recipe_ids).await?;
        let mut ingredient_links = self.load_links::<Ingredient>(&recipe_ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let tags = tag_links.remove(&row.id).unwrap_or_default();
                let ingredients = ingredient_links.remove(&row.id).unwrap_or_default();
                row.into_recipe(tags, ingredients)
            })
            .collect())
    }

    /// Get one of the caller's recipes with its associations resolved.
    ///
    /// Returns `None` both for absent ids and for recipes owned by someone
    /// else; the two cases are indistinguishable to the caller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(
        &self,
        user_id: UserId,
        id: RecipeId,
    ) -> Result<Option<RecipeDetail>, RepositoryError> {
        let row: Option<RecipeRow> = sqlx::query_as(&format!(
            "SELECT {RECIPE_COLUMNS} FROM skillet.recipe WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let tags = self.load_associated::<Tag>(row.id).await?;
        let ingredients = self.load_associated::<Ingredient>(row.id).await?;
        let tag_ids = tags.iter().map(OwnedAttribute::id).collect();
        let ingredient_ids = ingredients.iter().map(OwnedAttribute::id).collect();

        Ok(Some(RecipeDetail {
            recipe: row.into_recipe(tag_ids, ingredient_ids),
            tags,
            ingredients,
        }))
    }

    /// Create a recipe owned by the caller, with its associations, atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if a tag/ingredient id does
    /// not exist (nothing is persisted in that case).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, user_id: UserId, new: NewRecipe) -> Result<RecipeId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (recipe_id,): (i32,) = sqlx::query_as(
            "INSERT INTO skillet.recipe (user_id, title, time_minutes, price, link) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(user_id)
        .bind(&new.title)
        .bind(new.time_minutes)
        .bind(new.price)
        .bind(&new.link)
        .fetch_one(&mut *tx)
        .await?;

        let tag_ids: Vec<i32> = new.tag_ids.iter().map(|t| t.as_i32()).collect();
        let ingredient_ids: Vec<i32> = new.ingredient_ids.iter().map(|i| i.as_i32()).collect();
        replace_links::<Tag>(&mut tx, recipe_id, &tag_ids).await?;
        replace_links::<Ingredient>(&mut tx, recipe_id, &ingredient_ids).await?;

        tx.commit().await?;

        Ok(RecipeId::new(recipe_id))
    }

    /// Apply a partial or full update to one of the caller's recipes.
    ///
    /// `None` fields keep their stored value; `Some` association sets replace
    /// the stored set exactly, all inside one transaction. The two-level
    /// `link` can also be cleared (`Some(None)`), which `COALESCE` cannot
    /// express, so it gets its own set/keep flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the recipe is absent or owned by
    /// someone else.
    /// Returns `RepositoryError::InvalidReference` if a tag/ingredient id does
    /// not exist (the previous association set survives).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        user_id: UserId,
        id: RecipeId,
        changes: RecipeChanges,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (set_link, link) = match changes.link {
            Some(link) => (true, link),
            None => (false, None),
        };

        let result = sqlx::query(
            "UPDATE skillet.recipe \
             SET title = COALESCE($3, title), \
                 time_minutes = COALESCE($4, time_minutes), \
                 price = COALESCE($5, price), \
                 link = CASE WHEN $7 THEN $6 ELSE link END, \
                 updated_at = now() \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .bind(&changes.title)
        .bind(changes.time_minutes)
        .bind(changes.price)
        .bind(link)
        .bind(set_link)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        if let Some(tags) = &changes.tag_ids {
            let ids: Vec<i32> = tags.iter().map(|t| t.as_i32()).collect();
            replace_links::<Tag>(&mut tx, id.as_i32(), &ids).await?;
        }
        if let Some(ingredients) = &changes.ingredient_ids {
            let ids: Vec<i32> = ingredients.iter().map(|i| i.as_i32()).collect();
            replace_links::<Ingredient>(&mut tx, id.as_i32(), &ids).await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Attach an image path to a recipe, returning the previously stored path
    /// so the caller can discard the old file.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the recipe is absent or owned by
    /// someone else.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_image(
        &self,
        user_id: UserId,
        id: RecipeId,
        image: &str,
    ) -> Result<Option<String>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<(Option<String>,)> = sqlx::query_as(
            "SELECT image FROM skillet.recipe WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((previous,)) = previous else {
            return Err(RepositoryError::NotFound);
        };

        sqlx::query("UPDATE skillet.recipe SET image = $3, updated_at = now() WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .bind(image)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(previous)
    }

    /// Load association ids for a batch of recipes, grouped by recipe id.
    async fn load_links<T: OwnedAttribute>(
        &self,
        recipe_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<T::Id>>, RepositoryError> {
        if recipe_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT recipe_id, {column} FROM {link} \
             WHERE recipe_id = ANY($1) ORDER BY {column} ASC",
            link = T::LINK_TABLE,
            column = T::LINK_COLUMN,
        );

        let rows: Vec<(i32, i32)> = sqlx::query_as(&sql)
            .bind(recipe_ids.to_vec())
            .fetch_all(self.pool)
            .await?;

        let mut grouped: HashMap<i32, Vec<T::Id>> = HashMap::new();
        for (recipe_id, entity_id) in rows {
            grouped.entry(recipe_id).or_default().push(entity_id.into());
        }
        Ok(grouped)
    }

    /// Load the full associated entities for one recipe, ordered by name.
    async fn load_associated<T: OwnedAttribute>(
        &self,
        recipe_id: i32,
    ) -> Result<Vec<T>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: i32,
            user_id: i32,
            name: String,
        }

        let sql = format!(
            "SELECT a.id, a.user_id, a.name FROM {table} a \
             JOIN {link} l ON l.{column} = a.id \
             WHERE l.recipe_id = $1 \
             ORDER BY a.name ASC, a.id ASC",
            table = T::TABLE,
            link = T::LINK_TABLE,
            column = T::LINK_COLUMN,
        );

        let rows: Vec<Row> = sqlx::query_as(&sql)
            .bind(recipe_id)
            .fetch_all(self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| T::from_parts(r.id.into(), UserId::new(r.user_id), r.name))
            .collect())
    }
}

/// Replace a recipe's association set inside the caller's transaction.
///
/// Duplicate ids in the payload collapse to a single link. A foreign-key
/// violation (unknown id) maps to `InvalidReference` keyed to the payload
/// field, and aborting the transaction restores the previous set.
async fn replace_links<T: OwnedAttribute>(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: i32,
    ids: &[i32],
) -> Result<(), RepositoryError> {
    sqlx::query(&format!(
        "DELETE FROM {link} WHERE recipe_id = $1",
        link = T::LINK_TABLE
    ))
    .bind(recipe_id)
    .execute(&mut **tx)
    .await?;

    if ids.is_empty() {
        return Ok(());
    }

    sqlx::query(&format!(
        "INSERT INTO {link} (recipe_id, {column}) \
         SELECT DISTINCT $1, u FROM unnest($2::int4[]) AS u",
        link = T::LINK_TABLE,
        column = T::LINK_COLUMN,
    ))
    .bind(recipe_id)
    .bind(ids.to_vec())
    .execute(&mut **tx)
    .await
    .map_err(map_association_error)?;

    Ok(())
}
