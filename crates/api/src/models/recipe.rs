//! Recipe domain types.

use chrono::{DateTime, Utc};

use skillet_core::{IngredientId, Price, RecipeId, TagId, UserId};

use super::{Ingredient, Tag};

/// A recipe (domain type).
///
/// Carries association ids only; the detail representation resolves them to
/// full [`Tag`]/[`Ingredient`] values.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub id: RecipeId,
    pub user_id: UserId,
    pub title: String,
    /// Preparation time in minutes, never negative.
    pub time_minutes: i32,
    pub price: Price,
    /// Optional free-text link to an external source.
    pub link: Option<String>,
    /// Relative media path of the attached image, if any.
    pub image: Option<String>,
    pub tag_ids: Vec<TagId>,
    pub ingredient_ids: Vec<IngredientId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A recipe with its associations resolved to full objects.
#[derive(Debug, Clone)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
}

/// Validated input for creating a recipe or fully replacing one (PUT).
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub time_minutes: i32,
    pub price: Price,
    pub link: Option<String>,
    pub tag_ids: Vec<TagId>,
    pub ingredient_ids: Vec<IngredientId>,
}

/// Validated partial update (PATCH). `None` fields are left untouched;
/// `Some` association sets replace the stored set exactly.
///
/// `link` is two-level: the outer `None` leaves the stored value alone,
/// `Some(None)` clears it. A full replace (PUT) always carries the outer
/// `Some`, so a link omitted from the payload is reset rather than kept.
#[derive(Debug, Clone, Default)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Price>,
    pub link: Option<Option<String>>,
    pub tag_ids: Option<Vec<TagId>>,
    pub ingredient_ids: Option<Vec<IngredientId>>,
}

impl From<NewRecipe> for RecipeChanges {
    fn from(new: NewRecipe) -> Self {
        Self {
            title: Some(new.title),
            time_minutes: Some(new.time_minutes),
            price: Some(new.price),
            link: Some(new.link),
            tag_ids: Some(new.tag_ids),
            ingredient_ids: Some(new.ingredient_ids),
        }
    }
}

/// Filters for the recipe list operation.
///
/// Within each list an id has to match at least one association (OR); when
/// both lists are present a recipe must match both (AND).
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub tags: Option<Vec<TagId>>,
    pub ingredients: Option<Vec<IngredientId>>,
}
