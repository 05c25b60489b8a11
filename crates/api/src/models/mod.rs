//! Domain models.
//!
//! These types represent validated domain objects separate from database row
//! types and from the serde payload/response types in `routes`.

pub mod attribute;
pub mod recipe;
pub mod user;

pub use attribute::{Ingredient, OwnedAttribute, Tag};
pub use recipe::{NewRecipe, Recipe, RecipeChanges, RecipeDetail, RecipeFilter};
pub use user::User;
