//! Owned-attribute domain types (tags and ingredients).
//!
//! Tags and ingredients have identical shape and identical list/create
//! behavior, so both the repository and the routes are written once against
//! the [`OwnedAttribute`] trait and instantiated twice.

use skillet_core::{IngredientId, TagId, UserId};

/// A small user-owned lookup record with a name.
///
/// Implementors pin down the table layout so the generic repository can build
/// its queries.
pub trait OwnedAttribute: Send + Sync + Unpin + 'static {
    /// Entity id newtype.
    type Id: Copy
        + Eq
        + std::hash::Hash
        + std::fmt::Display
        + From<i32>
        + Into<i32>
        + Send
        + Sync
        + serde::Serialize;

    /// Fully qualified entity table, e.g. `skillet.tag`.
    const TABLE: &'static str;
    /// Fully qualified recipe association table, e.g. `skillet.recipe_tag`.
    const LINK_TABLE: &'static str;
    /// Column in the association table referencing this entity.
    const LINK_COLUMN: &'static str;

    /// Assemble a domain value from its parts.
    fn from_parts(id: Self::Id, user_id: UserId, name: String) -> Self;

    /// Entity id.
    fn id(&self) -> Self::Id;

    /// Display name.
    fn name(&self) -> &str;
}

/// A tag a recipe can be assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub user_id: UserId,
    pub name: String,
}

impl OwnedAttribute for Tag {
    type Id = TagId;

    const TABLE: &'static str = "skillet.tag";
    const LINK_TABLE: &'static str = "skillet.recipe_tag";
    const LINK_COLUMN: &'static str = "tag_id";

    fn from_parts(id: TagId, user_id: UserId, name: String) -> Self {
        Self { id, user_id, name }
    }

    fn id(&self) -> TagId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// An ingredient a recipe can use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub id: IngredientId,
    pub user_id: UserId,
    pub name: String,
}

impl OwnedAttribute for Ingredient {
    type Id = IngredientId;

    const TABLE: &'static str = "skillet.ingredient";
    const LINK_TABLE: &'static str = "skillet.recipe_ingredient";
    const LINK_COLUMN: &'static str = "ingredient_id";

    fn from_parts(id: IngredientId, user_id: UserId, name: String) -> Self {
        Self { id, user_id, name }
    }

    fn id(&self) -> IngredientId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}
