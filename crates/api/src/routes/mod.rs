//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness check
//! GET  /health/ready                   - Readiness check (pings the database)
//!
//! # Users
//! POST /api/user/create                - Register a new user
//! POST /api/user/token                 - Exchange credentials for a token
//! GET  /api/user/me                    - Current user's profile
//! PUT  /api/user/me                    - Replace profile fields
//! PATCH /api/user/me                   - Partially update profile fields
//!
//! # Tags
//! GET  /api/recipe/tags                - List own tags (?assigned_only=1)
//! POST /api/recipe/tags                - Create a tag
//!
//! # Ingredients
//! GET  /api/recipe/ingredients         - List own ingredients (?assigned_only=1)
//! POST /api/recipe/ingredients         - Create an ingredient
//!
//! # Recipes
//! GET  /api/recipe/recipes             - List own recipes (?tags=1,2&ingredients=3)
//! POST /api/recipe/recipes             - Create a recipe
//! GET  /api/recipe/recipes/{id}        - Recipe detail
//! PUT  /api/recipe/recipes/{id}        - Full update
//! PATCH /api/recipe/recipes/{id}       - Partial update
//! POST /api/recipe/recipes/{id}/upload-image - Attach an image (multipart)
//! ```
//!
//! All `/api/recipe/*` routes and `/api/user/me` require a token in the
//! `Authorization` header.

pub mod attributes;
pub mod recipes;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::models::{Ingredient, Tag};
use crate::state::AppState;

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(users::create))
        .route("/token", post(users::token))
        .route(
            "/me",
            get(users::me).put(users::update_me).patch(users::update_me),
        )
}

/// Create the recipe routes router, including tags and ingredients.
pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .nest("/tags", attribute_routes::<Tag>())
        .nest("/ingredients", attribute_routes::<Ingredient>())
        .nest("/recipes", recipe_crud_routes())
}

fn attribute_routes<T: crate::models::OwnedAttribute>() -> Router<AppState> {
    Router::new().route(
        "/",
        get(attributes::list::<T>).post(attributes::create::<T>),
    )
}

fn recipe_crud_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(recipes::list).post(recipes::create))
        .route(
            "/{id}",
            get(recipes::retrieve)
                .put(recipes::replace)
                .patch(recipes::update),
        )
        .route("/{id}/upload-image", post(recipes::upload_image))
}

/// Create all API routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/user", user_routes())
        .nest("/recipe", recipe_routes())
}
