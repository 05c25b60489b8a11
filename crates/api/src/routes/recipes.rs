//! Recipe CRUD and image upload handlers.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use skillet_core::{IngredientId, Price, RecipeId, TagId};

use crate::db::recipes::RecipeRepository;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{NewRecipe, Recipe, RecipeChanges, RecipeDetail, RecipeFilter};
use crate::routes::attributes::AttributeOut;
use crate::state::AppState;
use crate::validation::{BLANK, FieldErrors, REQUIRED};

/// Request body for creating or updating a recipe. Every field optional so
/// that each missing field surfaces as its own validation error; which fields
/// are actually required depends on the verb.
#[derive(Debug, Default, Deserialize)]
pub struct RecipePayload {
    title: Option<String>,
    time_minutes: Option<i32>,
    price: Option<Decimal>,
    link: Option<String>,
    tags: Option<Vec<i32>>,
    ingredients: Option<Vec<i32>>,
}

/// Query parameters for the list operation. Both filters are comma-separated
/// id lists.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeListQuery {
    tags: Option<String>,
    ingredients: Option<String>,
}

/// A recipe as it appears in list responses: associations as id arrays.
#[derive(Debug, Serialize)]
pub struct RecipeOut {
    id: i32,
    title: String,
    time_minutes: i32,
    price: Price,
    link: Option<String>,
    image: Option<String>,
    tags: Vec<TagId>,
    ingredients: Vec<IngredientId>,
}

impl From<Recipe> for RecipeOut {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id.into(),
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            image: recipe.image.as_deref().map(media_url),
            tags: recipe.tag_ids,
            ingredients: recipe.ingredient_ids,
        }
    }
}

/// A recipe as it appears in detail responses: associations as full objects.
#[derive(Debug, Serialize)]
pub struct RecipeDetailOut {
    id: i32,
    title: String,
    time_minutes: i32,
    price: Price,
    link: Option<String>,
    image: Option<String>,
    tags: Vec<AttributeOut>,
    ingredients: Vec<AttributeOut>,
}

impl From<RecipeDetail> for RecipeDetailOut {
    fn from(detail: RecipeDetail) -> Self {
        Self {
            id: detail.recipe.id.into(),
            title: detail.recipe.title,
            time_minutes: detail.recipe.time_minutes,
            price: detail.recipe.price,
            link: detail.recipe.link,
            image: detail.recipe.image.as_deref().map(media_url),
            tags: detail.tags.into_iter().map(Into::into).collect(),
            ingredients: detail.ingredients.into_iter().map(Into::into).collect(),
        }
    }
}

/// Response for a successful image upload.
#[derive(Debug, Serialize)]
pub struct RecipeImageOut {
    id: i32,
    image: String,
}

/// `GET /api/recipe/recipes` - list the caller's recipes, ordered by title.
///
/// Optional `tags`/`ingredients` filters take comma-separated id lists; a
/// recipe matches a filter when it carries any of the listed ids, and both
/// filters must match when both are present.
pub async fn list(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<RecipeListQuery>,
) -> Result<Json<Vec<RecipeOut>>> {
    let filter = RecipeFilter {
        tags: query
            .tags
            .as_deref()
            .map(|raw| parse_id_list(raw, "tags"))
            .transpose()?
            .flatten(),
        ingredients: query
            .ingredients
            .as_deref()
            .map(|raw| parse_id_list(raw, "ingredients"))
            .transpose()?
            .flatten(),
    };

    let recipes = RecipeRepository::new(state.pool())
        .list(user.id, &filter)
        .await?;

    Ok(Json(recipes.into_iter().map(Into::into).collect()))
}

/// `POST /api/recipe/recipes` - create a recipe owned by the caller.
pub async fn create(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<RecipePayload>,
) -> Result<(StatusCode, Json<RecipeDetailOut>)> {
    let new = validate_full(payload)?;

    let repo = RecipeRepository::new(state.pool());
    let id = repo.create(user.id, new).await?;
    let detail = repo.get(user.id, id).await?.ok_or(AppError::NotFound)?;

    Ok((StatusCode::CREATED, Json(detail.into())))
}

/// `GET /api/recipe/recipes/{id}` - recipe detail.
///
/// Another user's recipe is indistinguishable from a missing one: both 404.
pub async fn retrieve(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<RecipeId>,
) -> Result<Json<RecipeDetailOut>> {
    let detail = RecipeRepository::new(state.pool())
        .get(user.id, id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(detail.into()))
}

/// `PUT /api/recipe/recipes/{id}` - full update; every required field must be
/// present again.
pub async fn replace(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<RecipeId>,
    Json(payload): Json<RecipePayload>,
) -> Result<Json<RecipeDetailOut>> {
    let changes = RecipeChanges::from(validate_full(payload)?);
    apply_update(&state, user.id, id, changes).await
}

/// `PATCH /api/recipe/recipes/{id}` - partial update; absent fields keep
/// their stored values, present association lists replace the stored set.
pub async fn update(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<RecipeId>,
    Json(payload): Json<RecipePayload>,
) -> Result<Json<RecipeDetailOut>> {
    let changes = validate_partial(payload)?;
    apply_update(&state, user.id, id, changes).await
}

async fn apply_update(
    state: &AppState,
    user_id: skillet_core::UserId,
    id: RecipeId,
    changes: RecipeChanges,
) -> Result<Json<RecipeDetailOut>> {
    let repo = RecipeRepository::new(state.pool());
    repo.update(user_id, id, changes).await?;
    let detail = repo.get(user_id, id).await?.ok_or(AppError::NotFound)?;

    Ok(Json(detail.into()))
}

/// `POST /api/recipe/recipes/{id}/upload-image` - attach an image.
///
/// Expects a multipart form with an `image` part carrying an `image/*`
/// content type. Replaces and deletes any previously stored image.
pub async fn upload_image(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<RecipeId>,
    mut multipart: Multipart,
) -> Result<Json<RecipeImageOut>> {
    let mut image: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        if !field
            .content_type()
            .is_some_and(|ct| ct.starts_with("image/"))
        {
            return Err(FieldErrors::single("image", "Upload a valid image.").into());
        }

        let filename = field.file_name().map(str::to_owned);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        image = Some((filename, data.to_vec()));
        break;
    }

    let Some((filename, data)) = image else {
        return Err(FieldErrors::single("image", REQUIRED).into());
    };
    if data.is_empty() {
        return Err(FieldErrors::single("image", "The submitted file is empty.").into());
    }

    let relative = state
        .media()
        .save_recipe_image(filename.as_deref(), &data)
        .await
        .map_err(|e| AppError::Internal(format!("failed to store image: {e}")))?;

    let repo = RecipeRepository::new(state.pool());
    let previous = match repo.set_image(user.id, id, &relative).await {
        Ok(previous) => previous,
        Err(e) => {
            // The recipe row rejected the image; drop the orphaned file.
            if let Err(remove_err) = state.media().remove(&relative).await {
                tracing::warn!(path = %relative, error = %remove_err, "failed to remove orphaned image");
            }
            return Err(e.into());
        }
    };

    if let Some(previous) = previous
        && let Err(e) = state.media().remove(&previous).await
    {
        tracing::warn!(path = %previous, error = %e, "failed to remove replaced image");
    }

    Ok(Json(RecipeImageOut {
        id: id.into(),
        image: media_url(&relative),
    }))
}

/// Validate a payload for create/PUT, where the base fields are required.
fn validate_full(payload: RecipePayload) -> Result<NewRecipe> {
    let mut errors = FieldErrors::new();

    let title = match payload.title {
        None => {
            errors.push("title", REQUIRED);
            None
        }
        Some(title) if title.is_empty() => {
            errors.push("title", BLANK);
            None
        }
        Some(title) => Some(title),
    };

    let time_minutes = match payload.time_minutes {
        None => {
            errors.push("time_minutes", REQUIRED);
            None
        }
        Some(minutes) => validate_time_minutes(minutes, &mut errors),
    };

    let price = match payload.price {
        None => {
            errors.push("price", REQUIRED);
            None
        }
        Some(amount) => validate_price(amount, &mut errors),
    };

    let (Some(title), Some(time_minutes), Some(price)) = (title, time_minutes, price) else {
        return Err(errors.into());
    };

    Ok(NewRecipe {
        title,
        time_minutes,
        price,
        link: payload.link,
        tag_ids: payload.tags.unwrap_or_default().into_iter().map(TagId::from).collect(),
        ingredient_ids: payload
            .ingredients
            .unwrap_or_default()
            .into_iter()
            .map(IngredientId::from)
            .collect(),
    })
}

/// Validate a payload for PATCH, where only supplied fields are checked.
fn validate_partial(payload: RecipePayload) -> Result<RecipeChanges> {
    let mut errors = FieldErrors::new();

    let title = match payload.title {
        Some(title) if title.is_empty() => {
            errors.push("title", BLANK);
            None
        }
        other => other,
    };

    let time_minutes = payload
        .time_minutes
        .and_then(|minutes| validate_time_minutes(minutes, &mut errors));

    let price = payload
        .price
        .and_then(|amount| validate_price(amount, &mut errors));

    if !errors.is_empty() {
        return Err(errors.into());
    }

    Ok(RecipeChanges {
        title,
        time_minutes,
        price,
        link: payload.link.map(Some),
        tag_ids: payload
            .tags
            .map(|ids| ids.into_iter().map(TagId::from).collect()),
        ingredient_ids: payload
            .ingredients
            .map(|ids| ids.into_iter().map(IngredientId::from).collect()),
    })
}

fn validate_time_minutes(minutes: i32, errors: &mut FieldErrors) -> Option<i32> {
    if minutes < 0 {
        errors.push(
            "time_minutes",
            "Ensure this value is greater than or equal to 0.",
        );
        return None;
    }
    Some(minutes)
}

fn validate_price(amount: Decimal, errors: &mut FieldErrors) -> Option<Price> {
    match Price::new(amount) {
        Ok(price) => Some(price),
        Err(e) => {
            errors.push("price", e.to_string());
            None
        }
    }
}

/// Parse a comma-separated id list from a query parameter.
///
/// A parameter that is present but carries no ids (e.g. `?tags=`) means "no
/// filter" and parses to `None`.
fn parse_id_list<T: From<i32>>(raw: &str, field: &str) -> Result<Option<Vec<T>>> {
    let ids: Vec<T> = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i32>()
                .map(T::from)
                .map_err(|_| FieldErrors::single(field, "Enter a comma-separated list of ids.").into())
        })
        .collect::<Result<_>>()?;

    Ok((!ids.is_empty()).then_some(ids))
}

/// Public URL for a stored media path.
fn media_url(relative: &str) -> String {
    format!("/media/{relative}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn full_payload() -> RecipePayload {
        RecipePayload {
            title: Some("Thai prawn curry".to_string()),
            time_minutes: Some(30),
            price: Some(Decimal::new(525, 2)),
            link: Some("https://example.com/recipe.pdf".to_string()),
            tags: Some(vec![1, 2]),
            ingredients: None,
        }
    }

    #[test]
    fn test_parse_id_list() {
        let ids: Vec<TagId> = parse_id_list("1,2, 3", "tags").unwrap().unwrap();
        assert_eq!(ids, vec![TagId::from(1), TagId::from(2), TagId::from(3)]);
    }

    #[test]
    fn test_parse_id_list_rejects_garbage() {
        assert!(parse_id_list::<TagId>("1,abc", "tags").is_err());
    }

    #[test]
    fn test_parse_id_list_ignores_empty_segments() {
        let ids: Vec<TagId> = parse_id_list("1,,2,", "tags").unwrap().unwrap();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_parse_id_list_without_ids_means_no_filter() {
        assert!(parse_id_list::<TagId>("", "tags").unwrap().is_none());
        assert!(parse_id_list::<TagId>(" , ,", "tags").unwrap().is_none());
    }

    #[test]
    fn test_validate_full_accepts_complete_payload() {
        let new = validate_full(full_payload()).unwrap();
        assert_eq!(new.title, "Thai prawn curry");
        assert_eq!(new.time_minutes, 30);
        assert_eq!(new.tag_ids, vec![TagId::from(1), TagId::from(2)]);
        assert!(new.ingredient_ids.is_empty());
    }

    #[test]
    fn test_validate_full_collects_all_missing_fields() {
        let err = validate_full(RecipePayload::default()).unwrap_err();
        let AppError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        let map = errors.as_map();
        assert!(map.contains_key("title"));
        assert!(map.contains_key("time_minutes"));
        assert!(map.contains_key("price"));
    }

    #[test]
    fn test_validate_full_rejects_out_of_range_price() {
        let payload = RecipePayload {
            price: Some(Decimal::new(1_000_000, 0)),
            ..full_payload()
        };
        let AppError::Validation(errors) = validate_full(payload).unwrap_err() else {
            panic!("expected validation error");
        };
        assert!(errors.as_map().contains_key("price"));
    }

    #[test]
    fn test_full_update_clears_omitted_link() {
        let payload = RecipePayload {
            link: None,
            ..full_payload()
        };
        let changes = RecipeChanges::from(validate_full(payload).unwrap());
        assert_eq!(changes.link, Some(None));
    }

    #[test]
    fn test_partial_update_keeps_omitted_link() {
        let changes = validate_partial(RecipePayload {
            title: Some("New title".to_string()),
            ..RecipePayload::default()
        })
        .unwrap();
        assert_eq!(changes.link, None);
    }

    #[test]
    fn test_validate_full_rejects_negative_time() {
        let payload = RecipePayload {
            time_minutes: Some(-5),
            ..full_payload()
        };
        assert!(validate_full(payload).is_err());
    }

    #[test]
    fn test_validate_partial_keeps_absent_fields_unset() {
        let changes = validate_partial(RecipePayload {
            title: Some("New title".to_string()),
            ..RecipePayload::default()
        })
        .unwrap();
        assert_eq!(changes.title.as_deref(), Some("New title"));
        assert!(changes.time_minutes.is_none());
        assert!(changes.price.is_none());
        assert!(changes.tag_ids.is_none());
    }

    #[test]
    fn test_validate_partial_empty_list_clears_associations() {
        let changes = validate_partial(RecipePayload {
            tags: Some(vec![]),
            ..RecipePayload::default()
        })
        .unwrap();
        assert_eq!(changes.tag_ids, Some(vec![]));
    }

    #[test]
    fn test_validate_partial_rejects_blank_title() {
        let err = validate_partial(RecipePayload {
            title: Some(String::new()),
            ..RecipePayload::default()
        });
        assert!(err.is_err());
    }

    #[test]
    fn test_media_url() {
        assert_eq!(media_url("recipe/abc.jpg"), "/media/recipe/abc.jpg");
    }
}
