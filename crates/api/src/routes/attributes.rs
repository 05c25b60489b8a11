//! Tag and ingredient handlers.
//!
//! Tags and ingredients share their entire HTTP surface, so the handlers are
//! generic over [`OwnedAttribute`] and instantiated once per entity in the
//! router.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::db::attributes::AttributeRepository;
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::OwnedAttribute;
use crate::state::AppState;
use crate::validation::{BLANK, FieldErrors, REQUIRED};

/// Request body for creating or renaming an attribute.
#[derive(Debug, Deserialize)]
pub struct AttributePayload {
    name: Option<String>,
}

/// A tag or ingredient as it appears in responses.
#[derive(Debug, Serialize)]
pub struct AttributeOut {
    id: i32,
    name: String,
}

impl<T: OwnedAttribute> From<T> for AttributeOut {
    fn from(attribute: T) -> Self {
        Self {
            id: attribute.id().into(),
            name: attribute.name().to_owned(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    assigned_only: Option<String>,
}

/// `GET /` - list the caller's attributes, ordered by name.
///
/// `?assigned_only=1` restricts the listing to attributes attached to at
/// least one of the caller's recipes.
pub async fn list<T: OwnedAttribute>(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<AttributeOut>>> {
    let assigned_only = query.assigned_only.as_deref().is_some_and(is_truthy);

    let attributes = AttributeRepository::<T>::new(state.pool())
        .list(user.id, assigned_only)
        .await?;

    Ok(Json(attributes.into_iter().map(Into::into).collect()))
}

/// `POST /` - create an attribute owned by the caller.
pub async fn create<T: OwnedAttribute>(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<AttributePayload>,
) -> Result<(StatusCode, Json<AttributeOut>)> {
    let name = validate_name(payload.name)?;

    let attribute = AttributeRepository::<T>::new(state.pool())
        .create(user.id, &name)
        .await?;

    Ok((StatusCode::CREATED, Json(attribute.into())))
}

fn validate_name(name: Option<String>) -> Result<String> {
    match name {
        None => Err(FieldErrors::single("name", REQUIRED).into()),
        Some(name) if name.is_empty() => Err(FieldErrors::single("name", BLANK).into()),
        Some(name) => Ok(name),
    }
}

/// Interpret a query-string flag the way form encodings spell booleans.
fn is_truthy(value: &str) -> bool {
    matches!(value, "1" | "true" | "True" | "yes" | "on")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name(Some("Vegan".to_string())).unwrap(), "Vegan");
        assert!(validate_name(None).is_err());
        assert!(validate_name(Some(String::new())).is_err());
    }
}
