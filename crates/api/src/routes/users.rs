//! User registration, token, and profile handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::User;
use crate::services::auth::AuthService;
use crate::state::AppState;
use crate::validation::{FieldErrors, REQUIRED};

/// Registration request body. Every field optional so that missing fields
/// surface as per-field validation errors rather than a deserialization
/// rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    email: Option<String>,
    password: Option<String>,
    name: Option<String>,
}

/// Credentials for token exchange.
#[derive(Debug, Deserialize)]
pub struct TokenPayload {
    email: Option<String>,
    password: Option<String>,
}

/// Profile update body. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdatePayload {
    email: Option<String>,
    password: Option<String>,
    name: Option<String>,
}

/// Public view of a user. The password never appears in responses.
#[derive(Debug, Serialize)]
pub struct UserOut {
    email: String,
    name: String,
}

impl From<User> for UserOut {
    fn from(user: User) -> Self {
        Self {
            email: user.email.into_inner(),
            name: user.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenOut {
    token: String,
}

/// `POST /api/user/create` - register a new user.
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<UserOut>)> {
    let user = AuthService::new(state.pool())
        .register(
            payload.email.as_deref(),
            payload.password.as_deref(),
            payload.name.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// `POST /api/user/token` - exchange credentials for a bearer token.
pub async fn token(
    State(state): State<AppState>,
    Json(payload): Json<TokenPayload>,
) -> Result<Json<TokenOut>> {
    let mut errors = FieldErrors::new();
    if payload.email.is_none() {
        errors.push("email", REQUIRED);
    }
    if payload.password.is_none() {
        errors.push("password", REQUIRED);
    }
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(errors.into());
    };

    let token = AuthService::new(state.pool())
        .issue_token(&email, &password)
        .await?;

    Ok(Json(TokenOut { token }))
}

/// `GET /api/user/me` - the authenticated user's profile.
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserOut> {
    Json(user.into())
}

/// `PUT`/`PATCH /api/user/me` - update the authenticated user's profile.
/// Both verbs apply only the supplied fields.
pub async fn update_me(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdatePayload>,
) -> Result<Json<UserOut>> {
    let updated = AuthService::new(state.pool())
        .update_profile(
            user.id,
            payload.email.as_deref(),
            payload.name.as_deref(),
            payload.password.as_deref(),
        )
        .await?;

    Ok(Json(updated.into()))
}
