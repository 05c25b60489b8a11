//! Token authentication extractor.
//!
//! Protected handlers take a [`CurrentUser`] argument; requests without a
//! valid `Authorization` header are rejected with 401 before the handler
//! runs. Both `Token <key>` and `Bearer <key>` schemes are accepted.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};

use crate::db::tokens::TokenRepository;
use crate::error::{AppError, set_sentry_user};
use crate::models::User;
use crate::state::AppState;

/// Extractor that requires a valid authentication token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(CurrentUser(user): CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| {
                AppError::Unauthorized("Authentication credentials were not provided.".to_string())
            })?;

        let state = AppState::from_ref(state);
        let user = TokenRepository::new(state.pool())
            .get_user(key)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid token.".to_string()))?;

        set_sentry_user(&user.id, Some(user.email.as_str()));

        Ok(Self(user))
    }
}

/// Extract the token key from an `Authorization` header value.
fn bearer_token(value: &str) -> Option<&str> {
    let key = value
        .strip_prefix("Token ")
        .or_else(|| value.strip_prefix("Bearer "))?
        .trim();
    if key.is_empty() { None } else { Some(key) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_schemes() {
        assert_eq!(bearer_token("Token abc123"), Some("abc123"));
        assert_eq!(bearer_token("Bearer abc123"), Some("abc123"));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("abc123"), None);
        assert_eq!(bearer_token("Token "), None);
        assert_eq!(bearer_token(""), None);
    }
}
