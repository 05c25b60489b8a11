//! Integration test helpers for Skillet.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and apply migrations
//! docker compose up -d db
//! cargo run -p skillet-cli -- migrate
//!
//! # Start the API
//! cargo run -p skillet-api
//!
//! # Run integration tests
//! cargo test -p skillet-integration-tests -- --ignored
//! ```
//!
//! Each test registers its own throwaway users, so tests can run against a
//! shared database without interfering with each other.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::expect_used)]

use reqwest::{Client, RequestBuilder};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("SKILLET_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// Create an HTTP client.
#[must_use]
pub fn client() -> Client {
    Client::new()
}

/// A unique email address per call, so tests never collide.
#[must_use]
pub fn unique_email() -> String {
    format!("user-{}@example.com", Uuid::new_v4())
}

/// Attach a token to a request.
#[must_use]
pub fn with_token(request: RequestBuilder, token: &str) -> RequestBuilder {
    request.header(reqwest::header::AUTHORIZATION, format!("Token {token}"))
}

/// Register a user and return their token.
///
/// # Panics
///
/// Panics if registration or token exchange fails.
pub async fn register_and_login(client: &Client, email: &str, password: &str) -> String {
    let resp = client
        .post(format!("{}/api/user/create", base_url()))
        .json(&json!({"email": email, "password": password, "name": "Test User"}))
        .send()
        .await
        .expect("Failed to register user");
    assert_eq!(resp.status(), 201, "registration failed for {email}");

    obtain_token(client, email, password).await
}

/// Exchange credentials for a token.
///
/// # Panics
///
/// Panics if the exchange fails.
pub async fn obtain_token(client: &Client, email: &str, password: &str) -> String {
    let resp = client
        .post(format!("{}/api/user/token", base_url()))
        .json(&json!({"email": email, "password": password}))
        .send()
        .await
        .expect("Failed to request token");
    assert_eq!(resp.status(), 200, "token exchange failed for {email}");

    let body: Value = resp.json().await.expect("Failed to parse token response");
    body["token"]
        .as_str()
        .expect("token missing from response")
        .to_string()
}

/// Create a tag and return its id.
///
/// # Panics
///
/// Panics if creation fails.
pub async fn create_tag(client: &Client, token: &str, name: &str) -> i64 {
    create_attribute(client, token, "tags", name).await
}

/// Create an ingredient and return its id.
///
/// # Panics
///
/// Panics if creation fails.
pub async fn create_ingredient(client: &Client, token: &str, name: &str) -> i64 {
    create_attribute(client, token, "ingredients", name).await
}

async fn create_attribute(client: &Client, token: &str, resource: &str, name: &str) -> i64 {
    let resp = with_token(
        client.post(format!("{}/api/recipe/{resource}", base_url())),
        token,
    )
    .json(&json!({"name": name}))
    .send()
    .await
    .expect("Failed to create attribute");
    assert_eq!(resp.status(), 201, "failed to create {resource} {name}");

    let body: Value = resp.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("id missing from response")
}

/// Create a recipe from a payload, defaulting any missing required field,
/// and return its id.
///
/// # Panics
///
/// Panics if creation fails.
pub async fn create_recipe(client: &Client, token: &str, overrides: Value) -> i64 {
    let mut payload = json!({
        "title": "Sample recipe",
        "time_minutes": 10,
        "price": "5.25",
    });
    if let (Some(base), Some(extra)) = (payload.as_object_mut(), overrides.as_object()) {
        for (key, value) in extra {
            base.insert(key.clone(), value.clone());
        }
    }

    let resp = with_token(
        client.post(format!("{}/api/recipe/recipes", base_url())),
        token,
    )
    .json(&payload)
    .send()
    .await
    .expect("Failed to create recipe");
    assert_eq!(resp.status(), 201, "failed to create recipe: {payload}");

    let body: Value = resp.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("id missing from response")
}
