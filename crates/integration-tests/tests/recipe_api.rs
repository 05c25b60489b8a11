//! Integration tests for the recipe API.
//!
//! Run with: cargo test -p skillet-integration-tests -- --ignored

#![allow(clippy::expect_used)]

use serde_json::{Value, json};

use skillet_integration_tests::{
    base_url, client, create_ingredient, create_recipe, create_tag, register_and_login,
    unique_email, with_token,
};

async fn get_recipe(client: &reqwest::Client, token: &str, id: i64) -> reqwest::Response {
    with_token(
        client.get(format!("{}/api/recipe/recipes/{id}", base_url())),
        token,
    )
    .send()
    .await
    .expect("request failed")
}

#[tokio::test]
#[ignore = "Requires running skillet-api server"]
async fn test_list_requires_auth() {
    let client = client();

    let resp = client
        .get(format!("{}/api/recipe/recipes", base_url()))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
#[ignore = "Requires running skillet-api server"]
async fn test_create_recipe() {
    let client = client();
    let token = register_and_login(&client, &unique_email(), "testpass123").await;

    let resp = with_token(
        client.post(format!("{}/api/recipe/recipes", base_url())),
        &token,
    )
    .json(&json!({
        "title": "Thai prawn curry",
        "time_minutes": 30,
        "price": "5.25",
        "link": "https://example.com/recipe.pdf",
    }))
    .send()
    .await
    .expect("request failed");

    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.expect("invalid json");
    assert_eq!(body["title"], "Thai prawn curry");
    assert_eq!(body["time_minutes"], 30);
    assert_eq!(body["price"], "5.25");
    assert_eq!(body["link"], "https://example.com/recipe.pdf");
    assert_eq!(body["tags"], json!([]));
    assert_eq!(body["ingredients"], json!([]));
    assert!(body["image"].is_null());
}

#[tokio::test]
#[ignore = "Requires running skillet-api server"]
async fn test_create_recipe_missing_fields() {
    let client = client();
    let token = register_and_login(&client, &unique_email(), "testpass123").await;

    let resp = with_token(
        client.post(format!("{}/api/recipe/recipes", base_url())),
        &token,
    )
    .json(&json!({"title": "No price or time"}))
    .send()
    .await
    .expect("request failed");

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("invalid json");
    assert!(body.get("time_minutes").is_some());
    assert!(body.get("price").is_some());
}

#[tokio::test]
#[ignore = "Requires running skillet-api server"]
async fn test_create_recipe_with_tags_and_ingredients() {
    let client = client();
    let token = register_and_login(&client, &unique_email(), "testpass123").await;

    let tag = create_tag(&client, &token, "Thai").await;
    let ingredient = create_ingredient(&client, &token, "Prawns").await;

    let resp = with_token(
        client.post(format!("{}/api/recipe/recipes", base_url())),
        &token,
    )
    .json(&json!({
        "title": "Prawn curry",
        "time_minutes": 25,
        "price": "12.00",
        "tags": [tag],
        "ingredients": [ingredient],
    }))
    .send()
    .await
    .expect("request failed");

    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.expect("invalid json");
    assert_eq!(body["tags"][0]["id"], tag);
    assert_eq!(body["tags"][0]["name"], "Thai");
    assert_eq!(body["ingredients"][0]["name"], "Prawns");
}

#[tokio::test]
#[ignore = "Requires running skillet-api server"]
async fn test_create_recipe_with_unknown_tag_fails() {
    let client = client();
    let token = register_and_login(&client, &unique_email(), "testpass123").await;

    let resp = with_token(
        client.post(format!("{}/api/recipe/recipes", base_url())),
        &token,
    )
    .json(&json!({
        "title": "Broken",
        "time_minutes": 5,
        "price": "1.00",
        "tags": [999_999_999],
    }))
    .send()
    .await
    .expect("request failed");

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("invalid json");
    assert!(body.get("tags").is_some());
}

#[tokio::test]
#[ignore = "Requires running skillet-api server"]
async fn test_create_recipe_out_of_range_price_fails() {
    let client = client();
    let token = register_and_login(&client, &unique_email(), "testpass123").await;

    // More than four integer digits does not fit the price column
    let resp = with_token(
        client.post(format!("{}/api/recipe/recipes", base_url())),
        &token,
    )
    .json(&json!({
        "title": "Gold leaf soup",
        "time_minutes": 5,
        "price": "1000000.00",
    }))
    .send()
    .await
    .expect("request failed");

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("invalid json");
    assert!(body.get("price").is_some());
}

#[tokio::test]
#[ignore = "Requires running skillet-api server"]
async fn test_create_ignores_id_field() {
    let client = client();
    let token = register_and_login(&client, &unique_email(), "testpass123").await;

    let resp = with_token(
        client.post(format!("{}/api/recipe/recipes", base_url())),
        &token,
    )
    .json(&json!({
        "id": 987_654_321,
        "title": "Ignores the id",
        "time_minutes": 10,
        "price": "5.25",
    }))
    .send()
    .await
    .expect("request failed");

    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.expect("invalid json");
    assert_ne!(body["id"], 987_654_321);
}

#[tokio::test]
#[ignore = "Requires running skillet-api server"]
async fn test_list_limited_to_owner() {
    let client = client();
    let token = register_and_login(&client, &unique_email(), "testpass123").await;
    let other_token = register_and_login(&client, &unique_email(), "testpass123").await;

    create_recipe(&client, &other_token, json!({"title": "Someone else's"})).await;
    let id = create_recipe(&client, &token, json!({"title": "Mine"})).await;

    let resp = with_token(
        client.get(format!("{}/api/recipe/recipes", base_url())),
        &token,
    )
    .send()
    .await
    .expect("request failed");

    let body: Vec<Value> = resp.json().await.expect("invalid json");
    assert_eq!(body.len(), 1);
    assert_eq!(body[0]["id"], id);
    // List entries carry association ids, not nested objects
    assert!(body[0]["tags"].is_array());
}

#[tokio::test]
#[ignore = "Requires running skillet-api server"]
async fn test_other_users_recipe_is_404() {
    let client = client();
    let token = register_and_login(&client, &unique_email(), "testpass123").await;
    let other_token = register_and_login(&client, &unique_email(), "testpass123").await;

    let id = create_recipe(&client, &other_token, json!({})).await;

    let resp = get_recipe(&client, &token, id).await;
    assert_eq!(resp.status(), 404);

    // Updates are scoped the same way
    let resp = with_token(
        client.patch(format!("{}/api/recipe/recipes/{id}", base_url())),
        &token,
    )
    .json(&json!({"title": "Hijacked"}))
    .send()
    .await
    .expect("request failed");
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
#[ignore = "Requires running skillet-api server"]
async fn test_partial_update_preserves_other_fields() {
    let client = client();
    let token = register_and_login(&client, &unique_email(), "testpass123").await;

    let tag = create_tag(&client, &token, "Curry").await;
    let id = create_recipe(
        &client,
        &token,
        json!({"title": "Original", "time_minutes": 20, "price": "3.50", "tags": [tag]}),
    )
    .await;

    let resp = with_token(
        client.patch(format!("{}/api/recipe/recipes/{id}", base_url())),
        &token,
    )
    .json(&json!({"title": "Renamed"}))
    .send()
    .await
    .expect("request failed");

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("invalid json");
    assert_eq!(body["title"], "Renamed");
    assert_eq!(body["time_minutes"], 20);
    assert_eq!(body["price"], "3.50");
    assert_eq!(body["tags"][0]["id"], tag);
}

#[tokio::test]
#[ignore = "Requires running skillet-api server"]
async fn test_patch_ignores_id_field() {
    let client = client();
    let token = register_and_login(&client, &unique_email(), "testpass123").await;

    let id = create_recipe(&client, &token, json!({})).await;

    let resp = with_token(
        client.patch(format!("{}/api/recipe/recipes/{id}", base_url())),
        &token,
    )
    .json(&json!({"id": 999_999, "title": "Still the same row"}))
    .send()
    .await
    .expect("request failed");

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("invalid json");
    assert_eq!(body["id"], id);
}

#[tokio::test]
#[ignore = "Requires running skillet-api server"]
async fn test_full_update_replaces_associations() {
    let client = client();
    let token = register_and_login(&client, &unique_email(), "testpass123").await;

    let old_tag = create_tag(&client, &token, "Old").await;
    let new_tag = create_tag(&client, &token, "New").await;
    let id = create_recipe(&client, &token, json!({"tags": [old_tag]})).await;

    let resp = with_token(
        client.put(format!("{}/api/recipe/recipes/{id}", base_url())),
        &token,
    )
    .json(&json!({
        "title": "Replaced",
        "time_minutes": 1,
        "price": "0.99",
        "tags": [new_tag],
    }))
    .send()
    .await
    .expect("request failed");

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("invalid json");
    assert_eq!(body["tags"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["tags"][0]["id"], new_tag);
}

#[tokio::test]
#[ignore = "Requires running skillet-api server"]
async fn test_full_update_clears_omitted_link() {
    let client = client();
    let token = register_and_login(&client, &unique_email(), "testpass123").await;

    let id = create_recipe(
        &client,
        &token,
        json!({"link": "https://example.com/old.pdf"}),
    )
    .await;

    let resp = with_token(
        client.put(format!("{}/api/recipe/recipes/{id}", base_url())),
        &token,
    )
    .json(&json!({"title": "No link now", "time_minutes": 2, "price": "1.50"}))
    .send()
    .await
    .expect("request failed");

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("invalid json");
    assert!(body["link"].is_null());
}

#[tokio::test]
#[ignore = "Requires running skillet-api server"]
async fn test_patch_empty_list_clears_associations() {
    let client = client();
    let token = register_and_login(&client, &unique_email(), "testpass123").await;

    let tag = create_tag(&client, &token, "Temporary").await;
    let id = create_recipe(&client, &token, json!({"tags": [tag]})).await;

    let resp = with_token(
        client.patch(format!("{}/api/recipe/recipes/{id}", base_url())),
        &token,
    )
    .json(&json!({"tags": []}))
    .send()
    .await
    .expect("request failed");

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("invalid json");
    assert_eq!(body["tags"], json!([]));
}

#[tokio::test]
#[ignore = "Requires running skillet-api server"]
async fn test_filter_by_tags_and_ingredients() {
    let client = client();
    let token = register_and_login(&client, &unique_email(), "testpass123").await;

    let tag = create_tag(&client, &token, "Vegan").await;
    let ingredient = create_ingredient(&client, &token, "Tofu").await;
    let tagged = create_recipe(&client, &token, json!({"title": "Tagged", "tags": [tag]})).await;
    let with_ingredient = create_recipe(
        &client,
        &token,
        json!({"title": "With ingredient", "ingredients": [ingredient]}),
    )
    .await;
    create_recipe(&client, &token, json!({"title": "Plain"})).await;

    let resp = with_token(
        client.get(format!("{}/api/recipe/recipes?tags={tag}", base_url())),
        &token,
    )
    .send()
    .await
    .expect("request failed");
    let body: Vec<Value> = resp.json().await.expect("invalid json");
    assert_eq!(body.len(), 1);
    assert_eq!(body[0]["id"], tagged);

    let resp = with_token(
        client.get(format!(
            "{}/api/recipe/recipes?ingredients={ingredient}",
            base_url()
        )),
        &token,
    )
    .send()
    .await
    .expect("request failed");
    let body: Vec<Value> = resp.json().await.expect("invalid json");
    assert_eq!(body.len(), 1);
    assert_eq!(body[0]["id"], with_ingredient);

    // Both filters at once must both match
    let resp = with_token(
        client.get(format!(
            "{}/api/recipe/recipes?tags={tag}&ingredients={ingredient}",
            base_url()
        )),
        &token,
    )
    .send()
    .await
    .expect("request failed");
    let body: Vec<Value> = resp.json().await.expect("invalid json");
    assert!(body.is_empty());

    // A present-but-empty filter means no filter at all
    let resp = with_token(
        client.get(format!("{}/api/recipe/recipes?tags=", base_url())),
        &token,
    )
    .send()
    .await
    .expect("request failed");
    let body: Vec<Value> = resp.json().await.expect("invalid json");
    assert_eq!(body.len(), 3);
}

#[tokio::test]
#[ignore = "Requires running skillet-api server"]
async fn test_upload_image() {
    let client = client();
    let token = register_and_login(&client, &unique_email(), "testpass123").await;
    let id = create_recipe(&client, &token, json!({})).await;

    // Smallest possible valid JPEG-ish payload; the server only checks the
    // declared content type, not the bytes.
    let part = reqwest::multipart::Part::bytes(vec![0xFF, 0xD8, 0xFF, 0xD9])
        .file_name("photo.jpg")
        .mime_str("image/jpeg")
        .expect("invalid mime");
    let form = reqwest::multipart::Form::new().part("image", part);

    let resp = with_token(
        client.post(format!(
            "{}/api/recipe/recipes/{id}/upload-image",
            base_url()
        )),
        &token,
    )
    .multipart(form)
    .send()
    .await
    .expect("request failed");

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("invalid json");
    assert_eq!(body["id"], id);
    let image = body["image"].as_str().expect("image missing");
    assert!(image.starts_with("/media/recipe/"));
    assert!(image.ends_with(".jpg"));

    // The detail view now carries the image path
    let detail: Value = get_recipe(&client, &token, id)
        .await
        .json()
        .await
        .expect("invalid json");
    assert_eq!(detail["image"], image);
}

#[tokio::test]
#[ignore = "Requires running skillet-api server"]
async fn test_upload_image_rejects_non_image() {
    let client = client();
    let token = register_and_login(&client, &unique_email(), "testpass123").await;
    let id = create_recipe(&client, &token, json!({})).await;

    let part = reqwest::multipart::Part::text("not an image")
        .file_name("notes.txt")
        .mime_str("text/plain")
        .expect("invalid mime");
    let form = reqwest::multipart::Form::new().part("image", part);

    let resp = with_token(
        client.post(format!(
            "{}/api/recipe/recipes/{id}/upload-image",
            base_url()
        )),
        &token,
    )
    .multipart(form)
    .send()
    .await
    .expect("request failed");

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("invalid json");
    assert!(body.get("image").is_some());
}

#[tokio::test]
#[ignore = "Requires running skillet-api server"]
async fn test_attach_another_users_tag_by_id() {
    let client = client();
    let token = register_and_login(&client, &unique_email(), "testpass123").await;
    let other_token = register_and_login(&client, &unique_email(), "testpass123").await;

    // Ids are global, so a foreign tag can be attached; it still never shows
    // up in the attacher's own tag listing.
    let foreign_tag = create_tag(&client, &other_token, "Foreign").await;
    let id = create_recipe(&client, &token, json!({"tags": [foreign_tag]})).await;

    let detail: Value = get_recipe(&client, &token, id)
        .await
        .json()
        .await
        .expect("invalid json");
    assert_eq!(detail["tags"][0]["id"], foreign_tag);

    let resp = with_token(client.get(format!("{}/api/recipe/tags", base_url())), &token)
        .send()
        .await
        .expect("request failed");
    let tags: Vec<Value> = resp.json().await.expect("invalid json");
    assert!(tags.iter().all(|t| t["id"] != foreign_tag));
}
