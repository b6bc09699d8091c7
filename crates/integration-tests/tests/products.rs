//! Integration tests for the product catalog routes.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::{Value, json};

use product_catalog_integration_tests::TestApp;

fn mug() -> Value {
    json!({
        "name": "Mug",
        "description": "Stoneware, 350ml",
        "category": "Kitchen",
        "price": "12.50",
    })
}

/// An app signed in as the super admin, who also holds `Admin`.
async fn admin_app() -> TestApp {
    let mut app = TestApp::new().await;
    app.login_as_super_admin().await;
    app
}

#[tokio::test]
async fn test_admin_creates_and_lists_products() {
    let mut app = admin_app().await;

    let created = app.post("/products", &mug()).await;
    assert_eq!(created.status, StatusCode::CREATED);
    let product = created.json();
    assert_eq!(product["name"], "Mug");
    assert_eq!(product["price"], "12.50");
    assert_ne!(product["id"], "00000000-0000-0000-0000-000000000000");

    let listing = app.get("/products").await;
    assert_eq!(listing.status, StatusCode::OK);
    let products = listing.json();
    assert_eq!(products.as_array().unwrap().len(), 1);
    assert_eq!(products[0]["id"], product["id"]);
}

#[tokio::test]
async fn test_create_rejects_invalid_product() {
    let mut app = admin_app().await;

    let response = app
        .post("/products", &json!({ "name": "", "price": "1.00" }))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.field_errors("name"),
        ["The Name field is required."]
    );
    assert!(app.get("/products").await.json().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_rejects_prices_the_catalog_cannot_store() {
    let mut app = admin_app().await;

    for price in ["19.999", "10000000000", "-1.00"] {
        let mut body = mug();
        body["price"] = json!(price);
        let response = app.post("/products", &body).await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY, "{price}");
    }
    assert!(app.get("/products").await.json().as_array().unwrap().is_empty());

    let mut body = mug();
    body["price"] = json!("9999999999.99");
    let response = app.post("/products", &body).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json()["price"], "9999999999.99");
}

#[tokio::test]
async fn test_details_are_public_and_404_when_absent() {
    let mut app = admin_app().await;
    let id = app.post("/products", &mug()).await.json()["id"]
        .as_str()
        .unwrap()
        .to_owned();

    app.forget_session();
    let details = app.get(&format!("/products/{id}")).await;
    assert_eq!(details.status, StatusCode::OK);
    assert_eq!(details.json()["category"], "Kitchen");

    let missing = app
        .get("/products/7b0c1f5e-4f57-4f0e-9a43-1d6f2b8f0c11")
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_edit_of_unknown_product_is_404() {
    let mut app = admin_app().await;

    let response = app
        .get("/products/7b0c1f5e-4f57-4f0e-9a43-1d6f2b8f0c11/edit")
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sequential_updates_both_apply() {
    let mut app = admin_app().await;
    let product = app.post("/products", &mug()).await.json();
    let id = product["id"].as_str().unwrap().to_owned();

    let mut first = product.clone();
    first["name"] = json!("Big Mug");
    let response = app.put(&format!("/products/{id}"), &first).await;
    assert_eq!(response.status, StatusCode::OK);

    let mut second = product.clone();
    second["price"] = json!("15.00");
    let response = app.put(&format!("/products/{id}"), &second).await;
    assert_eq!(response.status, StatusCode::OK);

    // Last writer wins for every field
    let edited = app.get(&format!("/products/{id}/edit")).await.json();
    assert_eq!(edited["name"], "Mug");
    assert_eq!(edited["price"], "15.00");
}

#[tokio::test]
async fn test_update_with_mismatched_id_is_404() {
    let mut app = admin_app().await;
    let product = app.post("/products", &mug()).await.json();
    let id = product["id"].as_str().unwrap().to_owned();

    let mut body = product.clone();
    body["id"] = json!("7b0c1f5e-4f57-4f0e-9a43-1d6f2b8f0c11");
    body["name"] = json!("Renamed");
    let response = app.put(&format!("/products/{id}"), &body).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let unchanged = app.get(&format!("/products/{id}")).await.json();
    assert_eq!(unchanged["name"], "Mug");
}

#[tokio::test]
async fn test_delete_removes_product() {
    let mut app = admin_app().await;
    let id = app.post("/products", &mug()).await.json()["id"]
        .as_str()
        .unwrap()
        .to_owned();

    let response = app.delete(&format!("/products/{id}")).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(
        app.get(&format!("/products/{id}")).await.status,
        StatusCode::NOT_FOUND
    );

    // Deleting again is a no-op
    let again = app.delete(&format!("/products/{id}")).await;
    assert_eq!(again.status, StatusCode::NO_CONTENT);
}
