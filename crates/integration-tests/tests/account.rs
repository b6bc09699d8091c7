//! Integration tests for registration, login, lockout and logout.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use product_catalog_integration_tests::TestApp;
use product_catalog_web::db::AccountStore;
use product_catalog_web::routes::account::{
    DUPLICATE_EMAIL_MESSAGE, INVALID_CREDENTIALS_MESSAGE, LOCKED_OUT_MESSAGE,
    PASSWORD_COMPLEXITY_MESSAGE,
};

const PASSWORD: &str = "Passw0rd!";

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let mut app = TestApp::new().await;

    let live = app.get("/health").await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.body, b"ok");

    let ready = app.get("/health/ready").await;
    assert_eq!(ready.status, StatusCode::OK);
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_register_signs_in_as_plain_user() {
    let mut app = TestApp::new().await;

    let response = app.register("New.User@Example.com", PASSWORD).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/"));
    assert!(app.has_session());

    let profile = app.get("/").await;
    assert_eq!(profile.status, StatusCode::OK);
    let body = profile.json();
    assert_eq!(body["email"], "new.user@example.com");
    assert_eq!(body["first_name"], "Test");

    // User may browse but not change the catalog or manage users
    assert_eq!(app.get("/products").await.status, StatusCode::OK);
    let create = app
        .post(
            "/products",
            &json!({ "name": "Mug", "description": "Tall", "category": "Kitchen", "price": "4.50" }),
        )
        .await;
    assert_eq!(create.status, StatusCode::FORBIDDEN);
    assert_eq!(app.get("/admin/users").await.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_register_duplicate_email_is_rejected() {
    let mut app = TestApp::new().await;
    app.register("dup@example.com", PASSWORD).await;
    let before = app.stores().accounts.list_accounts().await.unwrap().len();

    app.forget_session();
    let response = app.register("DUP@example.com", PASSWORD).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.form_errors(), [DUPLICATE_EMAIL_MESSAGE]);
    assert!(!app.has_session());

    let after = app.stores().accounts.list_accounts().await.unwrap().len();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_register_validation_errors_are_keyed_by_field() {
    let mut app = TestApp::new().await;

    let response = app
        .post(
            "/account/register",
            &json!({
                "first_name": "",
                "last_name": "User",
                "email": "not-an-email",
                "password": PASSWORD,
                "confirm_password": "Different1!",
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.field_errors("first_name"),
        ["The First Name field is required."]
    );
    assert_eq!(response.field_errors("email").len(), 1);
    assert_eq!(
        response.field_errors("confirm_password"),
        ["The password and confirmation password do not match."]
    );
}

#[tokio::test]
async fn test_register_weak_password_reports_policy() {
    let mut app = TestApp::new().await;

    let response = app.register("weak@example.com", "password1").await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.field_errors("password"),
        [PASSWORD_COMPLEXITY_MESSAGE]
    );
    assert!(
        app.stores()
            .accounts
            .list_accounts()
            .await
            .unwrap()
            .iter()
            .all(|a| a.email.as_str() != "weak@example.com")
    );
}

// =============================================================================
// Login / Logout
// =============================================================================

#[tokio::test]
async fn test_login_failures_do_not_reveal_accounts() {
    let mut app = TestApp::new().await;
    app.register("known@example.com", PASSWORD).await;
    app.forget_session();

    let wrong_password = app.login("known@example.com", "Wrong-pass1").await;
    let unknown_email = app.login("nobody@example.com", PASSWORD).await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_email.body);
    assert_eq!(wrong_password.form_errors(), [INVALID_CREDENTIALS_MESSAGE]);
    assert!(!app.has_session());
}

#[tokio::test]
async fn test_login_is_case_insensitive_on_email() {
    let mut app = TestApp::new().await;
    app.register("case@example.com", PASSWORD).await;
    app.forget_session();

    let response = app.login("CASE@Example.COM", PASSWORD).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/"));
    assert_eq!(app.get("/").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_lockout_after_repeated_failures() {
    let mut app = TestApp::with_config(|config| config.lockout_max_attempts = 3).await;
    app.register("locked@example.com", PASSWORD).await;
    app.forget_session();

    for _ in 0..2 {
        let response = app.login("locked@example.com", "Wrong-pass1").await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    let third = app.login("locked@example.com", "Wrong-pass1").await;
    assert_eq!(third.status, StatusCode::LOCKED);
    assert_eq!(third.form_errors(), [LOCKED_OUT_MESSAGE]);

    // Correct credentials are refused while locked
    let correct = app.login("locked@example.com", PASSWORD).await;
    assert_eq!(correct.status, StatusCode::LOCKED);
    assert!(!app.has_session());
}

#[tokio::test]
async fn test_logout_ends_session() {
    let mut app = TestApp::new().await;
    app.register("bye@example.com", PASSWORD).await;
    assert_eq!(app.get("/").await.status, StatusCode::OK);

    let response = app.post("/account/logout", &json!({})).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/account/login"));

    let profile = app.get("/").await;
    assert_eq!(profile.status, StatusCode::SEE_OTHER);
    assert_eq!(profile.location.as_deref(), Some("/account/login"));
}

#[tokio::test]
async fn test_signed_out_requests_redirect_to_login() {
    let mut app = TestApp::new().await;

    for uri in ["/", "/products", "/admin/users"] {
        let response = app.get(uri).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(response.location.as_deref(), Some("/account/login"));
    }
}
