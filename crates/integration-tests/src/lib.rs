//! Integration tests for the product catalog.
//!
//! Drives the full router (sessions, extractors, handlers, workflows) over
//! the in-memory stores with `tower::ServiceExt::oneshot`. No database or
//! network is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p product-catalog-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `account` - Registration, login, lockout and logout
//! - `products` - Product listing and admin-only changes
//! - `admin_users` - Super admin user management

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use product_catalog_web::config::{CatalogConfig, DEFAULT_SEED_ADMIN_EMAIL};
use product_catalog_web::db::Stores;
use product_catalog_web::middleware::create_session_layer;
use product_catalog_web::routes;
use product_catalog_web::services::bootstrap;
use product_catalog_web::state::AppState;

/// Password of the seeded super admin.
pub const SUPER_ADMIN_PASSWORD: &str = "Sup3r-Secret!";
/// Email of the seeded super admin.
pub const SUPER_ADMIN_EMAIL: &str = DEFAULT_SEED_ADMIN_EMAIL;

/// A response with its body read.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// The body parsed as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }

    /// Form-level error messages from a rejected submission.
    #[must_use]
    pub fn form_errors(&self) -> Vec<String> {
        self.field_errors("form")
    }

    /// Error messages for `field` from a rejected submission.
    #[must_use]
    pub fn field_errors(&self, field: &str) -> Vec<String> {
        self.json()["errors"][field]
            .as_array()
            .map(|messages| {
                messages
                    .iter()
                    .filter_map(|m| m.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// One browser talking to a freshly seeded catalog.
///
/// Keeps the session cookie between requests.
pub struct TestApp {
    router: Router,
    stores: Stores,
    cookie: Option<String>,
}

impl TestApp {
    /// A catalog with roles and the super admin seeded.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Like [`TestApp::new`], adjusting the configuration first.
    ///
    /// # Panics
    ///
    /// Panics if seeding fails.
    pub async fn with_config(adjust: impl FnOnce(&mut CatalogConfig)) -> Self {
        let mut config = CatalogConfig::new(
            SecretString::from("postgres://unused/catalog"),
            "http://localhost:3000",
        )
        .expect("default configuration");
        config.seed_admin.password = Some(SecretString::from(SUPER_ADMIN_PASSWORD));
        adjust(&mut config);

        let stores = Stores::memory();
        let state = AppState::new(config.clone(), stores.clone());
        bootstrap::run(state.identity(), state.stores(), &config.seed_admin)
            .await
            .expect("seeding succeeds");

        let session_layer = create_session_layer(MemoryStore::default(), &config);
        Self {
            router: routes::app(state, session_layer),
            stores,
            cookie: None,
        }
    }

    /// The stores behind the app.
    #[must_use]
    pub const fn stores(&self) -> &Stores {
        &self.stores
    }

    /// Whether a session cookie is held.
    #[must_use]
    pub const fn has_session(&self) -> bool {
        self.cookie.is_some()
    }

    /// Send a request, remembering any session cookie the app sets.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the router fails.
    pub async fn request(&mut self, method: Method, uri: &str, json: Option<&Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match json {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("valid request"))
            .await
            .expect("router is infallible");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            let pair = set_cookie.split(';').next().unwrap_or_default().trim();
            let cleared = pair.ends_with('=') || set_cookie.contains("Max-Age=0");
            self.cookie = (!cleared).then(|| pair.to_owned());
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body")
            .to_vec();

        TestResponse {
            status,
            location,
            body,
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, json: &Value) -> TestResponse {
        self.request(Method::POST, uri, Some(json)).await
    }

    pub async fn put(&mut self, uri: &str, json: &Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(json)).await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None).await
    }

    /// Sign in with a password.
    pub async fn login(&mut self, email: &str, password: &str) -> TestResponse {
        self.post(
            "/account/login",
            &serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Sign in as the seeded super admin.
    ///
    /// # Panics
    ///
    /// Panics if the login is refused.
    pub async fn login_as_super_admin(&mut self) {
        let response = self.login(SUPER_ADMIN_EMAIL, SUPER_ADMIN_PASSWORD).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "super admin login");
    }

    /// Register a new account, which signs it in.
    pub async fn register(&mut self, email: &str, password: &str) -> TestResponse {
        self.post(
            "/account/register",
            &serde_json::json!({
                "first_name": "Test",
                "last_name": "User",
                "email": email,
                "password": password,
                "confirm_password": password,
            }),
        )
        .await
    }

    /// Forget the session cookie, as a new browser would.
    pub fn forget_session(&mut self) {
        self.cookie = None;
    }
}
