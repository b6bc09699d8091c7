//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                       - Profile of the signed-in user
//! GET    /health                 - Liveness check
//! GET    /health/ready           - Store reachability
//!
//! # Account
//! POST   /account/register       - Register and sign in
//! POST   /account/login          - Password sign-in
//! POST   /account/logout         - Sign out
//!
//! # Products (listing requires auth, changes require Admin)
//! GET    /products               - Product listing
//! POST   /products               - Create product
//! GET    /products/{id}          - Product detail
//! GET    /products/{id}/edit     - Product for editing
//! PUT    /products/{id}          - Update product
//! DELETE /products/{id}          - Remove product
//!
//! # User administration (SuperAdmin)
//! GET    /admin/users            - Accounts with their role
//! GET    /admin/users/new        - Role options for a new account
//! POST   /admin/users            - Create account
//! GET    /admin/users/{id}/edit  - Account with role options
//! PUT    /admin/users/{id}       - Update names and role
//! DELETE /admin/users/{id}       - Remove account profile
//! ```

pub mod account;
pub mod admin_users;
pub mod health;
pub mod products;
pub mod profile;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::state::AppState;

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(account::register))
        .route("/login", post(account::login))
        .route("/logout", post(account::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::details)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/{id}/edit", get(products::edit))
}

/// Create the user administration routes router.
pub fn admin_user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin_users::index).post(admin_users::create))
        .route("/new", get(admin_users::new_user))
        .route(
            "/{id}",
            axum::routing::put(admin_users::update).delete(admin_users::delete),
        )
        .route("/{id}/edit", get(admin_users::edit))
}

/// Create the main routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::show))
        .nest("/account", account_routes())
        .nest("/products", product_routes())
        .nest("/admin/users", admin_user_routes())
}

/// The full application: health checks, routes, sessions and request tracing.
///
/// Sentry layers are added by the binary.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(routes())
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
