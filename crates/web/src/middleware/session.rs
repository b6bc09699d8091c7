//! Session middleware configuration.
//!
//! Production uses the `PostgreSQL` store from `tower-sessions-sqlx-store`;
//! tests pass a `tower_sessions::MemoryStore`.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::CatalogConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "catalog_session";

/// Session store backed by `catalog.session`.
///
/// The table is created by `PostgresStore::migrate`, which `catalog-cli
/// migrate` runs.
///
/// # Panics
///
/// Panics if the schema name or table name is invalid (should never happen
/// with hardcoded "catalog" and "session" values).
#[must_use]
pub fn postgres_session_store(pool: &PgPool) -> PostgresStore {
    PostgresStore::new(pool.clone())
        .with_schema_name("catalog")
        .expect("valid schema name")
        .with_table_name("session")
        .expect("valid table name")
}

/// Create the session layer over `store`.
///
/// Sessions end with the browser unless sign-in asks for a persistent one.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &CatalogConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnSessionEnd)
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
