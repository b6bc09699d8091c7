//! CLI command implementations.
//!
//! # Environment Variables
//!
//! - `CATALOG_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `seed` and `user` read the full server configuration (see `CatalogConfig::from_env`),
//!   so accounts they create follow the same identity policy as the server

pub mod migrate;
pub mod seed;
pub mod user;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use product_catalog_web::config::{CatalogConfig, ConfigError};
use product_catalog_web::db::{self, Stores};
use product_catalog_web::services::{AdminError, BootstrapError};
use product_catalog_web::state::AppState;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Seeding failed.
    #[error("Seed error: {0}")]
    Bootstrap(#[from] BootstrapError),

    /// User management failed.
    #[error("{0}")]
    Admin(#[from] AdminError),
}

/// Connect to the catalog database.
async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("CATALOG_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("CATALOG_DATABASE_URL"))?;

    tracing::info!("Connecting to catalog database...");
    Ok(db::create_pool(&database_url).await?)
}

/// Load the server configuration and build application state over its database.
async fn open_state() -> Result<AppState, CommandError> {
    let config = CatalogConfig::from_env()?;

    tracing::info!("Connecting to catalog database...");
    let pool = db::create_pool(&config.database_url).await?;
    Ok(AppState::new(config, Stores::postgres(pool)))
}
