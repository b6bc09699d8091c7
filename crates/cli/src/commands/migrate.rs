//! Database migration command.
//!
//! Applies `crates/web/migrations/` and creates the session table used by
//! `tower-sessions-sqlx-store`.

use product_catalog_web::middleware::postgres_session_store;

use super::{CommandError, connect};

/// Run all catalog migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running catalog migrations...");
    sqlx::migrate!("../web/migrations").run(&pool).await?;

    tracing::info!("Creating session table...");
    postgres_session_store(&pool).migrate().await?;

    tracing::info!("Catalog migrations complete!");
    Ok(())
}
