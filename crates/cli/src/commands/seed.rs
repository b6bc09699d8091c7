//! Seed roles and the super admin.
//!
//! Performs the same idempotent step the server runs at startup, but fails
//! loudly instead of logging a warning.

use product_catalog_web::services::bootstrap::{self, SeedOutcome};

use super::{CommandError, open_state};

/// Run the seeding step.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the database is
/// unreachable, or the seed password fails the password policy.
pub async fn run() -> Result<(), CommandError> {
    let state = open_state().await?;

    let outcome =
        bootstrap::run(state.identity(), state.stores(), &state.config().seed_admin).await?;

    match outcome {
        SeedOutcome::Created(id) => tracing::info!(
            "Super admin created! ID: {}, Email: {}",
            id,
            state.config().seed_admin.email
        ),
        SeedOutcome::AlreadyExists => tracing::info!("Super admin already exists"),
        SeedOutcome::Skipped => {
            tracing::warn!("Roles seeded; set CATALOG_SEED_ADMIN_PASSWORD to create the super admin");
        }
    }
    Ok(())
}
