//! Startup seeding of roles and the super admin account.
//!
//! Runs before the server accepts traffic and from `catalog-cli seed`. Every
//! step is idempotent.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{info, warn};

use product_catalog_core::{AccountId, Email, RoleName};

use crate::db::{RepositoryError, RoleStore, Stores};
use crate::identity::{IdentityError, IdentityManager};
use crate::models::NewAccount;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Identity manager error, including a seed password that fails the policy.
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// The super admin account created at startup.
#[derive(Clone)]
pub struct SeedAdmin {
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    /// Without a password the account is not created.
    pub password: Option<SecretString>,
}

impl std::fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// What happened to the super admin account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created(AccountId),
    AlreadyExists,
    /// No seed password was configured.
    Skipped,
}

/// Insert every role that does not exist yet. Returns how many were created.
///
/// # Errors
///
/// Returns `BootstrapError::Repository` if the store fails.
pub async fn seed_roles(roles: &dyn RoleStore) -> Result<usize, BootstrapError> {
    let mut created = 0;
    for name in RoleName::ALL {
        let (_, inserted) = roles.ensure_role(name).await?;
        if inserted {
            info!(role = %name, "Role seeded");
            created += 1;
        }
    }
    Ok(created)
}

/// Create the super admin if no account holds its email.
///
/// The account gets `SuperAdmin`, `Admin` and `User`.
///
/// # Errors
///
/// Returns `BootstrapError::Identity` if the seed password fails the policy
/// or a role is missing.
/// Returns `BootstrapError::Repository` if the store fails.
pub async fn seed_super_admin(
    identity: &IdentityManager,
    seed: &SeedAdmin,
) -> Result<SeedOutcome, BootstrapError> {
    let Some(password) = &seed.password else {
        warn!("No seed admin password configured; skipping super admin creation");
        return Ok(SeedOutcome::Skipped);
    };

    if identity.find_by_email(&seed.email).await?.is_some() {
        return Ok(SeedOutcome::AlreadyExists);
    }

    let new = NewAccount {
        email: seed.email.clone(),
        first_name: seed.first_name.clone(),
        last_name: seed.last_name.clone(),
    };
    let account = identity
        .create_account(&new, password.expose_secret())
        .await?;
    identity
        .add_to_roles(
            account.id,
            &[RoleName::SuperAdmin, RoleName::Admin, RoleName::User],
        )
        .await?;

    info!(account_id = %account.id, email = %account.email, "Super admin seeded");
    Ok(SeedOutcome::Created(account.id))
}

/// Seed roles, then the super admin.
///
/// # Errors
///
/// Returns the first seeding error.
pub async fn run(
    identity: &IdentityManager,
    stores: &Stores,
    seed: &SeedAdmin,
) -> Result<SeedOutcome, BootstrapError> {
    seed_roles(stores.roles.as_ref()).await?;
    seed_super_admin(identity, seed).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::identity::IdentitySettings;

    use super::*;

    fn seed(password: Option<&str>) -> SeedAdmin {
        SeedAdmin {
            email: Email::parse("superadmin@catalog.local").unwrap(),
            first_name: "Super".to_owned(),
            last_name: "Admin".to_owned(),
            password: password.map(SecretString::from),
        }
    }

    #[tokio::test]
    async fn test_run_is_idempotent() {
        let stores = Stores::memory();
        let identity = IdentityManager::new(&stores, IdentitySettings::default());
        let seed = seed(Some("Sup3r-secret"));

        let first = run(&identity, &stores, &seed).await.unwrap();
        let SeedOutcome::Created(id) = first else {
            panic!("expected super admin to be created, got {first:?}");
        };
        let second = run(&identity, &stores, &seed).await.unwrap();
        assert_eq!(second, SeedOutcome::AlreadyExists);

        assert_eq!(stores.roles.list_roles().await.unwrap().len(), 3);
        let mut roles = identity.roles_for(id).await.unwrap();
        roles.sort();
        assert_eq!(
            roles,
            vec![RoleName::User, RoleName::Admin, RoleName::SuperAdmin]
        );
    }

    #[tokio::test]
    async fn test_without_password_only_roles_are_seeded() {
        let stores = Stores::memory();
        let identity = IdentityManager::new(&stores, IdentitySettings::default());

        let outcome = run(&identity, &stores, &seed(None)).await.unwrap();
        assert_eq!(outcome, SeedOutcome::Skipped);
        assert_eq!(stores.roles.list_roles().await.unwrap().len(), 3);
        assert!(stores.accounts.list_accounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_weak_seed_password_is_rejected() {
        let stores = Stores::memory();
        let identity = IdentityManager::new(&stores, IdentitySettings::default());

        let err = run(&identity, &stores, &seed(Some("weak"))).await.unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::Identity(IdentityError::Rejected(_))
        ));
    }
}
