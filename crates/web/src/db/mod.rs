//! Persistence for the catalog.
//!
//! # Database: `catalog` schema
//!
//! ## Tables
//!
//! - `account` - Identity records (credentials and lockout counters)
//! - `account_profile` - Application-owned extension (first/last name)
//! - `role` - Seeded roles
//! - `account_role` - `(account, role)` assignments
//! - `product` - Catalog entries
//! - `session` - Session storage (created by `PostgresStore::migrate`)
//!
//! Workflows only see the [`AccountStore`], [`RoleStore`] and [`ProductStore`]
//! traits. [`Stores::postgres`] wires them to `PostgreSQL`; [`Stores::memory`]
//! wires them to a process-local store for tests and local development.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p product-catalog-cli -- migrate
//! ```

pub mod accounts;
pub mod memory;
pub mod products;
pub mod roles;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use product_catalog_core::{AccountId, ProductId, RoleId, RoleName};

use crate::models::{
    Account, AccountProfile, IdentityAccount, LockoutState, Product, Role, RoleAssignment,
};

pub use accounts::AccountRepository;
pub use memory::MemoryStore;
pub use products::ProductRepository;
pub use roles::RoleRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a sqlx error to `Conflict` when it is a unique violation.
pub(crate) fn conflict_or_database(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}

/// Identity and profile storage.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Check the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Insert an identity record and its profile atomically.
    ///
    /// Returns `RepositoryError::Conflict` if the normalized email is taken.
    async fn create_account(
        &self,
        identity: &IdentityAccount,
        profile: &AccountProfile,
    ) -> Result<(), RepositoryError>;

    /// Look up an identity record by its normalized email.
    async fn find_by_normalized_email(
        &self,
        normalized_email: &str,
    ) -> Result<Option<IdentityAccount>, RepositoryError>;

    /// Look up an identity record by id.
    async fn find_by_id(&self, id: AccountId) -> Result<Option<IdentityAccount>, RepositoryError>;

    /// Persist failed-attempt counters.
    async fn update_lockout(
        &self,
        id: AccountId,
        state: LockoutState,
    ) -> Result<(), RepositoryError>;

    /// Every account that has a profile, in creation order.
    async fn list_accounts(&self) -> Result<Vec<Account>, RepositoryError>;

    /// Profile for an account.
    async fn get_profile(&self, id: AccountId) -> Result<Option<AccountProfile>, RepositoryError>;

    /// Overwrite a profile's names. Returns `false` if no profile exists.
    async fn update_profile(&self, profile: &AccountProfile) -> Result<bool, RepositoryError>;

    /// Remove a profile, leaving the identity record in place.
    ///
    /// Returns `false` if no profile existed.
    async fn delete_profile(&self, id: AccountId) -> Result<bool, RepositoryError>;
}

/// Roles and role assignments.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Every seeded role.
    async fn list_roles(&self) -> Result<Vec<Role>, RepositoryError>;

    /// Look up a role by id.
    async fn find_role(&self, id: RoleId) -> Result<Option<Role>, RepositoryError>;

    /// Look up a role by name.
    async fn find_role_by_name(&self, name: RoleName) -> Result<Option<Role>, RepositoryError>;

    /// Insert the role if absent. Returns the role and whether it was created.
    async fn ensure_role(&self, name: RoleName) -> Result<(Role, bool), RepositoryError>;

    /// Every assignment.
    async fn list_assignments(&self) -> Result<Vec<RoleAssignment>, RepositoryError>;

    /// Assignments held by one account.
    async fn assignments_for(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<RoleAssignment>, RepositoryError>;

    /// Add an assignment. Returns `false` if it already existed.
    async fn add_assignment(&self, assignment: RoleAssignment) -> Result<bool, RepositoryError>;

    /// Remove an assignment. Returns `false` if it did not exist.
    async fn remove_assignment(&self, assignment: RoleAssignment)
    -> Result<bool, RepositoryError>;

    /// Remove `from` and add `to` for one account in a single transaction.
    async fn replace_assignment(
        &self,
        account_id: AccountId,
        from: Option<RoleId>,
        to: Option<RoleId>,
    ) -> Result<(), RepositoryError>;
}

/// Product catalog storage.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Every product, in creation order.
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Look up a product by id.
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Insert a new product.
    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError>;

    /// Overwrite a product. Returns `false` if it does not exist.
    async fn update_product(&self, product: &Product) -> Result<bool, RepositoryError>;

    /// Delete a product. Returns `false` if it did not exist.
    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError>;
}

/// The three stores the workflows run against.
#[derive(Clone)]
pub struct Stores {
    pub accounts: Arc<dyn AccountStore>,
    pub roles: Arc<dyn RoleStore>,
    pub products: Arc<dyn ProductStore>,
}

impl Stores {
    /// Stores backed by `PostgreSQL`.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            accounts: Arc::new(AccountRepository::new(pool.clone())),
            roles: Arc::new(RoleRepository::new(pool.clone())),
            products: Arc::new(ProductRepository::new(pool)),
        }
    }

    /// Stores backed by a fresh in-memory store.
    #[must_use]
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::default());
        Self {
            accounts: store.clone(),
            roles: store.clone(),
            products: store,
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
