//! Business logic services.
//!
//! Each workflow borrows the identity manager and stores it needs for the
//! duration of one request.

pub mod admin;
pub mod auth;
pub mod bootstrap;
pub mod products;
pub mod profile;

pub use admin::{AdminError, AdminService};
pub use auth::{AuthError, AuthService};
pub use bootstrap::{BootstrapError, SeedAdmin};
pub use products::{ProductError, ProductService};
pub use profile::{ProfileError, ProfileService};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use tower_sessions::{MemoryStore as SessionMemoryStore, Session};

    use product_catalog_core::RoleName;

    use crate::db::Stores;
    use crate::identity::{IdentityManager, IdentitySettings};

    /// In-memory stores with every role seeded.
    #[allow(clippy::unwrap_used)]
    pub async fn seeded() -> (Stores, IdentityManager) {
        let stores = Stores::memory();
        for name in RoleName::ALL {
            stores.roles.ensure_role(name).await.unwrap();
        }
        let identity = IdentityManager::new(&stores, IdentitySettings::default());
        (stores, identity)
    }

    /// A fresh unsaved session.
    pub fn session() -> Session {
        Session::new(None, Arc::new(SessionMemoryStore::default()), None)
    }
}
