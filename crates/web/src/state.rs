//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::CatalogConfig;
use crate::db::Stores;
use crate::identity::IdentityManager;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the stores and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: CatalogConfig,
    stores: Stores,
    identity: IdentityManager,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The identity manager is built from the configured lockout and
    /// remember-me settings.
    #[must_use]
    pub fn new(config: CatalogConfig, stores: Stores) -> Self {
        let identity = IdentityManager::new(&stores, config.identity_settings());
        Self::with_identity(config, stores, identity)
    }

    /// Create application state around an existing identity manager.
    #[must_use]
    pub fn with_identity(config: CatalogConfig, stores: Stores, identity: IdentityManager) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                stores,
                identity,
            }),
        }
    }

    /// Get a reference to the catalog configuration.
    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.inner.config
    }

    /// Get a reference to the stores.
    #[must_use]
    pub fn stores(&self) -> &Stores {
        &self.inner.stores
    }

    /// Get a reference to the identity manager.
    #[must_use]
    pub fn identity(&self) -> &IdentityManager {
        &self.inner.identity
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn test_identity_follows_configured_policy() {
        let mut config = CatalogConfig::new(
            SecretString::from("postgres://localhost/test"),
            "http://localhost:3000",
        )
        .unwrap();
        config.lockout_max_attempts = 3;
        config.lockout_minutes = 30;
        config.remember_me_days = 2;

        let state = AppState::new(config, Stores::memory());
        let settings = state.identity().settings();
        assert_eq!(settings.lockout.max_failed_attempts, 3);
        assert_eq!(settings.lockout.duration, Duration::minutes(30));
        assert_eq!(settings.remember_me, Duration::days(2));
    }
}
