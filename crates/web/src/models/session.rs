//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use product_catalog_core::{AccountId, Email, RoleName};

/// Session-stored principal.
///
/// The role list is a snapshot taken at sign-in; role changes apply on the
/// next sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Account ID.
    pub id: AccountId,
    /// Email address.
    pub email: Email,
    /// Roles held at sign-in.
    pub roles: Vec<RoleName>,
}

impl CurrentUser {
    /// Whether the principal holds `role`.
    #[must_use]
    pub fn has_role(&self, role: RoleName) -> bool {
        self.roles.contains(&role)
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
