//! Role models.

use serde::Serialize;

use product_catalog_core::{AccountId, RoleId, RoleName};

/// A seeded role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Role {
    pub id: RoleId,
    pub name: RoleName,
}

/// An `(account, role)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoleAssignment {
    pub account_id: AccountId,
    pub role_id: RoleId,
}
