//! Role names for authorization.

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a known role.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid role: {0}. Valid roles: User, Admin, SuperAdmin")]
pub struct RoleNameError(pub String);

/// One of the fixed roles seeded at startup.
///
/// Role names are stored and displayed in their `PascalCase` form
/// (`User`, `Admin`, `SuperAdmin`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoleName {
    /// Any registered account. Can browse the catalog.
    User,
    /// Can create, edit and delete products.
    Admin,
    /// Can manage the user roster and role assignments.
    SuperAdmin,
}

impl RoleName {
    /// Every role, in seeding order.
    pub const ALL: [Self; 3] = [Self::Admin, Self::User, Self::SuperAdmin];

    /// Roles an administrator may assign through the user management screens.
    ///
    /// `SuperAdmin` is never offered.
    pub const ASSIGNABLE: [Self; 2] = [Self::Admin, Self::User];

    /// The stored/display name of this role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Admin => "Admin",
            Self::SuperAdmin => "SuperAdmin",
        }
    }
}

impl std::fmt::Display for RoleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RoleName {
    type Err = RoleNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" => Ok(Self::User),
            "Admin" => Ok(Self::Admin),
            "SuperAdmin" => Ok(Self::SuperAdmin),
            _ => Err(RoleNameError(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for role in RoleName::ALL {
            assert_eq!(role.as_str().parse::<RoleName>().unwrap(), role);
        }
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("admin".parse::<RoleName>().is_err());
        assert!("Viewer".parse::<RoleName>().is_err());
    }

    #[test]
    fn test_assignable_excludes_super_admin() {
        assert!(!RoleName::ASSIGNABLE.contains(&RoleName::SuperAdmin));
        assert_eq!(RoleName::ASSIGNABLE, [RoleName::Admin, RoleName::User]);
    }
}
