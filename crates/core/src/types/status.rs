//! Status enums for authentication outcomes.

use serde::{Deserialize, Serialize};

/// Outcome of a password sign-in attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignInStatus {
    /// Credentials matched and the account is not locked.
    Succeeded,
    /// The account is locked after too many failed attempts.
    LockedOut,
    /// Unknown email or wrong password. The two are never distinguished.
    Failed,
}

impl SignInStatus {
    /// Whether the attempt signed the user in.
    #[must_use]
    pub const fn succeeded(self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Whether the account is locked out.
    #[must_use]
    pub const fn is_locked_out(self) -> bool {
        matches!(self, Self::LockedOut)
    }
}
