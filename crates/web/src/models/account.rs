//! Account models.
//!
//! An account is split in two: the identity record owned by the identity
//! manager (credentials and lockout counters) and the profile record owned by
//! the application (display names). Reads join the two into [`Account`].

use chrono::{DateTime, Utc};
use serde::Serialize;

use product_catalog_core::{AccountId, Email, RoleId};

/// Identity-owned account record.
#[derive(Clone)]
pub struct IdentityAccount {
    /// Unique account ID.
    pub id: AccountId,
    /// Email as entered.
    pub email: Email,
    /// Uppercase form of the email used for uniqueness and lookups.
    pub normalized_email: String,
    /// Username; mirrors the email.
    pub username: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Consecutive failed sign-in attempts since the last success or lockout.
    pub access_failed_count: i32,
    /// End of the current lockout window, if any.
    pub lockout_end: Option<DateTime<Utc>>,
    /// Whether failed attempts count towards a lockout.
    pub lockout_enabled: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl IdentityAccount {
    /// Whether the account is locked out at `now`.
    #[must_use]
    pub fn is_locked_out(&self, now: DateTime<Utc>) -> bool {
        self.lockout_enabled && self.lockout_end.is_some_and(|end| end > now)
    }

    /// Current failed-attempt counters.
    #[must_use]
    pub const fn lockout_state(&self) -> LockoutState {
        LockoutState {
            access_failed_count: self.access_failed_count,
            lockout_end: self.lockout_end,
        }
    }
}

impl std::fmt::Debug for IdentityAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityAccount")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("access_failed_count", &self.access_failed_count)
            .field("lockout_end", &self.lockout_end)
            .field("lockout_enabled", &self.lockout_enabled)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Failed-attempt counters persisted after each password check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutState {
    pub access_failed_count: i32,
    pub lockout_end: Option<DateTime<Utc>>,
}

impl LockoutState {
    /// Counters after a successful sign-in.
    pub const CLEARED: Self = Self {
        access_failed_count: 0,
        lockout_end: None,
    };
}

/// Application-owned extension record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountProfile {
    pub account_id: AccountId,
    pub first_name: String,
    pub last_name: String,
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
}

/// Identity and profile joined for reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: AccountId,
    pub email: Email,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl Account {
    /// Join an identity record with its profile.
    #[must_use]
    pub fn from_parts(identity: &IdentityAccount, profile: &AccountProfile) -> Self {
        Self {
            id: identity.id,
            email: identity.email.clone(),
            username: identity.username.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
        }
    }
}

/// Account listing row with its resolved role name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: AccountId,
    pub email: Email,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Name of the assigned role, or `"None"`.
    pub role_name: String,
}

impl UserView {
    /// Role name shown when an account has no resolvable assignment.
    pub const NO_ROLE: &'static str = "None";
}

/// A selectable role in the admin forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleOption {
    pub value: String,
    pub text: String,
}

/// Account editing view: the account plus every role it could be given.
#[derive(Debug, Clone, Serialize)]
pub struct UserEditView {
    #[serde(flatten)]
    pub account: Account,
    /// The role currently assigned, if any.
    pub role_id: Option<RoleId>,
    pub role_options: Vec<RoleOption>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn identity(lockout_end: Option<DateTime<Utc>>) -> IdentityAccount {
        let email = Email::parse("jo@example.com").unwrap();
        IdentityAccount {
            id: AccountId::generate(),
            normalized_email: email.normalized(),
            username: email.as_str().to_owned(),
            email,
            password_hash: "$argon2id$secret".to_owned(),
            access_failed_count: 0,
            lockout_end,
            lockout_enabled: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_locked_out() {
        let now = Utc::now();
        assert!(!identity(None).is_locked_out(now));
        assert!(identity(Some(now + Duration::minutes(1))).is_locked_out(now));
        assert!(!identity(Some(now - Duration::minutes(1))).is_locked_out(now));
    }

    #[test]
    fn test_lockout_disabled_never_locks() {
        let now = Utc::now();
        let mut account = identity(Some(now + Duration::minutes(1)));
        account.lockout_enabled = false;
        assert!(!account.is_locked_out(now));
    }

    #[test]
    fn test_debug_redacts_hash() {
        let debug = format!("{:?}", identity(None));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("$argon2id$secret"));
    }
}
