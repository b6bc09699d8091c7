//! Failed-attempt counting and lockout windows.

use chrono::{DateTime, Duration, Utc};

use crate::models::{IdentityAccount, LockoutState};

/// When repeated failures lock an account, and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    pub max_failed_attempts: u32,
    pub duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failed_attempts: 10,
            duration: Duration::minutes(5),
        }
    }
}

impl LockoutPolicy {
    /// Counters after one more failed attempt at `now`.
    ///
    /// Reaching the threshold opens a lockout window and resets the count.
    #[must_use]
    pub fn register_failure(&self, account: &IdentityAccount, now: DateTime<Utc>) -> LockoutState {
        let failures = account.access_failed_count.saturating_add(1);
        if u32::try_from(failures).unwrap_or(u32::MAX) >= self.max_failed_attempts {
            LockoutState {
                access_failed_count: 0,
                lockout_end: Some(now + self.duration),
            }
        } else {
            LockoutState {
                access_failed_count: failures,
                lockout_end: account.lockout_end,
            }
        }
    }
}
