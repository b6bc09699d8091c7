//! Identity error types.

use serde::Serialize;
use thiserror::Error;

use product_catalog_core::RoleName;

use crate::db::RepositoryError;

/// Machine-readable reason an account was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IssueCode {
    PasswordTooShort,
    PasswordRequiresNonAlphanumeric,
    PasswordRequiresDigit,
    PasswordRequiresLower,
    PasswordRequiresUpper,
    DuplicateUserName,
}

impl IssueCode {
    /// Whether the issue comes from the password complexity rules.
    #[must_use]
    pub const fn is_password_complexity(self) -> bool {
        !matches!(self, Self::DuplicateUserName)
    }
}

/// One reason an account was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityIssue {
    pub code: IssueCode,
    pub description: String,
}

impl IdentityIssue {
    /// Build an issue.
    #[must_use]
    pub fn new(code: IssueCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }

    /// The username is already taken.
    #[must_use]
    pub fn duplicate_user_name(username: &str) -> Self {
        Self::new(
            IssueCode::DuplicateUserName,
            format!("Username '{username}' is already taken."),
        )
    }
}

fn describe(issues: &[IdentityIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.description.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Errors that can occur during identity operations.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The account was rejected by the password policy or uniqueness rules.
    #[error("account rejected: {}", describe(.0))]
    Rejected(Vec<IdentityIssue>),

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// A role that should have been seeded is missing.
    #[error("role not seeded: {0}")]
    MissingRole(RoleName),

    /// Session could not be read or written.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl IdentityError {
    /// The rejection issues, if this is a rejection.
    #[must_use]
    pub fn issues(&self) -> Option<&[IdentityIssue]> {
        match self {
            Self::Rejected(issues) => Some(issues),
            _ => None,
        }
    }
}
