//! Password policy and Argon2id hashing.

use std::sync::OnceLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use super::error::{IdentityError, IdentityIssue, IssueCode};

/// Complexity rules applied when an account is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub required_length: usize,
    pub require_non_alphanumeric: bool,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            required_length: 8,
            require_non_alphanumeric: true,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
        }
    }
}

impl PasswordPolicy {
    /// Check `password` against the policy. An empty list means it passes.
    #[must_use]
    pub fn validate(&self, password: &str) -> Vec<IdentityIssue> {
        let mut issues = Vec::new();

        if password.chars().count() < self.required_length {
            issues.push(IdentityIssue::new(
                IssueCode::PasswordTooShort,
                format!(
                    "Passwords must be at least {} characters.",
                    self.required_length
                ),
            ));
        }
        if self.require_non_alphanumeric && password.chars().all(char::is_alphanumeric) {
            issues.push(IdentityIssue::new(
                IssueCode::PasswordRequiresNonAlphanumeric,
                "Passwords must have at least one non alphanumeric character.",
            ));
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            issues.push(IdentityIssue::new(
                IssueCode::PasswordRequiresDigit,
                "Passwords must have at least one digit ('0'-'9').",
            ));
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            issues.push(IdentityIssue::new(
                IssueCode::PasswordRequiresLower,
                "Passwords must have at least one lowercase ('a'-'z').",
            ));
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            issues.push(IdentityIssue::new(
                IssueCode::PasswordRequiresUpper,
                "Passwords must have at least one uppercase ('A'-'Z').",
            ));
        }

        issues
    }
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `IdentityError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, IdentityError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| IdentityError::PasswordHash)
}

/// Verify a password against a stored hash.
///
/// An unparseable hash never verifies.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Hash of a random secret, built on first use with the same parameters as
/// [`hash_password`].
pub(super) static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

fn dummy_hash() -> Option<&'static str> {
    DUMMY_HASH
        .get_or_init(|| hash_password(SaltString::generate(&mut OsRng).as_str()).ok())
        .as_deref()
}

/// Spend one Argon2 verification on a password that has no account.
///
/// Sign-in for an unknown email then costs the same as a wrong password.
pub fn verify_without_account(password: &str) {
    if let Some(hash) = dummy_hash() {
        let _ = verify_password(password, hash);
    }
}
