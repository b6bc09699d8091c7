//! Authentication error types.

use thiserror::Error;

use crate::identity::IdentityError;

/// Errors that can occur during registration, login or logout.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The submitted form failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] product_catalog_core::EmailError),

    /// An account with this email already exists.
    #[error("user with this email already exists")]
    DuplicateAccount,

    /// Identity manager error, including password policy rejections.
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),
}
