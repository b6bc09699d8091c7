//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Expected failures a user can fix (validation, duplicates, policy
//! rejections) are answered with a [`FormErrors`] body instead.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::identity::{IdentityError, IdentityIssue};
use crate::services::{AdminError, AuthError, ProductError, ProfileError};

/// Key for errors that belong to the form as a whole.
pub const FORM_LEVEL: &str = "form";

/// Field-keyed error messages returned when a submitted form is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    #[serde(skip)]
    status: StatusCode,
    errors: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    /// An empty set answered with `status`.
    #[must_use]
    pub const fn new(status: StatusCode) -> Self {
        Self {
            status,
            errors: BTreeMap::new(),
        }
    }

    /// Add a message for `field`.
    #[must_use]
    pub fn with(mut self, field: &str, message: impl Into<String>) -> Self {
        self.errors
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
        self
    }

    /// Add a form-level message.
    #[must_use]
    pub fn with_form_error(self, message: impl Into<String>) -> Self {
        self.with(FORM_LEVEL, message)
    }

    /// One entry per failed field, answered with 422.
    #[must_use]
    pub fn from_validation(errors: &validator::ValidationErrors) -> Self {
        let mut form = Self::new(StatusCode::UNPROCESSABLE_ENTITY);
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                form = form.with(&field.to_string(), message);
            }
        }
        form
    }

    /// Form-level entries for each identity issue, answered with 422.
    #[must_use]
    pub fn from_issues(issues: &[IdentityIssue]) -> Self {
        issues
            .iter()
            .fold(Self::new(StatusCode::UNPROCESSABLE_ENTITY), |form, issue| {
                form.with_form_error(issue.description.clone())
            })
    }

    /// The response status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Messages recorded for `field`.
    #[must_use]
    pub fn messages(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or_default()
    }
}

impl IntoResponse for FormErrors {
    fn into_response(self) -> Response {
        (self.status, Json(&self)).into_response()
    }
}

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Identity operation failed.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Submitted form failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(errors) => Self::Validation(errors),
            AuthError::InvalidEmail(e) => Self::BadRequest(e.to_string()),
            AuthError::DuplicateAccount => {
                Self::BadRequest("User with this email already exists.".to_string())
            }
            AuthError::Identity(e) => Self::Identity(e),
        }
    }
}

impl From<AdminError> for AppError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Validation(errors) => Self::Validation(errors),
            AdminError::InvalidEmail(e) => Self::BadRequest(e.to_string()),
            AdminError::NotFound => Self::NotFound("user".to_string()),
            AdminError::Identity(e) => Self::Identity(e),
            AdminError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::Validation(errors) => Self::Validation(errors),
            ProductError::NotFound => Self::NotFound("product".to_string()),
            ProductError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<ProfileError> for AppError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::NotFound => Self::NotFound("account".to_string()),
            ProfileError::Identity(e) => Self::Identity(e),
            ProfileError::Repository(e) => Self::Database(e),
        }
    }
}

impl AppError {
    /// Whether this is a server-side failure.
    fn is_server_error(&self) -> bool {
        match self {
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => true,
            Self::Identity(err) => !matches!(err, IdentityError::Rejected(_)),
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        match self {
            Self::Validation(errors) => FormErrors::from_validation(&errors).into_response(),
            Self::Identity(IdentityError::Rejected(issues)) => {
                FormErrors::from_issues(&issues).into_response()
            }
            Self::NotFound(what) => {
                (StatusCode::NOT_FOUND, format!("Not found: {what}")).into_response()
            }
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            // Don't expose internal error details to clients
            Self::Database(_) | Self::Identity(_) | Self::Session(_) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use validator::Validate;

    use crate::identity::IssueCode;
    use crate::models::RegisterForm;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Identity(IdentityError::PasswordHash)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_service_errors_map_to_status() {
        assert_eq!(
            get_status(ProductError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(get_status(AdminError::NotFound.into()), StatusCode::NOT_FOUND);
        assert_eq!(
            get_status(ProfileError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_rejection_is_unprocessable() {
        let issues = vec![IdentityIssue::new(IssueCode::PasswordRequiresDigit, "digit")];
        assert_eq!(
            get_status(AppError::Identity(IdentityError::Rejected(issues))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_form_errors_from_validation() {
        let form = RegisterForm::default();
        let errors = form.validate().unwrap_err();
        let form_errors = FormErrors::from_validation(&errors);

        assert_eq!(form_errors.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            form_errors.messages("first_name"),
            ["The First Name field is required.".to_string()]
        );
        assert!(form_errors.messages("nonexistent").is_empty());
    }

    #[test]
    fn test_form_errors_from_issues_are_form_level() {
        let issues = vec![
            IdentityIssue::new(IssueCode::DuplicateUserName, "taken"),
            IdentityIssue::new(IssueCode::PasswordTooShort, "short"),
        ];
        let form_errors = FormErrors::from_issues(&issues);
        assert_eq!(form_errors.messages(FORM_LEVEL), ["taken", "short"]);
    }
}
