//! Registration, login and logout handlers.
//!
//! Successful submissions redirect; rejected ones answer with a
//! [`FormErrors`] body keyed by field.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use product_catalog_core::SignInStatus;

use crate::error::{FormErrors, Result, clear_sentry_user, set_sentry_user};
use crate::identity::{IdentityError, IdentityIssue};
use crate::middleware::{OptionalAuth, auth::LOGIN_PATH};
use crate::models::{CurrentUser, LoginForm, RegisterForm, session_keys};
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// Shown when registration hits an existing email.
pub const DUPLICATE_EMAIL_MESSAGE: &str = "User with this email already exists.";
/// Shown when the password fails the complexity rules.
pub const PASSWORD_COMPLEXITY_MESSAGE: &str = "Password does not meet complexity requirements.";
/// Shown for unknown emails and wrong passwords alike.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";
/// Shown while an account is locked out.
pub const LOCKED_OUT_MESSAGE: &str = "This account has been locked out, please try again later.";

/// Handle registration.
///
/// Signs the new account in and redirects home.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<RegisterForm>,
) -> Result<Response> {
    match AuthService::new(state.identity())
        .register(&session, &form)
        .await
    {
        Ok(account) => {
            set_sentry_user(&account.id, Some(account.email.as_str()));
            Ok(Redirect::to("/").into_response())
        }
        Err(AuthError::Validation(errors)) => {
            Ok(FormErrors::from_validation(&errors).into_response())
        }
        Err(AuthError::InvalidEmail(e)) => Ok(FormErrors::new(StatusCode::UNPROCESSABLE_ENTITY)
            .with("email", e.to_string())
            .into_response()),
        Err(AuthError::DuplicateAccount) => Ok(FormErrors::new(StatusCode::UNPROCESSABLE_ENTITY)
            .with_form_error(DUPLICATE_EMAIL_MESSAGE)
            .into_response()),
        Err(AuthError::Identity(IdentityError::Rejected(issues))) => {
            Ok(registration_issues(&issues).into_response())
        }
        Err(other) => Err(other.into()),
    }
}

/// Password-policy issues collapse into one `password` message; the rest
/// are form-level.
fn registration_issues(issues: &[IdentityIssue]) -> FormErrors {
    let mut form = FormErrors::new(StatusCode::UNPROCESSABLE_ENTITY);
    if issues.iter().any(|issue| issue.code.is_password_complexity()) {
        form = form.with("password", PASSWORD_COMPLEXITY_MESSAGE);
    }
    issues
        .iter()
        .filter(|issue| !issue.code.is_password_complexity())
        .fold(form, |form, issue| form.with_form_error(issue.description.clone()))
}

/// Handle login.
///
/// Wrong passwords and unknown emails get the same 401; a locked account
/// gets 423.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<Response> {
    let status = match AuthService::new(state.identity())
        .login(&session, &form)
        .await
    {
        Ok(status) => status,
        Err(AuthError::Validation(errors)) => {
            return Ok(FormErrors::from_validation(&errors).into_response());
        }
        Err(AuthError::InvalidEmail(_)) => SignInStatus::Failed,
        Err(other) => return Err(other.into()),
    };

    let response = match status {
        SignInStatus::Succeeded => {
            if let Some(user) = session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await?
            {
                set_sentry_user(&user.id, Some(user.email.as_str()));
            }
            Redirect::to("/").into_response()
        }
        SignInStatus::LockedOut => FormErrors::new(StatusCode::LOCKED)
            .with_form_error(LOCKED_OUT_MESSAGE)
            .into_response(),
        SignInStatus::Failed => FormErrors::new(StatusCode::UNAUTHORIZED)
            .with_form_error(INVALID_CREDENTIALS_MESSAGE)
            .into_response(),
    };
    Ok(response)
}

/// Handle logout.
#[instrument(skip_all, fields(account_id = ?user.as_ref().map(|u| u.id)))]
pub async fn logout(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<Redirect> {
    AuthService::new(state.identity()).logout(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to(LOGIN_PATH))
}
