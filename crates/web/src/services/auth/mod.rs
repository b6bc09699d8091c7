//! Authentication service.
//!
//! Self-service registration, password login with lockout, and logout.

mod error;

pub use error::AuthError;

use tower_sessions::Session;
use tracing::{info, instrument, warn};
use validator::Validate;

use product_catalog_core::{Email, RoleName, SignInStatus};

use crate::identity::{IdentityError, IdentityManager, IssueCode};
use crate::models::{Account, LoginForm, NewAccount, RegisterForm};

/// Authentication service.
pub struct AuthService<'a> {
    identity: &'a IdentityManager,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(identity: &'a IdentityManager) -> Self {
        Self { identity }
    }

    /// Register a new account and sign it in.
    ///
    /// The email is lowercased before it is stored. New accounts get the
    /// `User` role and a non-persistent session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the form is invalid.
    /// Returns `AuthError::DuplicateAccount` if the email is taken.
    /// Returns `AuthError::Identity` with the rejection issues if the
    /// password fails the policy, or on store/session failure.
    #[instrument(skip(self, session, form), fields(email = %form.email))]
    pub async fn register(
        &self,
        session: &Session,
        form: &RegisterForm,
    ) -> Result<Account, AuthError> {
        form.validate()?;
        let email = Email::parse(&form.email)?.to_lowercase();

        if self.identity.find_by_email(&email).await?.is_some() {
            warn!("Registration rejected: email already registered");
            return Err(AuthError::DuplicateAccount);
        }

        let new = NewAccount {
            email,
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
        };
        let account = self
            .identity
            .create_account(&new, &form.password)
            .await
            .map_err(|err| match err {
                IdentityError::Rejected(issues)
                    if issues
                        .iter()
                        .any(|issue| issue.code == IssueCode::DuplicateUserName) =>
                {
                    AuthError::DuplicateAccount
                }
                other => AuthError::Identity(other),
            })?;

        self.identity.add_to_role(account.id, RoleName::User).await?;
        self.identity
            .sign_in(session, account.id, &account.email, false)
            .await?;

        info!(account_id = %account.id, "User registered");
        Ok(account)
    }

    /// Sign in with email and password.
    ///
    /// Failed attempts count towards a lockout. Unknown emails and wrong
    /// passwords both report `Failed`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the form is invalid.
    /// Returns `AuthError::Identity` on store or session failure.
    #[instrument(skip(self, session, form), fields(email = %form.email))]
    pub async fn login(
        &self,
        session: &Session,
        form: &LoginForm,
    ) -> Result<SignInStatus, AuthError> {
        form.validate()?;
        let email = Email::parse(&form.email)?;

        let status = self
            .identity
            .password_sign_in(session, &email, &form.password, form.remember_me, true)
            .await?;

        match status {
            SignInStatus::Succeeded => info!("User logged in"),
            SignInStatus::LockedOut => warn!("User account locked out"),
            SignInStatus::Failed => warn!("Invalid login attempt"),
        }
        Ok(status)
    }

    /// End the current session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Identity` if the session cannot be flushed.
    pub async fn logout(&self, session: &Session) -> Result<(), AuthError> {
        self.identity.sign_out(session).await?;
        info!("User logged out");
        Ok(())
    }
}
