//! Profile service: resolves the signed-in principal to a displayable account.

use thiserror::Error;

use crate::db::{AccountStore, RepositoryError, Stores};
use crate::identity::{IdentityError, IdentityManager};
use crate::models::{Account, CurrentUser};

/// First name shown when an account's profile is gone.
pub const DEFAULT_FIRST_NAME: &str = "DefaultFirstName";
/// Last name shown when an account's profile is gone.
pub const DEFAULT_LAST_NAME: &str = "DefaultLastName";

/// Errors that can occur while resolving a profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The principal no longer maps to an account.
    #[error("account not found")]
    NotFound,

    /// Identity manager error.
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Profile service.
pub struct ProfileService<'a> {
    identity: &'a IdentityManager,
    accounts: &'a dyn AccountStore,
}

impl<'a> ProfileService<'a> {
    /// Create a new profile service.
    #[must_use]
    pub fn new(identity: &'a IdentityManager, stores: &'a Stores) -> Self {
        Self {
            identity,
            accounts: stores.accounts.as_ref(),
        }
    }

    /// The account behind the session principal.
    ///
    /// A deleted profile falls back to placeholder names.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::NotFound` if the identity record is gone.
    /// Returns `ProfileError::Repository` if the store fails.
    pub async fn resolve_current_user(
        &self,
        principal: &CurrentUser,
    ) -> Result<Account, ProfileError> {
        let identity = self
            .identity
            .current_account(principal)
            .await?
            .ok_or(ProfileError::NotFound)?;
        let profile = self.accounts.get_profile(identity.id).await?;

        let (first_name, last_name) = profile.map_or_else(
            || (DEFAULT_FIRST_NAME.to_owned(), DEFAULT_LAST_NAME.to_owned()),
            |p| (p.first_name, p.last_name),
        );

        Ok(Account {
            id: identity.id,
            email: identity.email,
            username: identity.username,
            first_name,
            last_name,
        })
    }
}
