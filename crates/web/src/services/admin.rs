//! User administration service.
//!
//! Lists accounts with their role, creates accounts with a role, swaps an
//! account's single role, and removes account profiles. Route-level access
//! is restricted to super admins.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{info, instrument, warn};
use validator::Validate;

use product_catalog_core::{AccountId, Email, RoleId, RoleName};

use crate::db::{AccountStore, RepositoryError, RoleStore, Stores};
use crate::identity::{IdentityError, IdentityManager};
use crate::models::{
    Account, AddUserForm, NewAccount, RoleOption, UpdateUserForm, UserEditView, UserView,
};

/// Errors that can occur during user administration.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The submitted form failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] product_catalog_core::EmailError),

    /// Account not found.
    #[error("user not found")]
    NotFound,

    /// Identity manager error, including account rejections.
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Profile changes applied by [`AdminService::update_user`].
#[derive(Debug, Clone)]
pub struct AccountUpdate {
    pub id: AccountId,
    pub first_name: String,
    pub last_name: String,
}

/// User administration service.
pub struct AdminService<'a> {
    identity: &'a IdentityManager,
    accounts: &'a dyn AccountStore,
    roles: &'a dyn RoleStore,
}

impl<'a> AdminService<'a> {
    /// Create a new admin service.
    #[must_use]
    pub fn new(identity: &'a IdentityManager, stores: &'a Stores) -> Self {
        Self {
            identity,
            accounts: stores.accounts.as_ref(),
            roles: stores.roles.as_ref(),
        }
    }

    /// Every account with its resolved role name.
    ///
    /// Accounts without an assignment, or whose assignment points at an
    /// unknown role, show `"None"`.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Repository` if the store fails.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<UserView>, AdminError> {
        let accounts = self.accounts.list_accounts().await?;
        let assignments = self.roles.list_assignments().await?;
        let role_names: HashMap<RoleId, RoleName> = self
            .roles
            .list_roles()
            .await?
            .into_iter()
            .map(|role| (role.id, role.name))
            .collect();

        Ok(accounts
            .into_iter()
            .map(|account| {
                let role_name = assignments
                    .iter()
                    .find(|a| a.account_id == account.id)
                    .and_then(|a| role_names.get(&a.role_id))
                    .map_or_else(|| UserView::NO_ROLE.to_owned(), ToString::to_string);
                UserView {
                    id: account.id,
                    email: account.email,
                    username: account.username,
                    first_name: account.first_name,
                    last_name: account.last_name,
                    role_name,
                }
            })
            .collect())
    }

    /// Create an account and assign its roles.
    ///
    /// Selecting `"Admin"` grants Admin and User; anything else grants User.
    /// The email is stored as entered.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` if the form is invalid.
    /// Returns `AdminError::Identity` with the rejection issues if the account
    /// is refused; no role is assigned in that case.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn create_user(&self, form: &AddUserForm) -> Result<Account, AdminError> {
        form.validate()?;
        let new = NewAccount {
            email: Email::parse(&form.email)?,
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
        };

        let account = self.identity.create_account(&new, &form.password).await?;

        if form.wants_admin() {
            self.identity
                .add_to_roles(account.id, &[RoleName::Admin, RoleName::User])
                .await?;
        } else {
            self.identity.add_to_role(account.id, RoleName::User).await?;
        }

        info!(account_id = %account.id, admin = form.wants_admin(), "User created");
        Ok(account)
    }

    /// An account with its current role and every role it could be given.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the account has no profile.
    /// Returns `AdminError::Repository` if the store fails.
    #[instrument(skip(self))]
    pub async fn get_user_for_edit(&self, id: AccountId) -> Result<UserEditView, AdminError> {
        let profile = self
            .accounts
            .get_profile(id)
            .await?
            .ok_or(AdminError::NotFound)?;
        let identity = self
            .accounts
            .find_by_id(id)
            .await?
            .ok_or(AdminError::NotFound)?;

        let role_id = self
            .roles
            .assignments_for(id)
            .await?
            .first()
            .map(|a| a.role_id);
        let role_options = self
            .roles
            .list_roles()
            .await?
            .into_iter()
            .map(|role| RoleOption {
                value: role.id.to_string(),
                text: role.name.to_string(),
            })
            .collect();

        Ok(UserEditView {
            account: Account::from_parts(&identity, &profile),
            role_id,
            role_options,
        })
    }

    /// Update an account's names and swap its role.
    ///
    /// The current assignment (if any) is removed and `new_role_id` added in
    /// one store transaction. An id that does not resolve to a role leaves
    /// the account with no role. Returns `false` without side effects when
    /// the account has no profile.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Repository` if the store fails.
    #[instrument(skip(self, update), fields(account_id = %update.id))]
    pub async fn update_user(
        &self,
        update: &AccountUpdate,
        new_role_id: Option<RoleId>,
    ) -> Result<bool, AdminError> {
        let Some(mut profile) = self.accounts.get_profile(update.id).await? else {
            return Ok(false);
        };

        let current = self
            .roles
            .assignments_for(update.id)
            .await?
            .first()
            .map(|a| a.role_id);
        let next = match new_role_id {
            Some(role_id) => self.roles.find_role(role_id).await?,
            None => None,
        };
        if next.is_none() {
            warn!("New role does not resolve; account is left without a role");
        }

        if current.is_some() || next.is_some() {
            self.identity
                .replace_role(update.id, current, next.map(|role| role.id))
                .await?;
        }

        profile.first_name.clone_from(&update.first_name);
        profile.last_name.clone_from(&update.last_name);
        self.accounts.update_profile(&profile).await?;

        info!(role = ?next.map(|role| role.name), "User updated");
        Ok(true)
    }

    /// Validate an update form and apply it.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` if the form is invalid.
    /// Returns `AdminError::Repository` if the store fails.
    pub async fn update_user_from_form(
        &self,
        id: AccountId,
        form: &UpdateUserForm,
    ) -> Result<bool, AdminError> {
        form.validate()?;
        let update = AccountUpdate {
            id,
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
        };
        let new_role_id = form
            .role_id
            .as_deref()
            .and_then(|raw| raw.parse::<RoleId>().ok());
        self.update_user(&update, new_role_id).await
    }

    /// Remove an account's profile. The identity record and role
    /// assignments are kept.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Repository` if the store fails.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: AccountId) -> Result<bool, AdminError> {
        let deleted = self.accounts.delete_profile(id).await?;
        if deleted {
            info!("User profile deleted");
        }
        Ok(deleted)
    }

    /// Roles offered when creating an account. `SuperAdmin` is never offered.
    #[must_use]
    pub fn list_role_options() -> Vec<RoleOption> {
        RoleName::ASSIGNABLE
            .iter()
            .map(|role| RoleOption {
                value: role.to_string(),
                text: role.to_string(),
            })
            .collect()
    }
}
