//! Identity management.
//!
//! Owns account creation, password verification, lockout tracking, session
//! issuance and role assignment. Workflows never touch password hashes or
//! lockout counters directly; they go through [`IdentityManager`].

mod error;
mod lockout;
mod password;

pub use error::{IdentityError, IdentityIssue, IssueCode};
pub use lockout::LockoutPolicy;
pub use password::{PasswordPolicy, hash_password, verify_password, verify_without_account};

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tower_sessions::{Expiry, Session};
use tracing::{info, instrument, warn};

use product_catalog_core::{AccountId, Email, RoleId, RoleName, SignInStatus};

use crate::db::{AccountStore, RepositoryError, RoleStore, Stores};
use crate::models::{
    Account, AccountProfile, CurrentUser, IdentityAccount, LockoutState, NewAccount, Role,
    RoleAssignment, session_keys,
};

/// Source of the current time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Tunable identity rules.
#[derive(Debug, Clone, Copy)]
pub struct IdentitySettings {
    pub password: PasswordPolicy,
    pub lockout: LockoutPolicy,
    /// Inactivity expiry for persistent ("remember me") sessions.
    pub remember_me: Duration,
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            password: PasswordPolicy::default(),
            lockout: LockoutPolicy::default(),
            remember_me: Duration::days(14),
        }
    }
}

/// Result of a password check.
#[derive(Debug, Clone)]
pub struct SignInOutcome {
    pub status: SignInStatus,
    /// The matched account; only set on success.
    pub account: Option<IdentityAccount>,
}

impl SignInOutcome {
    const fn failed() -> Self {
        Self {
            status: SignInStatus::Failed,
            account: None,
        }
    }

    const fn locked_out() -> Self {
        Self {
            status: SignInStatus::LockedOut,
            account: None,
        }
    }
}

/// Identity manager over the account and role stores.
#[derive(Clone)]
pub struct IdentityManager {
    accounts: Arc<dyn AccountStore>,
    roles: Arc<dyn RoleStore>,
    settings: IdentitySettings,
    clock: Clock,
}

impl std::fmt::Debug for IdentityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityManager")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl IdentityManager {
    /// Create an identity manager using the system clock.
    #[must_use]
    pub fn new(stores: &Stores, settings: IdentitySettings) -> Self {
        Self {
            accounts: Arc::clone(&stores.accounts),
            roles: Arc::clone(&stores.roles),
            settings,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the clock used for lockout decisions.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// The active identity rules.
    #[must_use]
    pub const fn settings(&self) -> &IdentitySettings {
        &self.settings
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Create an account with a password.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Rejected` if the password fails the policy or
    /// the email is already taken.
    /// Returns `IdentityError::Repository` if the store fails.
    #[instrument(skip(self, new, password), fields(email = %new.email))]
    pub async fn create_account(
        &self,
        new: &NewAccount,
        password: &str,
    ) -> Result<Account, IdentityError> {
        let normalized_email = new.email.normalized();
        let username = new.email.as_str().to_owned();

        let mut issues = Vec::new();
        if self
            .accounts
            .find_by_normalized_email(&normalized_email)
            .await?
            .is_some()
        {
            issues.push(IdentityIssue::duplicate_user_name(&username));
        }
        issues.extend(self.settings.password.validate(password));
        if !issues.is_empty() {
            return Err(IdentityError::Rejected(issues));
        }

        let identity = IdentityAccount {
            id: AccountId::generate(),
            email: new.email.clone(),
            normalized_email,
            username,
            password_hash: hash_password(password)?,
            access_failed_count: 0,
            lockout_end: None,
            lockout_enabled: true,
            created_at: self.now(),
        };
        let profile = AccountProfile {
            account_id: identity.id,
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
        };

        match self.accounts.create_account(&identity, &profile).await {
            Ok(()) => {}
            Err(RepositoryError::Conflict(_)) => {
                return Err(IdentityError::Rejected(vec![
                    IdentityIssue::duplicate_user_name(&identity.username),
                ]));
            }
            Err(e) => return Err(e.into()),
        }

        info!(account_id = %identity.id, "Account created");
        Ok(Account::from_parts(&identity, &profile))
    }

    /// Look up an account by email, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Repository` if the store fails.
    pub async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<IdentityAccount>, IdentityError> {
        Ok(self
            .accounts
            .find_by_normalized_email(&email.normalized())
            .await?)
    }

    /// Look up an account by id.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Repository` if the store fails.
    pub async fn find_by_id(&self, id: AccountId) -> Result<Option<IdentityAccount>, IdentityError> {
        Ok(self.accounts.find_by_id(id).await?)
    }

    /// Resolve a session principal to its identity record.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Repository` if the store fails.
    pub async fn current_account(
        &self,
        principal: &CurrentUser,
    ) -> Result<Option<IdentityAccount>, IdentityError> {
        self.find_by_id(principal.id).await
    }

    // =========================================================================
    // Sign-in
    // =========================================================================

    /// Check a password, updating the failed-attempt counters.
    ///
    /// A locked account reports `LockedOut` without checking the password.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Repository` if the store fails.
    #[instrument(skip(self, password))]
    pub async fn check_password(
        &self,
        email: &Email,
        password: &str,
        lockout_on_failure: bool,
    ) -> Result<SignInOutcome, IdentityError> {
        let Some(account) = self.find_by_email(email).await? else {
            verify_without_account(password);
            return Ok(SignInOutcome::failed());
        };

        let now = self.now();
        if account.is_locked_out(now) {
            warn!(account_id = %account.id, "Sign-in attempt on locked account");
            return Ok(SignInOutcome::locked_out());
        }

        if verify_password(password, &account.password_hash) {
            if account.lockout_state() != LockoutState::CLEARED {
                self.accounts
                    .update_lockout(account.id, LockoutState::CLEARED)
                    .await?;
            }
            return Ok(SignInOutcome {
                status: SignInStatus::Succeeded,
                account: Some(account),
            });
        }

        if lockout_on_failure && account.lockout_enabled {
            let state = self.settings.lockout.register_failure(&account, now);
            self.accounts.update_lockout(account.id, state).await?;
            if state.lockout_end.is_some_and(|end| end > now) {
                warn!(account_id = %account.id, "Account locked out");
                return Ok(SignInOutcome::locked_out());
            }
        }

        Ok(SignInOutcome::failed())
    }

    /// Check a password and, on success, sign the account in.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Repository` if the store fails.
    /// Returns `IdentityError::Session` if the session cannot be written.
    pub async fn password_sign_in(
        &self,
        session: &Session,
        email: &Email,
        password: &str,
        persistent: bool,
        lockout_on_failure: bool,
    ) -> Result<SignInStatus, IdentityError> {
        let outcome = self
            .check_password(email, password, lockout_on_failure)
            .await?;
        if let Some(account) = &outcome.account {
            self.sign_in(session, account.id, &account.email, persistent)
                .await?;
        }
        Ok(outcome.status)
    }

    /// Establish an authenticated session.
    ///
    /// The session id is cycled and the principal stored with a snapshot of
    /// the account's roles.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Session` if the session cannot be written.
    /// Returns `IdentityError::Repository` if roles cannot be read.
    pub async fn sign_in(
        &self,
        session: &Session,
        account_id: AccountId,
        email: &Email,
        persistent: bool,
    ) -> Result<CurrentUser, IdentityError> {
        let principal = CurrentUser {
            id: account_id,
            email: email.clone(),
            roles: self.roles_for(account_id).await?,
        };

        session.cycle_id().await?;
        session.set_expiry(Some(if persistent {
            Expiry::OnInactivity(tower_sessions::cookie::time::Duration::seconds(
                self.settings.remember_me.num_seconds(),
            ))
        } else {
            Expiry::OnSessionEnd
        }));
        session
            .insert(session_keys::CURRENT_USER, &principal)
            .await?;

        info!(account_id = %account_id, persistent, "Signed in");
        Ok(principal)
    }

    /// End the session.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Session` if the session cannot be flushed.
    pub async fn sign_out(&self, session: &Session) -> Result<(), IdentityError> {
        session.flush().await?;
        Ok(())
    }

    // =========================================================================
    // Roles
    // =========================================================================

    async fn role(&self, name: RoleName) -> Result<Role, IdentityError> {
        self.roles
            .find_role_by_name(name)
            .await?
            .ok_or(IdentityError::MissingRole(name))
    }

    /// Assign a role.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::MissingRole` if the role has not been seeded.
    /// Returns `IdentityError::Repository` if the store fails.
    pub async fn add_to_role(
        &self,
        account_id: AccountId,
        name: RoleName,
    ) -> Result<(), IdentityError> {
        let role = self.role(name).await?;
        self.roles
            .add_assignment(RoleAssignment {
                account_id,
                role_id: role.id,
            })
            .await?;
        Ok(())
    }

    /// Assign several roles.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::MissingRole` if a role has not been seeded.
    /// Returns `IdentityError::Repository` if the store fails.
    pub async fn add_to_roles(
        &self,
        account_id: AccountId,
        names: &[RoleName],
    ) -> Result<(), IdentityError> {
        for name in names {
            self.add_to_role(account_id, *name).await?;
        }
        Ok(())
    }

    /// Remove a role. Returns `false` if it was not held.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::MissingRole` if the role has not been seeded.
    /// Returns `IdentityError::Repository` if the store fails.
    pub async fn remove_from_role(
        &self,
        account_id: AccountId,
        name: RoleName,
    ) -> Result<bool, IdentityError> {
        let role = self.role(name).await?;
        Ok(self
            .roles
            .remove_assignment(RoleAssignment {
                account_id,
                role_id: role.id,
            })
            .await?)
    }

    /// Swap one role for another in a single store transaction.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Repository` if the store fails.
    pub async fn replace_role(
        &self,
        account_id: AccountId,
        from: Option<RoleId>,
        to: Option<RoleId>,
    ) -> Result<(), IdentityError> {
        self.roles.replace_assignment(account_id, from, to).await?;
        Ok(())
    }

    /// Names of the roles an account holds. Assignments to unknown roles are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Repository` if the store fails.
    pub async fn roles_for(&self, account_id: AccountId) -> Result<Vec<RoleName>, IdentityError> {
        let roles = self.roles.list_roles().await?;
        let held = self.roles.assignments_for(account_id).await?;
        Ok(held
            .iter()
            .filter_map(|a| roles.iter().find(|r| r.id == a.role_id).map(|r| r.name))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicI64, Ordering};

    use tower_sessions::MemoryStore as SessionMemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(SessionMemoryStore::default()), None)
    }

    async fn seeded() -> (Stores, IdentityManager) {
        let stores = Stores::memory();
        for name in RoleName::ALL {
            stores.roles.ensure_role(name).await.unwrap();
        }
        let identity = IdentityManager::new(&stores, IdentitySettings::default());
        (stores, identity)
    }

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            email: Email::parse(email).unwrap(),
            first_name: "Grace".to_owned(),
            last_name: "Hopper".to_owned(),
        }
    }

    /// Clock advanced manually, in seconds past a fixed origin.
    fn manual_clock() -> (Arc<AtomicI64>, Clock) {
        let offset = Arc::new(AtomicI64::new(0));
        let origin = Utc::now();
        let handle = Arc::clone(&offset);
        let clock: Clock =
            Arc::new(move || origin + Duration::seconds(handle.load(Ordering::SeqCst)));
        (offset, clock)
    }

    #[tokio::test]
    async fn test_create_account_rejects_weak_password() {
        let (_, identity) = seeded().await;
        let err = identity
            .create_account(&new_account("weak@example.com"), "password")
            .await
            .unwrap_err();
        let issues = err.issues().unwrap();
        assert!(issues.iter().all(|i| i.code.is_password_complexity()));
        assert!(identity
            .find_by_email(&Email::parse("weak@example.com").unwrap())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_create_account_rejects_duplicate_ignoring_case() {
        let (_, identity) = seeded().await;
        identity
            .create_account(&new_account("grace@example.com"), "Passw0rd!")
            .await
            .unwrap();
        let err = identity
            .create_account(&new_account("GRACE@example.com"), "Passw0rd!")
            .await
            .unwrap_err();
        assert_eq!(
            err.issues().unwrap()[0].code,
            IssueCode::DuplicateUserName
        );
    }

    #[tokio::test]
    async fn test_check_password_success_and_failure() {
        let (_, identity) = seeded().await;
        identity
            .create_account(&new_account("grace@example.com"), "Passw0rd!")
            .await
            .unwrap();
        let email = Email::parse("grace@example.com").unwrap();

        let ok = identity.check_password(&email, "Passw0rd!", true).await.unwrap();
        assert_eq!(ok.status, SignInStatus::Succeeded);
        assert!(ok.account.is_some());

        let bad = identity.check_password(&email, "nope", true).await.unwrap();
        assert_eq!(bad.status, SignInStatus::Failed);

        let unknown = Email::parse("nobody@example.com").unwrap();
        let missing = identity.check_password(&unknown, "Passw0rd!", true).await.unwrap();
        assert_eq!(missing.status, SignInStatus::Failed);
    }

    #[tokio::test]
    async fn test_unknown_email_still_runs_argon2() {
        let (_, identity) = seeded().await;
        let unknown = Email::parse("ghost@example.com").unwrap();

        let outcome = identity.check_password(&unknown, "Passw0rd!", true).await.unwrap();
        assert_eq!(outcome.status, SignInStatus::Failed);
        assert!(outcome.account.is_none());

        let hash = super::password::DUMMY_HASH.get().unwrap().as_deref().unwrap();
        assert!(hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_lockout_after_ten_failures_then_expires() {
        let (offset, clock) = manual_clock();
        let (_, identity) = seeded().await;
        let identity = identity.with_clock(clock);
        identity
            .create_account(&new_account("lock@example.com"), "Passw0rd!")
            .await
            .unwrap();
        let email = Email::parse("lock@example.com").unwrap();

        for _ in 0..9 {
            let outcome = identity.check_password(&email, "wrong", true).await.unwrap();
            assert_eq!(outcome.status, SignInStatus::Failed);
        }
        let tenth = identity.check_password(&email, "wrong", true).await.unwrap();
        assert_eq!(tenth.status, SignInStatus::LockedOut);

        // Correct password is refused while locked.
        let locked = identity.check_password(&email, "Passw0rd!", true).await.unwrap();
        assert_eq!(locked.status, SignInStatus::LockedOut);

        offset.store(5 * 60 + 1, Ordering::SeqCst);
        let after = identity.check_password(&email, "Passw0rd!", true).await.unwrap();
        assert_eq!(after.status, SignInStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_success_resets_failed_count() {
        let (stores, identity) = seeded().await;
        let account = identity
            .create_account(&new_account("reset@example.com"), "Passw0rd!")
            .await
            .unwrap();
        let email = Email::parse("reset@example.com").unwrap();

        for _ in 0..3 {
            identity.check_password(&email, "wrong", true).await.unwrap();
        }
        let stored = stores.accounts.find_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(stored.access_failed_count, 3);

        identity.check_password(&email, "Passw0rd!", true).await.unwrap();
        let stored = stores.accounts.find_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(stored.access_failed_count, 0);
    }

    #[tokio::test]
    async fn test_failures_without_lockout_do_not_count() {
        let (stores, identity) = seeded().await;
        let account = identity
            .create_account(&new_account("free@example.com"), "Passw0rd!")
            .await
            .unwrap();
        let email = Email::parse("free@example.com").unwrap();

        for _ in 0..12 {
            let outcome = identity.check_password(&email, "wrong", false).await.unwrap();
            assert_eq!(outcome.status, SignInStatus::Failed);
        }
        let stored = stores.accounts.find_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(stored.access_failed_count, 0);
    }

    #[tokio::test]
    async fn test_sign_in_stores_principal_with_roles() {
        let (_, identity) = seeded().await;
        let account = identity
            .create_account(&new_account("roles@example.com"), "Passw0rd!")
            .await
            .unwrap();
        identity
            .add_to_roles(account.id, &[RoleName::Admin, RoleName::User])
            .await
            .unwrap();

        let session = session();
        identity
            .sign_in(&session, account.id, &account.email, false)
            .await
            .unwrap();

        let principal: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(principal.id, account.id);
        assert!(principal.has_role(RoleName::Admin));
        assert!(principal.has_role(RoleName::User));
        assert!(!principal.has_role(RoleName::SuperAdmin));

        identity.sign_out(&session).await.unwrap();
        let cleared: Option<CurrentUser> = session.get(session_keys::CURRENT_USER).await.unwrap();
        assert!(cleared.is_none());
    }

    #[tokio::test]
    async fn test_add_and_remove_role() {
        let (_, identity) = seeded().await;
        let account = identity
            .create_account(&new_account("swap@example.com"), "Passw0rd!")
            .await
            .unwrap();

        identity.add_to_role(account.id, RoleName::User).await.unwrap();
        assert_eq!(identity.roles_for(account.id).await.unwrap(), vec![RoleName::User]);

        assert!(identity.remove_from_role(account.id, RoleName::User).await.unwrap());
        assert!(!identity.remove_from_role(account.id, RoleName::User).await.unwrap());
        assert!(identity.roles_for(account.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_to_unseeded_role_fails() {
        let stores = Stores::memory();
        let identity = IdentityManager::new(&stores, IdentitySettings::default());
        let err = identity
            .add_to_role(AccountId::generate(), RoleName::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::MissingRole(RoleName::Admin)));
    }
}
