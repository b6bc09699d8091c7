//! Process-local store for tests and local development.
//!
//! All tables sit behind one `RwLock`, so multi-row operations such as
//! [`RoleStore::replace_assignment`] are atomic. Rows keep insertion order.

use async_trait::async_trait;
use tokio::sync::RwLock;

use product_catalog_core::{AccountId, ProductId, RoleId, RoleName};

use super::{AccountStore, ProductStore, RepositoryError, RoleStore};
use crate::models::{
    Account, AccountProfile, IdentityAccount, LockoutState, Product, Role, RoleAssignment,
};

#[derive(Default)]
struct Tables {
    identities: Vec<IdentityAccount>,
    profiles: Vec<AccountProfile>,
    roles: Vec<Role>,
    assignments: Vec<RoleAssignment>,
    products: Vec<Product>,
}

/// In-memory implementation of every store trait.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn create_account(
        &self,
        identity: &IdentityAccount,
        profile: &AccountProfile,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables
            .identities
            .iter()
            .any(|existing| existing.normalized_email == identity.normalized_email)
        {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        tables.identities.push(identity.clone());
        tables.profiles.push(profile.clone());
        Ok(())
    }

    async fn find_by_normalized_email(
        &self,
        normalized_email: &str,
    ) -> Result<Option<IdentityAccount>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .identities
            .iter()
            .find(|identity| identity.normalized_email == normalized_email)
            .cloned())
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<IdentityAccount>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.identities.iter().find(|i| i.id == id).cloned())
    }

    async fn update_lockout(
        &self,
        id: AccountId,
        state: LockoutState,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let identity = tables
            .identities
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(RepositoryError::NotFound)?;
        identity.access_failed_count = state.access_failed_count;
        identity.lockout_end = state.lockout_end;
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .iter()
            .filter_map(|profile| {
                tables
                    .identities
                    .iter()
                    .find(|i| i.id == profile.account_id)
                    .map(|identity| Account::from_parts(identity, profile))
            })
            .collect())
    }

    async fn get_profile(&self, id: AccountId) -> Result<Option<AccountProfile>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.iter().find(|p| p.account_id == id).cloned())
    }

    async fn update_profile(&self, profile: &AccountProfile) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        match tables
            .profiles
            .iter_mut()
            .find(|p| p.account_id == profile.account_id)
        {
            Some(existing) => {
                existing.clone_from(profile);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_profile(&self, id: AccountId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        let before = tables.profiles.len();
        tables.profiles.retain(|p| p.account_id != id);
        Ok(tables.profiles.len() < before)
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn list_roles(&self) -> Result<Vec<Role>, RepositoryError> {
        Ok(self.tables.read().await.roles.clone())
    }

    async fn find_role(&self, id: RoleId) -> Result<Option<Role>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.roles.iter().find(|r| r.id == id).copied())
    }

    async fn find_role_by_name(&self, name: RoleName) -> Result<Option<Role>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.roles.iter().find(|r| r.name == name).copied())
    }

    async fn ensure_role(&self, name: RoleName) -> Result<(Role, bool), RepositoryError> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.roles.iter().find(|r| r.name == name) {
            return Ok((*existing, false));
        }
        let role = Role {
            id: RoleId::generate(),
            name,
        };
        tables.roles.push(role);
        Ok((role, true))
    }

    async fn list_assignments(&self) -> Result<Vec<RoleAssignment>, RepositoryError> {
        Ok(self.tables.read().await.assignments.clone())
    }

    async fn assignments_for(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<RoleAssignment>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .assignments
            .iter()
            .filter(|a| a.account_id == account_id)
            .copied()
            .collect())
    }

    async fn add_assignment(&self, assignment: RoleAssignment) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(insert_assignment(&mut tables.assignments, assignment))
    }

    async fn remove_assignment(
        &self,
        assignment: RoleAssignment,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(delete_assignment(&mut tables.assignments, assignment))
    }

    async fn replace_assignment(
        &self,
        account_id: AccountId,
        from: Option<RoleId>,
        to: Option<RoleId>,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        if let Some(role_id) = from {
            delete_assignment(&mut tables.assignments, RoleAssignment { account_id, role_id });
        }
        if let Some(role_id) = to {
            insert_assignment(&mut tables.assignments, RoleAssignment { account_id, role_id });
        }
        Ok(())
    }
}

fn insert_assignment(assignments: &mut Vec<RoleAssignment>, assignment: RoleAssignment) -> bool {
    if assignments.contains(&assignment) {
        return false;
    }
    assignments.push(assignment);
    true
}

fn delete_assignment(assignments: &mut Vec<RoleAssignment>, assignment: RoleAssignment) -> bool {
    let before = assignments.len();
    assignments.retain(|a| *a != assignment);
    assignments.len() < before
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.tables.read().await.products.clone())
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.products.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.products.iter().any(|p| p.id == product.id) {
            return Err(RepositoryError::Conflict("product id already exists".to_owned()));
        }
        tables.products.push(product.clone());
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        match tables.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => {
                existing.clone_from(product);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        Ok(tables.products.len() < before)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use product_catalog_core::{Email, Price};

    use super::*;

    fn identity(email: &str) -> (IdentityAccount, AccountProfile) {
        let email = Email::parse(email).unwrap();
        let id = AccountId::generate();
        (
            IdentityAccount {
                id,
                normalized_email: email.normalized(),
                username: email.as_str().to_owned(),
                email,
                password_hash: String::new(),
                access_failed_count: 0,
                lockout_end: None,
                lockout_enabled: true,
                created_at: Utc::now(),
            },
            AccountProfile {
                account_id: id,
                first_name: "First".to_owned(),
                last_name: "Last".to_owned(),
            },
        )
    }

    #[tokio::test]
    async fn test_create_account_rejects_duplicate_normalized_email() {
        let store = MemoryStore::new();
        let (first, first_profile) = identity("dup@example.com");
        let (second, second_profile) = identity("DUP@example.com");

        store.create_account(&first, &first_profile).await.unwrap();
        let err = store
            .create_account(&second, &second_profile)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.list_accounts().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_profile_keeps_identity() {
        let store = MemoryStore::new();
        let (account, profile) = identity("keep@example.com");
        store.create_account(&account, &profile).await.unwrap();

        assert!(store.delete_profile(account.id).await.unwrap());
        assert!(!store.delete_profile(account.id).await.unwrap());
        assert!(store.find_by_id(account.id).await.unwrap().is_some());
        assert!(store.list_accounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_role_is_idempotent() {
        let store = MemoryStore::new();
        let (first, created) = store.ensure_role(RoleName::Admin).await.unwrap();
        assert!(created);
        let (second, created) = store.ensure_role(RoleName::Admin).await.unwrap();
        assert!(!created);
        assert_eq!(first, second);
        assert_eq!(store.list_roles().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_replace_assignment_swaps_role() {
        let store = MemoryStore::new();
        let (admin, _) = store.ensure_role(RoleName::Admin).await.unwrap();
        let (user, _) = store.ensure_role(RoleName::User).await.unwrap();
        let account_id = AccountId::generate();

        store
            .add_assignment(RoleAssignment {
                account_id,
                role_id: admin.id,
            })
            .await
            .unwrap();
        store
            .replace_assignment(account_id, Some(admin.id), Some(user.id))
            .await
            .unwrap();

        let held = store.assignments_for(account_id).await.unwrap();
        assert_eq!(
            held,
            vec![RoleAssignment {
                account_id,
                role_id: user.id
            }]
        );
    }

    #[tokio::test]
    async fn test_update_missing_product_reports_false() {
        let store = MemoryStore::new();
        let product = Product {
            id: ProductId::generate(),
            name: "Lamp".to_owned(),
            description: "Desk lamp".to_owned(),
            category: "Home".to_owned(),
            price: Price::ZERO,
        };
        assert!(!store.update_product(&product).await.unwrap());
        store.insert_product(&product).await.unwrap();
        assert!(store.update_product(&product).await.unwrap());
    }
}
