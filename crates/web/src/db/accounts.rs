//! Account repository for `PostgreSQL`.
//!
//! Identity records live in `catalog.account`; the application-owned profile
//! lives in `catalog.account_profile`, keyed by the same id.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use product_catalog_core::{AccountId, Email};

use super::{AccountStore, RepositoryError, conflict_or_database};
use crate::models::{Account, AccountProfile, IdentityAccount, LockoutState};

/// Repository for account database operations.
#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: Uuid,
    email: String,
    normalized_email: String,
    username: String,
    password_hash: String,
    access_failed_count: i32,
    lockout_end: Option<DateTime<Utc>>,
    lockout_enabled: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<IdentityRow> for IdentityAccount {
    type Error = RepositoryError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        let email = parse_email(&row.email)?;
        Ok(Self {
            id: AccountId::new(row.id),
            email,
            normalized_email: row.normalized_email,
            username: row.username,
            password_hash: row.password_hash,
            access_failed_count: row.access_failed_count,
            lockout_end: row.lockout_end,
            lockout_enabled: row.lockout_enabled,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    username: String,
    first_name: String,
    last_name: String,
}

impl TryFrom<AccountRow> for Account {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AccountId::new(row.id),
            email: parse_email(&row.email)?,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    account_id: Uuid,
    first_name: String,
    last_name: String,
}

impl From<ProfileRow> for AccountProfile {
    fn from(row: ProfileRow) -> Self {
        Self {
            account_id: AccountId::new(row.account_id),
            first_name: row.first_name,
            last_name: row.last_name,
        }
    }
}

fn parse_email(raw: &str) -> Result<Email, RepositoryError> {
    Email::parse(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid email in database: {e}")))
}

const IDENTITY_COLUMNS: &str = "id, email, normalized_email, username, password_hash, \
     access_failed_count, lockout_end, lockout_enabled, created_at";

#[async_trait]
impl AccountStore for AccountRepository {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_account(
        &self,
        identity: &IdentityAccount,
        profile: &AccountProfile,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO catalog.account
                (id, email, normalized_email, username, password_hash,
                 access_failed_count, lockout_end, lockout_enabled, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(identity.id)
        .bind(identity.email.as_str())
        .bind(&identity.normalized_email)
        .bind(&identity.username)
        .bind(&identity.password_hash)
        .bind(identity.access_failed_count)
        .bind(identity.lockout_end)
        .bind(identity.lockout_enabled)
        .bind(identity.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_or_database(e, "email"))?;

        sqlx::query(
            r"
            INSERT INTO catalog.account_profile (account_id, first_name, last_name)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(profile.account_id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_normalized_email(
        &self,
        normalized_email: &str,
    ) -> Result<Option<IdentityAccount>, RepositoryError> {
        let query =
            format!("SELECT {IDENTITY_COLUMNS} FROM catalog.account WHERE normalized_email = $1");
        sqlx::query_as::<_, IdentityRow>(&query)
            .bind(normalized_email)
            .fetch_optional(&self.pool)
            .await?
            .map(IdentityAccount::try_from)
            .transpose()
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<IdentityAccount>, RepositoryError> {
        let query = format!("SELECT {IDENTITY_COLUMNS} FROM catalog.account WHERE id = $1");
        sqlx::query_as::<_, IdentityRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(IdentityAccount::try_from)
            .transpose()
    }

    async fn update_lockout(
        &self,
        id: AccountId,
        state: LockoutState,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE catalog.account
            SET access_failed_count = $2, lockout_end = $3
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(state.access_failed_count)
        .bind(state.lockout_end)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, RepositoryError> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r"
            SELECT a.id, a.email, a.username, p.first_name, p.last_name
            FROM catalog.account_profile p
            JOIN catalog.account a ON a.id = p.account_id
            ORDER BY p.created_at, a.id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Account::try_from).collect()
    }

    async fn get_profile(&self, id: AccountId) -> Result<Option<AccountProfile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            SELECT account_id, first_name, last_name
            FROM catalog.account_profile
            WHERE account_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AccountProfile::from))
    }

    async fn update_profile(&self, profile: &AccountProfile) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE catalog.account_profile
            SET first_name = $2, last_name = $3, updated_at = NOW()
            WHERE account_id = $1
            ",
        )
        .bind(profile.account_id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_profile(&self, id: AccountId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM catalog.account_profile WHERE account_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
