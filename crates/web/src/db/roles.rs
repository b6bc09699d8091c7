//! Role and role-assignment repository for `PostgreSQL`.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use product_catalog_core::{AccountId, RoleId, RoleName};

use super::{RepositoryError, RoleStore};
use crate::models::{Role, RoleAssignment};

/// Repository for role database operations.
#[derive(Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Create a new role repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RoleRow {
    id: Uuid,
    name: String,
}

impl TryFrom<RoleRow> for Role {
    type Error = RepositoryError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        let name = row
            .name
            .parse::<RoleName>()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
        Ok(Self {
            id: RoleId::new(row.id),
            name,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AssignmentRow {
    account_id: Uuid,
    role_id: Uuid,
}

impl From<AssignmentRow> for RoleAssignment {
    fn from(row: AssignmentRow) -> Self {
        Self {
            account_id: AccountId::new(row.account_id),
            role_id: RoleId::new(row.role_id),
        }
    }
}

#[async_trait]
impl RoleStore for RoleRepository {
    async fn list_roles(&self) -> Result<Vec<Role>, RepositoryError> {
        sqlx::query_as::<_, RoleRow>("SELECT id, name FROM catalog.role ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Role::try_from)
            .collect()
    }

    async fn find_role(&self, id: RoleId) -> Result<Option<Role>, RepositoryError> {
        sqlx::query_as::<_, RoleRow>("SELECT id, name FROM catalog.role WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Role::try_from)
            .transpose()
    }

    async fn find_role_by_name(&self, name: RoleName) -> Result<Option<Role>, RepositoryError> {
        sqlx::query_as::<_, RoleRow>("SELECT id, name FROM catalog.role WHERE name = $1")
            .bind(name.as_str())
            .fetch_optional(&self.pool)
            .await?
            .map(Role::try_from)
            .transpose()
    }

    async fn ensure_role(&self, name: RoleName) -> Result<(Role, bool), RepositoryError> {
        let inserted = sqlx::query_as::<_, RoleRow>(
            r"
            INSERT INTO catalog.role (id, name)
            VALUES ($1, $2)
            ON CONFLICT (name) DO NOTHING
            RETURNING id, name
            ",
        )
        .bind(RoleId::generate())
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok((Role::try_from(row)?, true));
        }

        let existing = self
            .find_role_by_name(name)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        Ok((existing, false))
    }

    async fn list_assignments(&self) -> Result<Vec<RoleAssignment>, RepositoryError> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            "SELECT account_id, role_id FROM catalog.account_role ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RoleAssignment::from).collect())
    }

    async fn assignments_for(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<RoleAssignment>, RepositoryError> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            r"
            SELECT account_id, role_id
            FROM catalog.account_role
            WHERE account_id = $1
            ORDER BY created_at
            ",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RoleAssignment::from).collect())
    }

    async fn add_assignment(&self, assignment: RoleAssignment) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO catalog.account_role (account_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(assignment.account_id)
        .bind(assignment.role_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_assignment(
        &self,
        assignment: RoleAssignment,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM catalog.account_role WHERE account_id = $1 AND role_id = $2")
                .bind(assignment.account_id)
                .bind(assignment.role_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn replace_assignment(
        &self,
        account_id: AccountId,
        from: Option<RoleId>,
        to: Option<RoleId>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if let Some(role_id) = from {
            sqlx::query(
                "DELETE FROM catalog.account_role WHERE account_id = $1 AND role_id = $2",
            )
            .bind(account_id)
            .bind(role_id)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(role_id) = to {
            sqlx::query(
                r"
                INSERT INTO catalog.account_role (account_id, role_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                ",
            )
            .bind(account_id)
            .bind(role_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
