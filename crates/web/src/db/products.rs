//! Product repository for `PostgreSQL`.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use product_catalog_core::{Price, ProductId};

use super::{ProductStore, RepositoryError};
use crate::models::Product;

/// Repository for product database operations.
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    category: String,
    price: Price,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            category: row.category,
            price: row.price,
        }
    }
}

#[async_trait]
impl ProductStore for ProductRepository {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, category, price
            FROM catalog.product
            ORDER BY created_at, id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, category, price
            FROM catalog.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO catalog.product (id, name, description, category, price)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.price)
        .execute(&self.pool)
        .await
        .map_err(|e| super::conflict_or_database(e, "product id"))?;

        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE catalog.product
            SET name = $2, description = $3, category = $4, price = $5, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.price)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM catalog.product WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
