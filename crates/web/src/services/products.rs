//! Product catalog service.

use thiserror::Error;
use tracing::{info, instrument};
use validator::Validate;

use product_catalog_core::ProductId;

use crate::db::{ProductStore, RepositoryError, Stores};
use crate::models::{Product, ProductForm};

/// Errors that can occur during product operations.
#[derive(Debug, Error)]
pub enum ProductError {
    /// The submitted form failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Product not found.
    #[error("product not found")]
    NotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Product catalog service.
pub struct ProductService<'a> {
    products: &'a dyn ProductStore,
}

impl<'a> ProductService<'a> {
    /// Create a new product service.
    #[must_use]
    pub fn new(stores: &'a Stores) -> Self {
        Self {
            products: stores.products.as_ref(),
        }
    }

    /// Every product.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Repository` if the store fails.
    pub async fn list(&self) -> Result<Vec<Product>, ProductError> {
        Ok(self.products.list_products().await?)
    }

    /// A product, or the empty product when the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Repository` if the store fails.
    pub async fn get(&self, id: ProductId) -> Result<Product, ProductError> {
        Ok(self
            .products
            .find_product(id)
            .await?
            .unwrap_or_else(Product::empty))
    }

    /// A product that must exist.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::NotFound` if the id is unknown.
    /// Returns `ProductError::Repository` if the store fails.
    pub async fn details(&self, id: ProductId) -> Result<Product, ProductError> {
        self.products
            .find_product(id)
            .await?
            .ok_or(ProductError::NotFound)
    }

    /// Create a product with a fresh id. Any id in the form is ignored.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Validation` if the form is invalid.
    /// Returns `ProductError::Repository` if the store fails.
    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn create(&self, form: &ProductForm) -> Result<Product, ProductError> {
        form.validate()?;
        let product = Product {
            id: ProductId::generate(),
            name: form.name.clone(),
            description: form.description.clone(),
            category: form.category.clone(),
            price: form.price,
        };
        self.products.insert_product(&product).await?;
        info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Overwrite a product. Last writer wins.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Validation` if the form is invalid.
    /// Returns `ProductError::NotFound` if the product no longer exists.
    /// Returns `ProductError::Repository` if the store fails.
    #[instrument(skip(self, form))]
    pub async fn update(&self, id: ProductId, form: &ProductForm) -> Result<Product, ProductError> {
        form.validate()?;
        let product = Product {
            id,
            name: form.name.clone(),
            description: form.description.clone(),
            category: form.category.clone(),
            price: form.price,
        };
        if !self.products.update_product(&product).await? {
            return Err(ProductError::NotFound);
        }
        info!("Product updated");
        Ok(product)
    }

    /// Delete a product. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Repository` if the store fails.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: ProductId) -> Result<(), ProductError> {
        if self.products.delete_product(id).await? {
            info!("Product deleted");
        }
        Ok(())
    }
}
