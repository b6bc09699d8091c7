//! Product catalog model.

use serde::{Deserialize, Serialize};

use product_catalog_core::{Price, ProductId};

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Price,
}

impl Product {
    /// The empty product returned for unknown ids: nil id, blank fields, zero price.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            id: ProductId::nil(),
            name: String::new(),
            description: String::new(),
            category: String::new(),
            price: Price::ZERO,
        }
    }

    /// Whether this is the empty sentinel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_nil()
    }
}
