//! Product catalog.

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use flatshop_core::{Price, Product, ProductId};

use crate::store::{Document, StoreError, Table};

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The submitted product fails validation.
    #[error("{0}")]
    InvalidProduct(String),

    /// Document store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Fields of a product to add. The id is assigned by the catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub image: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

/// Catalog operations over the `products` document.
pub struct CatalogService<'a> {
    products: &'a Table<Product>,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(products: &'a Table<Product>) -> Self {
        Self { products }
    }

    /// Add a product, assigning it the next sequential id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidProduct` for an empty name or negative
    /// price. Returns `StoreError::DataCorruption` if the assigned id is
    /// already taken.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub async fn add_product(&self, new: NewProduct) -> Result<Product, CatalogError> {
        if new.name.trim().is_empty() {
            return Err(CatalogError::InvalidProduct(
                "Product name cannot be empty".to_string(),
            ));
        }
        let price =
            Price::new(new.price).map_err(|e| CatalogError::InvalidProduct(e.to_string()))?;

        let mut tx = self.products.begin().await?;
        let product_id = ProductId::for_catalog_size(tx.len()).ok_or_else(|| {
            StoreError::DataCorruption("product catalog is full".to_string())
        })?;
        let key = product_id.to_string();
        if tx.contains_key(&key) {
            return Err(StoreError::DataCorruption(format!(
                "product id {product_id} already exists in a catalog of {} products",
                tx.len()
            ))
            .into());
        }

        let product = Product {
            product_id,
            image: new.image,
            name: new.name,
            price,
            quantity: new.quantity,
        };
        tx.insert(key, product.clone());
        tx.commit().await?;

        tracing::info!(product_id = %product_id, "Product added");
        Ok(product)
    }

    /// The full catalog, keyed by product id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` if the document cannot be read.
    pub async fn list_products(&self) -> Result<Document<Product>, CatalogError> {
        Ok(self.products.snapshot().await?)
    }
}
