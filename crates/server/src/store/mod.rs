//! Flat JSON document store.
//!
//! # Documents
//!
//! - `users` - username → user record (argon2 hash)
//! - `products` - product id → product
//! - `coupons` - coupon code → coupon
//! - `carts` - username → cart
//!
//! Every operation reads a whole document, changes it in memory, and writes it
//! back. Each document has its own lock; an operation that writes several
//! documents takes them in the order carts, coupons, products.

pub mod backend;
pub mod table;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use flatshop_core::{Cart, Coupon, Product};

use crate::models::user::UserRecord;

pub use backend::{DocumentBackend, FileBackend, MemoryBackend};
pub use table::{Document, Table, TableTx};

/// Errors from the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a document failed.
    #[error("I/O error on document {document}: {source}")]
    Io {
        document: String,
        #[source]
        source: std::io::Error,
    },

    /// A document is not valid JSON for its record type.
    #[error("serialization error on document {document}: {source}")]
    Serialization {
        document: String,
        #[source]
        source: serde_json::Error,
    },

    /// Stored data violates an invariant.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// The four shop documents over a shared backend.
pub struct Store {
    backend: Arc<dyn DocumentBackend>,
    users: Table<UserRecord>,
    products: Table<Product>,
    coupons: Table<Coupon>,
    carts: Table<Cart>,
}

impl Store {
    #[must_use]
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            users: Table::new("users", Arc::clone(&backend)),
            products: Table::new("products", Arc::clone(&backend)),
            coupons: Table::new("coupons", Arc::clone(&backend)),
            carts: Table::new("carts", Arc::clone(&backend)),
            backend,
        }
    }

    /// A store of `<dir>/<document>.json` files.
    #[must_use]
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileBackend::new(dir)))
    }

    /// A store that lives only in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    #[must_use]
    pub const fn users(&self) -> &Table<UserRecord> {
        &self.users
    }

    #[must_use]
    pub const fn products(&self) -> &Table<Product> {
        &self.products
    }

    #[must_use]
    pub const fn coupons(&self) -> &Table<Coupon> {
        &self.coupons
    }

    #[must_use]
    pub const fn carts(&self) -> &Table<Cart> {
        &self.carts
    }

    /// Where the documents live, for logs.
    #[must_use]
    pub fn location(&self) -> String {
        self.backend.describe()
    }

    /// Create any missing document as `{}`.
    ///
    /// Returns the names of the documents that were created.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if a document cannot be written.
    pub async fn init(&self) -> Result<Vec<&'static str>, StoreError> {
        let mut created = Vec::new();
        for (name, was_created) in [
            (self.users.name(), self.users.ensure_exists().await?),
            (self.products.name(), self.products.ensure_exists().await?),
            (self.coupons.name(), self.coupons.ensure_exists().await?),
            (self.carts.name(), self.carts.ensure_exists().await?),
        ] {
            if was_created {
                tracing::info!(document = name, location = %self.location(), "Created document");
                created.push(name);
            }
        }
        Ok(created)
    }

    /// Check that every document can be read and parsed.
    ///
    /// # Errors
    ///
    /// Returns the first `StoreError` encountered.
    pub async fn check(&self) -> Result<(), StoreError> {
        self.users.snapshot().await?;
        self.products.snapshot().await?;
        self.coupons.snapshot().await?;
        self.carts.snapshot().await?;
        Ok(())
    }
}
