//! Typed documents with transactional read-modify-write.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, MutexGuard};

use super::StoreError;
use super::backend::DocumentBackend;

/// A whole document: natural key to record.
pub type Document<V> = BTreeMap<String, V>;

/// One JSON document holding records of type `V`.
///
/// Writers go through [`Table::begin`], which holds the table lock from load
/// until the transaction is committed or dropped. Readers take the lock only
/// while loading.
pub struct Table<V> {
    name: &'static str,
    backend: Arc<dyn DocumentBackend>,
    lock: Mutex<()>,
    _records: PhantomData<fn() -> V>,
}

impl<V> Table<V>
where
    V: Serialize + DeserializeOwned,
{
    #[must_use]
    pub fn new(name: &'static str, backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            name,
            backend,
            lock: Mutex::new(()),
            _records: PhantomData,
        }
    }

    /// Document name (`users`, `products`, ...).
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Load the full document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the document cannot be read or parsed.
    pub async fn snapshot(&self) -> Result<Document<V>, StoreError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// Load a single record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the document cannot be read or parsed.
    pub async fn get(&self, key: &str) -> Result<Option<V>, StoreError> {
        let mut document = self.snapshot().await?;
        Ok(document.remove(key))
    }

    /// Start a write transaction.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the document cannot be read or parsed.
    pub async fn begin(&self) -> Result<TableTx<'_, V>, StoreError> {
        let guard = self.lock.lock().await;
        let document = self.load().await?;
        Ok(TableTx {
            table: self,
            document,
            _guard: guard,
        })
    }

    /// Write an empty document if none exists yet.
    ///
    /// Returns `true` if the document was created.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend fails.
    pub async fn ensure_exists(&self) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        if self.backend.load(self.name).await?.is_some() {
            return Ok(false);
        }
        self.write(&Document::new()).await?;
        Ok(true)
    }

    async fn load(&self) -> Result<Document<V>, StoreError> {
        let Some(contents) = self.backend.load(self.name).await? else {
            return Ok(Document::new());
        };
        serde_json::from_str(&contents).map_err(|source| StoreError::Serialization {
            document: self.name.to_owned(),
            source,
        })
    }

    async fn write(&self, document: &Document<V>) -> Result<(), StoreError> {
        let contents =
            serde_json::to_string_pretty(document).map_err(|source| StoreError::Serialization {
                document: self.name.to_owned(),
                source,
            })?;
        self.backend.save(self.name, &contents).await
    }
}

/// An open write transaction on a [`Table`].
///
/// Changes are only persisted by [`TableTx::commit`]; dropping the
/// transaction discards them and releases the lock.
pub struct TableTx<'a, V>
where
    V: Serialize + DeserializeOwned,
{
    table: &'a Table<V>,
    document: Document<V>,
    _guard: MutexGuard<'a, ()>,
}

impl<V> TableTx<'_, V>
where
    V: Serialize + DeserializeOwned,
{
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.document.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.document.get_mut(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.document.contains_key(key)
    }

    /// Insert or replace a record, returning the previous one.
    pub fn insert(&mut self, key: String, value: V) -> Option<V> {
        self.document.insert(key, value)
    }

    /// Number of records in the document.
    #[must_use]
    pub fn len(&self) -> usize {
        self.document.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    /// Write the document back and release the lock.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the document cannot be written.
    pub async fn commit(self) -> Result<(), StoreError> {
        self.table.write(&self.document).await
    }
}
