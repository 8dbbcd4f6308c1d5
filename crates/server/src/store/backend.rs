//! Raw document storage.
//!
//! A backend stores named JSON documents as opaque strings. [`FileBackend`]
//! keeps one `<name>.json` file per document in a directory; [`MemoryBackend`]
//! keeps them in a map and is used by tests and throwaway servers.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::StoreError;

/// Storage for whole JSON documents, addressed by name.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Read a document. Returns `None` if it has never been written.
    async fn load(&self, name: &str) -> Result<Option<String>, StoreError>;

    /// Replace a document.
    async fn save(&self, name: &str, contents: &str) -> Result<(), StoreError>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// Documents stored as `<dir>/<name>.json`.
///
/// Writes go to `<name>.json.tmp` first and are renamed over the target, so a
/// reader never sees a half-written document.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

#[async_trait]
impl DocumentBackend for FileBackend {
    async fn load(&self, name: &str) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(self.path_for(name)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                document: name.to_owned(),
                source,
            }),
        }
    }

    async fn save(&self, name: &str, contents: &str) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            document: name.to_owned(),
            source,
        };

        tokio::fs::create_dir_all(&self.dir).await.map_err(io_err)?;

        let target = self.path_for(name);
        let tmp = self.dir.join(format!("{name}.json.tmp"));
        tokio::fs::write(&tmp, contents).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &target).await.map_err(io_err)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

/// Documents held in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    documents: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn load(&self, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self.documents.lock().await.get(name).cloned())
    }

    async fn save(&self, name: &str, contents: &str) -> Result<(), StoreError> {
        self.documents
            .lock()
            .await
            .insert(name.to_owned(), contents.to_owned());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
