//! `flatshop init`.

use std::path::Path;

use flatshop_server::store::{Store, StoreError};

/// Create every missing document in `data_dir`.
///
/// Existing documents are left untouched, so running it twice is harmless.
///
/// # Errors
///
/// Returns an error if the directory or a document cannot be written.
pub async fn run(data_dir: &Path) -> Result<Vec<&'static str>, StoreError> {
    let store = Store::open(data_dir);
    let created = store.init().await?;

    if created.is_empty() {
        tracing::info!(location = %store.location(), "Data directory already initialized");
    } else {
        tracing::info!(
            location = %store.location(),
            documents = ?created,
            "Data directory initialized"
        );
    }

    Ok(created)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();

        let first = run(dir.path()).await.unwrap();
        assert_eq!(first.len(), 4);
        assert!(dir.path().join("products.json").exists());

        let second = run(dir.path()).await.unwrap();
        assert!(second.is_empty());
    }
}
