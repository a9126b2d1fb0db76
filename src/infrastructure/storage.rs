use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::domain::error::{AppError, Result};

/// Object storage seam for photo and document blobs. Keys are
/// namespaced per account (`{account_id}/{kind}/{uuid}-{name}`), so a
/// backend never needs tenant knowledge of its own.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;
    async fn get(&self, key: &str) -> Result<Vec<u8>>;
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Build a fresh storage key for an upload.
pub fn build_key(account_id: i64, kind: &str, file_name: &str) -> String {
    let safe_name: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}/{}/{}-{}", account_id, kind, Uuid::new_v4(), safe_name)
}

/// SHA-256 checksum of a blob, hex encoded.
pub fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Filesystem-backed storage rooted at a configured directory.
pub struct FsObjectStorage {
    root: PathBuf,
}

impl FsObjectStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a key under the root, rejecting path traversal.
    fn resolve(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty()
            || key.split('/').any(|part| {
                part.is_empty() || part == "." || part == ".." || part.contains('\\')
            })
        {
            return Err(AppError::StorageError(format!("Invalid storage key: {}", key)));
        }
        Ok(self.root.join(key))
    }

    async fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::StorageError(format!("Failed to create storage dir: {}", e))
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for FsObjectStorage {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.resolve(key)?;
        Self::ensure_parent(&path).await?;
        fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to write object: {}", e)))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.resolve(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("Object not found: {}", key)))
            }
            Err(e) => Err(AppError::StorageError(format!("Failed to read object: {}", e))),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::StorageError(format!(
                "Failed to delete object: {}",
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsObjectStorage::new(dir.path());

        let key = build_key(7, "photos", "pool view.jpg");
        assert!(key.starts_with("7/photos/"));
        assert!(key.ends_with("pool_view.jpg"));

        storage.put(&key, b"jpeg bytes").await.unwrap();
        assert_eq!(storage.get(&key).await.unwrap(), b"jpeg bytes");

        storage.delete(&key).await.unwrap();
        assert!(matches!(
            storage.get(&key).await.unwrap_err(),
            AppError::NotFound(_)
        ));

        // Deleting a missing object is a no-op.
        storage.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsObjectStorage::new(dir.path());

        assert!(storage.get("../etc/passwd").await.is_err());
        assert!(storage.put("a//b", b"x").await.is_err());
    }

    #[test]
    fn test_checksum_is_stable() {
        assert_eq!(checksum(b"abc"), checksum(b"abc"));
        assert_ne!(checksum(b"abc"), checksum(b"abd"));
        assert_eq!(checksum(b"abc").len(), 64);
    }
}
