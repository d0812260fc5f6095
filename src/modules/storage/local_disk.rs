//! Local filesystem storage rooted at `STORAGE_LOCAL_ROOT`.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};

use super::StorageBackend;
use crate::core::error::AppError;

pub struct LocalDiskStorage {
    root: PathBuf,
}

impl LocalDiskStorage {
    pub async fn new(root: PathBuf) -> Result<Self, AppError> {
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create storage root '{}': {}",
                root.display(),
                e
            ))
        })?;

        info!("Local disk storage initialized at {}", root.display());
        Ok(Self { root })
    }

    /// Map a key to a path under the root. Absolute keys and `..` segments are rejected.
    fn resolve(&self, key: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(key);
        let mut saw_segment = false;
        for component in relative.components() {
            match component {
                Component::Normal(_) => saw_segment = true,
                Component::CurDir => {}
                _ => {
                    return Err(AppError::Storage(format!(
                        "Storage key '{}' escapes the storage root",
                        key
                    )))
                }
            }
        }
        if !saw_segment {
            return Err(AppError::Storage("Storage key is empty".to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl StorageBackend for LocalDiskStorage {
    fn driver(&self) -> &'static str {
        "local"
    }

    async fn put(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<(), AppError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Storage(format!("Failed to create directory for '{}': {}", key, e))
            })?;
        }

        fs::write(&path, &data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write '{}': {}", key, e)))?;

        debug!("Stored {} bytes at '{}'", data.len(), key);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, AppError> {
        let path = self.resolve(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(AppError::NotFound("File not found in storage".to_string()))
            }
            Err(e) => Err(AppError::Storage(format!("Failed to read '{}': {}", key, e))),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted '{}'", key);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("'{}' already absent from storage", key);
                Ok(())
            }
            Err(e) => Err(AppError::Storage(format!("Failed to delete '{}': {}", key, e))),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        let path = self.resolve(key)?;
        fs::try_exists(&path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to stat '{}': {}", key, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn storage() -> (tempfile::TempDir, LocalDiskStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalDiskStorage::new(dir.path().join("files")).await.unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let (_dir, storage) = storage().await;

        storage
            .put("documents/a.txt", b"hello".to_vec(), "text/plain")
            .await
            .unwrap();
        assert!(storage.exists("documents/a.txt").await.unwrap());
        assert_eq!(storage.get("documents/a.txt").await.unwrap(), b"hello");

        storage.delete("documents/a.txt").await.unwrap();
        assert!(!storage.exists("documents/a.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_ok() {
        let (_dir, storage) = storage().await;
        tokio_test::assert_ok!(storage.delete("documents/missing.pdf").await);
    }

    #[tokio::test]
    async fn test_get_missing_file_is_not_found() {
        let (_dir, storage) = storage().await;
        let err = storage.get("documents/missing.pdf").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_keys_cannot_escape_root() {
        let (_dir, storage) = storage().await;

        for key in ["../outside.txt", "/etc/passwd", "documents/../../x", ""] {
            let err = storage.put(key, vec![1], "text/plain").await.unwrap_err();
            assert!(matches!(err, AppError::Storage(_)), "key {:?}", key);
        }
    }
}
