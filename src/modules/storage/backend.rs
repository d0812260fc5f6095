use std::sync::Arc;

use async_trait::async_trait;

use super::{LocalDiskStorage, MinIOStorage};
use crate::core::config::{MinIOConfig, StorageConfig, StorageDriver};
use crate::core::error::AppError;

/// Object storage for document files.
///
/// Keys are relative paths (`documents/{uuid}.pdf`). `delete` on a missing key succeeds, so a
/// purge can be retried after a partial failure.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Short driver name for logs
    fn driver(&self) -> &'static str;

    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError>;

    /// Read a whole object. Missing objects are `AppError::NotFound`.
    async fn get(&self, key: &str) -> Result<Vec<u8>, AppError>;

    async fn delete(&self, key: &str) -> Result<(), AppError>;

    async fn exists(&self, key: &str) -> Result<bool, AppError>;
}

pub type SharedStorage = Arc<dyn StorageBackend>;

/// Build the backend selected by `STORAGE_DRIVER`
pub async fn build_storage(
    storage: &StorageConfig,
    minio: &MinIOConfig,
) -> Result<SharedStorage, AppError> {
    let backend: SharedStorage = match storage.driver {
        StorageDriver::Local => Arc::new(LocalDiskStorage::new(storage.local_root.clone()).await?),
        StorageDriver::MinIO => Arc::new(MinIOStorage::new(minio.clone()).await?),
    };
    Ok(backend)
}
