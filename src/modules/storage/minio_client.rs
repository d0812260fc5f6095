//! MinIO/S3-compatible document storage
//!
//! Uses the rust-s3 crate with path-style addressing so it works against a local MinIO as well
//! as S3. Non-2xx answers are turned into errors here, so callers see the same semantics as the
//! local disk driver.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use super::StorageBackend;
use crate::core::config::MinIOConfig;
use crate::core::error::AppError;

pub struct MinIOStorage {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
}

impl MinIOStorage {
    /// Connect to the configured bucket, creating it when missing
    pub async fn new(config: MinIOConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Storage(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Storage(format!("Failed to create MinIO bucket: {}", e)))?;

        // http://endpoint/bucket instead of http://bucket.endpoint
        bucket.set_path_style();

        let storage = Self {
            bucket,
            region,
            credentials,
            endpoint: config.endpoint,
        };

        storage.ensure_bucket_exists().await;

        info!(
            "MinIO storage initialized for endpoint: {}, bucket: {}",
            storage.endpoint,
            storage.bucket.name()
        );

        Ok(storage)
    }

    async fn ensure_bucket_exists(&self) {
        let result = Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;

        match result {
            Ok(_) => info!("Bucket '{}' created successfully", self.bucket.name()),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
            }
        }
    }
}

fn is_not_found(message: &str) -> bool {
    message.contains("404") || message.contains("NoSuchKey")
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[async_trait]
impl StorageBackend for MinIOStorage {
    fn driver(&self) -> &'static str {
        "minio"
    }

    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        let response = self
            .bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload file '{}': {}", key, e)))?;

        if !is_success(response.status_code()) {
            return Err(AppError::Storage(format!(
                "Upload of '{}' answered HTTP {}",
                key,
                response.status_code()
            )));
        }

        debug!("Uploaded file '{}' to bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, AppError> {
        let response = self.bucket.get_object(key).await.map_err(|e| {
            if is_not_found(&e.to_string()) {
                AppError::NotFound("File not found in storage".to_string())
            } else {
                AppError::Storage(format!("Failed to download file '{}': {}", key, e))
            }
        })?;

        match response.status_code() {
            404 => Err(AppError::NotFound("File not found in storage".to_string())),
            status if is_success(status) => {
                debug!(
                    "Downloaded file '{}' from bucket '{}'",
                    key,
                    self.bucket.name()
                );
                Ok(response.to_vec())
            }
            status => Err(AppError::Storage(format!(
                "Download of '{}' answered HTTP {}",
                key, status
            ))),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let status = match self.bucket.delete_object(key).await {
            Ok(response) => response.status_code(),
            Err(e) if is_not_found(&e.to_string()) => 404,
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "Failed to delete file '{}': {}",
                    key, e
                )))
            }
        };

        if status == 404 || is_success(status) {
            debug!(
                "Deleted file '{}' from bucket '{}'",
                key,
                self.bucket.name()
            );
            Ok(())
        } else {
            Err(AppError::Storage(format!(
                "Delete of '{}' answered HTTP {}",
                key, status
            )))
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        match self.bucket.head_object(key).await {
            Ok((_, status)) => Ok(is_success(status)),
            Err(e) => {
                let error_str = e.to_string();
                if is_not_found(&error_str) {
                    Ok(false)
                } else {
                    Err(AppError::Storage(format!(
                        "Failed to check if file '{}' exists: {}",
                        key, e
                    )))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        assert!(is_not_found("Got HTTP 404 with content 'NoSuchKey'"));
        assert!(is_not_found("<Code>NoSuchKey</Code>"));
        assert!(!is_not_found("Got HTTP 403 with content 'AccessDenied'"));
    }

    #[test]
    fn test_success_range() {
        assert!(is_success(200));
        assert!(is_success(204));
        assert!(!is_success(304));
        assert!(!is_success(500));
    }
}
