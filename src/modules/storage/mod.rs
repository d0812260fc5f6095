//! Storage module for document files
//!
//! Files are addressed by a relative key such as `documents/{uuid}.pdf` and live either
//! on the local disk or in a MinIO/S3-compatible bucket.

mod backend;
mod local_disk;
mod minio_client;

pub use backend::{build_storage, SharedStorage, StorageBackend};
pub use local_disk::LocalDiskStorage;
pub use minio_client::MinIOStorage;
