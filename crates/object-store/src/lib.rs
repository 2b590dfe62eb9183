//! S3 Versioned Object Storage Backend
//!
//! This crate plugs a versioned S3 bucket (AWS or any S3-compatible service
//! such as MinIO) into the storage seams of `docvault-common`.
//!
//! # Features
//!
//! - Paginated `ListObjectVersions`, filtered to one exact key
//! - Pinned reads of a single version id
//! - Presigned single-object `PUT` URLs for the credential broker
//!
//! # Example
//!
//! ```rust,no_run
//! use docvault_object_store::{S3Config, S3VersionStore};
//!
//! # async fn example() -> Result<(), docvault_object_store::S3StoreError> {
//! let store = S3VersionStore::new(&S3Config {
//!     endpoint: Some("http://localhost:9000".into()),
//!     region: "us-east-1".into(),
//!     bucket: "documents".into(),
//!     access_key: "minioadmin".into(),
//!     secret_key: "minioadmin".into(),
//! })?;
//! store.verify_bucket().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod listing;
mod s3;

pub use config::{S3Config, DEFAULT_REGION};
pub use error::{Result, S3StoreError};
pub use s3::S3VersionStore;
