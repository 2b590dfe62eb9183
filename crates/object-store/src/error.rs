//! Error types for the versioned object store.

use common::grant::SignError;
use common::store::StoreError;

/// Errors that can occur when talking to S3.
#[derive(Debug, thiserror::Error)]
pub enum S3StoreError {
    /// Object storage error
    #[error("object storage error: {0}")]
    ObjectStore(#[from] object_store::Error),

    /// Raw HTTP error on calls made outside object_store
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// S3 answered with a non-success status
    #[error("s3 returned {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Response body was not the XML we expected
    #[error("malformed listing: {0}")]
    Listing(#[from] quick_xml::DeError),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No usable credentials could be resolved
    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    /// Object or version not found
    #[error("not found: {0}")]
    NotFound(String),

    /// S3 bucket not found - must be created (with versioning on) before use
    #[error("S3 bucket '{0}' does not exist. Create it before starting the broker.")]
    BucketNotFound(String),
}

/// Result type alias for object store operations.
pub type Result<T> = std::result::Result<T, S3StoreError>;

impl From<S3StoreError> for StoreError {
    fn from(err: S3StoreError) -> Self {
        match err {
            S3StoreError::NotFound(what) => StoreError::NotFound(what),
            S3StoreError::ObjectStore(object_store::Error::NotFound { path, .. }) => {
                StoreError::NotFound(path)
            }
            S3StoreError::Listing(e) => StoreError::Response(e.to_string()),
            S3StoreError::HttpStatus { status, body } => {
                StoreError::Response(format!("{}: {}", status, body))
            }
            other => StoreError::Request(other.to_string()),
        }
    }
}

impl From<S3StoreError> for SignError {
    fn from(err: S3StoreError) -> Self {
        match err {
            S3StoreError::MissingCredentials(reason) => SignError::MissingCredentials(reason),
            other => SignError::Unavailable(other.to_string()),
        }
    }
}
