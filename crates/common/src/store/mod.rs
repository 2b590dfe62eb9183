//! Storage seam for versioned objects.
//!
//! The catalog and fetcher only ever talk to a [`VersionStore`]. The S3
//! implementation lives in `docvault-object-store`; [`MemoryVersionStore`]
//! backs tests and local tooling.

mod memory;

use async_trait::async_trait;
use bytes::Bytes;

use crate::revision::{Revision, RevisionId};

pub use memory::MemoryVersionStore;

/// Continuation point for a paginated version listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCursor {
    pub key_marker: String,
    pub version_id_marker: String,
}

/// One page of a version listing, in whatever order the provider returns.
#[derive(Debug, Clone, Default)]
pub struct VersionPage {
    pub revisions: Vec<Revision>,
    /// Set when the provider has more versions to hand out
    pub next: Option<PageCursor>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("storage request failed: {0}")]
    Request(String),
    #[error("unexpected storage response: {0}")]
    Response(String),
}

#[async_trait]
pub trait VersionStore: Send + Sync + std::fmt::Debug {
    /// List one page of versions of exactly `key`.
    ///
    /// # Arguments
    /// * `key` - The object key whose history is listed
    /// * `cursor` - Where the previous page stopped, `None` for the first page
    async fn list_versions(
        &self,
        key: &str,
        cursor: Option<&PageCursor>,
    ) -> Result<VersionPage, StoreError>;

    /// Fetch the raw body of one specific version of `key`.
    async fn get_version(&self, key: &str, version_id: &RevisionId) -> Result<Bytes, StoreError>;
}
