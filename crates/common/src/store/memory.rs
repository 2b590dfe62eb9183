use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::{PageCursor, StoreError, VersionPage, VersionStore};
use crate::revision::{Revision, RevisionId};

const DEFAULT_PAGE_SIZE: usize = 1000;

/// In-memory versioned object store
#[derive(Debug, Clone)]
pub struct MemoryVersionStore {
    inner: Arc<Mutex<MemoryVersionStoreInner>>,
}

#[derive(Debug)]
struct MemoryVersionStoreInner {
    /// key -> versions in write order
    objects: HashMap<String, Vec<StoredVersion>>,
    next_id: u64,
    page_size: usize,
    /// When set, every call fails with this message
    outage: Option<String>,
}

#[derive(Debug, Clone)]
struct StoredVersion {
    revision: Revision,
    body: Bytes,
}

impl MemoryVersionStore {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Listing hands out at most `page_size` versions per call.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryVersionStoreInner {
                objects: HashMap::new(),
                next_id: 1,
                page_size: page_size.max(1),
                outage: None,
            })),
        }
    }

    /// Write a new version of `key` stamped with the current time.
    pub fn put(&self, key: &str, body: impl Into<Bytes>) -> RevisionId {
        self.put_at(key, body, Utc::now())
    }

    /// Write a new version of `key` with an explicit modification time.
    pub fn put_at(&self, key: &str, body: impl Into<Bytes>, at: DateTime<Utc>) -> RevisionId {
        let body = body.into();
        let mut inner = self.inner.lock();
        let version_id = RevisionId::new(format!("mem-{:08}", inner.next_id));
        inner.next_id += 1;

        let revision = Revision {
            version_id: version_id.clone(),
            last_modified: at,
            size: body.len() as u64,
        };
        inner
            .objects
            .entry(key.to_string())
            .or_default()
            .push(StoredVersion { revision, body });
        version_id
    }

    /// Make every subsequent call fail until `restore` is called.
    pub fn fail_with(&self, reason: impl Into<String>) {
        self.inner.lock().outage = Some(reason.into());
    }

    pub fn restore(&self) {
        self.inner.lock().outage = None;
    }
}

impl Default for MemoryVersionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VersionStore for MemoryVersionStore {
    async fn list_versions(
        &self,
        key: &str,
        cursor: Option<&PageCursor>,
    ) -> Result<VersionPage, StoreError> {
        let inner = self.inner.lock();
        if let Some(reason) = &inner.outage {
            return Err(StoreError::Request(reason.clone()));
        }

        // Providers list newest writes first
        let versions: Vec<&StoredVersion> = match inner.objects.get(key) {
            Some(versions) => versions.iter().rev().collect(),
            None => return Ok(VersionPage::default()),
        };

        let start = match cursor {
            Some(cursor) => versions
                .iter()
                .position(|v| v.revision.version_id.as_str() == cursor.version_id_marker)
                .map(|i| i + 1)
                .ok_or_else(|| {
                    StoreError::Response(format!(
                        "unknown version marker {}",
                        cursor.version_id_marker
                    ))
                })?,
            None => 0,
        };

        let end = (start + inner.page_size).min(versions.len());
        let revisions: Vec<Revision> = versions[start..end]
            .iter()
            .map(|v| v.revision.clone())
            .collect();
        let next = if end < versions.len() {
            revisions.last().map(|last| PageCursor {
                key_marker: key.to_string(),
                version_id_marker: last.version_id.to_string(),
            })
        } else {
            None
        };

        Ok(VersionPage { revisions, next })
    }

    async fn get_version(&self, key: &str, version_id: &RevisionId) -> Result<Bytes, StoreError> {
        let inner = self.inner.lock();
        if let Some(reason) = &inner.outage {
            return Err(StoreError::Request(reason.clone()));
        }

        inner
            .objects
            .get(key)
            .and_then(|versions| {
                versions
                    .iter()
                    .find(|v| &v.revision.version_id == version_id)
            })
            .map(|v| v.body.clone())
            .ok_or_else(|| StoreError::NotFound(format!("{}@{}", key, version_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pages_walk_every_version() {
        let store = MemoryVersionStore::with_page_size(2);
        for i in 0..5 {
            store.put("doc.json", format!("{{\"n\":{}}}", i));
        }

        let mut seen = Vec::new();
        let mut cursor = None;
        loop {
            let page = store.list_versions("doc.json", cursor.as_ref()).await.unwrap();
            assert!(page.revisions.len() <= 2);
            seen.extend(page.revisions);
            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        assert_eq!(seen.len(), 5);
    }

    #[tokio::test]
    async fn test_get_specific_version() {
        let store = MemoryVersionStore::new();
        let first = store.put("doc.json", "{\"v\":1}");
        let _second = store.put("doc.json", "{\"v\":2}");

        let body = store.get_version("doc.json", &first).await.unwrap();
        assert_eq!(&body[..], b"{\"v\":1}");

        let missing = store.get_version("doc.json", &RevisionId::new("nope")).await;
        assert!(matches!(missing, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_outage() {
        let store = MemoryVersionStore::new();
        store.put("doc.json", "{}");
        store.fail_with("connection refused");
        assert!(store.list_versions("doc.json", None).await.is_err());
        store.restore();
        assert_eq!(
            store
                .list_versions("doc.json", None)
                .await
                .unwrap()
                .revisions
                .len(),
            1
        );
    }
}
