use std::sync::Arc;

use tracing::{debug, warn};

use crate::document::{DecodeError, DocumentContent};
use crate::revision::RevisionId;
use crate::store::{StoreError, VersionStore};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to fetch revision content: {0}")]
    ContentFetch(#[from] StoreError),
    #[error("failed to decode revision content: {0}")]
    ContentDecode(#[from] DecodeError),
}

/// Retrieves and decodes the body of one exact revision.
#[derive(Debug, Clone)]
pub struct ContentFetcher {
    store: Arc<dyn VersionStore>,
}

impl ContentFetcher {
    pub fn new(store: Arc<dyn VersionStore>) -> Self {
        Self { store }
    }

    pub async fn fetch_revision_content(
        &self,
        object_key: &str,
        revision_id: &RevisionId,
    ) -> Result<DocumentContent, FetchError> {
        let body = self.store.get_version(object_key, revision_id).await?;
        debug!(key = %object_key, version = %revision_id, size = body.len(), "fetched revision");

        DocumentContent::decode(&body).map_err(|e| {
            warn!(key = %object_key, version = %revision_id, "revision is not a JSON document: {}", e);
            e.into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryVersionStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_fetches_requested_version_not_latest() {
        let store = MemoryVersionStore::new();
        let old = store.put("document.json", r#"{"rev":"old"}"#);
        store.put("document.json", r#"{"rev":"new"}"#);

        let fetcher = ContentFetcher::new(Arc::new(store));
        let content = fetcher
            .fetch_revision_content("document.json", &old)
            .await
            .unwrap();
        assert_eq!(content.tree(), &json!({"rev": "old"}));
    }

    #[tokio::test]
    async fn test_decode_and_fetch_errors() {
        let store = MemoryVersionStore::new();
        let broken = store.put("document.json", "<html>oops</html>");
        let fetcher = ContentFetcher::new(Arc::new(store.clone()));

        assert!(matches!(
            fetcher.fetch_revision_content("document.json", &broken).await,
            Err(FetchError::ContentDecode(_))
        ));

        store.fail_with("timeout");
        assert!(matches!(
            fetcher.fetch_revision_content("document.json", &broken).await,
            Err(FetchError::ContentFetch(_))
        ));
    }
}
