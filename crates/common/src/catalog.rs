use std::sync::Arc;

use tracing::{debug, warn};

use crate::revision::{sort_newest_first, Revision};
use crate::store::{PageCursor, StoreError, VersionStore};

/// Upper bound on listing pages, guards against a provider that never stops paginating.
const MAX_LISTING_PAGES: usize = 10_000;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("version catalog unavailable: {0}")]
    CatalogUnavailable(#[from] StoreError),
}

/// Lists the full revision history of an object.
#[derive(Debug, Clone)]
pub struct VersionCatalog {
    store: Arc<dyn VersionStore>,
}

impl VersionCatalog {
    pub fn new(store: Arc<dyn VersionStore>) -> Self {
        Self { store }
    }

    /// Every revision of `object_key`, newest first.
    ///
    /// Walks all listing pages. Each call re-queries the store.
    pub async fn list_revisions(&self, object_key: &str) -> Result<Vec<Revision>, CatalogError> {
        let mut revisions = Vec::new();
        let mut cursor: Option<PageCursor> = None;

        for page_number in 0..MAX_LISTING_PAGES {
            let page = self
                .store
                .list_versions(object_key, cursor.as_ref())
                .await
                .map_err(|e| {
                    warn!(key = %object_key, page = page_number, "version listing failed: {}", e);
                    e
                })?;
            debug!(
                key = %object_key,
                page = page_number,
                count = page.revisions.len(),
                "listed version page"
            );
            revisions.extend(page.revisions);

            match page.next {
                Some(next) if Some(&next) == cursor.as_ref() => {
                    return Err(StoreError::Response(format!(
                        "listing did not advance past {}",
                        next.version_id_marker
                    ))
                    .into());
                }
                Some(next) => cursor = Some(next),
                None => {
                    sort_newest_first(&mut revisions);
                    return Ok(revisions);
                }
            }
        }

        Err(StoreError::Response(format!(
            "listing exceeded {} pages",
            MAX_LISTING_PAGES
        ))
        .into())
    }
}
