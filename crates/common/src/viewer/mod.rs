//! Browse, preview and restore prior revisions of a document.
//!
//! The viewer owns the primary editing surface and the secondary preview
//! surface and moves between four phases:
//!
//! ```text
//!  Idle --open_catalog--> Browsing --select--> Previewing --confirm--> Confirmed
//!    ^                      ^  ^                   |
//!    |                      |  +------cancel-------+
//!    +--------close---------+
//! ```
//!
//! Storage calls never run under the state lock. Every fetch is tagged with
//! the generation current when it was issued; a result whose generation has
//! moved on (another selection, a cancel, a close) is dropped on arrival.

mod raster;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::catalog::{CatalogError, VersionCatalog};
use crate::document::DocumentContent;
use crate::fetcher::{ContentFetcher, FetchError};
use crate::revision::{filter_by_range, CatalogEntry, Revision, RevisionId, TimeRange};
use crate::store::VersionStore;
use crate::surface::{DocumentSurface, SurfaceError};

pub use raster::{CompositeImage, RasterError};
use raster::CompositeBuilder;

/// Delay unit between page exports; page `n` waits `n` units.
pub const DEFAULT_PAGE_STAGGER: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerPhase {
    /// No catalog open
    Idle,
    /// Catalog visible, nothing previewed
    Browsing,
    /// A revision is loaded read-only in the preview surface
    Previewing,
    /// A revision was restored into the primary surface
    Confirmed,
}

/// How a selection resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The revision is now previewed
    Loaded,
    /// A newer selection, cancel or close overtook this one
    Superseded,
}

#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("preview surface is not ready")]
    SurfaceNotReady,
    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),
    #[error("revision {0} is not in the catalog")]
    UnknownRevision(RevisionId),
    #[error("version catalog is not open")]
    CatalogClosed,
    #[error("no previewed revision to confirm")]
    NothingToConfirm,
    #[error("no revision is being previewed")]
    NotPreviewing,
    #[error(transparent)]
    Raster(#[from] RasterError),
}

#[derive(Debug, Clone)]
struct Preview {
    revision: RevisionId,
    content: DocumentContent,
}

struct ViewerInner<P, S> {
    phase: ViewerPhase,
    /// Last catalog that loaded successfully, kept across failures
    revisions: Vec<Revision>,
    range: Option<TimeRange>,
    selected: Option<RevisionId>,
    generation: u64,
    preview: Option<Preview>,
    last_error: Option<String>,
    primary: P,
    secondary: S,
}

impl<P, S> ViewerInner<P, S> {
    fn invalidate(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn catalog_open(&self) -> bool {
        matches!(self.phase, ViewerPhase::Browsing | ViewerPhase::Previewing)
    }
}

pub struct VersionViewer<P, S> {
    inner: Arc<Mutex<ViewerInner<P, S>>>,
    catalog: VersionCatalog,
    fetcher: ContentFetcher,
    object_key: String,
    page_stagger: Duration,
}

impl<P, S> Clone for VersionViewer<P, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            catalog: self.catalog.clone(),
            fetcher: self.fetcher.clone(),
            object_key: self.object_key.clone(),
            page_stagger: self.page_stagger,
        }
    }
}

impl<P, S> fmt::Debug for VersionViewer<P, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionViewer")
            .field("object_key", &self.object_key)
            .field("phase", &self.inner.lock().phase)
            .finish()
    }
}

impl<P: DocumentSurface, S: DocumentSurface> VersionViewer<P, S> {
    pub fn new(
        store: Arc<dyn VersionStore>,
        object_key: impl Into<String>,
        primary: P,
        secondary: S,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ViewerInner {
                phase: ViewerPhase::Idle,
                revisions: Vec::new(),
                range: None,
                selected: None,
                generation: 0,
                preview: None,
                last_error: None,
                primary,
                secondary,
            })),
            catalog: VersionCatalog::new(store.clone()),
            fetcher: ContentFetcher::new(store),
            object_key: object_key.into(),
            page_stagger: DEFAULT_PAGE_STAGGER,
        }
    }

    pub fn with_page_stagger(mut self, stagger: Duration) -> Self {
        self.page_stagger = stagger;
        self
    }

    pub fn object_key(&self) -> &str {
        &self.object_key
    }

    pub fn phase(&self) -> ViewerPhase {
        self.inner.lock().phase
    }

    pub fn selected(&self) -> Option<RevisionId> {
        self.inner.lock().selected.clone()
    }

    /// Content currently in the preview surface, if any.
    pub fn preview_content(&self) -> Option<DocumentContent> {
        self.inner.lock().preview.as_ref().map(|p| p.content.clone())
    }

    pub fn previewed_revision(&self) -> Option<RevisionId> {
        self.inner.lock().preview.as_ref().map(|p| p.revision.clone())
    }

    /// The most recent failure, kept until the next successful action.
    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().last_error.clone()
    }

    /// Revisions passing the current range filter, newest first.
    pub fn revisions(&self) -> Vec<Revision> {
        let inner = self.inner.lock();
        filter_by_range(&inner.revisions, inner.range.as_ref())
    }

    /// Display rows for the current (filtered) catalog.
    pub fn entries(&self) -> Vec<CatalogEntry> {
        let inner = self.inner.lock();
        filter_by_range(&inner.revisions, inner.range.as_ref())
            .iter()
            .map(|r| CatalogEntry::project(r, inner.selected.as_ref()))
            .collect()
    }

    /// Run `f` against the primary surface.
    pub fn with_primary<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        f(&mut self.inner.lock().primary)
    }

    /// Run `f` against the preview surface.
    pub fn with_secondary<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.inner.lock().secondary)
    }

    /// Show the catalog and (re)load it from storage.
    ///
    /// On failure the previously loaded catalog stays in place and the
    /// error is recorded alongside it.
    pub async fn open_catalog(&self) -> Result<Vec<CatalogEntry>, ViewerError> {
        {
            let mut inner = self.inner.lock();
            if !inner.catalog_open() {
                inner.phase = ViewerPhase::Browsing;
            }
        }

        match self.catalog.list_revisions(&self.object_key).await {
            Ok(revisions) => {
                info!(key = %self.object_key, count = revisions.len(), "loaded version catalog");
                let mut inner = self.inner.lock();
                inner.revisions = revisions;
                inner.last_error = None;
            }
            Err(e) => {
                warn!(key = %self.object_key, "failed to load version catalog: {}", e);
                self.inner.lock().last_error = Some(e.to_string());
                return Err(e.into());
            }
        }
        Ok(self.entries())
    }

    /// Restrict the displayed catalog to a time range, `None` to clear.
    pub fn set_range(&self, range: Option<TimeRange>) -> Vec<CatalogEntry> {
        self.inner.lock().range = range;
        self.entries()
    }

    /// Select a revision and load it into the preview surface.
    pub async fn select(&self, revision_id: &RevisionId) -> Result<SelectOutcome, ViewerError> {
        let ticket = {
            let mut inner = self.inner.lock();
            if !inner.catalog_open() {
                return Err(ViewerError::CatalogClosed);
            }
            if !inner.revisions.iter().any(|r| &r.version_id == revision_id) {
                return Err(ViewerError::UnknownRevision(revision_id.clone()));
            }
            inner.selected = Some(revision_id.clone());
            inner.invalidate()
        };
        debug!(version = %revision_id, generation = ticket, "fetching revision for preview");

        let result = self
            .fetcher
            .fetch_revision_content(&self.object_key, revision_id)
            .await;

        let mut inner = self.inner.lock();
        if inner.generation != ticket {
            debug!(version = %revision_id, generation = ticket, "dropping stale revision fetch");
            return Ok(SelectOutcome::Superseded);
        }

        let content = match result {
            Ok(content) => content,
            Err(e) => {
                warn!(version = %revision_id, "failed to load revision: {}", e);
                inner.last_error = Some(e.to_string());
                let previewed = inner.preview.as_ref().map(|p| p.revision.clone());
                inner.selected = previewed;
                return Err(e.into());
            }
        };

        if let Err(e) = inner.secondary.open(content.clone()) {
            inner.last_error = Some(e.to_string());
            let previewed = inner.preview.as_ref().map(|p| p.revision.clone());
            inner.selected = previewed;
            return Err(e.into());
        }
        inner.secondary.set_read_only(true);
        inner.preview = Some(Preview {
            revision: revision_id.clone(),
            content,
        });
        inner.phase = ViewerPhase::Previewing;
        inner.last_error = None;
        Ok(SelectOutcome::Loaded)
    }

    /// Restore the previewed revision into the primary surface and lock it.
    pub fn confirm(&self) -> Result<RevisionId, ViewerError> {
        let mut inner = self.inner.lock();
        let preview = match (&inner.phase, &inner.preview) {
            (ViewerPhase::Previewing, Some(preview)) => preview.clone(),
            _ => return Err(ViewerError::NothingToConfirm),
        };

        inner.primary.open(preview.content)?;
        inner.primary.set_read_only(true);

        Self::discard_preview(&mut inner);
        inner.phase = ViewerPhase::Confirmed;
        info!(version = %preview.revision, "restored revision into editor");
        Ok(preview.revision)
    }

    /// Drop any preview and go back to browsing. The primary is untouched;
    /// the preview surface is left blank and editable.
    pub fn cancel(&self) {
        let mut inner = self.inner.lock();
        Self::discard_preview(&mut inner);
        inner.phase = ViewerPhase::Browsing;
    }

    /// Hide the catalog entirely.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        Self::discard_preview(&mut inner);
        inner.phase = ViewerPhase::Idle;
    }

    /// Invalidate in-flight work and blank the preview surface.
    fn discard_preview(inner: &mut ViewerInner<P, S>) {
        inner.invalidate();
        inner.selected = None;
        inner.preview = None;
        if let Err(e) = inner.secondary.open(DocumentContent::blank()) {
            warn!("failed to clear preview surface: {}", e);
        }
        inner.secondary.set_read_only(false);
    }

    /// Stack every page of the previewed revision into one image.
    ///
    /// Pages are exported in ascending order with a growing delay between
    /// them. A page that fails to export or decode is left out.
    pub async fn rasterize(&self) -> Result<CompositeImage, ViewerError> {
        let (ticket, page_count) = {
            let inner = self.inner.lock();
            if inner.phase != ViewerPhase::Previewing || inner.preview.is_none() {
                return Err(ViewerError::NotPreviewing);
            }
            if !inner.secondary.is_ready() {
                return Err(ViewerError::SurfaceNotReady);
            }
            (inner.generation, inner.secondary.page_count())
        };

        let mut builder = CompositeBuilder::default();
        for page in 1..=page_count {
            if !self.page_stagger.is_zero() {
                tokio::time::sleep(self.page_stagger * page).await;
            }

            let exported = {
                let inner = self.inner.lock();
                if inner.generation != ticket {
                    return Err(ViewerError::NotPreviewing);
                }
                inner.secondary.export_page_image(page)
            };

            let pushed = match exported {
                Ok(bytes) => builder.push_png(page, &bytes).map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            if let Err(reason) = pushed {
                warn!(page, "skipping page in composite: {}", reason);
            }
        }

        let composite = builder.finish()?;
        debug!(
            width = composite.width,
            height = composite.height,
            pages = ?composite.pages,
            "rasterized preview"
        );
        Ok(composite)
    }
}
