//! Capability interface over an embedded document editing widget.
//!
//! Any widget that can open, serialize, lock and rasterize a document can
//! sit behind [`DocumentSurface`]. The primary editor and the read-only
//! preview are both surfaces.

mod memory;

use crate::document::DocumentContent;

pub use memory::{MemorySurface, PageRender};

/// Lifecycle of a surface: created, usable, gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    Initializing,
    Ready,
    TornDown,
}

pub type ReadyCallback = Box<dyn FnOnce() + Send>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SurfaceError {
    #[error("document surface is not ready")]
    NotReady,
    #[error("page {0} is out of range")]
    PageOutOfRange(u32),
    #[error("failed to export page {page}: {reason}")]
    Export { page: u32, reason: String },
    #[error("surface rejected document: {0}")]
    Open(String),
}

pub trait DocumentSurface: Send + 'static {
    fn state(&self) -> SurfaceState;

    fn is_ready(&self) -> bool {
        self.state() == SurfaceState::Ready
    }

    /// Register a callback fired once the surface becomes ready.
    ///
    /// Fires immediately if the surface already is.
    fn on_ready(&mut self, callback: ReadyCallback);

    /// Replace the displayed document.
    fn open(&mut self, content: DocumentContent) -> Result<(), SurfaceError>;

    /// Snapshot of the displayed document.
    fn serialize(&self) -> DocumentContent;

    fn set_read_only(&mut self, read_only: bool);

    fn is_read_only(&self) -> bool;

    fn page_count(&self) -> u32;

    /// Render one page (1-based) as PNG bytes.
    fn export_page_image(&self, page: u32) -> Result<Vec<u8>, SurfaceError>;
}
