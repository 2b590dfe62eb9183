use std::fmt;

use super::{DocumentSurface, ReadyCallback, SurfaceError, SurfaceState};
use crate::document::DocumentContent;

/// What a headless surface hands back when asked for a page image.
#[derive(Debug, Clone)]
pub enum PageRender {
    Png(Vec<u8>),
    Fail(String),
}

/// Headless surface holding a document in memory.
///
/// Page images are scripted up front since there is no layout engine
/// behind it.
pub struct MemorySurface {
    state: SurfaceState,
    content: DocumentContent,
    read_only: bool,
    pages: Vec<PageRender>,
    ready_callbacks: Vec<ReadyCallback>,
}

impl MemorySurface {
    /// A surface that is already initialized.
    pub fn ready() -> Self {
        Self {
            state: SurfaceState::Ready,
            ..Self::initializing()
        }
    }

    /// A surface still waiting on its widget to come up.
    pub fn initializing() -> Self {
        Self {
            state: SurfaceState::Initializing,
            content: DocumentContent::blank(),
            read_only: false,
            pages: Vec::new(),
            ready_callbacks: Vec::new(),
        }
    }

    pub fn with_content(mut self, content: DocumentContent) -> Self {
        self.content = content;
        self
    }

    pub fn with_pages(mut self, pages: Vec<PageRender>) -> Self {
        self.pages = pages;
        self
    }

    /// Transition to ready and run any queued callbacks.
    pub fn mark_ready(&mut self) {
        if self.state != SurfaceState::Initializing {
            return;
        }
        self.state = SurfaceState::Ready;
        for callback in self.ready_callbacks.drain(..) {
            callback();
        }
    }

    pub fn teardown(&mut self) {
        self.state = SurfaceState::TornDown;
        self.ready_callbacks.clear();
    }
}

impl fmt::Debug for MemorySurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySurface")
            .field("state", &self.state)
            .field("read_only", &self.read_only)
            .field("pages", &self.pages.len())
            .finish()
    }
}

impl DocumentSurface for MemorySurface {
    fn state(&self) -> SurfaceState {
        self.state
    }

    fn on_ready(&mut self, callback: ReadyCallback) {
        match self.state {
            SurfaceState::Ready => callback(),
            SurfaceState::Initializing => self.ready_callbacks.push(callback),
            SurfaceState::TornDown => {}
        }
    }

    fn open(&mut self, content: DocumentContent) -> Result<(), SurfaceError> {
        if self.state == SurfaceState::TornDown {
            return Err(SurfaceError::NotReady);
        }
        self.content = content;
        Ok(())
    }

    fn serialize(&self) -> DocumentContent {
        self.content.clone()
    }

    fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn export_page_image(&self, page: u32) -> Result<Vec<u8>, SurfaceError> {
        if !self.is_ready() {
            return Err(SurfaceError::NotReady);
        }
        let index = page
            .checked_sub(1)
            .ok_or(SurfaceError::PageOutOfRange(page))? as usize;
        match self.pages.get(index) {
            Some(PageRender::Png(bytes)) => Ok(bytes.clone()),
            Some(PageRender::Fail(reason)) => Err(SurfaceError::Export {
                page,
                reason: reason.clone(),
            }),
            None => Err(SurfaceError::PageOutOfRange(page)),
        }
    }
}
