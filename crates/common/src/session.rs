//! Editing actions on the primary surface: new, open, save/export.
//!
//! Anything that puts fresh content into the editor clears its read-only
//! flag; only a confirmed restore from the version viewer sets it.

use tracing::{info, warn};

use std::sync::Arc;

use crate::document::{ContentKind, DocumentContent, ObjectName};
use crate::store::MemoryVersionStore;
use crate::surface::{DocumentSurface, MemorySurface, SurfaceError};
use crate::viewer::VersionViewer;

/// A document serialized for download or upload.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalExport {
    pub file_name: String,
    pub mime: &'static str,
    pub kind: ContentKind,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid local file: {0}")]
    InvalidLocalFile(String),
    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),
}

/// The editor a user works in, plus its version history.
#[derive(Debug)]
pub struct EditorSession<P, S> {
    viewer: VersionViewer<P, S>,
}

impl<P: DocumentSurface> EditorSession<P, MemorySurface> {
    /// A session over `primary` alone, with no stored history behind it.
    pub fn local(primary: P) -> Self {
        let viewer = VersionViewer::new(
            Arc::new(MemoryVersionStore::new()),
            "",
            primary,
            MemorySurface::ready(),
        );
        Self::new(viewer)
    }
}

impl<P: DocumentSurface, S: DocumentSurface> EditorSession<P, S> {
    pub fn new(viewer: VersionViewer<P, S>) -> Self {
        Self { viewer }
    }

    pub fn viewer(&self) -> &VersionViewer<P, S> {
        &self.viewer
    }

    /// Start over with a blank, editable document.
    pub fn new_document(&self) -> Result<(), SessionError> {
        self.replace_primary(DocumentContent::blank())
    }

    /// Open a user-picked `.sfdt` or `.json` file.
    ///
    /// The editor is left untouched if the file is rejected.
    pub fn open_local(&self, file_name: &str, bytes: &[u8]) -> Result<(), SessionError> {
        if ContentKind::from_file_name(file_name).is_none() {
            warn!(file = %file_name, "rejected local file with unsupported extension");
            return Err(SessionError::InvalidLocalFile(format!(
                "{} is neither a .sfdt nor a .json file",
                file_name
            )));
        }
        let content = DocumentContent::decode(bytes).map_err(|e| {
            warn!(file = %file_name, "rejected local file: {}", e);
            SessionError::InvalidLocalFile(format!("{}: {}", file_name, e))
        })?;

        self.replace_primary(content)?;
        info!(file = %file_name, "opened local file");
        Ok(())
    }

    /// Serialize the editor as `<name>.<ext>` with the kind's MIME type.
    pub fn export_local(&self, name: &ObjectName, kind: ContentKind) -> LocalExport {
        let content = self.viewer.with_primary(|primary| primary.serialize());
        LocalExport {
            file_name: name.object_key(kind),
            mime: kind.export_mime(),
            kind,
            bytes: content.encode(),
        }
    }

    /// Quick save: `Document.sfdt`.
    pub fn save(&self) -> LocalExport {
        self.export_local(&ObjectName::default(), ContentKind::StructuredDocument)
    }

    pub fn is_read_only(&self) -> bool {
        self.viewer.with_primary(|primary| primary.is_read_only())
    }

    fn replace_primary(&self, content: DocumentContent) -> Result<(), SessionError> {
        self.viewer.with_primary(|primary| -> Result<(), SessionError> {
            primary.open(content)?;
            primary.set_read_only(false);
            Ok(())
        })
    }
}
