/**
 * Lists every stored revision of a document key,
 *  merging paginated provider responses.
 */
pub mod catalog;
/**
 * Document payloads, object names and the
 *  content kinds they are stored as.
 */
pub mod document;
/**
 * Pulls the bytes of a single pinned revision
 *  and decodes them into a document tree.
 */
pub mod fetcher;
/**
 * Short-lived, single-object write grants.
 *  Signing itself is delegated to a [`grant::GrantSigner`].
 */
pub mod grant;
/**
 * Revision metadata, ordering and
 *  time-range filtering.
 */
pub mod revision;
/**
 * New/open/save actions on the primary editor.
 */
pub mod session;
/**
 * The versioned object storage seam, plus an
 *  in-memory implementation.
 */
pub mod store;
/**
 * Capability trait for the editor widgets
 *  and a headless in-memory surface.
 */
pub mod surface;
pub mod testkit;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;
/**
 * Preview/confirm workflow over the version
 *  catalog, including page rasterization.
 */
pub mod viewer;

pub mod prelude {
    pub use crate::catalog::{CatalogError, VersionCatalog};
    pub use crate::document::{ContentKind, DocumentContent, ObjectName};
    pub use crate::fetcher::{ContentFetcher, FetchError};
    pub use crate::grant::{CredentialBroker, GrantError, GrantSigner, SignError, WriteGrant};
    pub use crate::revision::{CatalogEntry, Revision, RevisionId, TimeRange};
    pub use crate::session::{EditorSession, LocalExport, SessionError};
    pub use crate::store::{MemoryVersionStore, PageCursor, StoreError, VersionPage, VersionStore};
    pub use crate::surface::{DocumentSurface, MemorySurface, SurfaceError, SurfaceState};
    pub use crate::version::build_info;
    pub use crate::viewer::{
        CompositeImage, SelectOutcome, VersionViewer, ViewerError, ViewerPhase,
    };
}
