use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use common::prelude::{
    ContentKind, EditorSession, MemorySurface, ObjectName, RevisionId, SelectOutcome,
    VersionViewer, ViewerError,
};
use common::document::ObjectNameError;
use docvault_daemon::state::AppState;
use object_store::{S3StoreError, S3VersionStore};

use crate::cli::storage::{StorageArgs, StorageArgsError};

/// Restore a stored revision and save it as a local file.
///
/// Runs the same preview and confirm steps as the editor, so a revision
/// that cannot be previewed is never written out.
#[derive(Args, Debug, Clone)]
pub struct Restore {
    /// Version id as listed by `versions`
    pub version_id: String,

    /// Directory to write the restored file into
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// File name without extension
    #[arg(long, default_value = "Document")]
    pub name: String,

    /// "json" to save as .json, anything else saves as .sfdt
    #[arg(long, default_value = "sfdt")]
    pub kind: ContentKind,

    /// Object key to restore from (default from config)
    #[arg(long)]
    pub key: Option<String>,

    #[command(flatten)]
    pub storage: StorageArgs,
}

#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    #[error("state error: {0}")]
    StateError(#[from] docvault_daemon::state::StateError),
    #[error(transparent)]
    Storage(#[from] StorageArgsError),
    #[error("storage error: {0}")]
    Store(#[from] S3StoreError),
    #[error(transparent)]
    Viewer(#[from] ViewerError),
    #[error("invalid file name: {0}")]
    Name(#[from] ObjectNameError),
    #[error("could not write {0}: {1}")]
    Write(PathBuf, std::io::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Restore {
    type Error = RestoreError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppState::load_or_default(ctx.config_path.clone())?;
        let key = self.key.clone().unwrap_or(config.object_key.clone());
        let name = ObjectName::new(self.name.clone())?;
        let store = S3VersionStore::new(&self.storage.resolve(&config)?)?;

        let viewer = VersionViewer::new(
            Arc::new(store),
            key,
            MemorySurface::ready(),
            MemorySurface::ready(),
        );
        let session = EditorSession::new(viewer);

        let revision = RevisionId::new(self.version_id.clone());
        session.viewer().open_catalog().await?;
        if session.viewer().select(&revision).await? == SelectOutcome::Superseded {
            // Nothing else drives this viewer, so there is no newer selection.
            return Err(ViewerError::NothingToConfirm.into());
        }
        let restored = session.viewer().confirm()?;
        session.viewer().close();

        let export = session.export_local(&name, self.kind);
        let path = self.out.join(&export.file_name);
        tokio::fs::write(&path, &export.bytes)
            .await
            .map_err(|e| RestoreError::Write(path.clone(), e))?;

        Ok(format!(
            "Restored {} to {} ({}, {} bytes)",
            restored,
            path.display(),
            export.mime,
            export.bytes.len()
        ))
    }
}
