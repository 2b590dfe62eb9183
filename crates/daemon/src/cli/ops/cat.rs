use std::sync::Arc;

use clap::Args;

use common::prelude::{ContentFetcher, FetchError, RevisionId};
use docvault_daemon::state::AppState;
use object_store::{S3StoreError, S3VersionStore};

use crate::cli::storage::{StorageArgs, StorageArgsError};

/// Print one stored revision of the document.
#[derive(Args, Debug, Clone)]
pub struct Cat {
    /// Version id as listed by `versions`
    pub version_id: String,

    /// Object key to read (default from config)
    #[arg(long)]
    pub key: Option<String>,

    #[command(flatten)]
    pub storage: StorageArgs,
}

#[derive(Debug, thiserror::Error)]
pub enum CatError {
    #[error("state error: {0}")]
    StateError(#[from] docvault_daemon::state::StateError),
    #[error(transparent)]
    Storage(#[from] StorageArgsError),
    #[error("storage error: {0}")]
    Store(#[from] S3StoreError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("could not render document: {0}")]
    Render(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Cat {
    type Error = CatError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppState::load_or_default(ctx.config_path.clone())?;
        let key = self.key.clone().unwrap_or(config.object_key.clone());
        let store = S3VersionStore::new(&self.storage.resolve(&config)?)?;

        let fetcher = ContentFetcher::new(Arc::new(store));
        let content = fetcher
            .fetch_revision_content(&key, &RevisionId::new(self.version_id.clone()))
            .await?;

        Ok(serde_json::to_string_pretty(content.tree())?)
    }
}
