use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::Args;

use common::prelude::{CatalogError, TimeRange, VersionCatalog};
use common::revision::{filter_by_range, format_size, format_timestamp};
use docvault_daemon::state::AppState;
use object_store::{S3StoreError, S3VersionStore};

use crate::cli::storage::{StorageArgs, StorageArgsError};

/// List every stored revision of the document, newest first.
#[derive(Args, Debug, Clone)]
pub struct Versions {
    /// Object key to list (default from config)
    #[arg(long)]
    pub key: Option<String>,

    /// Only revisions modified at or after this instant (RFC 3339)
    #[arg(long)]
    pub since: Option<DateTime<Utc>>,

    /// Only revisions modified at or before this instant (RFC 3339)
    #[arg(long)]
    pub until: Option<DateTime<Utc>>,

    #[command(flatten)]
    pub storage: StorageArgs,
}

#[derive(Debug, thiserror::Error)]
pub enum VersionsError {
    #[error("state error: {0}")]
    StateError(#[from] docvault_daemon::state::StateError),
    #[error(transparent)]
    Storage(#[from] StorageArgsError),
    #[error("storage error: {0}")]
    Store(#[from] S3StoreError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl Versions {
    fn range(&self) -> Option<TimeRange> {
        if self.since.is_none() && self.until.is_none() {
            return None;
        }
        Some(TimeRange::new(
            self.since.unwrap_or(DateTime::<Utc>::MIN_UTC),
            self.until.unwrap_or(DateTime::<Utc>::MAX_UTC),
        ))
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Versions {
    type Error = VersionsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppState::load_or_default(ctx.config_path.clone())?;
        let key = self.key.clone().unwrap_or(config.object_key.clone());
        let store = S3VersionStore::new(&self.storage.resolve(&config)?)?;

        let catalog = VersionCatalog::new(Arc::new(store));
        let revisions = catalog.list_revisions(&key).await?;
        let revisions = filter_by_range(&revisions, self.range().as_ref());

        if revisions.is_empty() {
            return Ok(format!("No versions of {} found", key));
        }

        let rows = revisions
            .iter()
            .map(|r| {
                format!(
                    "{}  {:>12}  {}",
                    format_timestamp(r.last_modified),
                    format_size(r.size),
                    r.version_id
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        Ok(format!("{} ({} versions)\n{}", key, revisions.len(), rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn versions(since: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Versions {
        Versions {
            key: None,
            since,
            until,
            storage: StorageArgs::default(),
        }
    }

    #[test]
    fn test_open_ended_range() {
        assert!(versions(None, None).range().is_none());

        let since = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let range = versions(Some(since), None).range().unwrap();
        assert!(range.contains(since));
        assert!(range.contains(Utc::now()));
        assert!(!range.contains(since - chrono::Duration::seconds(1)));
    }
}
