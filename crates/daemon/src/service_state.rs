use std::sync::Arc;

use common::grant::CredentialBroker;
use object_store::{S3StoreError, S3VersionStore};

use crate::ServiceConfig;

/// Shared state behind every broker request.
#[derive(Debug, Clone)]
pub struct State {
    broker: CredentialBroker,
}

impl State {
    pub fn new(broker: CredentialBroker) -> Self {
        Self { broker }
    }

    /// Build the S3-backed broker. Fails fast on a missing bucket or bad
    /// credentials.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self, StateSetupError> {
        let store = S3VersionStore::new(&config.s3)?;
        tracing::debug!(bucket = %store.bucket(), "verifying bucket");
        store.verify_bucket().await?;
        tracing::info!(
            bucket = %store.bucket(),
            ttl_secs = config.grant_ttl.as_secs(),
            "credential broker ready"
        );

        let broker = CredentialBroker::new(Arc::new(store)).with_ttl(config.grant_ttl);
        Ok(Self::new(broker))
    }

    pub fn broker(&self) -> &CredentialBroker {
        &self.broker
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("storage setup failed: {0}")]
    Storage(#[from] S3StoreError),
}
