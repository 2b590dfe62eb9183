//! Short-lived, single-object write authorizations.
//!
//! The browser never sees storage credentials. It asks the broker for a
//! grant naming one object and one content kind, and receives a presigned
//! `PUT` URL that stops working shortly afterwards.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use url::Url;

use crate::document::{ContentKind, ObjectName};

/// How long an issued grant stays usable.
pub const DEFAULT_GRANT_TTL: Duration = Duration::from_secs(60);

/// The only method a grant authorizes.
pub const GRANT_METHOD: &str = "PUT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteGrant {
    pub url: Url,
    pub object_key: String,
    pub content_type: String,
    pub method: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl WriteGrant {
    pub fn is_expired_at(&self, at: DateTime<Utc>) -> bool {
        at >= self.expires_at
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SignError {
    #[error("storage credentials unavailable: {0}")]
    MissingCredentials(String),
    #[error("storage service unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum GrantError {
    #[error("grant issuance failed: {0}")]
    GrantIssuanceFailed(#[from] SignError),
}

/// Something that can presign an upload for a single object.
#[async_trait]
pub trait GrantSigner: Send + Sync + std::fmt::Debug {
    /// Presign a `PUT` of `object_key` valid for `expires_in`.
    async fn sign_put(
        &self,
        object_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<Url, SignError>;

    /// Cheap check that signing can currently succeed.
    async fn check(&self) -> Result<(), SignError> {
        Ok(())
    }
}

/// Issues [`WriteGrant`]s through a [`GrantSigner`].
#[derive(Debug, Clone)]
pub struct CredentialBroker {
    signer: Arc<dyn GrantSigner>,
    ttl: Duration,
}

impl CredentialBroker {
    pub fn new(signer: Arc<dyn GrantSigner>) -> Self {
        Self {
            signer,
            ttl: DEFAULT_GRANT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn signer(&self) -> &Arc<dyn GrantSigner> {
        &self.signer
    }

    pub async fn issue_write_grant(
        &self,
        name: &ObjectName,
        kind: ContentKind,
    ) -> Result<WriteGrant, GrantError> {
        let object_key = name.object_key(kind);
        let content_type = kind.grant_mime();

        let issued_at = Utc::now();
        let url = self
            .signer
            .sign_put(&object_key, content_type, self.ttl)
            .await
            .map_err(|e| {
                error!(key = %object_key, "failed to sign upload: {}", e);
                e
            })?;
        let expires_at = issued_at
            + chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::seconds(60));

        info!(key = %object_key, content_type = %content_type, expires_at = %expires_at, "issued write grant");
        debug!(url = %url, "presigned url");

        Ok(WriteGrant {
            url,
            object_key,
            content_type: content_type.to_string(),
            method: GRANT_METHOD.to_string(),
            issued_at,
            expires_at,
        })
    }
}
