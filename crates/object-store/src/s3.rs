//! Versioned S3 bucket behind the catalog, fetcher and broker seams.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use common::grant::{GrantSigner, SignError};
use common::revision::RevisionId;
use common::store::{PageCursor, StoreError, VersionPage, VersionStore};
use object_store::aws::{AmazonS3, AmazonS3Builder, AwsAuthorizer};
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use object_store::{GetOptions, ObjectStore};
use reqwest::{Client, Method};
use tracing::{debug, warn};
use url::Url;

use crate::config::S3Config;
use crate::error::{Result, S3StoreError};
use crate::listing::{list_url, parse_page};

/// A single S3 bucket with versioning enabled.
#[derive(Debug, Clone)]
pub struct S3VersionStore {
    store: Arc<AmazonS3>,
    client: Client,
    bucket_url: Url,
    bucket: String,
    region: String,
}

impl S3VersionStore {
    /// Build a store from configuration. No network calls are made.
    pub fn new(config: &S3Config) -> Result<Self> {
        config.validate()?;

        let mut builder = AmazonS3Builder::new()
            .with_access_key_id(&config.access_key)
            .with_secret_access_key(&config.secret_key)
            .with_bucket_name(&config.bucket)
            .with_region(&config.region)
            .with_allow_http(config.allow_http());
        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint);
        }
        let store = builder
            .build()
            .map_err(|e| S3StoreError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            store: Arc::new(store),
            client: Client::new(),
            bucket_url: config.bucket_url()?,
            bucket: config.bucket.clone(),
            region: config.region.clone(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Verify the bucket exists and the credentials can read it.
    pub async fn verify_bucket(&self) -> Result<()> {
        use futures::TryStreamExt;

        let prefix = ObjectPath::from("");
        let mut stream = self.store.list(Some(&prefix));
        match stream.try_next().await {
            Ok(_) => Ok(()),
            Err(object_store::Error::NotFound { .. }) => {
                Err(S3StoreError::BucketNotFound(self.bucket.clone()))
            }
            Err(e) => {
                let msg = e.to_string();
                if msg.contains("NoSuchBucket") {
                    return Err(S3StoreError::BucketNotFound(self.bucket.clone()));
                }
                Err(e.into())
            }
        }
    }

    /// Upload a new version of `key`. Mostly useful for seeding.
    pub async fn put(&self, key: &str, body: Bytes) -> Result<()> {
        self.store.put(&ObjectPath::from(key), body.into()).await?;
        Ok(())
    }

    async fn list_page(&self, key: &str, cursor: Option<&PageCursor>) -> Result<VersionPage> {
        let credential = self
            .store
            .credentials()
            .get_credential()
            .await
            .map_err(|e| S3StoreError::MissingCredentials(e.to_string()))?;

        let url = list_url(&self.bucket_url, key, cursor);
        let mut request = self.client.request(Method::GET, url).build()?;
        AwsAuthorizer::new(&credential, "s3", &self.region).authorize(&mut request, None);

        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            if body.contains("NoSuchBucket") {
                return Err(S3StoreError::BucketNotFound(self.bucket.clone()));
            }
            return Err(S3StoreError::HttpStatus { status, body });
        }

        parse_page(&body, key)
    }

    async fn get_pinned(&self, key: &str, version_id: &RevisionId) -> Result<Bytes> {
        let options = GetOptions {
            version: Some(version_id.as_str().to_string()),
            ..Default::default()
        };
        let result = self
            .store
            .get_opts(&ObjectPath::from(key), options)
            .await
            .map_err(|e| match e {
                object_store::Error::NotFound { .. } => {
                    S3StoreError::NotFound(format!("{}@{}", key, version_id))
                }
                other => other.into(),
            })?;
        Ok(result.bytes().await?)
    }
}

#[async_trait]
impl VersionStore for S3VersionStore {
    async fn list_versions(
        &self,
        key: &str,
        cursor: Option<&PageCursor>,
    ) -> std::result::Result<VersionPage, StoreError> {
        debug!(bucket = %self.bucket, key, "listing object versions");
        self.list_page(key, cursor).await.map_err(|e| {
            warn!(bucket = %self.bucket, key, "version listing failed: {}", e);
            e.into()
        })
    }

    async fn get_version(
        &self,
        key: &str,
        version_id: &RevisionId,
    ) -> std::result::Result<Bytes, StoreError> {
        debug!(bucket = %self.bucket, key, version = %version_id, "fetching object version");
        self.get_pinned(key, version_id).await.map_err(|e| {
            warn!(bucket = %self.bucket, key, version = %version_id, "version fetch failed: {}", e);
            e.into()
        })
    }
}

#[async_trait]
impl GrantSigner for S3VersionStore {
    async fn sign_put(
        &self,
        object_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> std::result::Result<Url, SignError> {
        // Presigning is local; only the credential lookup can fail.
        let url = self
            .store
            .signed_url(Method::PUT, &ObjectPath::from(object_key), expires_in)
            .await
            .map_err(|e| S3StoreError::MissingCredentials(e.to_string()))?;
        debug!(
            key = %object_key,
            content_type = %content_type,
            "presigned put covers host and key only, content type is not bound"
        );
        Ok(url)
    }

    async fn check(&self) -> std::result::Result<(), SignError> {
        self.store
            .credentials()
            .get_credential()
            .await
            .map_err(|e| SignError::MissingCredentials(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> S3VersionStore {
        S3VersionStore::new(&S3Config {
            endpoint: Some("http://localhost:9000".into()),
            region: "us-east-1".into(),
            bucket: "docs".into(),
            access_key: "minioadmin".into(),
            secret_key: "minioadmin".into(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_presigned_put_is_scoped_to_one_object() {
        let url = store()
            .sign_put("report.sfdt", "application/json", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(url.path(), "/docs/report.sfdt");
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.contains(&("X-Amz-Expires".into(), "60".into())));
        assert!(query.iter().any(|(k, _)| k == "X-Amz-Signature"));
        // the content type travels on the PUT itself
        assert!(query.contains(&("X-Amz-SignedHeaders".into(), "host".into())));
    }

    #[test]
    fn test_rejects_incomplete_config() {
        let err = S3VersionStore::new(&S3Config {
            endpoint: None,
            region: "us-east-1".into(),
            bucket: "docs".into(),
            access_key: String::new(),
            secret_key: String::new(),
        })
        .unwrap_err();
        assert!(matches!(err, S3StoreError::MissingCredentials(_)));
    }
}
