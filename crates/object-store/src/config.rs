//! Connection settings for an S3-compatible bucket.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, S3StoreError};

pub const DEFAULT_REGION: &str = "us-east-1";

/// Configuration for the S3 backend (AWS S3, MinIO, etc.).
#[derive(Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// Custom endpoint (e.g., "http://localhost:9000" for MinIO).
    /// AWS is used when unset.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Region the bucket lives in
    #[serde(default = "default_region")]
    pub region: String,
    /// Bucket name
    pub bucket: String,
    /// Access key ID
    pub access_key: String,
    /// Secret access key
    pub secret_key: String,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

// Keep the secret out of logs
impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl S3Config {
    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            return Err(S3StoreError::InvalidConfig("bucket name is empty".into()));
        }
        if self.region.trim().is_empty() {
            return Err(S3StoreError::InvalidConfig("region is empty".into()));
        }
        if self.access_key.is_empty() || self.secret_key.is_empty() {
            return Err(S3StoreError::MissingCredentials(
                "access key id and secret access key are both required".into(),
            ));
        }
        if let Some(endpoint) = &self.endpoint {
            Url::parse(endpoint).map_err(|e| {
                S3StoreError::InvalidConfig(format!("bad endpoint {}: {}", endpoint, e))
            })?;
        }
        Ok(())
    }

    /// Plain http is only allowed against an explicit http endpoint.
    pub fn allow_http(&self) -> bool {
        self.endpoint
            .as_deref()
            .is_some_and(|e| e.starts_with("http://"))
    }

    /// Base URL of the bucket for requests made outside object_store.
    ///
    /// Path-style, matching what object_store signs.
    pub fn bucket_url(&self) -> Result<Url> {
        let endpoint = match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://s3.{}.amazonaws.com", self.region),
        };
        let raw = format!("{}/{}/", endpoint, self.bucket);
        Url::parse(&raw).map_err(|e| S3StoreError::InvalidConfig(format!("{}: {}", raw, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: Option<&str>) -> S3Config {
        S3Config {
            endpoint: endpoint.map(str::to_string),
            region: "eu-west-2".into(),
            bucket: "docs".into(),
            access_key: "AKIDEXAMPLE".into(),
            secret_key: "wJalrXUtnFEMI".into(),
        }
    }

    #[test]
    fn test_bucket_url() {
        assert_eq!(
            config(None).bucket_url().unwrap().as_str(),
            "https://s3.eu-west-2.amazonaws.com/docs/"
        );
        assert_eq!(
            config(Some("http://localhost:9000/")).bucket_url().unwrap().as_str(),
            "http://localhost:9000/docs/"
        );
    }

    #[test]
    fn test_allow_http_only_for_http_endpoints() {
        assert!(!config(None).allow_http());
        assert!(!config(Some("https://minio.internal")).allow_http());
        assert!(config(Some("http://localhost:9000")).allow_http());
    }

    #[test]
    fn test_validate() {
        assert!(config(None).validate().is_ok());

        let mut missing = config(None);
        missing.secret_key.clear();
        assert!(matches!(
            missing.validate(),
            Err(S3StoreError::MissingCredentials(_))
        ));

        let bad = config(Some("not a url"));
        assert!(matches!(bad.validate(), Err(S3StoreError::InvalidConfig(_))));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let shown = format!("{:?}", config(None));
        assert!(!shown.contains("wJalrXUtnFEMI"));
    }
}
