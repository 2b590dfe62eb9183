use clap::Args;

use docvault_daemon::state::AppConfig;
use object_store::{S3Config, DEFAULT_REGION};

/// Bucket coordinates and credentials, from flags or the environment.
///
/// Anything not given falls back to the `[storage]` table in config.toml.
/// Credentials only ever come from here.
#[derive(Args, Debug, Clone, Default)]
pub struct StorageArgs {
    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub access_key: Option<String>,

    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    #[arg(long, env = "S3_BUCKET_NAME")]
    pub bucket: Option<String>,

    /// Custom S3-compatible endpoint (e.g. http://localhost:9000)
    #[arg(long, env = "S3_ENDPOINT")]
    pub endpoint: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageArgsError {
    #[error("no bucket configured: pass --bucket, set S3_BUCKET_NAME or add it to config.toml")]
    MissingBucket,
    #[error("missing {0}: pass it as a flag or set it in the environment")]
    MissingCredential(&'static str),
}

impl StorageArgs {
    pub fn resolve(&self, config: &AppConfig) -> Result<S3Config, StorageArgsError> {
        let bucket = self
            .bucket
            .clone()
            .or_else(|| config.storage.bucket.clone())
            .ok_or(StorageArgsError::MissingBucket)?;
        let region = self
            .region
            .clone()
            .or_else(|| config.storage.region.clone())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        let endpoint = self
            .endpoint
            .clone()
            .or_else(|| config.storage.endpoint.clone());
        let access_key = self
            .access_key
            .clone()
            .ok_or(StorageArgsError::MissingCredential("AWS_ACCESS_KEY_ID"))?;
        let secret_key = self
            .secret_key
            .clone()
            .ok_or(StorageArgsError::MissingCredential("AWS_SECRET_ACCESS_KEY"))?;

        Ok(S3Config {
            endpoint,
            region,
            bucket,
            access_key,
            secret_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_daemon::state::StorageConfig;

    fn with_keys() -> StorageArgs {
        StorageArgs {
            access_key: Some("AKID".into()),
            secret_key: Some("secret".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_flags_override_config() {
        let config = AppConfig {
            storage: StorageConfig {
                bucket: Some("from-config".into()),
                region: Some("eu-west-1".into()),
                endpoint: Some("http://localhost:9000".into()),
            },
            ..Default::default()
        };
        let args = StorageArgs {
            bucket: Some("from-flag".into()),
            ..with_keys()
        };

        let s3 = args.resolve(&config).unwrap();
        assert_eq!(s3.bucket, "from-flag");
        assert_eq!(s3.region, "eu-west-1");
        assert_eq!(s3.endpoint.as_deref(), Some("http://localhost:9000"));
    }

    #[test]
    fn test_missing_bucket_and_keys() {
        let config = AppConfig::default();
        assert!(matches!(
            with_keys().resolve(&config),
            Err(StorageArgsError::MissingBucket)
        ));

        let args = StorageArgs {
            bucket: Some("docs".into()),
            access_key: Some("AKID".into()),
            ..Default::default()
        };
        assert!(matches!(
            args.resolve(&config),
            Err(StorageArgsError::MissingCredential("AWS_SECRET_ACCESS_KEY"))
        ));
    }

    #[test]
    fn test_region_defaults() {
        let args = StorageArgs {
            bucket: Some("docs".into()),
            ..with_keys()
        };
        let s3 = args.resolve(&AppConfig::default()).unwrap();
        assert_eq!(s3.region, DEFAULT_REGION);
    }
}
