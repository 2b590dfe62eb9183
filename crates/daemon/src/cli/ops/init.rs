use clap::Args;

use docvault_daemon::state::{
    AppConfig, AppState, StorageConfig, DEFAULT_BROKER_PORT, DEFAULT_GRANT_TTL_SECS,
    DEFAULT_OBJECT_KEY,
};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Port for the credential broker
    #[arg(long, default_value_t = DEFAULT_BROKER_PORT)]
    pub broker_port: u16,

    /// Lifetime of issued write grants, in seconds
    #[arg(long, default_value_t = DEFAULT_GRANT_TTL_SECS)]
    pub grant_ttl: u64,

    /// Object whose history `versions`, `cat` and `restore` browse
    #[arg(long, default_value = DEFAULT_OBJECT_KEY)]
    pub object_key: String,

    /// Bucket holding the documents
    #[arg(long)]
    pub bucket: Option<String>,

    /// Region of the bucket
    #[arg(long)]
    pub region: Option<String>,

    /// Custom S3-compatible endpoint (e.g. http://localhost:9000)
    #[arg(long)]
    pub endpoint: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("state error: {0}")]
    StateError(#[from] docvault_daemon::state::StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            broker_port: self.broker_port,
            broker_url: None,
            grant_ttl_secs: self.grant_ttl,
            object_key: self.object_key.clone(),
            storage: StorageConfig {
                bucket: self.bucket.clone(),
                region: self.region.clone(),
                endpoint: self.endpoint.clone(),
            },
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let mut output = format!(
            "Initialized docvault directory at: {}\n  broker port: {}\n  grant ttl:   {}s\n  object key:  {}",
            state.docvault_dir.display(),
            state.config.broker_port,
            state.config.grant_ttl_secs,
            state.config.object_key,
        );
        if let Some(bucket) = &state.config.storage.bucket {
            output.push_str(&format!("\n  bucket:      {}", bucket));
        }
        output.push_str("\nCredentials are read from AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY.");

        Ok(output)
    }
}
