use std::time::Duration;

use clap::Args;

use docvault_daemon::state::AppState;
use docvault_daemon::{spawn_service, ServiceConfig, ServiceError};

use crate::cli::storage::{StorageArgs, StorageArgsError};

#[derive(Args, Debug, Clone)]
pub struct Broker {
    /// Override broker port (default from config)
    #[arg(long)]
    pub port: Option<u16>,

    /// Override grant lifetime in seconds (default from config)
    #[arg(long)]
    pub grant_ttl: Option<u64>,

    /// Directory for log files (defaults to the logs/ dir next to config.toml)
    #[arg(long)]
    pub log_dir: Option<std::path::PathBuf>,

    #[command(flatten)]
    pub storage: StorageArgs,
}

#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("state error: {0}")]
    StateError(#[from] docvault_daemon::state::StateError),

    #[error(transparent)]
    Storage(#[from] StorageArgsError),

    #[error("broker failed: {0}")]
    Service(#[from] ServiceError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Broker {
    type Error = BrokerError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        // An uninitialized directory is fine; flags and env carry everything.
        let (config, default_logs) = match AppState::load(ctx.config_path.clone()) {
            Ok(state) => (state.config, Some(state.logs_path)),
            Err(docvault_daemon::state::StateError::NotInitialized) => (Default::default(), None),
            Err(e) => return Err(e.into()),
        };

        let service_config = ServiceConfig {
            s3: self.storage.resolve(&config)?,
            grant_ttl: Duration::from_secs(self.grant_ttl.unwrap_or(config.grant_ttl_secs)),
            broker_port: self.port.unwrap_or(config.broker_port),
            log_level: tracing::Level::INFO,
            log_dir: self.log_dir.clone().or(default_logs),
        };

        spawn_service(&service_config).await?;
        Ok("broker ended".to_string())
    }
}
