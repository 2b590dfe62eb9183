use std::error::Error;
use std::path::PathBuf;

use url::Url;

use docvault_daemon::http_server::api::client::{ApiClient, ApiError};
use docvault_daemon::state::{AppState, DEFAULT_BROKER_PORT};

/// Resolve the broker URL for the API client.
///
/// Priority: explicit `--remote` flag > config `broker_url` > config `broker_port` > 3002.
pub fn resolve_remote(explicit: Option<Url>, config_path: Option<PathBuf>) -> Url {
    if let Some(url) = explicit {
        return url;
    }
    let port = match AppState::load(config_path) {
        Ok(state) => {
            if let Some(url) = state.config.broker_url {
                return url;
            }
            state.config.broker_port
        }
        Err(_) => DEFAULT_BROKER_PORT,
    };
    localhost(port)
}

fn localhost(port: u16) -> Url {
    let mut url = Url::parse("http://localhost").expect("hardcoded URL must parse");
    // http URLs always accept a port
    let _ = url.set_port(Some(port));
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_remote_explicit_wins() {
        let explicit = Url::parse("http://example.com:9999").unwrap();
        let result = resolve_remote(Some(explicit.clone()), None);
        assert_eq!(result, explicit);
    }

    #[test]
    fn test_resolve_remote_falls_back_to_default() {
        let result = resolve_remote(None, Some(PathBuf::from("/nonexistent")));
        assert_eq!(result.as_str(), "http://localhost:3002/");
    }

    #[test]
    fn test_resolve_remote_from_config() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(
            temp.path().join("config.toml"),
            "broker_port = 4400\n",
        )
        .unwrap();
        let result = resolve_remote(None, Some(temp.path().to_path_buf()));
        assert_eq!(result.port(), Some(4400));

        std::fs::write(
            temp.path().join("config.toml"),
            "broker_url = \"https://broker.example.com/\"\n",
        )
        .unwrap();
        let result = resolve_remote(None, Some(temp.path().to_path_buf()));
        assert_eq!(result.as_str(), "https://broker.example.com/");
    }
}

#[derive(Clone)]
pub struct OpContext {
    /// API client pointed at the broker
    pub client: ApiClient,
    /// Optional custom config path (defaults to ~/.docvault)
    pub config_path: Option<PathBuf>,
}

impl OpContext {
    /// Create context with custom remote URL and optional config path
    pub fn new(remote: Url, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        Ok(Self {
            client: ApiClient::new(&remote)?,
            config_path,
        })
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
