use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

pub const APP_NAME: &str = "docvault";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const LOGS_DIR_NAME: &str = "logs";

pub const DEFAULT_BROKER_PORT: u16 = 3002;
pub const DEFAULT_OBJECT_KEY: &str = "document.json";
pub const DEFAULT_GRANT_TTL_SECS: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port the credential broker listens on
    #[serde(default = "default_broker_port")]
    pub broker_port: u16,
    /// Broker the CLI talks to (defaults to localhost on `broker_port`)
    #[serde(default)]
    pub broker_url: Option<Url>,
    /// Lifetime of an issued write grant, in seconds
    #[serde(default = "default_grant_ttl_secs")]
    pub grant_ttl_secs: u64,
    /// Object whose history the version commands browse
    #[serde(default = "default_object_key")]
    pub object_key: String,
    /// Where documents live. Credentials are never written here.
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_broker_port() -> u16 {
    DEFAULT_BROKER_PORT
}

fn default_grant_ttl_secs() -> u64 {
    DEFAULT_GRANT_TTL_SECS
}

fn default_object_key() -> String {
    DEFAULT_OBJECT_KEY.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            broker_port: default_broker_port(),
            broker_url: None,
            grant_ttl_secs: default_grant_ttl_secs(),
            object_key: default_object_key(),
            storage: StorageConfig::default(),
        }
    }
}

/// Non-secret bucket coordinates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket name (S3_BUCKET_NAME overrides)
    #[serde(default)]
    pub bucket: Option<String>,
    /// Region (AWS_REGION overrides)
    #[serde(default)]
    pub region: Option<String>,
    /// Custom S3-compatible endpoint, e.g. "http://localhost:9000" for MinIO
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the docvault directory (~/.docvault)
    pub docvault_dir: PathBuf,
    /// Path to the log directory
    pub logs_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the docvault directory path (custom or default ~/.docvault)
    pub fn docvault_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new docvault state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let docvault_dir = Self::docvault_dir(custom_path)?;

        if docvault_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&docvault_dir)?;

        let logs_path = docvault_dir.join(LOGS_DIR_NAME);
        fs::create_dir_all(&logs_path)?;

        let config = config.unwrap_or_default();
        let config_path = docvault_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        Ok(Self {
            docvault_dir,
            logs_path,
            config_path,
            config,
        })
    }

    /// Load existing state from the docvault directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let docvault_dir = Self::docvault_dir(custom_path)?;

        if !docvault_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let logs_path = docvault_dir.join(LOGS_DIR_NAME);
        let config_path = docvault_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            docvault_dir,
            logs_path,
            config_path,
            config,
        })
    }

    /// Load the state if it exists, otherwise fall back to defaults.
    pub fn load_or_default(custom_path: Option<PathBuf>) -> Result<AppConfig, StateError> {
        match Self::load(custom_path) {
            Ok(state) => Ok(state.config),
            Err(StateError::NotInitialized) => Ok(AppConfig::default()),
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("docvault directory not initialized. Run 'docvault init' first")]
    NotInitialized,

    #[error("docvault directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_then_load() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("dv");

        let config = AppConfig {
            broker_port: 4100,
            storage: StorageConfig {
                bucket: Some("docs".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let state = AppState::init(Some(dir.clone()), Some(config)).unwrap();
        assert!(state.config_path.exists());
        assert!(state.logs_path.is_dir());

        let loaded = AppState::load(Some(dir.clone())).unwrap();
        assert_eq!(loaded.config.broker_port, 4100);
        assert_eq!(loaded.config.object_key, DEFAULT_OBJECT_KEY);
        assert_eq!(loaded.config.storage.bucket.as_deref(), Some("docs"));

        assert!(matches!(
            AppState::init(Some(dir), None),
            Err(StateError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "broker_port = 9000\n").unwrap();

        let state = AppState::load(Some(temp.path().to_path_buf())).unwrap();
        assert_eq!(state.config.broker_port, 9000);
        assert_eq!(state.config.grant_ttl_secs, DEFAULT_GRANT_TTL_SECS);
        assert!(state.config.storage.endpoint.is_none());
    }

    #[test]
    fn test_missing_dir_falls_back_to_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let config = AppState::load_or_default(Some(temp.path().join("absent"))).unwrap();
        assert_eq!(config.broker_port, DEFAULT_BROKER_PORT);
    }
}
