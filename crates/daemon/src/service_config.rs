use std::path::PathBuf;
use std::time::Duration;

use object_store::S3Config;

#[derive(Debug)]
pub struct Config {
    // storage configuration
    /// Bucket and credentials used to sign grants
    pub s3: S3Config,
    /// How long an issued grant stays valid
    pub grant_ttl: Duration,

    // http server configuration
    /// Port for the broker HTTP server
    pub broker_port: u16,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}
