pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "docvault")]
#[command(about = "Presigned uploads and version history for S3-backed documents")]
pub struct Args {
    /// Broker to talk to (defaults to localhost on the configured broker port)
    #[arg(long, global = true, env = "DOCVAULT_BROKER_URL")]
    pub remote: Option<Url>,

    /// Path to the docvault config directory (defaults to ~/.docvault)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
