// CLI modules
mod cli;

use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Broker, Cat, Grant, Health, Init, Restore, Upload, Version, Versions};

command_enum! {
    (Broker, Broker),
    (Cat, Cat),
    (Grant, Grant),
    (Health, Health),
    (Init, Init),
    (Restore, Restore),
    (Upload, Upload),
    (Version, Version),
    (Versions, Versions),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Resolve broker URL: explicit flag > config broker_url > config broker_port > 3002
    let remote = cli::op::resolve_remote(args.remote, args.config_path.clone());

    let ctx = match cli::op::OpContext::new(remote, args.config_path) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: Failed to create API client: {}", e);
            std::process::exit(1);
        }
    };

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
