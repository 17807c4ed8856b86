use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};

mod cli;
mod core;
mod config;
mod error;

use cli::Cli;
use config::Config;
use crate::core::{Engine, FileLogger};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting Readsmith v{}", env!("CARGO_PKG_VERSION"));

    // Configuration problems are fatal before any filesystem work happens
    let config = match Config::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("❌ {}", err);
            std::process::exit(1);
        }
    };
    if let Err(err) = config.validate() {
        eprintln!("❌ {}", err);
        std::process::exit(1);
    }

    let engine = Engine::new(config).await?;

    // Execute the requested command; unexpected failures land in the
    // persistent error log before the process exits nonzero
    if let Err(err) = cli.execute(engine).await {
        eprintln!("💥 Unhandled top-level error: {:#}", err);
        FileLogger::new()
            .error(&format!("{:#}", err), "Top-level failure")
            .await;
        return Err(err);
    }

    Ok(())
}
