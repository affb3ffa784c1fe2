//! Main entry point for Concierge.

use anyhow::{Context, Result};
use clap::Parser;
use concierge_bot::ConciergeBot;
use concierge_common::logging::{init_logging, LogFormat, LoggingConfig};
use concierge_config::{Config, ConfigLoader};
use std::path::PathBuf;
use tracing::{error, info};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "CONCIERGE_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Log level, overriding the configuration
    #[arg(short, long)]
    log_level: Option<String>,

    /// Data directory, overriding the configuration
    #[arg(short, long)]
    data_dir: Option<String>,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_config(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ConfigLoader::load().context("failed to load configuration")?,
    };

    if let Some(level) = &args.log_level {
        config.logging.level.clone_from(level);
    }
    if let Some(dir) = &args.data_dir {
        config.storage.data_dir.clone_from(dir);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    let _guard = init_logging(&LoggingConfig {
        level: config.logging.level.clone(),
        format: LogFormat::from_name(&config.logging.format),
        file_path: config.logging.file.clone(),
        ..LoggingConfig::default()
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    info!("Starting Concierge v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded successfully");

    let bot = ConciergeBot::new(config);
    if let Err(e) = bot.start().await {
        error!("Bot failed to start: {}", e);
        return Err(e.into());
    }

    Ok(())
}
