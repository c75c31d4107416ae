//! irkey-c64 command line

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use irkey_c64::Config;
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config_path = cli.config.unwrap_or_else(Config::default_path);
    info!("Loading config from {:?}", config_path);
    let config = Config::load(&config_path)?;

    match cli.command {
        Commands::Replay { capture, dump } => commands::replay::run(&config, &capture, dump),
        Commands::Decode { pulses } => commands::frame::decode(&config, &pulses),
        Commands::Encode { event } => commands::frame::encode(event),
        Commands::Keymap { format } => commands::keymap::print(&config, format),
    }
}
