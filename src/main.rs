mod cli;
mod commands;

use batchbox::config::Config;
use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = match cli.config.clone() {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    let report = match cli.command {
        Commands::Download(args) => commands::download(config, args).await?,
        Commands::Classify(args) => commands::classify(config, args).await?,
    };

    if !report.is_clean() {
        std::process::exit(1);
    }

    Ok(())
}
