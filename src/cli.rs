use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "batchbox")]
#[command(about = "Concurrent batch downloader and log classifier", long_about = None)]
pub struct Cli {
    /// Path to the configuration file (default: config/batchbox.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download every given URL concurrently into a local directory
    Download(DownloadArgs),
    /// Classify every log file in a directory by bracketed severity tag
    Classify(ClassifyArgs),
}

#[derive(clap::Args, Debug)]
pub struct DownloadArgs {
    /// URLs to download
    pub urls: Vec<String>,

    /// File with one URL per line ('#' lines are skipped)
    #[arg(long)]
    pub list: Option<PathBuf>,

    /// Output directory (overrides config)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ClassifyArgs {
    /// Directory holding the .log files to classify (overrides config)
    #[arg(long)]
    pub source_dir: Option<PathBuf>,

    /// Directory for the per-severity category files (overrides config)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}
