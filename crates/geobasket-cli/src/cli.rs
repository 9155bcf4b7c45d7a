use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "basket",
    version,
    about = "OGC layer discovery and batch extraction"
)]
pub struct Cli {
    /// Path to the basket configuration file (settings + service list)
    #[arg(long, global = true, default_value = "basket.toml")]
    pub config: PathBuf,

    /// Emit machine-readable JSON instead of human output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a discovery pass and print the selection tree
    Discover(DiscoverArgs),
    /// Discover layers and submit one batch extraction request
    Extract(ExtractArgs),
}

#[derive(Args)]
pub struct DiscoverArgs {
    /// Override the per-request timeout, in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(Args)]
pub struct ExtractArgs {
    /// Email address the extraction results are sent to
    pub email: String,

    /// Check every discovered layer before submitting
    #[arg(long)]
    pub all: bool,

    /// Override the batch submission endpoint
    #[arg(long)]
    pub batch_url: Option<String>,

    /// Override the per-request timeout, in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Build and print the payload without submitting it
    #[arg(long)]
    pub dry_run: bool,
}
