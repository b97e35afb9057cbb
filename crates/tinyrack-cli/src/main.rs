//! tinyrack CLI - offline rendering and configuration tools for the tinyrack
//! render core.

mod commands;
mod tone;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tinyrack")]
#[command(author, version, about = "tinyrack render core CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render test tones through the full engine into a WAV file
    Render(commands::render::RenderArgs),

    /// Show how tone generators are split across cores
    Partition(commands::partition::PartitionArgs),

    /// Validate boot configuration and performance files
    Check(commands::check::CheckArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Partition(args) => commands::partition::run(args),
        Commands::Check(args) => commands::check::run(args),
    }
}
