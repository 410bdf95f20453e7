mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "motionseg", about = "Find the moving parts of a video")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show video source metadata
    Info(commands::info::InfoArgs),
    /// Score a video (or a score list) and write the motion segments
    Detect(commands::detect::DetectArgs),
    /// Translate saved segments into timeline or clip frame ranges
    Ranges(commands::ranges::RangesArgs),
    /// Print or save the default detection config as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Detect(args) => commands::detect::run(args),
        Commands::Ranges(args) => commands::ranges::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
