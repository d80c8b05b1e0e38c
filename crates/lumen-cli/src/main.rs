mod commands;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lumen", about = "Video contrast-enhancement quality benchmark")]
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
    /// Enhance, denoise and score every video of a folder
    Run(commands::run::RunArgs),
    /// Enhance and denoise a single image
    Enhance(commands::enhance::EnhanceArgs),
    /// Print MSE and PSNR between two images
    Compare(commands::compare::CompareArgs),
    /// Save intensity histogram charts for every image of a folder
    Histogram(commands::histogram::HistogramArgs),
    /// Print or save the default pipeline config as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Enhance(args) => commands::enhance::run(args),
        Commands::Compare(args) => commands::compare::run(args),
        Commands::Histogram(args) => commands::histogram::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
