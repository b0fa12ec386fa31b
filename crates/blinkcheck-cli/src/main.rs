use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod config;
mod count;
mod framediff;
mod merge;
mod scores;
mod selection;

/// Eye-blink anti-spoofing pipeline: per-frame eye/face differences,
/// blink scores, blink counts, and merged 5-column result files.
#[derive(Parser)]
#[command(name = "blinkcheck", version, about)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute normalized eye/face frame differences for every video.
    Framediff(framediff::Args),
    /// Turn feature series into blink score series.
    Scores(scores::Args),
    /// Count blink events in every score series.
    Count(count::Args),
    /// Calibrate a threshold and merge blink counts into 5-column files.
    Merge(merge::Args),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = config::Config::from_env();

    match cli.command {
        Command::Framediff(args) => framediff::run(args, &config),
        Command::Scores(args) => scores::run(args, &config),
        Command::Count(args) => count::run(args, &config),
        Command::Merge(args) => merge::run(args, &config),
    }
}
