//! `blinkcheck count` — blink-count series from score series.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use rayon::prelude::*;

use blinkcheck_core::{count_blinks, ThresholdPolicy};
use blinkcheck_db::Database;

use crate::config::Config;
use crate::selection::Selection;

#[derive(clap::Args, Debug)]
pub struct Args {
    /// Directory containing the score series.
    #[arg(long)]
    pub inputdir: Option<PathBuf>,

    /// Output directory for the blink-count series.
    #[arg(long)]
    pub outputdir: Option<PathBuf>,

    #[command(flatten)]
    pub selection: Selection,

    /// Frames to skip after each detection (and at series start).
    #[arg(short = 'S', long, default_value_t = 10)]
    pub skip_frames: usize,

    /// Standard deviations above the running mean a score must reach.
    #[arg(short = 'T', long, default_value_t = 3.0)]
    pub threshold_ratio: f64,

    /// Use a fixed score threshold instead of the running statistics.
    #[arg(long, conflicts_with = "threshold_ratio")]
    pub threshold: Option<f64>,
}

pub fn run(args: Args, config: &Config) -> Result<()> {
    let inputdir = args.inputdir.clone().unwrap_or_else(|| config.scores_dir.clone());
    let outputdir = args.outputdir.clone().unwrap_or_else(|| config.blinks_dir.clone());

    let policy = match args.threshold {
        Some(threshold) => ThresholdPolicy::Fixed { threshold },
        None => ThresholdPolicy::Adaptive {
            std_ratio: args.threshold_ratio,
        },
    };

    let db = Database::open(&inputdir)?;
    let entries = args.selection.everything(&db);
    if entries.is_empty() {
        bail!("selection matched no videos under {}", inputdir.display());
    }
    tracing::info!(videos = entries.len(), ?policy, "counting blinks");

    let failures = entries
        .par_iter()
        .filter(|entry| {
            let result = (|| -> Result<()> {
                let scores = blinkcheck_db::load_scores(&entry.series_path(db.root()))
                    .context("loading score series")?;
                let counts = count_blinks(&scores, policy, args.skip_frames);
                let total = counts.last().copied().unwrap_or(0);
                blinkcheck_db::save_counts(&entry.series_path(&outputdir), &counts)
                    .context("saving count series")?;
                tracing::info!(video = %entry.stem.display(), blinks = total, "counted");
                Ok(())
            })();
            if let Err(err) = &result {
                tracing::error!(video = %entry.stem.display(), "video failed: {err:#}");
            }
            result.is_err()
        })
        .count();

    if failures > 0 {
        bail!("{failures} of {} videos failed", entries.len());
    }
    Ok(())
}
