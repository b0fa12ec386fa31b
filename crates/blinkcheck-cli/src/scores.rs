//! `blinkcheck scores` — blink score series from feature series.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use rayon::prelude::*;

use blinkcheck_core::score_series;
use blinkcheck_db::Database;

use crate::config::Config;
use crate::selection::Selection;

#[derive(clap::Args, Debug)]
pub struct Args {
    /// Directory containing the feature series to score.
    #[arg(long)]
    pub inputdir: Option<PathBuf>,

    /// Output directory for the score series.
    #[arg(long)]
    pub outputdir: Option<PathBuf>,

    #[command(flatten)]
    pub selection: Selection,
}

pub fn run(args: Args, config: &Config) -> Result<()> {
    let inputdir = args
        .inputdir
        .unwrap_or_else(|| config.framediff_dir.clone());
    let outputdir = args.outputdir.unwrap_or_else(|| config.scores_dir.clone());

    let db = Database::open(&inputdir)?;
    let entries = args.selection.everything(&db);
    if entries.is_empty() {
        bail!("selection matched no videos under {}", inputdir.display());
    }
    tracing::info!(videos = entries.len(), "scoring feature series");

    let failures = entries
        .par_iter()
        .filter(|entry| {
            let result = (|| -> Result<()> {
                let features = blinkcheck_db::load_features(&entry.series_path(db.root()))
                    .context("loading feature series")?;
                let scores = score_series(&features);
                blinkcheck_db::save_scores(&entry.series_path(&outputdir), &scores)
                    .context("saving score series")?;
                tracing::debug!(video = %entry.stem.display(), frames = scores.len(), "scored");
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
