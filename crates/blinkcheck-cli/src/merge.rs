//! `blinkcheck merge` — calibrate a fixed blink threshold and merge
//! per-video counts into one 5-column text file per group.
//!
//! Every output line represents one video:
//! `client client client stem count` for genuine accesses,
//! `client client attack stem count` for attacks. The count is the final
//! value of the blink scan over the first `--number-of-scores` scores.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use blinkcheck_core::{blink_threshold, count_blinks, ThresholdPolicy, VideoSummary};
use blinkcheck_db::{Database, Group, Protocol, SupportFilter, VideoClass, VideoEntry};

use crate::config::Config;
use crate::selection::Selection;

#[derive(clap::Args, Debug)]
pub struct Args {
    /// Directory containing the score series.
    #[arg(long)]
    pub inputdir: Option<PathBuf>,

    /// Output directory for the 5-column files.
    #[arg(long)]
    pub outputdir: Option<PathBuf>,

    #[command(flatten)]
    pub selection: Selection,

    /// Number of leading scores summarized per video.
    #[arg(short = 'n', long, default_value_t = 220)]
    pub number_of_scores: usize,

    /// Frames to skip after each detection (and at series start).
    #[arg(short = 'S', long, default_value_t = 5)]
    pub skip_frames: usize,

    /// Where between the reference population's average score and its
    /// average peak the threshold sits (0 = average, 1 = peak).
    #[arg(short = 'T', long, default_value_t = 0.5)]
    pub threshold_ratio: f64,
}

pub fn run(args: Args, config: &Config) -> Result<()> {
    let inputdir = args.inputdir.clone().unwrap_or_else(|| config.scores_dir.clone());
    let outputdir = args.outputdir.clone().unwrap_or_else(|| config.merged_dir.clone());

    let db = Database::open(&inputdir)?;
    let threshold = calibrate(&db, args.threshold_ratio)?;
    tracing::info!(threshold, "blink threshold calibrated");

    std::fs::create_dir_all(&outputdir)
        .with_context(|| format!("creating output directory {}", outputdir.display()))?;

    for group in Group::ALL {
        write_group(&db, &args, group, threshold, &outputdir)?;
    }
    Ok(())
}

/// Derive the threshold from the train-group photo-protocol genuine
/// accesses: live enrollment-like footage under the simplest condition.
fn calibrate(db: &Database, ratio: f64) -> Result<f64> {
    let reference = db.videos(
        Protocol::Photo,
        SupportFilter::Both,
        &[Group::Train],
        &[VideoClass::Real],
    );

    let mut summaries = Vec::with_capacity(reference.len());
    for entry in &reference {
        let scores = blinkcheck_db::load_scores(&entry.series_path(db.root()))
            .context("loading reference score series")?;
        if let Some(summary) = VideoSummary::from_scores(&scores) {
            summaries.push(summary);
        }
    }

    match blink_threshold(&summaries, ratio) {
        Some(threshold) => Ok(threshold),
        None => bail!("no train-group real-access score series to calibrate from"),
    }
}

fn write_group(
    db: &Database,
    args: &Args,
    group: Group,
    threshold: f64,
    outputdir: &std::path::Path,
) -> Result<()> {
    let reals = db.videos(
        args.selection.protocol,
        args.selection.support,
        &[group],
        &[VideoClass::Real],
    );
    let attacks = db.videos(
        args.selection.protocol,
        args.selection.support,
        &[group],
        &[VideoClass::Attack],
    );

    let path = outputdir.join(format!("{group}-5col.txt"));
    let file =
        File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);

    let total = reals.len() + attacks.len();
    tracing::info!(%group, videos = total, "merging group");

    for &entry in &reals {
        let nb = final_count(db, args, entry, threshold)?;
        writeln!(
            out,
            "{id} {id} {id} {stem} {nb}",
            id = entry.client_id,
            stem = entry.stem.display()
        )?;
    }
    for &entry in &attacks {
        let nb = final_count(db, args, entry, threshold)?;
        writeln!(
            out,
            "{id} {id} attack {stem} {nb}",
            id = entry.client_id,
            stem = entry.stem.display()
        )?;
    }

    out.flush()
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn final_count(db: &Database, args: &Args, entry: &VideoEntry, threshold: f64) -> Result<u32> {
    let scores = blinkcheck_db::load_scores(&entry.series_path(db.root()))
        .with_context(|| format!("loading scores for {}", entry.stem.display()))?;
    let window = &scores[..scores.len().min(args.number_of_scores)];
    let counts = count_blinks(window, ThresholdPolicy::Fixed { threshold }, args.skip_frames);
    Ok(counts.last().copied().unwrap_or(0))
}
