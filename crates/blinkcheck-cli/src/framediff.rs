//! `blinkcheck framediff` — normalized eye/face frame differences for
//! every video in the database.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{bail, Context, Result};
use rayon::prelude::*;

use blinkcheck_core::{light, sequence_features};
use blinkcheck_db::{frame_annotations, load_landmarks, Database, VideoEntry};

use crate::config::Config;
use crate::selection::Selection;

#[derive(clap::Args, Debug)]
pub struct Args {
    /// Video database root (per-video frame directories).
    #[arg(long)]
    pub inputdir: Option<PathBuf>,

    /// Directory of flandmark annotation files.
    #[arg(long)]
    pub annotations: Option<PathBuf>,

    /// Output directory for the feature series.
    #[arg(long)]
    pub outputdir: Option<PathBuf>,

    #[command(flatten)]
    pub selection: Selection,

    /// Maximum eye-center displacement between consecutive frames, as a
    /// fraction of the eye-box width, before an eye is excluded.
    #[arg(short = 'M', long, default_value_t = 0.2)]
    pub max_displacement: f64,

    /// Skip the per-frame histogram lighting normalization.
    #[arg(long)]
    pub skip_light_normalize: bool,
}

pub fn run(args: Args, config: &Config) -> Result<()> {
    let inputdir = args
        .inputdir
        .clone()
        .unwrap_or_else(|| config.database_dir.clone());
    let annotations_dir = args
        .annotations
        .clone()
        .unwrap_or_else(|| config.annotations_dir.clone());
    let outputdir = args
        .outputdir
        .clone()
        .unwrap_or_else(|| config.framediff_dir.clone());

    let db = Database::open(&inputdir)?;
    let entries = args.selection.everything(&db);
    if entries.is_empty() {
        bail!("selection matched no videos under {}", inputdir.display());
    }
    tracing::info!(videos = entries.len(), "extracting frame differences");

    let done = AtomicUsize::new(0);
    let total = entries.len();
    let failures: Vec<_> = entries
        .par_iter()
        .filter_map(|&entry| {
            let result = process_video(entry, &db, &annotations_dir, &outputdir, &args);
            let n = done.fetch_add(1, Ordering::Relaxed) + 1;
            match result {
                Ok(frames) => {
                    tracing::info!(
                        video = %entry.stem.display(),
                        frames,
                        "features extracted [{n}/{total}]"
                    );
                    None
                }
                Err(err) => {
                    tracing::error!(video = %entry.stem.display(), "video failed: {err:#}");
                    Some(entry.stem.clone())
                }
            }
        })
        .collect();

    if !failures.is_empty() {
        bail!("{} of {} videos failed", failures.len(), total);
    }
    Ok(())
}

fn process_video(
    entry: &VideoEntry,
    db: &Database,
    annotations_dir: &std::path::Path,
    outputdir: &std::path::Path,
    args: &Args,
) -> Result<usize> {
    let frame_dir = entry.path_in(db.root());
    let mut frames =
        blinkcheck_db::load_frame_sequence(&frame_dir).context("loading frame sequence")?;

    let annotation_path = entry.path_in(annotations_dir).with_extension("flandmark");
    let annotations = if annotation_path.is_file() {
        let landmarks = load_landmarks(&annotation_path).context("loading annotations")?;
        frame_annotations(&landmarks, frames.len())
    } else {
        // No annotation file at all: every transition degrades to the
        // neutral feature pair, same as per-frame detector failure.
        tracing::warn!(
            video = %entry.stem.display(),
            path = %annotation_path.display(),
            "annotation file missing, treating all frames as unannotated"
        );
        vec![None; frames.len()]
    };

    if !args.skip_light_normalize {
        for frame in &mut frames {
            light::equalize_histogram(frame);
        }
    }

    let features = sequence_features(&frames, &annotations, args.max_displacement)
        .context("extracting features")?;
    blinkcheck_db::save_features(&entry.series_path(outputdir), &features)
        .context("saving feature series")?;
    Ok(frames.len())
}
