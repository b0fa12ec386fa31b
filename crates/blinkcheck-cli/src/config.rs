//! Pipeline directory layout, loaded from environment variables.
//!
//! Each stage reads the previous stage's directory and writes its own.
//! Command-line flags override these defaults per invocation; the
//! `BLINKCHECK_*` variables override them per environment.

use std::path::PathBuf;

pub struct Config {
    /// Video database root: per-video frame directories.
    pub database_dir: PathBuf,
    /// Flandmark annotation files, one per video.
    pub annotations_dir: PathBuf,
    /// Feature series (framediff stage output).
    pub framediff_dir: PathBuf,
    /// Score series (scores stage output).
    pub scores_dir: PathBuf,
    /// Blink-count series (count stage output).
    pub blinks_dir: PathBuf,
    /// Merged 5-column result files.
    pub merged_dir: PathBuf,
}

impl Config {
    /// Load the layout from `BLINKCHECK_*` environment variables with
    /// defaults relative to the working directory.
    pub fn from_env() -> Self {
        Self {
            database_dir: env_path("BLINKCHECK_DATABASE_DIR", "database"),
            annotations_dir: env_path("BLINKCHECK_ANNOTATIONS_DIR", "annotations"),
            framediff_dir: env_path("BLINKCHECK_FRAMEDIFF_DIR", "framediff"),
            scores_dir: env_path("BLINKCHECK_SCORES_DIR", "scores"),
            blinks_dir: env_path("BLINKCHECK_BLINKS_DIR", "blinks"),
            merged_dir: env_path("BLINKCHECK_MERGED_DIR", "merged"),
        }
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}
