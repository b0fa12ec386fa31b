//! Per-video series persistence.
//!
//! Every pipeline stage reads its predecessor's output and writes its own
//! as one JSON file per video, mirrored onto the database tree layout.
//! Feature rows are objects or `null` (index 0, and any transition with
//! no defined feature); scores are plain floats; counts plain integers.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use blinkcheck_core::Features;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeriesError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write series file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read series file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed series file {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode series for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn save<T: Serialize>(path: &Path, series: &[T]) -> Result<(), SeriesError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| SeriesError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let file = File::create(path).map_err(|source| SeriesError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::to_writer(BufWriter::new(file), series).map_err(|source| SeriesError::Encode {
        path: path.to_path_buf(),
        source,
    })
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SeriesError> {
    let file = File::open(path).map_err(|source| SeriesError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| SeriesError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_features(path: &Path, series: &[Option<Features>]) -> Result<(), SeriesError> {
    save(path, series)
}

pub fn load_features(path: &Path) -> Result<Vec<Option<Features>>, SeriesError> {
    load(path)
}

pub fn save_scores(path: &Path, series: &[f64]) -> Result<(), SeriesError> {
    save(path, series)
}

pub fn load_scores(path: &Path) -> Result<Vec<f64>, SeriesError> {
    load(path)
}

pub fn save_counts(path: &Path, series: &[u32]) -> Result<(), SeriesError> {
    save(path, series)
}

pub fn load_counts(path: &Path) -> Result<Vec<u32>, SeriesError> {
    load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "blinkcheck-series-test-{tag}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ))
    }

    #[test]
    fn undefined_feature_rows_persist_as_null() {
        let path = scratch_path("null").join("train/real/client001.json");
        let series = vec![
            None,
            Some(Features {
                eye_ratio: 1.5,
                face_ratio: 0.25,
            }),
        ];
        save_features(&path, &series).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[null,"));

        let loaded = load_features(&path).unwrap();
        assert_eq!(loaded, series);
        let _ = fs::remove_dir_all(path.ancestors().nth(3).unwrap());
    }

    #[test]
    fn save_creates_missing_parents() {
        let path = scratch_path("parents").join("devel/attack/fixed/client002.json");
        save_scores(&path, &[0.0, 1.5, -2.25]).unwrap();
        assert_eq!(load_scores(&path).unwrap(), vec![0.0, 1.5, -2.25]);
        let _ = fs::remove_dir_all(path.ancestors().nth(4).unwrap());
    }

    #[test]
    fn count_series_survives_as_integers() {
        let path = scratch_path("counts").join("c.json");
        save_counts(&path, &[0, 0, 1, 1, 2]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "[0,0,1,1,2]");
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn load_errors_carry_the_path() {
        let path = scratch_path("absent").join("missing.json");
        let err = load_scores(&path).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let dir = scratch_path("bad");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.json");
        fs::write(&path, "[1.0, oops]").unwrap();
        assert!(matches!(
            load_scores(&path).unwrap_err(),
            SeriesError::Decode { .. }
        ));
        let _ = fs::remove_dir_all(&dir);
    }
}
