//! Flandmark annotation file parsing.
//!
//! One text file per video, one line per annotated frame:
//!
//! ```text
//! <frame> <x> <y> <width> <height> <x0> <y0> ... <x7> <y7>
//! ```
//!
//! i.e. the detection bounding box followed by the eight flandmark key
//! points (face center, inner eye corners, mouth corners, outer eye
//! corners, nose). Frames the detector failed on are simply absent.
//! Detections narrower than [`MIN_FACE_WIDTH`] are implausible for this
//! footage and are dropped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use blinkcheck_core::annotation::Landmarks;
use blinkcheck_core::{FrameAnnotation, Region};
use thiserror::Error;

/// Detections narrower than this many pixels are discarded.
const MIN_FACE_WIDTH: i32 = 50;

/// Fields per line: frame index + bounding box + 8 landmark pairs.
const FIELDS_PER_LINE: usize = 1 + 4 + 16;

#[derive(Error, Debug)]
pub enum AnnotationError {
    #[error("failed to read annotation file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: expected {FIELDS_PER_LINE} integer fields, found {found}")]
    MalformedLine {
        path: PathBuf,
        line: usize,
        found: usize,
    },

    #[error("{path}:{line}: non-integer field '{field}'")]
    BadField {
        path: PathBuf,
        line: usize,
        field: String,
    },
}

/// Parse one video's annotation file into per-frame landmark records.
pub fn load_landmarks(path: &Path) -> Result<BTreeMap<usize, Landmarks>, AnnotationError> {
    let text = std::fs::read_to_string(path).map_err(|source| AnnotationError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut records = BTreeMap::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fields = parse_fields(line, path, line_no + 1)?;
        let frame = fields[0] as usize;
        let bounding_box = Region::new(fields[1], fields[2], fields[3], fields[4]);

        if bounding_box.width < MIN_FACE_WIDTH {
            tracing::debug!(
                frame,
                width = bounding_box.width,
                "dropping implausibly narrow face detection"
            );
            continue;
        }

        let p = |k: usize| (f64::from(fields[5 + 2 * k]), f64::from(fields[6 + 2 * k]));
        records.insert(
            frame,
            Landmarks {
                bounding_box,
                face_center: p(0),
                inner_right_eye: p(1),
                inner_left_eye: p(2),
                right_mouth: p(3),
                left_mouth: p(4),
                outer_right_eye: p(5),
                outer_left_eye: p(6),
                nose: p(7),
            },
        );
    }

    Ok(records)
}

fn parse_fields(line: &str, path: &Path, line_no: usize) -> Result<Vec<i32>, AnnotationError> {
    let mut fields = Vec::with_capacity(FIELDS_PER_LINE);
    for token in line.split_whitespace() {
        let value = token.parse().map_err(|_| AnnotationError::BadField {
            path: path.to_path_buf(),
            line: line_no,
            field: token.to_string(),
        })?;
        fields.push(value);
    }
    if fields.len() != FIELDS_PER_LINE {
        return Err(AnnotationError::MalformedLine {
            path: path.to_path_buf(),
            line: line_no,
            found: fields.len(),
        });
    }
    Ok(fields)
}

/// Expand a landmark table into one derived annotation slot per frame.
pub fn frame_annotations(
    landmarks: &BTreeMap<usize, Landmarks>,
    frame_count: usize,
) -> Vec<Option<FrameAnnotation>> {
    (0..frame_count)
        .map(|k| landmarks.get(&k).map(Landmarks::to_annotation))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn write_annotation(tag: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "blinkcheck-annot-test-{tag}-{}.flandmark",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        fs::write(&path, content).unwrap();
        path
    }

    const LINE_FRAME3: &str =
        "3 40 20 120 140 100 80 85 50 115 50 88 130 112 130 65 50 135 50 100 90";

    #[test]
    fn parses_frames_and_landmarks() {
        let path = write_annotation(
            "ok",
            &format!("{LINE_FRAME3}\n5 40 20 120 140 0 0 1 1 2 2 3 3 4 4 5 5 6 6 7 7\n"),
        );
        let records = load_landmarks(&path).unwrap();
        assert_eq!(records.len(), 2);

        let lm = &records[&3];
        assert_eq!(lm.bounding_box, Region::new(40, 20, 120, 140));
        assert_eq!(lm.inner_right_eye, (85.0, 50.0));
        assert_eq!(lm.nose, (100.0, 90.0));
        assert!(records.contains_key(&5));
        assert!(!records.contains_key(&4));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn narrow_detections_are_dropped() {
        let path = write_annotation(
            "narrow",
            &format!("2 40 20 49 140 100 80 85 50 115 50 88 130 112 130 65 50 135 50 100 90\n{LINE_FRAME3}\n"),
        );
        let records = load_landmarks(&path).unwrap();
        assert!(!records.contains_key(&2));
        assert!(records.contains_key(&3));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn short_line_is_an_error() {
        let path = write_annotation("short", "3 40 20 120 140 1 2\n");
        assert!(matches!(
            load_landmarks(&path).unwrap_err(),
            AnnotationError::MalformedLine { line: 1, found: 7, .. }
        ));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn non_integer_field_is_an_error() {
        let path = write_annotation("alpha", &LINE_FRAME3.replace("100 90", "100 ninety"));
        assert!(matches!(
            load_landmarks(&path).unwrap_err(),
            AnnotationError::BadField { .. }
        ));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_reports_the_path() {
        let path = std::env::temp_dir().join("blinkcheck-annot-test-absent.flandmark");
        let err = load_landmarks(&path).unwrap_err();
        assert!(matches!(err, AnnotationError::Read { .. }));
    }

    #[test]
    fn table_expands_to_per_frame_slots() {
        let path = write_annotation("expand", &format!("{LINE_FRAME3}\n"));
        let records = load_landmarks(&path).unwrap();
        let annotations = frame_annotations(&records, 6);
        assert_eq!(annotations.len(), 6);
        assert!(annotations[3].is_some());
        assert!(annotations.iter().enumerate().all(|(k, a)| (k == 3) == a.is_some()));
        let _ = fs::remove_file(&path);
    }
}
