//! Frame-difference feature extraction.
//!
//! For every pair of consecutive grayscale frames this produces two
//! normalized motion measurements: the mean absolute pixel difference
//! inside the eye rectangles, and the same over the face remainder with
//! the eye contribution subtracted out (the remainder rectangle contains
//! the eye rectangles). The eye/face ratio downstream is what makes a
//! blink stand out against whole-face motion such as talking or lighting
//! drift.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::annotation::FrameAnnotation;
use crate::geometry::{euclidean, Region};

#[derive(Error, Debug)]
pub enum FeatureError {
    /// The corrected face-remainder difference came out negative. The
    /// remainder rectangle must contain the eye rectangles; a negative
    /// remainder means the annotation geometry is inconsistent and must
    /// not be clamped away.
    #[error(
        "face-remainder difference is negative at frame {frame} \
         (remainder sum {remainder_sum} < eye sum {eye_sum})"
    )]
    GeometryInconsistency {
        frame: usize,
        remainder_sum: i64,
        eye_sum: u64,
    },

    /// Two consecutive frames have different dimensions.
    #[error("frame {frame} is {curr_rows}x{curr_cols} but its predecessor is {prev_rows}x{prev_cols}")]
    ShapeMismatch {
        frame: usize,
        prev_rows: usize,
        prev_cols: usize,
        curr_rows: usize,
        curr_cols: usize,
    },
}

/// Normalized motion measurements for one frame transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Features {
    /// Mean absolute pixel difference over the included eye regions;
    /// 0 when no eye pixel could be measured.
    pub eye_ratio: f64,
    /// Mean absolute pixel difference over the face remainder;
    /// 1 when no remainder pixel could be measured, so that an
    /// unmeasurable baseline suppresses the eye/face ratio downstream.
    pub face_ratio: f64,
}

/// Accumulated absolute difference over some set of regions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RegionDiff {
    sum: u64,
    pixels: u64,
}

/// Sum of `|curr - prev|` over one region, clamped to the frame.
fn region_abs_diff(prev: ArrayView2<u8>, curr: ArrayView2<u8>, region: Region) -> RegionDiff {
    let (rows, cols) = curr.dim();
    let Some(c) = region.clamp(cols, rows) else {
        return RegionDiff::default();
    };

    let mut sum = 0u64;
    for y in c.y0..c.y1 {
        for x in c.x0..c.x1 {
            sum += u64::from(curr[[y, x]].abs_diff(prev[[y, x]]));
        }
    }
    RegionDiff {
        sum,
        pixels: c.pixels(),
    }
}

/// Difference over the eye regions, guarded against detector jitter.
///
/// An eye is included only when both frames carry it and its center moved
/// strictly less than `max_displacement` × the current eye-box width. A
/// large center jump is detector noise or a re-acquisition, not a blink,
/// and would otherwise register as spurious eye motion.
fn eyes_difference(
    prev: ArrayView2<u8>,
    curr: ArrayView2<u8>,
    prev_annot: &FrameAnnotation,
    curr_annot: &FrameAnnotation,
    max_displacement: f64,
) -> RegionDiff {
    let pairs = [
        (&prev_annot.right_eye, &curr_annot.right_eye),
        (&prev_annot.left_eye, &curr_annot.left_eye),
    ];

    let mut total = RegionDiff::default();
    for (prev_eye, curr_eye) in pairs {
        let (Some(prev_eye), Some(curr_eye)) = (prev_eye, curr_eye) else {
            continue;
        };
        let displacement = euclidean(prev_eye.center, curr_eye.center);
        let tolerance = max_displacement * f64::from(curr_eye.region.width);
        if displacement >= tolerance {
            tracing::debug!(
                displacement,
                tolerance,
                "eye center jumped, excluding eye from difference"
            );
            continue;
        }
        let d = region_abs_diff(prev, curr, curr_eye.region);
        total.sum += d.sum;
        total.pixels += d.pixels;
    }
    total
}

/// Difference over the face remainder, with the eye contribution removed.
fn face_remainder_difference(
    prev: ArrayView2<u8>,
    curr: ArrayView2<u8>,
    prev_annot: &FrameAnnotation,
    curr_annot: &FrameAnnotation,
    eyes: RegionDiff,
    frame: usize,
) -> Result<RegionDiff, FeatureError> {
    let (Some(_), Some(remainder)) = (prev_annot.face_remainder, curr_annot.face_remainder) else {
        return Ok(RegionDiff::default());
    };

    let face = region_abs_diff(prev, curr, remainder);
    let remainder_sum = face.sum as i64 - eyes.sum as i64;
    if remainder_sum < 0 {
        return Err(FeatureError::GeometryInconsistency {
            frame,
            remainder_sum,
            eye_sum: eyes.sum,
        });
    }
    let pixels = face.pixels.saturating_sub(eyes.pixels);

    Ok(RegionDiff {
        sum: remainder_sum as u64,
        pixels,
    })
}

/// Features for a single transition `prev -> curr`.
///
/// Missing annotations on either side yield the neutral pair
/// `(eye_ratio: 0.0, face_ratio: 1.0)`: an unannotated transition must
/// not look like a blink.
pub fn transition_features(
    prev: ArrayView2<u8>,
    curr: ArrayView2<u8>,
    prev_annot: Option<&FrameAnnotation>,
    curr_annot: Option<&FrameAnnotation>,
    max_displacement: f64,
    frame: usize,
) -> Result<Features, FeatureError> {
    if prev.dim() != curr.dim() {
        let (prev_rows, prev_cols) = prev.dim();
        let (curr_rows, curr_cols) = curr.dim();
        return Err(FeatureError::ShapeMismatch {
            frame,
            prev_rows,
            prev_cols,
            curr_rows,
            curr_cols,
        });
    }

    let (eyes, face) = match (prev_annot, curr_annot) {
        (Some(pa), Some(ca)) => {
            let eyes = eyes_difference(prev, curr, pa, ca, max_displacement);
            let face = face_remainder_difference(prev, curr, pa, ca, eyes, frame)?;
            (eyes, face)
        }
        _ => (RegionDiff::default(), RegionDiff::default()),
    };

    let eye_ratio = if eyes.pixels > 0 {
        eyes.sum as f64 / eyes.pixels as f64
    } else {
        0.0
    };
    let face_ratio = if face.pixels > 0 {
        face.sum as f64 / face.pixels as f64
    } else {
        1.0
    };

    Ok(Features {
        eye_ratio,
        face_ratio,
    })
}

/// Feature series for a whole video.
///
/// `annotations` must have one entry per frame. The result has the same
/// length as `frames`; index 0 is `None` (a transition needs frame k-1).
pub fn sequence_features(
    frames: &[ndarray::Array2<u8>],
    annotations: &[Option<FrameAnnotation>],
    max_displacement: f64,
) -> Result<Vec<Option<Features>>, FeatureError> {
    debug_assert_eq!(frames.len(), annotations.len());

    let mut features = Vec::with_capacity(frames.len());
    if frames.is_empty() {
        return Ok(features);
    }
    features.push(None);

    for k in 1..frames.len() {
        let f = transition_features(
            frames[k - 1].view(),
            frames[k].view(),
            annotations[k - 1].as_ref(),
            annotations[k].as_ref(),
            max_displacement,
            k,
        )?;
        features.push(Some(f));
    }
    Ok(features)
}
