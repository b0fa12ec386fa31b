//! Blink scoring: eye/face ratio normalized against its own history.
//!
//! The raw eye-region difference alone cannot separate a blink from
//! whole-face motion (talking, camera shake, a waved photograph). Dividing
//! by the face-remainder difference and subtracting the running mean
//! leaves a score that only rises when the eyes move *more than the rest
//! of the face usually does*; the override rules flatten anything that
//! does not clear both the baseline and the local noise band.

use crate::framediff::Features;
use crate::stats::RunningStats;

/// Score one video's feature series.
///
/// A pure function of the whole series: running statistics are causal
/// (prefix-only), so re-running on the same input is bit-identical. The
/// result has the same length and indexing as the input; undefined rows
/// (index 0, unannotated stretches) behave as `eye_ratio == 0` and score
/// at the running mean.
pub fn score_series(features: &[Option<Features>]) -> Vec<f64> {
    let mut stats = RunningStats::new();
    let mut scores = Vec::with_capacity(features.len());

    for feature in features {
        let (eye_ratio, ratio) = match feature {
            Some(f) => (f.eye_ratio, normalized_ratio(f)),
            None => (0.0, 0.0),
        };

        stats.push(ratio);
        let mean = stats.mean();
        let std = stats.std();
        let raw = ratio - mean;

        // A blink signal must exceed both the mean baseline and the local
        // variability to be trusted; anything else collapses to the mean.
        let score = if eye_ratio == 0.0 || raw.abs() < std || raw < mean {
            mean
        } else {
            raw
        };
        scores.push(score);
    }
    scores
}

/// Eye/face ratio with the division singularities removed: a face ratio
/// of exactly 0 acts as 1, and any non-finite quotient becomes 0.
fn normalized_ratio(f: &Features) -> f64 {
    let denominator = if f.face_ratio == 0.0 {
        1.0
    } else {
        f.face_ratio
    };
    let ratio = f.eye_ratio / denominator;
    if ratio.is_finite() {
        ratio
    } else {
        0.0
    }
}
