//! Blink event counting over a score series.
//!
//! A single physical blink produces a short burst of high scores; counting
//! every qualifying frame would report one blink several times. The
//! counter is a refractory scan: after each detection (and at the start of
//! the series) `skip_frames` frames are consumed without being allowed to
//! trigger. Detection is driven by one of two threshold policies: the
//! series' own running statistics, or a fixed scalar calibrated from a
//! reference population.

use crate::stats::RunningStats;

/// How a frame qualifies as a blink detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdPolicy {
    /// Fires when `score - running_mean >= std_ratio * running_std`,
    /// with the statistics taken causally over the score series itself.
    ///
    /// On a constant series the running std is 0 and the condition
    /// degenerates to `diff >= 0`, so every armed frame fires. That is
    /// documented behavior of this policy, kept as-is.
    Adaptive { std_ratio: f64 },
    /// Fires when `score >= threshold`.
    Fixed { threshold: f64 },
}

/// Scan a score series and emit the cumulative blink count per frame.
///
/// The output has the same length as the input and is non-decreasing. The
/// scan starts inside the refractory window (`skip_frames` frames are
/// consumed before the first frame may trigger); `skip_frames == 0`
/// disables the window entirely. Running statistics for the adaptive
/// policy update on every frame, refractory or not; the threshold is
/// defined over the score prefix, not over armed frames only.
pub fn count_blinks(scores: &[f64], policy: ThresholdPolicy, skip_frames: usize) -> Vec<u32> {
    let mut counts = Vec::with_capacity(scores.len());
    let mut stats = RunningStats::new();
    let mut detected = 0u32;
    let mut skip = skip_frames;

    for &score in scores {
        stats.push(score);

        if skip > 0 {
            skip -= 1;
            counts.push(detected);
            continue;
        }

        let fires = match policy {
            ThresholdPolicy::Adaptive { std_ratio } => {
                score - stats.mean() >= std_ratio * stats.std()
            }
            ThresholdPolicy::Fixed { threshold } => score >= threshold,
        };
        if fires {
            detected += 1;
            skip = skip_frames;
        }
        counts.push(detected);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADAPTIVE_HALF: ThresholdPolicy = ThresholdPolicy::Adaptive { std_ratio: 0.5 };

    #[test]
    fn refractory_window_swallows_trailing_detections() {
        // Indices 2, 3 and 6 all clear the threshold; 3 falls inside the
        // window opened at 2 and must not count.
        let scores = [0.0, 0.0, 10.0, 10.0, 0.0, 0.0, 10.0];
        let counts = count_blinks(&scores, ADAPTIVE_HALF, 2);
        assert_eq!(counts, vec![0, 0, 1, 1, 1, 1, 2]);
    }

    #[test]
    fn output_is_non_decreasing_and_same_length() {
        let scores = [3.0, -1.0, 8.0, 8.0, 8.0, 0.5, 12.0, 12.0, -2.0];
        for skip in 0..5 {
            let counts = count_blinks(&scores, ADAPTIVE_HALF, skip);
            assert_eq!(counts.len(), scores.len());
            assert!(counts.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn count_is_bounded_by_window_capacity() {
        let scores = vec![5.0; 64];
        for skip in 0..8 {
            let counts = count_blinks(&scores, ADAPTIVE_HALF, skip);
            let bound = scores.len().div_ceil(skip + 1) as u32;
            assert!(*counts.last().unwrap() <= bound);
        }
    }

    #[test]
    fn constant_series_fires_on_every_armed_frame() {
        // Constant scores: running std is 0 and diff is 0, so `diff >= 0`
        // fires whenever the counter is armed. With skip 3 the armed
        // frames are 3, 7 and 11.
        let scores = vec![5.0; 12];
        let counts = count_blinks(&scores, ADAPTIVE_HALF, 3);
        assert_eq!(counts, vec![0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3]);
    }

    #[test]
    fn zero_skip_disables_the_window() {
        let scores = vec![5.0; 4];
        let counts = count_blinks(&scores, ADAPTIVE_HALF, 0);
        // Every frame is armed and every frame fires.
        assert_eq!(counts, vec![1, 2, 3, 4]);
    }

    #[test]
    fn fixed_threshold_fires_at_and_above() {
        let scores = [1.0, 4.0, 3.9999, 4.0001, 4.0];
        let counts = count_blinks(&scores, ThresholdPolicy::Fixed { threshold: 4.0 }, 0);
        assert_eq!(counts, vec![0, 1, 1, 2, 3]);
    }

    #[test]
    fn initial_window_protects_the_leading_frames() {
        let scores = [100.0, 100.0, 0.0, 0.0];
        let counts = count_blinks(&scores, ThresholdPolicy::Fixed { threshold: 50.0 }, 2);
        // Frames 0 and 1 are inside the initial window.
        assert_eq!(counts, vec![0, 0, 0, 0]);
    }

    #[test]
    fn empty_series_yields_empty_counts() {
        assert!(count_blinks(&[], ADAPTIVE_HALF, 5).is_empty());
    }

    #[test]
    fn statistics_keep_updating_through_the_window() {
        // The spike at index 1 is inside the initial window, but it still
        // enters the running statistics: by index 2 the mean/std already
        // reflect it, so the modest score there does not fire.
        let scores = [0.0, 30.0, 6.0, 0.0];
        let counts = count_blinks(&scores, ThresholdPolicy::Adaptive { std_ratio: 1.0 }, 2);
        // At index 2: mean = 12, std ~= 12.96; diff = -6 < std.
        assert_eq!(counts, vec![0, 0, 0, 0]);
    }
}
