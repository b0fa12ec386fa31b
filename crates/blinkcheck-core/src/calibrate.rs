//! Fixed-threshold calibration from a reference population.
//!
//! The fixed counting policy needs one scalar threshold for the whole
//! evaluation set. It is derived from the score series of a known-live
//! reference population: a point between the population's average score
//! and its typical per-video peak, placed by a ratio in [0, 1].

/// Per-video score summary used for calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoSummary {
    pub mean: f64,
    pub max: f64,
}

impl VideoSummary {
    /// Summarize one video's score series. Returns `None` for an empty
    /// series; a video with no scores cannot contribute.
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self { mean, max })
    }
}

/// Derive the blink threshold: `avg + ratio * (avg_max - avg)`, where
/// `avg` is the mean of per-video means and `avg_max` the mean of
/// per-video maxima. Returns `None` for an empty population.
pub fn blink_threshold(summaries: &[VideoSummary], ratio: f64) -> Option<f64> {
    if summaries.is_empty() {
        return None;
    }
    let n = summaries.len() as f64;
    let avg = summaries.iter().map(|s| s.mean).sum::<f64>() / n;
    let avg_max = summaries.iter().map(|s| s.max).sum::<f64>() / n;
    Some(avg + ratio * (avg_max - avg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_sits_between_mean_and_peak() {
        // Population mean-of-means 2.0, mean-of-maxes 6.0, ratio 0.5.
        let summaries = [
            VideoSummary {
                mean: 1.0,
                max: 5.0,
            },
            VideoSummary {
                mean: 3.0,
                max: 7.0,
            },
        ];
        assert_eq!(blink_threshold(&summaries, 0.5), Some(4.0));
    }

    #[test]
    fn ratio_endpoints_select_mean_or_peak() {
        let summaries = [VideoSummary {
            mean: 2.0,
            max: 6.0,
        }];
        assert_eq!(blink_threshold(&summaries, 0.0), Some(2.0));
        assert_eq!(blink_threshold(&summaries, 1.0), Some(6.0));
    }

    #[test]
    fn empty_population_has_no_threshold() {
        assert_eq!(blink_threshold(&[], 0.5), None);
    }

    #[test]
    fn summary_of_a_series() {
        let s = VideoSummary::from_scores(&[1.0, 2.0, 3.0, -2.0]).unwrap();
        assert_eq!(s.mean, 1.0);
        assert_eq!(s.max, 3.0);
        assert!(VideoSummary::from_scores(&[]).is_none());
    }
}
