//! Eye-blink detection primitives for anti-spoofing evaluation.
//!
//! A photograph or a replayed still held in front of a camera never
//! blinks. This crate implements the signal chain that turns a sequence of
//! grayscale frames plus per-frame face annotations into a blink count:
//!
//! 1. [`framediff`]: per-transition eye and face-remainder pixel
//!    differences, normalized into a two-component feature vector;
//! 2. [`score`]: the eye/face ratio normalized against its own running
//!    mean and standard deviation;
//! 3. [`count`]: a refractory-window scan that counts discrete blink
//!    events under an adaptive or a calibrated fixed threshold.
//!
//! Each stage is a pure function of fully materialized per-video series;
//! videos are independent of one another, so callers may fan out freely
//! at video granularity.

pub mod annotation;
pub mod calibrate;
pub mod count;
pub mod framediff;
pub mod geometry;
pub mod light;
pub mod score;
pub mod stats;

pub use annotation::{EyeAnnotation, FrameAnnotation, Landmarks};
pub use calibrate::{blink_threshold, VideoSummary};
pub use count::{count_blinks, ThresholdPolicy};
pub use framediff::{sequence_features, transition_features, FeatureError, Features};
pub use geometry::Region;
pub use score::score_series;
pub use stats::RunningStats;
