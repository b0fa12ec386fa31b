//! Database and persistence glue for the blink-detection pipeline.
//!
//! The algorithmic core operates on fully materialized in-memory series;
//! this crate supplies them: enumerating the video database tree with its
//! protocol/support/group/class query surface, parsing flandmark
//! annotation files, loading frame sequences, and persisting the
//! per-video feature/score/count series between pipeline stages.

pub mod annotations;
pub mod frames;
pub mod index;
pub mod series;

pub use annotations::{frame_annotations, load_landmarks, AnnotationError};
pub use frames::{load_frame_sequence, FrameError};
pub use index::{
    Database, DbError, Group, Protocol, Support, SupportFilter, VideoClass, VideoEntry,
};
pub use series::{
    load_counts, load_features, load_scores, save_counts, save_features, save_scores, SeriesError,
};
