use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("{frames} frames but the mask has {steps} steps")]
    StepCountMismatch { frames: usize, steps: usize },
    #[error("frame {index} has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        index: usize,
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("no frames to analyse")]
    NoFrames,
    #[error("no frame within {tolerance_s} s of {time}")]
    NoFrameNear {
        time: DateTime<Utc>,
        tolerance_s: i64,
    },
}
