mod box_mean;
mod error;
mod keogram;
mod nearest;

pub use box_mean::box_mean;
pub use error::AnalysisError;
pub use keogram::{keogram, Keogram};
pub use nearest::{nearest_frame, DEFAULT_FRAME_TOLERANCE_S};
