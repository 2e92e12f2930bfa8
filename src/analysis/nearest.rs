use chrono::{DateTime, Duration, Utc};

use super::error::AnalysisError;
use crate::stream::FrameRecord;

/// Default window for matching a requested time to a frame, one imager
/// cadence.
pub const DEFAULT_FRAME_TOLERANCE_S: i64 = 3;

/// The frame closest in time to `time`, provided it is within `tolerance`.
/// Ties go to the earlier frame.
pub fn nearest_frame(
    frames: &[FrameRecord],
    time: DateTime<Utc>,
    tolerance: Duration,
) -> Result<&FrameRecord, AnalysisError> {
    let offset_ms = |f: &FrameRecord| (f.timestamp - time).num_milliseconds().abs();
    frames
        .iter()
        .min_by_key(|f| offset_ms(*f))
        .filter(|f| offset_ms(*f) <= tolerance.num_milliseconds())
        .ok_or(AnalysisError::NoFrameNear {
            time,
            tolerance_s: tolerance.num_seconds(),
        })
}
