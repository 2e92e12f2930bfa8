use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameSourceError {
    #[error("ASI data not found for station {0}")]
    StationNotFound(String),
    #[error("frame read error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame decode error: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("no frames for station {station_id} in [{start}, {end})")]
    EmptyRange {
        station_id: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("frame source error: {0}")]
    FrameSource(#[from] FrameSourceError),
    #[error("bulk retrieval requested after {consumed} frames were already streamed")]
    BulkAfterIteration { consumed: usize },
    #[error("stream has not been started")]
    NotStarted,
    #[error("stream already started")]
    AlreadyStarted,
    #[error("stream is exhausted")]
    Exhausted,
}
