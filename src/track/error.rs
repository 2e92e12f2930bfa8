use thiserror::Error;

use crate::time_range::TimeRangeError;

#[derive(Debug, Error, PartialEq)]
pub enum TrackError {
    #[error("ground track is empty")]
    Empty,
    #[error(
        "component lengths differ: {latitudes} latitudes, {longitudes} longitudes, {altitudes} altitudes"
    )]
    LengthMismatch {
        latitudes: usize,
        longitudes: usize,
        altitudes: usize,
    },
    #[error("{count} timestamps given for {expected} samples")]
    TimestampMismatch { count: usize, expected: usize },
    #[error("sample {index}: {field} is not a finite number")]
    NonFinite { index: usize, field: &'static str },
    #[error("sample {index}: latitude {value} is outside [-90, 90]")]
    LatitudeOutOfRange { index: usize, value: f64 },
}

#[derive(Debug, Error)]
pub enum TleTrackError {
    #[error("invalid tle format")]
    InvalidTleFormat,
    #[error("invalid tle: {0}")]
    InvalidTle(#[from] sgp4::TleError),
    #[error("elements error: {0}")]
    Elements(#[from] sgp4::ElementsError),
    #[error("propagation error: {0}")]
    Propagation(String),
    #[error("time range error: {0}")]
    TimeRange(#[from] TimeRangeError),
    #[error("track error: {0}")]
    Track(#[from] TrackError),
}
