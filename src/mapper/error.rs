use thiserror::Error;

use crate::track::TrackError;

#[derive(Debug, Error, PartialEq)]
pub enum MapError {
    #[error("no calibration loaded for station {0}")]
    UnknownStation(String),
    #[error("malformed ground track: {0}")]
    MalformedTrack(#[from] TrackError),
}
