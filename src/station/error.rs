use thiserror::Error;

#[derive(Debug, Error)]
pub enum StationError {
    #[error("{0} array code is invalid, must be one of REGO, THEMIS (case insensitive)")]
    UnsupportedArray(String),
    #[error("station {code} is not part of the {array} array")]
    NotInArray { code: String, array: String },
    #[error("duplicate station code: {0}")]
    Duplicate(String),
}
