use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("calibration directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("calibration file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("invalid calibration document {file}: {message}")]
    InvalidDocument { file: String, message: String },
    #[error("{table} table has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        table: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("{table} table holds {actual} values, expected {expected}")]
    LengthMismatch {
        table: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("calibration grid of {rows}x{cols} pixels is too large")]
    GridTooLarge { rows: usize, cols: usize },
    #[error("calibration grid must not be empty")]
    EmptyGrid,
    #[error("no calibration loaded for station {0}")]
    UnknownStation(String),
}
