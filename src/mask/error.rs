use thiserror::Error;

use crate::mapper::MapError;

#[derive(Debug, Error, PartialEq)]
pub enum MaskError {
    #[error(transparent)]
    Map(#[from] MapError),
    #[error("box dimensions must be positive, got {width_km} km x {height_km} km")]
    InvalidBox { width_km: f64, height_km: f64 },
}
