mod error;
mod fisheye;
mod record;
mod registry;

pub use error::CalibrationError;
pub use fisheye::FisheyeModel;
pub use record::{CalibrationDocument, CalibrationRecord, PixelMatch};
pub use registry::CalibrationRegistry;
