mod error;
mod sky_mapper;

pub use error::MapError;
pub use sky_mapper::{
    pixels_as_f64, AzEl, AzElSequence, MapperOptions, Pixel, PixelSequence, SkyMapper,
    DEFAULT_TOLERANCE_DEG,
};
