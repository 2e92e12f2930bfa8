mod box_mask;
mod error;

pub use box_mask::{build_mask, mask_bounds, BoxMask, BoxSize, PixelBounds};
pub use error::MaskError;
