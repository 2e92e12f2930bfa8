use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::MapError;
use crate::calibration::{CalibrationRecord, CalibrationRegistry};
use crate::mask::{self, BoxMask, BoxSize, MaskError, PixelBounds};
use crate::track::GroundTrack;

/// Largest angular distance between a computed line of sight and the nearest
/// calibration pixel for the sample to count as in frame.
pub const DEFAULT_TOLERANCE_DEG: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct AzEl {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
}

/// Frame pixel: `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Pixel {
    pub x: usize,
    pub y: usize,
}

pub type AzElSequence = Vec<AzEl>;

/// One entry per track sample; `None` marks a sample outside the camera's view.
pub type PixelSequence = Vec<Option<Pixel>>;

/// `(x, y)` pairs with `NaN` in place of out-of-frame samples.
pub fn pixels_as_f64(pixels: &[Option<Pixel>]) -> Vec<(f64, f64)> {
    pixels
        .iter()
        .map(|p| match p {
            Some(p) => (p.x as f64, p.y as f64),
            None => (f64::NAN, f64::NAN),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MapperOptions {
    #[serde(default = "default_tolerance")]
    pub tolerance_deg: f64,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE_DEG
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            tolerance_deg: DEFAULT_TOLERANCE_DEG,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SkyMapper<'a> {
    registry: &'a CalibrationRegistry,
    options: MapperOptions,
}

impl<'a> SkyMapper<'a> {
    pub fn new(registry: &'a CalibrationRegistry) -> Self {
        Self::with_options(registry, MapperOptions::default())
    }

    pub fn with_options(registry: &'a CalibrationRegistry, options: MapperOptions) -> Self {
        Self { registry, options }
    }

    pub fn calibration(&self, station_id: &str) -> Result<&'a CalibrationRecord, MapError> {
        self.registry
            .get(station_id)
            .map_err(|_| MapError::UnknownStation(station_id.to_string()))
    }

    /// Look angles of every sample from the station, and the calibration pixel
    /// each one falls on. Both sequences keep the track's order and length.
    pub fn map_to_pixels(
        &self,
        station_id: &str,
        track: &GroundTrack,
    ) -> Result<(AzElSequence, PixelSequence), MapError> {
        let record = self.calibration(station_id)?;
        track.validate()?;
        Ok(map_with_record(record, track, self.options.tolerance_deg))
    }

    /// Per-sample `1.0`/`NaN` mask of a `box_km` rectangle centered on the
    /// mapped track at the calibration's reference altitude.
    pub fn equal_area_mask(
        &self,
        station_id: &str,
        track: &GroundTrack,
        box_km: (f64, f64),
    ) -> Result<BoxMask, MaskError> {
        let size = BoxSize::new(box_km.0, box_km.1)?;
        let record = self.calibration(station_id)?;
        track.validate().map_err(MapError::from)?;
        let (_, pixels) = map_with_record(record, track, self.options.tolerance_deg);
        Ok(mask::build_mask(record, &pixels, size))
    }

    /// Box rectangle at every sample, without the dense per-step grids of
    /// [`SkyMapper::equal_area_mask`].
    pub fn mask_bounds(
        &self,
        station_id: &str,
        track: &GroundTrack,
        box_km: (f64, f64),
    ) -> Result<Vec<Option<PixelBounds>>, MaskError> {
        let size = BoxSize::new(box_km.0, box_km.1)?;
        let record = self.calibration(station_id)?;
        track.validate().map_err(MapError::from)?;
        let (_, pixels) = map_with_record(record, track, self.options.tolerance_deg);
        Ok(mask::mask_bounds(record, &pixels, size))
    }
}

fn map_with_record(
    record: &CalibrationRecord,
    track: &GroundTrack,
    tolerance_deg: f64,
) -> (AzElSequence, PixelSequence) {
    let site = record.site();
    let mut azel = Vec::with_capacity(track.len());
    let mut pixels = Vec::with_capacity(track.len());

    for p in track.iter() {
        let look = site.look_angles(p.latitude_deg, p.longitude_deg, p.altitude_km);
        azel.push(AzEl {
            azimuth_deg: look.azimuth_deg,
            elevation_deg: look.elevation_deg,
        });

        let pixel = record
            .nearest_pixel(look.azimuth_deg, look.elevation_deg)
            .filter(|m| m.separation_deg <= tolerance_deg)
            .map(|m| Pixel { x: m.col, y: m.row });
        pixels.push(pixel);
    }

    let off_camera = pixels.iter().filter(|p| p.is_none()).count();
    if off_camera > 0 {
        log::debug!(
            "{} of {} samples fall outside the {} field of view",
            off_camera,
            pixels.len(),
            record.station_id()
        );
    }

    (azel, pixels)
}
