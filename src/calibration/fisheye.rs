use serde::Deserialize;

use super::error::CalibrationError;
use super::record::CalibrationRecord;
use crate::grid::Grid;
use crate::station::GroundStation;

const DEFAULT_REFERENCE_ALTITUDE_KM: f64 = 110.0;

/// Equidistant fisheye lens: zenith angle grows linearly with the distance from
/// the optical center, reaching the horizon at `radius_px`.
#[derive(Debug, Clone, Deserialize)]
pub struct FisheyeModel {
    pub rows: usize,
    pub cols: usize,
    #[serde(default)]
    pub center: Option<(f64, f64)>,
    #[serde(default)]
    pub radius_px: Option<f64>,
    /// Azimuth of the image "up" direction.
    #[serde(default)]
    pub rotation_deg: f64,
    /// East on the left, as seen looking up at the sky.
    #[serde(default)]
    pub mirrored: bool,
    #[serde(default = "default_reference_altitude")]
    pub reference_altitude_km: f64,
}

fn default_reference_altitude() -> f64 {
    DEFAULT_REFERENCE_ALTITUDE_KM
}

impl FisheyeModel {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            center: None,
            radius_px: None,
            rotation_deg: 0.0,
            mirrored: false,
            reference_altitude_km: DEFAULT_REFERENCE_ALTITUDE_KM,
        }
    }

    pub fn with_reference_altitude(mut self, altitude_km: f64) -> Self {
        self.reference_altitude_km = altitude_km;
        self
    }

    pub fn with_rotation(mut self, rotation_deg: f64) -> Self {
        self.rotation_deg = rotation_deg;
        self
    }

    fn center(&self) -> (f64, f64) {
        self.center.unwrap_or((
            (self.rows as f64 - 1.0) / 2.0,
            (self.cols as f64 - 1.0) / 2.0,
        ))
    }

    fn radius(&self) -> f64 {
        self.radius_px
            .unwrap_or(self.rows.min(self.cols) as f64 / 2.0)
    }

    /// `(azimuth, elevation)` seen by pixel `(row, col)`, or `None` outside the
    /// lens circle.
    pub fn look_direction(&self, row: usize, col: usize) -> Option<(f64, f64)> {
        let (cy, cx) = self.center();
        let dx = col as f64 - cx;
        let dy = row as f64 - cy;
        let r = dx.hypot(dy);
        let radius = self.radius();
        if r > radius {
            return None;
        }

        let elevation = 90.0 - 90.0 * r / radius;
        let east = if self.mirrored { -dx } else { dx };
        let azimuth = if r == 0.0 {
            0.0
        } else {
            (east.atan2(-dy).to_degrees() + self.rotation_deg).rem_euclid(360.0)
        };
        Some((azimuth, elevation))
    }

    pub fn build(
        &self,
        station_id: &str,
        site: GroundStation,
    ) -> Result<CalibrationRecord, CalibrationError> {
        let mut azimuth = Grid::nan(self.rows, self.cols);
        let mut elevation = Grid::nan(self.rows, self.cols);
        let mut footprint_lat = Grid::nan(self.rows, self.cols);
        let mut footprint_lon = Grid::nan(self.rows, self.cols);

        for row in 0..self.rows {
            for col in 0..self.cols {
                let Some((az, el)) = self.look_direction(row, col) else {
                    continue;
                };
                azimuth.set(row, col, az);
                elevation.set(row, col, el);
                if let Some((lat, lon)) = site.footprint(az, el, self.reference_altitude_km) {
                    footprint_lat.set(row, col, lat);
                    footprint_lon.set(row, col, lon);
                }
            }
        }

        log::debug!(
            "Built {}x{} fisheye calibration for {} at {} km",
            self.rows,
            self.cols,
            station_id,
            self.reference_altitude_km
        );

        CalibrationRecord::new(
            station_id,
            site,
            self.reference_altitude_km,
            azimuth,
            elevation,
            footprint_lat,
            footprint_lon,
        )
    }
}
