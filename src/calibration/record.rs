use serde::{Deserialize, Serialize};

use super::error::CalibrationError;
use crate::grid::Grid;
use crate::station::{GroundStation, EARTH_RADIUS_KM};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelMatch {
    pub row: usize,
    pub col: usize,
    /// Angular distance between the requested direction and the pixel's.
    pub separation_deg: f64,
}

/// Per-station skymap: pixel → (azimuth, elevation) and pixel → footprint at
/// `reference_altitude_km`. All tables share the frame grid shape.
#[derive(Debug, Clone)]
pub struct CalibrationRecord {
    station_id: String,
    site: GroundStation,
    reference_altitude_km: f64,
    azimuth: Grid,
    elevation: Grid,
    footprint_lat: Grid,
    footprint_lon: Grid,
    // Unit line-of-sight vectors in the local ENU frame, NaN outside the field of view.
    look_vectors: Vec<[f64; 3]>,
}

impl CalibrationRecord {
    pub fn new(
        station_id: &str,
        site: GroundStation,
        reference_altitude_km: f64,
        azimuth: Grid,
        elevation: Grid,
        footprint_lat: Grid,
        footprint_lon: Grid,
    ) -> Result<Self, CalibrationError> {
        let expected = azimuth.shape();
        if expected.0 == 0 || expected.1 == 0 {
            return Err(CalibrationError::EmptyGrid);
        }
        for (table, grid) in [
            ("elevation", &elevation),
            ("footprint latitude", &footprint_lat),
            ("footprint longitude", &footprint_lon),
        ] {
            if grid.shape() != expected {
                return Err(CalibrationError::ShapeMismatch {
                    table,
                    expected,
                    actual: grid.shape(),
                });
            }
        }

        let look_vectors = azimuth
            .as_slice()
            .iter()
            .zip(elevation.as_slice())
            .map(|(&az, &el)| unit_vector(az, el))
            .collect();

        Ok(Self {
            station_id: station_id.trim().to_uppercase(),
            site,
            reference_altitude_km,
            azimuth,
            elevation,
            footprint_lat,
            footprint_lon,
            look_vectors,
        })
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub fn site(&self) -> &GroundStation {
        &self.site
    }

    pub fn reference_altitude_km(&self) -> f64 {
        self.reference_altitude_km
    }

    pub fn shape(&self) -> (usize, usize) {
        self.azimuth.shape()
    }

    pub fn azimuth(&self) -> &Grid {
        &self.azimuth
    }

    pub fn elevation(&self) -> &Grid {
        &self.elevation
    }

    pub fn footprint_lat(&self) -> &Grid {
        &self.footprint_lat
    }

    pub fn footprint_lon(&self) -> &Grid {
        &self.footprint_lon
    }

    pub fn footprint_radius_km(&self) -> f64 {
        EARTH_RADIUS_KM + self.reference_altitude_km
    }

    pub fn look_direction(&self, row: usize, col: usize) -> Option<(f64, f64)> {
        let az = self.azimuth.get(row, col)?;
        let el = self.elevation.get(row, col)?;
        (az.is_finite() && el.is_finite()).then_some((az, el))
    }

    pub fn footprint(&self, row: usize, col: usize) -> Option<(f64, f64)> {
        let lat = self.footprint_lat.get(row, col)?;
        let lon = self.footprint_lon.get(row, col)?;
        (lat.is_finite() && lon.is_finite()).then_some((lat, lon))
    }

    /// Nearest-neighbour inverse of the az/el tables by angular separation.
    /// Ties resolve to the first pixel in row-major order.
    pub fn nearest_pixel(&self, azimuth_deg: f64, elevation_deg: f64) -> Option<PixelMatch> {
        let target = unit_vector(azimuth_deg, elevation_deg);
        if target[0].is_nan() {
            return None;
        }

        let mut best: Option<(usize, f64)> = None;
        for (idx, v) in self.look_vectors.iter().enumerate() {
            if v[0].is_nan() {
                continue;
            }
            let cos_sep = v[0] * target[0] + v[1] * target[1] + v[2] * target[2];
            if best.map_or(true, |(_, b)| cos_sep > b) {
                best = Some((idx, cos_sep));
            }
        }

        let (idx, cos_sep) = best?;
        let v = self.look_vectors[idx];
        let cross = [
            v[1] * target[2] - v[2] * target[1],
            v[2] * target[0] - v[0] * target[2],
            v[0] * target[1] - v[1] * target[0],
        ];
        let sin_sep = (cross[0] * cross[0] + cross[1] * cross[1] + cross[2] * cross[2]).sqrt();
        let cols = self.azimuth.cols();
        Some(PixelMatch {
            row: idx / cols,
            col: idx % cols,
            separation_deg: sin_sep.atan2(cos_sep).to_degrees(),
        })
    }
}

fn unit_vector(azimuth_deg: f64, elevation_deg: f64) -> [f64; 3] {
    if !azimuth_deg.is_finite() || !elevation_deg.is_finite() {
        return [f64::NAN; 3];
    }
    let az = azimuth_deg.to_radians();
    let el = elevation_deg.to_radians();
    [az.sin() * el.cos(), az.cos() * el.cos(), el.sin()]
}

/// Serialized form of a calibration record. `null` entries stand for pixels
/// without a value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationDocument {
    pub station_id: String,
    pub site_latitude: f64,
    pub site_longitude: f64,
    #[serde(default)]
    pub site_altitude_km: f64,
    pub reference_altitude_km: f64,
    pub rows: usize,
    pub cols: usize,
    pub azimuth: Vec<Option<f64>>,
    pub elevation: Vec<Option<f64>>,
    pub footprint_lat: Vec<Option<f64>>,
    pub footprint_lon: Vec<Option<f64>>,
}

impl CalibrationDocument {
    pub fn from_record(record: &CalibrationRecord) -> Self {
        let encode = |grid: &Grid| {
            grid.as_slice()
                .iter()
                .map(|v| v.is_finite().then_some(*v))
                .collect()
        };
        let (rows, cols) = record.shape();
        Self {
            station_id: record.station_id.clone(),
            site_latitude: record.site.latitude_deg,
            site_longitude: record.site.longitude_deg,
            site_altitude_km: record.site.altitude_km,
            reference_altitude_km: record.reference_altitude_km,
            rows,
            cols,
            azimuth: encode(&record.azimuth),
            elevation: encode(&record.elevation),
            footprint_lat: encode(&record.footprint_lat),
            footprint_lon: encode(&record.footprint_lon),
        }
    }
}

impl TryFrom<CalibrationDocument> for CalibrationRecord {
    type Error = CalibrationError;

    fn try_from(doc: CalibrationDocument) -> Result<Self, Self::Error> {
        let expected = doc
            .rows
            .checked_mul(doc.cols)
            .ok_or(CalibrationError::GridTooLarge {
                rows: doc.rows,
                cols: doc.cols,
            })?;
        let decode = |table: &'static str, values: Vec<Option<f64>>| {
            let len = values.len();
            let data = values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
            Grid::from_vec(doc.rows, doc.cols, data).ok_or(CalibrationError::LengthMismatch {
                table,
                expected,
                actual: len,
            })
        };

        let site = GroundStation::new(doc.site_latitude, doc.site_longitude, doc.site_altitude_km);
        CalibrationRecord::new(
            &doc.station_id,
            site,
            doc.reference_altitude_km,
            decode("azimuth", doc.azimuth)?,
            decode("elevation", doc.elevation)?,
            decode("footprint latitude", doc.footprint_lat)?,
            decode("footprint longitude", doc.footprint_lon)?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::FisheyeModel;

    fn record() -> CalibrationRecord {
        FisheyeModel::new(32, 32).build("rank", GroundStation::new(62.82, -92.11, 0.0))
            .unwrap()
    }

    #[test]
    fn rejects_mismatched_tables() {
        let err = CalibrationRecord::new(
            "RANK",
            GroundStation::default(),
            110.0,
            Grid::nan(4, 4),
            Grid::nan(4, 4),
            Grid::nan(4, 5),
            Grid::nan(4, 4),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CalibrationError::ShapeMismatch {
                table: "footprint latitude",
                ..
            }
        ));
    }

    #[test]
    fn station_id_is_normalized() {
        assert_eq!(record().station_id(), "RANK");
    }

    #[test]
    fn nearest_pixel_of_table_entry_is_exact() {
        let record = record();
        let (az, el) = record.look_direction(5, 20).unwrap();
        let hit = record.nearest_pixel(az, el).unwrap();
        assert_eq!((hit.row, hit.col), (5, 20));
        assert!(hit.separation_deg < 1e-6);
    }

    #[test]
    fn corner_pixels_have_no_direction() {
        let record = record();
        assert!(record.look_direction(0, 0).is_none());
        assert!(record.footprint(0, 0).is_none());
    }

    #[test]
    fn document_round_trip_preserves_nan_cells() {
        let record = record();
        let json = serde_json::to_string(&CalibrationDocument::from_record(&record)).unwrap();
        let doc: CalibrationDocument = serde_json::from_str(&json).unwrap();
        let back = CalibrationRecord::try_from(doc).unwrap();
        assert_eq!(back.shape(), record.shape());
        assert!(back.azimuth().at(0, 0).is_nan());
        assert_eq!(back.elevation().at(16, 16), record.elevation().at(16, 16));
    }

    #[test]
    fn document_with_overflowing_shape_is_rejected() {
        let mut doc = CalibrationDocument::from_record(&record());
        doc.rows = 1 << 33;
        doc.cols = 1 << 33;
        let err = CalibrationRecord::try_from(doc).unwrap_err();
        assert!(matches!(err, CalibrationError::GridTooLarge { .. }));
    }

    #[test]
    fn document_with_short_table_is_rejected() {
        let mut doc = CalibrationDocument::from_record(&record());
        doc.elevation.pop();
        let err = CalibrationRecord::try_from(doc).unwrap_err();
        assert!(matches!(
            err,
            CalibrationError::LengthMismatch {
                table: "elevation",
                ..
            }
        ));
    }
}
