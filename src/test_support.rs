//! Fixtures shared by unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::calibration::{CalibrationRegistry, FisheyeModel};
use crate::grid::Grid;
use crate::station::GroundStation;
use crate::stream::FrameRecord;
use crate::track::{GroundTrack, TrackPoint};

pub const RANK_LAT: f64 = 62.82;
pub const RANK_LON: f64 = -92.11;

pub fn rank_site() -> GroundStation {
    GroundStation::new(RANK_LAT, RANK_LON, 0.03)
}

/// Rankin Inlet with a 256x256 equidistant fisheye mapped at 110 km.
pub fn rank_registry() -> CalibrationRegistry {
    let mut registry = CalibrationRegistry::new();
    let record = FisheyeModel::new(256, 256)
        .build("RANK", rank_site())
        .unwrap();
    registry.insert(record);
    registry
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2017, 4, 13, 5, 0, 0).unwrap()
}

/// 40 samples at 3 s cadence passing just east of the station, south to north.
pub fn rank_track() -> GroundTrack {
    (0..40)
        .map(|i| {
            let lat = 62.5 + 0.6 * i as f64 / 39.0;
            TrackPoint::new(lat, RANK_LON + 0.05, 110.0).at(t0() + Duration::seconds(3 * i))
        })
        .collect()
}

pub fn frames(count: usize, rows: usize, cols: usize) -> Vec<FrameRecord> {
    (0..count)
        .map(|i| {
            FrameRecord::new(
                t0() + Duration::seconds(3 * i as i64),
                Grid::filled(rows, cols, i as f64),
            )
        })
        .collect()
}
