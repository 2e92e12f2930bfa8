use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::AnalysisError;
use crate::calibration::CalibrationRecord;
use crate::grid::Grid;
use crate::stream::FrameRecord;

/// Meridian slices of a frame sequence: one row per frame, one column per
/// image row that has a footprint latitude.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keogram {
    pub timestamps: Vec<DateTime<Utc>>,
    pub latitudes: Vec<f64>,
    pub data: Grid,
}

/// Stacks the center column of every frame. Image rows without a footprint
/// at the reference altitude are dropped.
pub fn keogram(frames: &[FrameRecord], record: &CalibrationRecord) -> Result<Keogram, AnalysisError> {
    if frames.is_empty() {
        return Err(AnalysisError::NoFrames);
    }

    let shape = record.shape();
    let center = shape.1 / 2;
    let (image_rows, latitudes): (Vec<usize>, Vec<f64>) = record
        .footprint_lat()
        .column(center)
        .into_iter()
        .enumerate()
        .filter(|(_, lat)| lat.is_finite())
        .unzip();

    let mut data = Grid::nan(frames.len(), image_rows.len());
    for (i, frame) in frames.iter().enumerate() {
        if frame.frame.shape() != shape {
            return Err(AnalysisError::ShapeMismatch {
                index: i,
                expected: shape,
                actual: frame.frame.shape(),
            });
        }
        for (j, &row) in image_rows.iter().enumerate() {
            data.set(i, j, frame.frame.at(row, center));
        }
    }

    log::debug!(
        "{} keogram: {} frames x {} latitudes",
        record.station_id(),
        frames.len(),
        latitudes.len()
    );

    Ok(Keogram {
        timestamps: frames.iter().map(|f| f.timestamp).collect(),
        latitudes,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{frames, rank_registry, t0};

    #[test]
    fn slices_center_column_of_every_frame() {
        let registry = rank_registry();
        let record = registry.get("RANK").unwrap();
        let records: Vec<FrameRecord> = (0..3)
            .map(|i| {
                let grid = Grid::from_fn(256, 256, |row, col| (i * 1000 + row) as f64 + col as f64 * 1e-3);
                FrameRecord::new(t0() + chrono::Duration::seconds(3 * i as i64), grid)
            })
            .collect();

        let k = keogram(&records, record).unwrap();
        assert_eq!(k.timestamps.len(), 3);
        assert_eq!(k.data.rows(), 3);
        assert_eq!(k.data.cols(), k.latitudes.len());
        assert!(!k.latitudes.is_empty());
        assert!(k.latitudes.iter().all(|l| l.is_finite()));
        // Every sampled value comes from column 128.
        assert!(k
            .data
            .as_slice()
            .iter()
            .all(|v| ((v.fract() * 1e3).round() - 128.0).abs() < 1e-6));
        // The top of the image is north.
        assert!(k.latitudes[0] > k.latitudes[k.latitudes.len() - 1]);
    }

    #[test]
    fn empty_and_mismatched_inputs_fail() {
        let registry = rank_registry();
        let record = registry.get("RANK").unwrap();
        assert_eq!(keogram(&[], record), Err(AnalysisError::NoFrames));
        assert!(matches!(
            keogram(&frames(2, 8, 8), record),
            Err(AnalysisError::ShapeMismatch { index: 0, .. })
        ));
    }
}
