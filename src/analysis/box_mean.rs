use super::error::AnalysisError;
use crate::mask::BoxMask;
use crate::stream::FrameRecord;

/// Mean intensity inside the box at every step, ignoring `NaN` pixels.
/// Steps with nothing to average (out-of-frame box, missing frame) are `NaN`.
pub fn box_mean(frames: &[FrameRecord], mask: &BoxMask) -> Result<Vec<f64>, AnalysisError> {
    let (steps, rows, cols) = mask.shape();
    if frames.len() != steps {
        return Err(AnalysisError::StepCountMismatch {
            frames: frames.len(),
            steps,
        });
    }

    frames
        .iter()
        .enumerate()
        .map(|(i, record)| {
            if record.frame.shape() != (rows, cols) {
                return Err(AnalysisError::ShapeMismatch {
                    index: i,
                    expected: (rows, cols),
                    actual: record.frame.shape(),
                });
            }

            let (sum, count) = record
                .frame
                .as_slice()
                .iter()
                .zip(mask.step(i))
                .map(|(v, m)| v * m)
                .filter(|v| !v.is_nan())
                .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));

            Ok(if count == 0 { f64::NAN } else { sum / count as f64 })
        })
        .collect()
}
