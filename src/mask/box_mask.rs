use serde::Serialize;
use utoipa::ToSchema;

use super::error::MaskError;
use crate::calibration::CalibrationRecord;
use crate::mapper::Pixel;
use crate::station::great_circle_km;

/// Box width (east-west along image rows) and height (along image columns) in
/// kilometers at the calibration's reference altitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSize {
    width_km: f64,
    height_km: f64,
}

impl BoxSize {
    pub fn new(width_km: f64, height_km: f64) -> Result<Self, MaskError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width_km) || !valid(height_km) {
            return Err(MaskError::InvalidBox {
                width_km,
                height_km,
            });
        }
        Ok(Self {
            width_km,
            height_km,
        })
    }

    pub fn width_km(&self) -> f64 {
        self.width_km
    }

    pub fn height_km(&self) -> f64 {
        self.height_km
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PixelBounds {
    pub row_min: usize,
    pub row_max: usize,
    pub col_min: usize,
    pub col_max: usize,
}

impl PixelBounds {
    pub fn pixel_count(&self) -> usize {
        (self.row_max - self.row_min + 1) * (self.col_max - self.col_min + 1)
    }
}

/// `N x H x W` mask: `1.0` inside the box at step `i`, `NaN` elsewhere.
/// Multiplying a frame by a step and taking a NaN-ignoring mean gives the
/// in-box mean intensity.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxMask {
    rows: usize,
    cols: usize,
    bounds: Vec<Option<PixelBounds>>,
    data: Vec<f64>,
}

impl BoxMask {
    fn empty(steps: usize, rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            bounds: vec![None; steps],
            data: vec![f64::NAN; steps * rows * cols],
        }
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.bounds.len(), self.rows, self.cols)
    }

    pub fn steps(&self) -> usize {
        self.bounds.len()
    }

    pub fn step(&self, i: usize) -> &[f64] {
        let len = self.rows * self.cols;
        &self.data[i * len..(i + 1) * len]
    }

    pub fn value(&self, i: usize, row: usize, col: usize) -> f64 {
        self.step(i)[row * self.cols + col]
    }

    pub fn bounds(&self, i: usize) -> Option<PixelBounds> {
        self.bounds[i]
    }

    pub fn inside_count(&self, i: usize) -> usize {
        self.step(i).iter().filter(|v| **v == 1.0).count()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    fn fill(&mut self, i: usize, b: PixelBounds) {
        let len = self.rows * self.cols;
        let step = &mut self.data[i * len..(i + 1) * len];
        for row in b.row_min..=b.row_max {
            step[row * self.cols + b.col_min..=row * self.cols + b.col_max].fill(1.0);
        }
        self.bounds[i] = Some(b);
    }
}

/// Box rectangle of every step for already-mapped pixels. Each rectangle grows
/// out from the center pixel along its row and column while the summed
/// footprint distance stays within half the box size; it stops at the frame
/// edge or at pixels with no footprint. `None` where the center is out of
/// frame or has no footprint.
pub fn mask_bounds(
    record: &CalibrationRecord,
    pixels: &[Option<Pixel>],
    size: BoxSize,
) -> Vec<Option<PixelBounds>> {
    let half_width = size.width_km / 2.0;
    let half_height = size.height_km / 2.0;

    pixels
        .iter()
        .enumerate()
        .map(|(i, pixel)| {
            let center = (*pixel)?;
            if record.footprint(center.y, center.x).is_none() {
                log::debug!(
                    "Step {}: pixel ({}, {}) has no footprint, leaving mask empty",
                    i,
                    center.x,
                    center.y
                );
                return None;
            }

            let left = extent(record, center, (0, -1), half_width);
            let right = extent(record, center, (0, 1), half_width);
            let up = extent(record, center, (-1, 0), half_height);
            let down = extent(record, center, (1, 0), half_height);

            Some(PixelBounds {
                row_min: center.y - up,
                row_max: center.y + down,
                col_min: center.x - left,
                col_max: center.x + right,
            })
        })
        .collect()
}

pub fn build_mask(record: &CalibrationRecord, pixels: &[Option<Pixel>], size: BoxSize) -> BoxMask {
    let (rows, cols) = record.shape();
    let mut mask = BoxMask::empty(pixels.len(), rows, cols);
    for (i, bounds) in mask_bounds(record, pixels, size).into_iter().enumerate() {
        if let Some(b) = bounds {
            mask.fill(i, b);
        }
    }
    mask
}

/// Number of pixels past `center` in direction `(d_row, d_col)` whose summed
/// footprint distance from the center is at most `limit_km`.
fn extent(record: &CalibrationRecord, center: Pixel, dir: (isize, isize), limit_km: f64) -> usize {
    let (rows, cols) = record.shape();
    let radius = record.footprint_radius_km();
    let (mut row, mut col) = (center.y, center.x);
    let Some(mut prev) = record.footprint(row, col) else {
        return 0;
    };

    let mut travelled = 0.0;
    let mut count = 0;
    loop {
        let next_row = row as isize + dir.0;
        let next_col = col as isize + dir.1;
        if next_row < 0 || next_col < 0 || next_row >= rows as isize || next_col >= cols as isize {
            break;
        }
        let (next_row, next_col) = (next_row as usize, next_col as usize);
        let Some(fp) = record.footprint(next_row, next_col) else {
            break;
        };

        travelled += great_circle_km(prev.0, prev.1, fp.0, fp.1, radius);
        if travelled > limit_km {
            break;
        }
        count += 1;
        prev = fp;
        row = next_row;
        col = next_col;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{CalibrationRegistry, FisheyeModel};
    use crate::mapper::{MapError, SkyMapper};
    use crate::station::GroundStation;
    use crate::test_support::{rank_registry, rank_track, RANK_LAT, RANK_LON};
    use crate::track::{GroundTrack, TrackError, TrackPoint};
    use approx::assert_relative_eq;

    #[test]
    fn non_positive_box_is_rejected() {
        let registry = rank_registry();
        let mapper = SkyMapper::new(&registry);
        for box_km in [(0.0, 10.0), (10.0, -1.0), (f64::NAN, 10.0)] {
            let err = mapper.equal_area_mask("RANK", &rank_track(), box_km).unwrap_err();
            assert!(matches!(err, MaskError::InvalidBox { .. }));
        }
    }

    #[test]
    fn mapping_errors_propagate() {
        let registry = rank_registry();
        let mapper = SkyMapper::new(&registry);
        let err = mapper
            .equal_area_mask("LUCK", &rank_track(), (10.0, 10.0))
            .unwrap_err();
        assert_eq!(err, MaskError::Map(MapError::UnknownStation("LUCK".into())));

        let err = mapper
            .equal_area_mask("RANK", &GroundTrack::default(), (10.0, 10.0))
            .unwrap_err();
        assert_eq!(err, MaskError::Map(MapError::MalformedTrack(TrackError::Empty)));
    }

    #[test]
    fn values_are_one_or_nan_and_shape_matches_grid() {
        let registry = rank_registry();
        let mapper = SkyMapper::new(&registry);
        let mask = mapper
            .equal_area_mask("RANK", &rank_track(), (20.0, 20.0))
            .unwrap();
        assert_eq!(mask.shape(), (40, 256, 256));
        assert!(mask.as_slice().iter().all(|v| *v == 1.0 || v.is_nan()));
    }

    #[test]
    fn mask_is_deterministic() {
        let registry = rank_registry();
        let mapper = SkyMapper::new(&registry);
        let a = mapper.equal_area_mask("RANK", &rank_track(), (15.0, 30.0)).unwrap();
        let b = mapper.equal_area_mask("RANK", &rank_track(), (15.0, 30.0)).unwrap();
        for i in 0..a.steps() {
            assert_eq!(a.bounds(i), b.bounds(i));
            assert_eq!(a.inside_count(i), b.inside_count(i));
        }
    }

    #[test]
    fn larger_boxes_never_shrink() {
        let registry = rank_registry();
        let mapper = SkyMapper::new(&registry);
        let track = rank_track();
        let mut previous: Option<BoxMask> = None;
        for km in [2.0, 5.0, 10.0, 20.0, 40.0, 80.0] {
            let mask = mapper.equal_area_mask("RANK", &track, (km, km)).unwrap();
            if let Some(prev) = &previous {
                for i in 0..mask.steps() {
                    assert!(mask.inside_count(i) >= prev.inside_count(i));
                }
            }
            previous = Some(mask);
        }
    }

    #[test]
    fn box_is_centered_on_mapped_pixel() {
        let registry = rank_registry();
        let mapper = SkyMapper::new(&registry);
        let track = rank_track();
        let (_, pixels) = mapper.map_to_pixels("RANK", &track).unwrap();
        let mask = mapper.equal_area_mask("RANK", &track, (10.0, 10.0)).unwrap();
        for (i, pixel) in pixels.iter().enumerate() {
            let p = pixel.unwrap();
            assert_eq!(mask.value(i, p.y, p.x), 1.0);
            let b = mask.bounds(i).unwrap();
            assert!(b.row_min <= p.y && p.y <= b.row_max);
            assert!(b.col_min <= p.x && p.x <= b.col_max);
            assert_eq!(b.pixel_count(), mask.inside_count(i));
        }
    }

    #[test]
    fn in_box_area_approximates_requested_area() {
        let registry = rank_registry();
        let mapper = SkyMapper::new(&registry);
        let record = registry.get("RANK").unwrap();
        let track = rank_track();
        let (_, pixels) = mapper.map_to_pixels("RANK", &track).unwrap();
        let mask = mapper.equal_area_mask("RANK", &track, (20.0, 20.0)).unwrap();

        let radius = record.footprint_radius_km();
        for (i, pixel) in pixels.iter().enumerate() {
            let p = pixel.unwrap();
            let fp = |r: usize, c: usize| record.footprint(r, c).unwrap();
            let (l, r) = (fp(p.y, p.x - 1), fp(p.y, p.x + 1));
            let (u, d) = (fp(p.y - 1, p.x), fp(p.y + 1, p.x));
            let dx = great_circle_km(l.0, l.1, r.0, r.1, radius) / 2.0;
            let dy = great_circle_km(u.0, u.1, d.0, d.1, radius) / 2.0;
            let area = mask.inside_count(i) as f64 * dx * dy;
            assert_relative_eq!(area, 400.0, max_relative = 0.3);
        }
    }

    #[test]
    fn out_of_frame_center_gives_empty_step() {
        let registry = rank_registry();
        let mapper = SkyMapper::new(&registry);
        let track = GroundTrack::new(vec![
            TrackPoint::new(RANK_LAT, RANK_LON, 110.0),
            TrackPoint::new(-RANK_LAT, RANK_LON + 180.0, 110.0),
        ]);
        let mask = mapper.equal_area_mask("RANK", &track, (10.0, 10.0)).unwrap();
        assert!(mask.inside_count(0) > 0);
        assert_eq!(mask.inside_count(1), 0);
        assert!(mask.step(1).iter().all(|v| v.is_nan()));
        assert!(mask.bounds(1).is_none());
    }

    #[test]
    fn bounds_agree_with_dense_mask() {
        let registry = rank_registry();
        let mapper = SkyMapper::new(&registry);
        let track = rank_track();
        let mask = mapper.equal_area_mask("RANK", &track, (20.0, 20.0)).unwrap();
        let bounds = mapper.mask_bounds("RANK", &track, (20.0, 20.0)).unwrap();

        assert_eq!(bounds.len(), mask.steps());
        for (i, b) in bounds.iter().enumerate() {
            assert_eq!(*b, mask.bounds(i));
            assert_eq!(b.map_or(0, |b| b.pixel_count()), mask.inside_count(i));
        }
    }

    #[test]
    fn box_is_clipped_at_frame_edge() {
        // A narrow-field lens whose field of view covers the whole frame.
        let mut model = FisheyeModel::new(24, 24);
        model.radius_px = Some(200.0);
        let site = GroundStation::new(RANK_LAT, RANK_LON, 0.0);
        let mut registry = CalibrationRegistry::new();
        registry.insert(model.build("NARROW", site).unwrap());
        let record = registry.get("NARROW").unwrap();

        let (lat, lon) = record.footprint(1, 1).unwrap();
        let track = GroundTrack::new(vec![TrackPoint::new(lat, lon, 110.0)]);
        let mask = SkyMapper::new(&registry)
            .equal_area_mask("NARROW", &track, (10_000.0, 10_000.0))
            .unwrap();

        let b = mask.bounds(0).unwrap();
        assert_eq!((b.row_min, b.col_min), (0, 0));
        assert_eq!((b.row_max, b.col_max), (23, 23));
        assert_eq!(mask.inside_count(0), 24 * 24);
    }
}
