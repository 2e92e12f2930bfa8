use serde::{Deserialize, Serialize};

/// Row-major 2-D array of `f64` values. `NaN` marks a cell with no value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

#[derive(Deserialize)]
struct RawGrid {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl TryFrom<RawGrid> for Grid {
    type Error = String;

    fn try_from(raw: RawGrid) -> Result<Self, Self::Error> {
        let len = raw.data.len();
        Grid::from_vec(raw.rows, raw.cols, raw.data).ok_or_else(|| {
            format!(
                "grid data holds {} values, expected {}x{}",
                len, raw.rows, raw.cols
            )
        })
    }
}

impl Grid {
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    pub fn nan(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, f64::NAN)
    }

    /// Builds a grid from row-major data. Returns `None` if the length does not
    /// match `rows * cols` or the product overflows.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Option<Self> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return None;
        }
        Some(Self { rows, cols, data })
    }

    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                data.push(f(row, col));
            }
        }
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.rows).map(|row| self.at(row, col)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_rejects_wrong_length() {
        assert!(Grid::from_vec(2, 3, vec![0.0; 5]).is_none());
        assert!(Grid::from_vec(2, 3, vec![0.0; 6]).is_some());
        assert!(Grid::from_vec(1 << 33, 1 << 33, Vec::new()).is_none());
    }

    #[test]
    fn indexing_is_row_major() {
        let grid = Grid::from_fn(2, 3, |r, c| (r * 10 + c) as f64);
        assert_eq!(grid.at(1, 2), 12.0);
        assert_eq!(grid.as_slice()[5], 12.0);
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.column(1), vec![1.0, 11.0]);
    }

    #[test]
    fn deserialize_checks_length() {
        let ok: Grid = serde_yaml::from_str("{rows: 1, cols: 2, data: [1.0, .nan]}").unwrap();
        assert!(ok.at(0, 1).is_nan());
        assert!(serde_yaml::from_str::<Grid>("{rows: 2, cols: 2, data: [1.0]}").is_err());
    }
}
