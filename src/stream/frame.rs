use chrono::{DateTime, Utc};

use crate::grid::Grid;

/// One camera frame and its timestamp. Slots the source reported as missing
/// carry a NaN-filled frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub timestamp: DateTime<Utc>,
    pub frame: Grid,
    pub missing: bool,
}

impl FrameRecord {
    pub fn new(timestamp: DateTime<Utc>, frame: Grid) -> Self {
        Self {
            timestamp,
            frame,
            missing: false,
        }
    }

    pub fn missing(timestamp: DateTime<Utc>, rows: usize, cols: usize) -> Self {
        Self {
            timestamp,
            frame: Grid::nan(rows, cols),
            missing: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameBatch {
    records: Vec<FrameRecord>,
}

impl FrameBatch {
    pub fn new(records: Vec<FrameRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[FrameRecord] {
        &self.records
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.records.iter().map(|r| r.timestamp).collect()
    }

    pub fn frames(&self) -> impl Iterator<Item = &Grid> {
        self.records.iter().map(|r| &r.frame)
    }

    pub fn into_parts(self) -> (Vec<DateTime<Utc>>, Vec<Grid>) {
        self.records
            .into_iter()
            .map(|r| (r.timestamp, r.frame))
            .unzip()
    }
}
