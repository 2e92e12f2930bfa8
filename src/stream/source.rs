use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

use super::error::FrameSourceError;
use super::frame::FrameRecord;
use crate::grid::Grid;
use crate::time_range::TimeRange;

/// One cadence slot from a frame source; `frame` is `None` when the source
/// knows the slot exists but has no data for it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceSlot {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub frame: Option<Grid>,
}

pub trait FrameSource {
    type Handle: FrameHandle;

    /// Opens the frames of `station_id` in `range`, ordered by timestamp.
    fn open(&mut self, station_id: &str, range: &TimeRange) -> Result<Self::Handle, FrameSourceError>;
}

/// An open cursor over a frame source. `close` releases whatever the handle
/// holds and is called exactly once by the stream.
pub trait FrameHandle {
    fn next_slot(&mut self) -> Option<Result<SourceSlot, FrameSourceError>>;
    fn close(&mut self);
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryFrameSource {
    slots: HashMap<String, Vec<SourceSlot>>,
}

impl InMemoryFrameSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, station_id: &str, record: FrameRecord) {
        let frame = (!record.missing).then_some(record.frame);
        self.insert_slot(
            station_id,
            SourceSlot {
                timestamp: record.timestamp,
                frame,
            },
        );
    }

    pub fn insert_slot(&mut self, station_id: &str, slot: SourceSlot) {
        self.slots
            .entry(station_id.trim().to_uppercase())
            .or_default()
            .push(slot);
    }

    pub fn extend(&mut self, station_id: &str, records: impl IntoIterator<Item = FrameRecord>) {
        for record in records {
            self.insert(station_id, record);
        }
    }
}

impl FrameSource for InMemoryFrameSource {
    type Handle = InMemoryHandle;

    fn open(&mut self, station_id: &str, range: &TimeRange) -> Result<Self::Handle, FrameSourceError> {
        let all = self
            .slots
            .get(&station_id.trim().to_uppercase())
            .ok_or_else(|| FrameSourceError::StationNotFound(station_id.to_string()))?;

        let mut slots: Vec<SourceSlot> = all
            .iter()
            .filter(|s| range.contains(s.timestamp))
            .cloned()
            .collect();
        slots.sort_by_key(|s| s.timestamp);

        Ok(InMemoryHandle {
            slots: slots.into_iter(),
        })
    }
}

pub struct InMemoryHandle {
    slots: std::vec::IntoIter<SourceSlot>,
}

impl FrameHandle for InMemoryHandle {
    fn next_slot(&mut self) -> Option<Result<SourceSlot, FrameSourceError>> {
        self.slots.next().map(Ok)
    }

    fn close(&mut self) {
        self.slots = Vec::new().into_iter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{frames, t0};
    use chrono::Duration;

    #[test]
    fn open_filters_half_open_range_and_sorts() {
        let mut source = InMemoryFrameSource::new();
        let mut records = frames(10, 2, 2);
        records.reverse();
        source.extend("rank", records);

        let range = TimeRange::new(t0() + Duration::seconds(3), t0() + Duration::seconds(12)).unwrap();
        let mut handle = source.open("RANK", &range).unwrap();
        let mut got = Vec::new();
        while let Some(slot) = handle.next_slot() {
            got.push(slot.unwrap().timestamp);
        }
        assert_eq!(
            got,
            vec![
                t0() + Duration::seconds(3),
                t0() + Duration::seconds(6),
                t0() + Duration::seconds(9)
            ]
        );
    }

    #[test]
    fn unknown_station_fails_to_open() {
        let mut source = InMemoryFrameSource::new();
        let range = TimeRange::new(t0(), t0() + Duration::minutes(1)).unwrap();
        assert!(matches!(
            source.open("GILL", &range),
            Err(FrameSourceError::StationNotFound(_))
        ));
    }

    #[test]
    fn closed_handle_yields_nothing() {
        let mut source = InMemoryFrameSource::new();
        source.extend("RANK", frames(3, 1, 1));
        let range = TimeRange::new(t0(), t0() + Duration::minutes(1)).unwrap();
        let mut handle = source.open("RANK", &range).unwrap();
        handle.close();
        assert!(handle.next_slot().is_none());
    }
}
