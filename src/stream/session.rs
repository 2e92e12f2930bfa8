use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::fmt;

use super::error::{FrameSourceError, StreamError};
use super::frame::{FrameBatch, FrameRecord};
use super::source::{FrameHandle, FrameSource, SourceSlot};
use crate::time_range::TimeRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum StreamState {
    Idle,
    Streaming,
    Exhausted,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StreamOptions {
    /// Shape used for NaN frames when no real frame has been seen yet.
    pub frame_shape: Option<(usize, usize)>,
}

/// Hook invoked for every streamed step, e.g. to draw the frame and the
/// track position into an animation.
pub trait StepRenderer {
    type Handle;

    fn render(&mut self, index: usize, record: &FrameRecord) -> Self::Handle;
}

impl StepRenderer for () {
    type Handle = ();

    fn render(&mut self, _index: usize, _record: &FrameRecord) {}
}

#[derive(Debug)]
pub struct StreamStep<H> {
    pub index: usize,
    pub record: FrameRecord,
    pub handle: H,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissingFrameWarning {
    pub station_id: String,
    pub index: usize,
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for MissingFrameWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frame {} at {} is missing, substituting NaN",
            self.station_id,
            self.index,
            self.timestamp.to_rfc3339()
        )
    }
}

struct OpenHandle<H: FrameHandle> {
    inner: Option<H>,
}

impl<H: FrameHandle> OpenHandle<H> {
    fn next_slot(&mut self) -> Option<Result<SourceSlot, FrameSourceError>> {
        self.inner.as_mut().and_then(|h| h.next_slot())
    }

    fn close(&mut self) {
        if let Some(mut handle) = self.inner.take() {
            handle.close();
        }
    }
}

impl<H: FrameHandle> Drop for OpenHandle<H> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Frame-by-frame playback of one station over a time range.
///
/// A session is started once, then consumed either step by step (through
/// [`FrameStream::next_step`] or the `Iterator` impl) or in one go through
/// [`FrameStream::drain_all`]. The source handle is released when the frames
/// run out, on the first source error, or when the stream is dropped.
pub struct FrameStream<S: FrameSource, R: StepRenderer = ()> {
    source: S,
    renderer: R,
    state: StreamState,
    handle: OpenHandle<S::Handle>,
    station_id: String,
    lookahead: VecDeque<SourceSlot>,
    shape: Option<(usize, usize)>,
    cursor: usize,
    last_timestamp: Option<DateTime<Utc>>,
    warnings: Vec<MissingFrameWarning>,
}

impl<S: FrameSource> FrameStream<S, ()> {
    pub fn new(source: S) -> Self {
        Self::with_renderer(source, ())
    }
}

impl<S: FrameSource, R: StepRenderer> FrameStream<S, R> {
    pub fn with_renderer(source: S, renderer: R) -> Self {
        Self {
            source,
            renderer,
            state: StreamState::Idle,
            handle: OpenHandle { inner: None },
            station_id: String::new(),
            lookahead: VecDeque::new(),
            shape: None,
            cursor: 0,
            last_timestamp: None,
            warnings: Vec::new(),
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn warnings(&self) -> &[MissingFrameWarning] {
        &self.warnings
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Opens the source for `station_id` over `range`.
    ///
    /// Fails with [`StreamError::EmptyRange`] when the range holds no real
    /// frame; the stream is then exhausted and the handle already closed.
    pub fn start(
        &mut self,
        range: TimeRange,
        station_id: &str,
        options: StreamOptions,
    ) -> Result<(), StreamError> {
        if self.state != StreamState::Idle {
            return Err(StreamError::AlreadyStarted);
        }

        self.station_id = station_id.trim().to_uppercase();
        let handle = match self.source.open(&self.station_id, &range) {
            Ok(handle) => handle,
            Err(e) => return Err(self.fail(e)),
        };
        self.handle.inner = Some(handle);
        self.state = StreamState::Streaming;
        self.shape = options.frame_shape;

        // Buffer up to and including the first real frame.
        loop {
            match self.handle.next_slot() {
                None => break,
                Some(Err(e)) => return Err(self.fail(e)),
                Some(Ok(slot)) => {
                    let real = slot.frame.is_some();
                    self.lookahead.push_back(slot);
                    if real {
                        break;
                    }
                }
            }
        }

        let first_shape = self
            .lookahead
            .back()
            .and_then(|s| s.frame.as_ref())
            .map(|f| f.shape());
        match first_shape {
            Some(shape) => {
                if self.shape.is_none() {
                    self.shape = Some(shape);
                }
                log::info!(
                    "Streaming {} frames from {} to {}",
                    self.station_id,
                    range.start.to_rfc3339(),
                    range.end.to_rfc3339()
                );
                Ok(())
            }
            None => {
                self.finish();
                Err(StreamError::EmptyRange {
                    station_id: self.station_id.clone(),
                    start: range.start,
                    end: range.end,
                })
            }
        }
    }

    pub fn next_step(&mut self) -> Option<Result<StreamStep<R::Handle>, StreamError>> {
        if self.state != StreamState::Streaming {
            return None;
        }

        match self.pull() {
            None => {
                log::debug!("{} stream finished after {} steps", self.station_id, self.cursor);
                self.finish();
                None
            }
            Some(Err(e)) => Some(Err(self.fail(e))),
            Some(Ok(slot)) => {
                let index = self.cursor;
                let record = self.to_record(index, slot);
                self.cursor += 1;
                let handle = self.renderer.render(index, &record);
                Some(Ok(StreamStep {
                    index,
                    record,
                    handle,
                }))
            }
        }
    }

    /// Every remaining frame at once. Only allowed on a freshly started
    /// stream.
    pub fn drain_all(&mut self) -> Result<FrameBatch, StreamError> {
        match self.state {
            StreamState::Idle => return Err(StreamError::NotStarted),
            StreamState::Exhausted => return Err(StreamError::Exhausted),
            StreamState::Streaming if self.cursor > 0 => {
                return Err(StreamError::BulkAfterIteration {
                    consumed: self.cursor,
                })
            }
            StreamState::Streaming => {}
        }

        let mut records = Vec::new();
        loop {
            match self.pull() {
                None => break,
                Some(Err(e)) => return Err(self.fail(e)),
                Some(Ok(slot)) => {
                    let index = records.len();
                    records.push(self.to_record(index, slot));
                }
            }
        }

        self.cursor = records.len();
        self.finish();
        Ok(FrameBatch::new(records))
    }

    fn pull(&mut self) -> Option<Result<SourceSlot, FrameSourceError>> {
        match self.lookahead.pop_front() {
            Some(slot) => Some(Ok(slot)),
            None => self.handle.next_slot(),
        }
    }

    fn to_record(&mut self, index: usize, slot: SourceSlot) -> FrameRecord {
        if let Some(last) = self.last_timestamp {
            if slot.timestamp <= last {
                log::warn!(
                    "{} source returned {} after {}",
                    self.station_id,
                    slot.timestamp.to_rfc3339(),
                    last.to_rfc3339()
                );
            }
        }
        self.last_timestamp = Some(slot.timestamp);

        match slot.frame {
            Some(frame) => FrameRecord::new(slot.timestamp, frame),
            None => {
                let warning = MissingFrameWarning {
                    station_id: self.station_id.clone(),
                    index,
                    timestamp: slot.timestamp,
                };
                log::warn!("{}", warning);
                self.warnings.push(warning);
                let (rows, cols) = self.shape.unwrap_or((0, 0));
                FrameRecord::missing(slot.timestamp, rows, cols)
            }
        }
    }

    fn fail(&mut self, error: FrameSourceError) -> StreamError {
        log::error!("{} stream aborted: {}", self.station_id, error);
        self.finish();
        StreamError::FrameSource(error)
    }

    fn finish(&mut self) {
        self.handle.close();
        self.lookahead.clear();
        self.state = StreamState::Exhausted;
    }
}

impl<S: FrameSource, R: StepRenderer> Iterator for FrameStream<S, R> {
    type Item = Result<StreamStep<R::Handle>, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_step()
    }
}
