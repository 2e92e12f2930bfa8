mod error;
mod frame;
mod session;
mod source;

pub use error::{FrameSourceError, StreamError};
pub use frame::{FrameBatch, FrameRecord};
pub use session::{
    FrameStream, MissingFrameWarning, StepRenderer, StreamOptions, StreamState, StreamStep,
};
pub use source::{FrameHandle, FrameSource, InMemoryFrameSource, InMemoryHandle, SourceSlot};
