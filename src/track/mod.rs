mod error;
mod ground_track;
mod tle;

pub use error::{TleTrackError, TrackError};
pub use ground_track::{GroundTrack, TrackPoint};
pub use tle::{ground_track_from_tle, parse_tle_lines};
