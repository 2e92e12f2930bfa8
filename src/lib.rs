//! Maps satellite ground tracks into all-sky imager frames and streams the
//! frames for per-step analysis.

pub mod analysis;
pub mod calibration;
pub mod config;
pub mod grid;
pub mod mapper;
pub mod mask;
pub mod station;
pub mod stream;
pub mod time_range;
pub mod track;
pub mod web;

#[cfg(test)]
mod test_support;
