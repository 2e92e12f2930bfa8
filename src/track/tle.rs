use chrono::{DateTime, Duration, Utc};
use sgp4::{Constants, Elements};

use super::error::TleTrackError;
use super::ground_track::{GroundTrack, TrackPoint};
use crate::station::ecef_to_geodetic;
use crate::time_range::TimeRange;

pub fn parse_tle_lines(tle: &str) -> Result<(Option<String>, String, String), TleTrackError> {
    let lines: Vec<String> = tle
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();

    match lines.len() {
        2 => Ok((None, lines[0].clone(), lines[1].clone())),
        3 => Ok((Some(lines[0].clone()), lines[1].clone(), lines[2].clone())),
        _ => Err(TleTrackError::InvalidTleFormat),
    }
}

/// Propagates a two/three-line element set over `range` at `step` and
/// returns the sub-satellite track. With `altitude_km` set, every sample is
/// placed at that altitude instead of the satellite's own.
pub fn ground_track_from_tle(
    tle: &str,
    range: &TimeRange,
    step: Duration,
    altitude_km: Option<f64>,
) -> Result<GroundTrack, TleTrackError> {
    let (name, line1, line2) = parse_tle_lines(tle)?;
    let elements = Elements::from_tle(name, line1.as_bytes(), line2.as_bytes())?;
    let constants = Constants::from_elements(&elements)?;

    let track: GroundTrack = range
        .steps(step)?
        .into_iter()
        .map(|t| propagate_point(&elements, &constants, t))
        .collect::<Result<_, _>>()?;

    log::debug!(
        "Propagated {} samples for {}",
        track.len(),
        elements.object_name.as_deref().unwrap_or("unnamed object")
    );

    let track = match altitude_km {
        Some(alt) => track.at_altitude(alt),
        None => track,
    };
    track.validate()?;
    Ok(track)
}

fn propagate_point(
    elements: &Elements,
    constants: &Constants,
    timestamp: DateTime<Utc>,
) -> Result<TrackPoint, TleTrackError> {
    let minutes = elements
        .datetime_to_minutes_since_epoch(&timestamp.naive_utc())
        .map_err(|e| TleTrackError::Propagation(e.to_string()))?;

    let prediction = constants
        .propagate(minutes)
        .map_err(|e| TleTrackError::Propagation(e.to_string()))?;

    let sidereal =
        sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&timestamp.naive_utc()));

    let ecef = teme_to_ecef_position(prediction.position, sidereal);
    let (lat, lon, alt) = ecef_to_geodetic(ecef);
    Ok(TrackPoint::new(lat, lon, alt).at(timestamp))
}

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}
