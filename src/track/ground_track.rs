use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::TrackError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TrackPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

impl TrackPoint {
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_km: f64) -> Self {
        Self {
            time: None,
            latitude_deg,
            longitude_deg,
            altitude_km,
        }
    }

    pub fn at(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroundTrack {
    points: Vec<TrackPoint>,
}

impl GroundTrack {
    pub fn new(points: Vec<TrackPoint>) -> Self {
        Self { points }
    }

    /// Zips per-component vectors into a track; every vector must have the
    /// same length.
    pub fn from_components(
        latitudes: &[f64],
        longitudes: &[f64],
        altitudes_km: &[f64],
        times: Option<&[DateTime<Utc>]>,
    ) -> Result<Self, TrackError> {
        if latitudes.len() != longitudes.len() || latitudes.len() != altitudes_km.len() {
            return Err(TrackError::LengthMismatch {
                latitudes: latitudes.len(),
                longitudes: longitudes.len(),
                altitudes: altitudes_km.len(),
            });
        }
        if let Some(times) = times {
            if times.len() != latitudes.len() {
                return Err(TrackError::TimestampMismatch {
                    count: times.len(),
                    expected: latitudes.len(),
                });
            }
        }

        let points = (0..latitudes.len())
            .map(|i| TrackPoint {
                time: times.map(|t| t[i]),
                latitude_deg: latitudes[i],
                longitude_deg: longitudes[i],
                altitude_km: altitudes_km[i],
            })
            .collect();
        Ok(Self { points })
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrackPoint> {
        self.points.iter()
    }

    /// Checks the track is non-empty and every sample is a finite, valid
    /// coordinate.
    pub fn validate(&self) -> Result<(), TrackError> {
        if self.points.is_empty() {
            return Err(TrackError::Empty);
        }
        for (index, p) in self.points.iter().enumerate() {
            for (field, value) in [
                ("latitude", p.latitude_deg),
                ("longitude", p.longitude_deg),
                ("altitude", p.altitude_km),
            ] {
                if !value.is_finite() {
                    return Err(TrackError::NonFinite { index, field });
                }
            }
            if p.latitude_deg.abs() > 90.0 {
                return Err(TrackError::LatitudeOutOfRange {
                    index,
                    value: p.latitude_deg,
                });
            }
        }
        Ok(())
    }

    /// Same track with every sample moved to `altitude_km`, e.g. to map a
    /// satellite's sub-point onto the auroral emission layer.
    pub fn at_altitude(&self, altitude_km: f64) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| TrackPoint { altitude_km, ..*p })
                .collect(),
        }
    }
}

impl FromIterator<TrackPoint> for GroundTrack {
    fn from_iter<I: IntoIterator<Item = TrackPoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_must_have_equal_length() {
        let err = GroundTrack::from_components(&[60.0, 61.0], &[-95.0], &[110.0, 110.0], None)
            .unwrap_err();
        assert_eq!(
            err,
            TrackError::LengthMismatch {
                latitudes: 2,
                longitudes: 1,
                altitudes: 2
            }
        );
    }

    #[test]
    fn empty_track_is_invalid() {
        assert_eq!(GroundTrack::default().validate(), Err(TrackError::Empty));
    }

    #[test]
    fn non_finite_sample_is_reported_by_index() {
        let track = GroundTrack::new(vec![
            TrackPoint::new(60.0, -95.0, 110.0),
            TrackPoint::new(60.1, f64::NAN, 110.0),
        ]);
        assert_eq!(
            track.validate(),
            Err(TrackError::NonFinite {
                index: 1,
                field: "longitude"
            })
        );
    }

    #[test]
    fn latitude_beyond_pole_is_invalid() {
        let track = GroundTrack::new(vec![TrackPoint::new(91.0, 0.0, 110.0)]);
        assert!(matches!(
            track.validate(),
            Err(TrackError::LatitudeOutOfRange { index: 0, .. })
        ));
    }

    #[test]
    fn at_altitude_keeps_horizontal_position() {
        let track = GroundTrack::new(vec![TrackPoint::new(60.0, -95.0, 500.0)]);
        let lowered = track.at_altitude(110.0);
        assert_eq!(lowered.points()[0].latitude_deg, 60.0);
        assert_eq!(lowered.points()[0].altitude_km, 110.0);
    }

    #[test]
    fn deserializes_from_yaml_list() {
        let yaml = "- latitude_deg: 62.0\n  longitude_deg: -93.0\n  altitude_km: 110\n- time: 2017-04-13T05:00:00Z\n  latitude_deg: 62.1\n  longitude_deg: -93.0\n  altitude_km: 110\n";
        let track: GroundTrack = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(track.len(), 2);
        assert!(track.points()[0].time.is_none());
        assert!(track.points()[1].time.is_some());
    }
}
