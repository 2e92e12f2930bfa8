use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error, PartialEq)]
pub enum TimeRangeError {
    #[error("invalid time {input:?}: {message}")]
    InvalidTime { input: String, message: String },
    #[error("time range start {start} must be before end {end}")]
    Inverted {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("step must be positive")]
    NonPositiveStep,
}

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TimeRangeError> {
        if start >= end {
            return Err(TimeRangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parses an RFC 3339 start and an end that is either RFC 3339 or a
    /// duration relative to the start, such as `+2m` or `+1h 30m`.
    pub fn parse(start: &str, end: &str) -> Result<Self, TimeRangeError> {
        let start = parse_instant(start)?;
        let end_trimmed = end.trim();
        let end = match end_trimmed.strip_prefix('+') {
            Some(rest) => start + parse_duration(rest)?,
            None => parse_instant(end_trimmed)?,
        };
        Self::new(start, end)
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Instants `start, start + step, ...` strictly before `end`.
    pub fn steps(&self, step: Duration) -> Result<Vec<DateTime<Utc>>, TimeRangeError> {
        if step <= Duration::zero() {
            return Err(TimeRangeError::NonPositiveStep);
        }
        let mut cursor = self.start;
        let mut out = Vec::new();
        while cursor < self.end {
            out.push(cursor);
            cursor += step;
        }
        Ok(out)
    }
}

pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, TimeRangeError> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TimeRangeError::InvalidTime {
            input: s.to_string(),
            message: e.to_string(),
        })
}

pub fn parse_duration(s: &str) -> Result<Duration, TimeRangeError> {
    let invalid = |message: String| TimeRangeError::InvalidTime {
        input: s.to_string(),
        message,
    };
    humantime::parse_duration(s.trim())
        .map_err(|e| invalid(e.to_string()))
        .and_then(|d| Duration::from_std(d).map_err(|e| invalid(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2008, 3, 9, h, m, s).unwrap()
    }

    #[test]
    fn parses_absolute_range() {
        let range = TimeRange::parse("2008-03-09T04:39:00Z", "2008-03-09T04:40:00Z").unwrap();
        assert_eq!(range.start, t(4, 39, 0));
        assert_eq!(range.end, t(4, 40, 0));
    }

    #[test]
    fn parses_relative_end() {
        let range = TimeRange::parse("2008-03-09T04:39:00Z", "+2m").unwrap();
        assert_eq!(range.end, t(4, 41, 0));
    }

    #[test]
    fn rejects_inverted_and_empty_ranges() {
        assert!(matches!(
            TimeRange::new(t(4, 40, 0), t(4, 39, 0)),
            Err(TimeRangeError::Inverted { .. })
        ));
        assert!(TimeRange::new(t(4, 40, 0), t(4, 40, 0)).is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            TimeRange::parse("yesterday", "+2m"),
            Err(TimeRangeError::InvalidTime { .. })
        ));
    }

    #[test]
    fn end_is_exclusive() {
        let range = TimeRange::new(t(4, 39, 0), t(4, 40, 0)).unwrap();
        assert!(range.contains(t(4, 39, 0)));
        assert!(!range.contains(t(4, 40, 0)));
    }

    #[test]
    fn steps_cover_half_open_interval() {
        let range = TimeRange::new(t(4, 39, 0), t(4, 41, 0)).unwrap();
        let steps = range.steps(Duration::seconds(3)).unwrap();
        assert_eq!(steps.len(), 40);
        assert_eq!(steps[39], t(4, 40, 57));
        assert!(range.steps(Duration::zero()).is_err());
    }
}
