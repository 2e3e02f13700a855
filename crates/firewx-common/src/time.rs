//! Analysis cycle timestamps and dataset cadence.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Publication cadence of an analysis product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cadence {
    minutes: u32,
}

impl Cadence {
    /// Create a cadence; zero minutes is clamped to one.
    pub fn from_minutes(minutes: u32) -> Self {
        Self {
            minutes: minutes.max(1),
        }
    }

    /// RTMA analyses are published every hour.
    pub fn hourly() -> Self {
        Self::from_minutes(60)
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn as_duration(&self) -> Duration {
        Duration::minutes(self.minutes as i64)
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self::hourly()
    }
}

/// One published analysis, identified by its valid time.
///
/// The timestamp is always aligned to the cadence it was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnalysisCycle {
    valid_time: DateTime<Utc>,
}

impl AnalysisCycle {
    /// Truncate an arbitrary instant down to the start of its cycle.
    pub fn truncate(time: DateTime<Utc>, cadence: Cadence) -> Self {
        let step = cadence.minutes() as i64 * 60;
        let secs = time.timestamp().div_euclid(step) * step;
        let valid_time = Utc
            .timestamp_opt(secs, 0)
            .single()
            .unwrap_or(time);
        Self { valid_time }
    }

    /// Truncate to the top of the hour.
    pub fn hourly(time: DateTime<Utc>) -> Self {
        Self::truncate(time, Cadence::hourly())
    }

    /// Valid time of the analysis.
    pub fn valid_time(&self) -> DateTime<Utc> {
        self.valid_time
    }

    /// The cycle immediately before this one.
    pub fn previous(&self, cadence: Cadence) -> Self {
        Self::truncate(self.valid_time - cadence.as_duration(), cadence)
    }

    /// Apply a nominal offset and re-align to the cadence.
    pub fn offset(&self, offset: Duration, cadence: Cadence) -> Self {
        Self::truncate(self.valid_time + offset, cadence)
    }

    /// Signed wall-clock separation `self - other`.
    pub fn since(&self, other: &AnalysisCycle) -> Duration {
        self.valid_time - other.valid_time
    }

    /// Compact form used in dataset paths, e.g. `20240701` and `12`.
    pub fn date_string(&self) -> String {
        self.valid_time.format("%Y%m%d").to_string()
    }

    pub fn hour_string(&self) -> String {
        self.valid_time.format("%H").to_string()
    }

    /// Parse an ISO 8601 timestamp and align it to the cadence.
    pub fn parse(s: &str, cadence: Cadence) -> Result<Self, CycleParseError> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::truncate(dt.with_timezone(&Utc), cadence));
        }

        for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
            if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(Self::truncate(Utc.from_utc_datetime(&ndt), cadence));
            }
        }

        // Compact YYYYMMDDHH, as in dataset paths
        if s.len() == 10 && s.bytes().all(|b| b.is_ascii_digit()) {
            let field = |range: std::ops::Range<usize>| s[range].parse::<u32>().ok();
            let time = match (field(0..4), field(4..6), field(6..8), field(8..10)) {
                (Some(y), Some(m), Some(d), Some(h)) => {
                    Utc.with_ymd_and_hms(y as i32, m, d, h, 0, 0).single()
                }
                _ => None,
            };
            if let Some(time) = time {
                return Ok(Self::truncate(time, cadence));
            }
        }

        Err(CycleParseError::InvalidFormat(s.to_string()))
    }
}

impl fmt::Display for AnalysisCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.valid_time.format("%Y-%m-%dT%H:%MZ"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CycleParseError {
    #[error("Invalid cycle time format: {0}")]
    InvalidFormat(String),
}

/// Source of "now" for cycle resolution.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant. Used for reproducible runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_truncate_hourly() {
        let t = Utc.with_ymd_and_hms(2024, 7, 1, 12, 47, 13).unwrap();
        let cycle = AnalysisCycle::hourly(t);
        assert_eq!(cycle.valid_time().hour(), 12);
        assert_eq!(cycle.valid_time().minute(), 0);
        assert_eq!(cycle.valid_time().second(), 0);
    }

    #[test]
    fn test_truncate_is_stable() {
        let t = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        let cycle = AnalysisCycle::hourly(t);
        assert_eq!(AnalysisCycle::hourly(cycle.valid_time()), cycle);
    }

    #[test]
    fn test_previous_crosses_midnight() {
        let cycle = AnalysisCycle::hourly(Utc.with_ymd_and_hms(2024, 7, 2, 0, 0, 0).unwrap());
        let prev = cycle.previous(Cadence::hourly());
        assert_eq!(prev.date_string(), "20240701");
        assert_eq!(prev.hour_string(), "23");
    }

    #[test]
    fn test_offset_minus_24h() {
        let cycle = AnalysisCycle::hourly(Utc.with_ymd_and_hms(2024, 7, 2, 5, 0, 0).unwrap());
        let ago = cycle.offset(Duration::hours(-24), Cadence::hourly());
        assert_eq!(cycle.since(&ago), Duration::hours(24));
    }

    #[test]
    fn test_parse_and_display() {
        let cycle = AnalysisCycle::parse("2024-07-01T12:30:00Z", Cadence::hourly()).unwrap();
        assert_eq!(cycle.to_string(), "2024-07-01T12:00Z");
        let compact = AnalysisCycle::parse("2024070112", Cadence::hourly()).unwrap();
        assert_eq!(compact, cycle);
        assert!(AnalysisCycle::parse("yesterday", Cadence::hourly()).is_err());
    }

    #[test]
    fn test_fifteen_minute_cadence() {
        let t = Utc.with_ymd_and_hms(2024, 7, 1, 12, 44, 0).unwrap();
        let cycle = AnalysisCycle::truncate(t, Cadence::from_minutes(15));
        assert_eq!(cycle.valid_time().minute(), 30);
    }
}
