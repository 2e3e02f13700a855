//! Decoding of CF-style time coordinates (`<unit> since <reference>`).
//!
//! GrADS Data Server publishes time as `days since 1-1-1 00:00:0.0` in the
//! standard (mixed Julian/Gregorian) calendar. Reference dates before the
//! Gregorian reform are interpreted in the Julian calendar, which puts the
//! GrADS epoch two days before the proleptic Gregorian 0001-01-01.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::error::{DapError, DapResult};

/// Time units of a coordinate variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    fn seconds(self) -> f64 {
        match self {
            TimeUnit::Seconds => 1.0,
            TimeUnit::Minutes => 60.0,
            TimeUnit::Hours => 3600.0,
            TimeUnit::Days => 86_400.0,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Some(TimeUnit::Seconds),
            "min" | "mins" | "minute" | "minutes" => Some(TimeUnit::Minutes),
            "h" | "hr" | "hrs" | "hour" | "hours" => Some(TimeUnit::Hours),
            "d" | "day" | "days" => Some(TimeUnit::Days),
            _ => None,
        }
    }
}

/// Parsed `<unit> since <reference>` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeUnits {
    pub unit: TimeUnit,
    pub reference: DateTime<Utc>,
}

impl TimeUnits {
    pub fn parse(units: &str) -> DapResult<Self> {
        let (unit, reference) = units
            .split_once(" since ")
            .ok_or_else(|| DapError::format(format!("time units without 'since': '{}'", units)))?;
        let unit = TimeUnit::parse(unit.trim())
            .ok_or_else(|| DapError::format(format!("unsupported time unit in '{}'", units)))?;
        let reference = parse_reference(reference.trim())?;
        Ok(Self { unit, reference })
    }

    /// Convert a coordinate value to a UTC instant, rounded to the second.
    pub fn decode(&self, value: f64) -> DapResult<DateTime<Utc>> {
        if !value.is_finite() {
            return Err(DapError::format(format!("non-finite time value {}", value)));
        }
        let seconds = (value * self.unit.seconds()).round() as i64;
        self.reference
            .checked_add_signed(Duration::seconds(seconds))
            .ok_or_else(|| DapError::format(format!("time value {} out of range", value)))
    }
}

/// Decode one time coordinate value.
pub fn decode_time(value: f64, units: &str) -> DapResult<DateTime<Utc>> {
    TimeUnits::parse(units)?.decode(value)
}

/// Parse `1-1-1 00:00:0.0`, `1970-01-01T00:00:00Z`, `2024-06-01` and the like.
fn parse_reference(s: &str) -> DapResult<DateTime<Utc>> {
    let s = s.trim_end_matches('Z').trim_end_matches(" UTC");
    let (date_part, time_part) = match s.split_once(|c| c == ' ' || c == 'T') {
        Some((d, t)) => (d, t.trim()),
        None => (s, ""),
    };

    let mut fields = date_part.splitn(3, '-');
    let mut next = |what: &str| -> DapResult<i64> {
        fields
            .next()
            .and_then(|f| f.trim().parse().ok())
            .ok_or_else(|| DapError::format(format!("bad {} in reference date '{}'", what, s)))
    };
    let (year, month, day) = (next("year")?, next("month")?, next("day")?);

    let date = calendar_date(year, month, day)
        .ok_or_else(|| DapError::format(format!("invalid reference date '{}'", s)))?;
    let time = parse_clock(time_part)
        .ok_or_else(|| DapError::format(format!("invalid reference time '{}'", s)))?;

    Ok(Utc.from_utc_datetime(&NaiveDateTime::new(date, time)))
}

/// Standard calendar: Julian before 1582-10-15, Gregorian from then on.
fn calendar_date(year: i64, month: i64, day: i64) -> Option<NaiveDate> {
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    if (year, month, day) >= (1582, 10, 15) {
        return NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32);
    }

    // Julian calendar date -> Julian Day Number -> Gregorian date
    let a = (14 - month) / 12;
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;
    let jdn = day + (153 * m + 2) / 5 + 365 * y + y / 4 - 32_083;
    // JDN 1_721_426 is Gregorian 0001-01-01 (day 1 from CE)
    NaiveDate::from_num_days_from_ce_opt((jdn - 1_721_425) as i32)
}

/// `00:00:0.0`, `12:30`, `06:00:00` or empty (midnight).
fn parse_clock(s: &str) -> Option<NaiveTime> {
    if s.is_empty() {
        return NaiveTime::from_hms_opt(0, 0, 0);
    }
    let mut parts = s.split(':');
    let hour: u32 = parts.next()?.trim().parse().ok()?;
    let minute: u32 = parts.next().map_or(Some(0), |p| p.trim().parse().ok())?;
    let second: f64 = parts.next().map_or(Some(0.0), |p| p.trim().parse().ok())?;
    NaiveTime::from_hms_opt(hour, minute, second.floor() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grads_epoch_is_julian() {
        let units = TimeUnits::parse("days since 1-1-1 00:00:0.0").unwrap();
        assert_eq!(units.unit, TimeUnit::Days);
        assert_eq!(
            units.reference,
            Utc.with_ymd_and_hms(0, 12, 30, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_decode_grads_days() {
        let t = decode_time(738887.0, "days since 1-1-1 00:00:0.0").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

        // fractional days round to the nearest second
        let t = decode_time(738887.0 + 12.0 / 24.0, "days since 1-1-1 00:00:0.0").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_decode_gregorian_reference() {
        let t = decode_time(3.0, "hours since 2024-06-15T00:00:00Z").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2024, 6, 15, 3, 0, 0).unwrap());

        let t = decode_time(1_718_409_600.0, "seconds since 1970-01-01").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_bad_units() {
        assert!(decode_time(1.0, "days").is_err());
        assert!(decode_time(1.0, "fortnights since 2000-01-01").is_err());
        assert!(decode_time(f64::NAN, "days since 2000-01-01").is_err());
    }
}
