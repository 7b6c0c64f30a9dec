use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage format for generated timestamps. Fixed width, so text ordering
/// matches chronological ordering inside SQLite.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Half-open time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn starting_at(start: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            start,
            end: start + duration,
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: &Interval) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Largest whole-second interval inside this one. Stored timestamps carry
    /// no sub-second part, so sampling has to happen on this grid.
    pub fn whole_seconds(&self) -> Interval {
        Interval::new(ceil_second(self.start), floor_second(self.end))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            format_timestamp(self.start),
            format_timestamp(self.end)
        )
    }
}

pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses the timestamp shapes seed data tends to carry: RFC 3339, a naive
/// `YYYY-MM-DDTHH:MM:SS` (or with a space) read as UTC, or a bare date at midnight UTC.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(value) = DateTime::parse_from_rfc3339(input) {
        return Some(value.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

pub fn floor_second(value: DateTime<Utc>) -> DateTime<Utc> {
    value.with_nanosecond(0).unwrap_or(value)
}

pub fn ceil_second(value: DateTime<Utc>) -> DateTime<Utc> {
    let floor = floor_second(value);
    if floor < value {
        floor + Duration::seconds(1)
    } else {
        floor
    }
}

/// Converts fractional hours into a whole-second duration.
pub fn hours_to_duration(hours: f64) -> Duration {
    Duration::seconds((hours * 3600.0).round() as i64)
}

/// ISO-8601 duration for a whole number of hours, e.g. `PT6H`.
pub fn iso_hours(hours: u32) -> String {
    format!("PT{hours}H")
}

/// Reads back a `PT{n}H` duration.
pub fn parse_iso_hours(input: &str) -> Option<u32> {
    input
        .trim()
        .strip_prefix("PT")
        .and_then(|rest| rest.strip_suffix('H'))
        .and_then(|hours| hours.parse().ok())
}
