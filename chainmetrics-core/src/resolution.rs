//! Output granularity and the calendar used to place timestamps.

use crate::error::MetricsError;
use chrono::{FixedOffset, Local, NaiveDateTime, Offset, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The single weekday that represents a week in weekly tables.
pub const WEEK_END: Weekday = Weekday::Sun;

const UNSUPPORTED_PERIOD: &str = "only day and week periods are supported";

/// Granularity of a metric table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[default]
    #[serde(rename = "day", alias = "daily")]
    Daily,
    #[serde(rename = "week", alias = "weekly")]
    Weekly,
}

impl Resolution {
    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::Daily => "day",
            Resolution::Weekly => "week",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "d" | "day" | "daily" => Ok(Resolution::Daily),
            "w" | "week" | "weekly" => Ok(Resolution::Weekly),
            other => Err(MetricsError::InvalidArgument(format!(
                "{UNSUPPORTED_PERIOD} (got '{other}')"
            ))),
        }
    }
}

/// Anything a metric operation accepts as its period argument.
///
/// Strings are validated here, before any request is issued.
pub trait IntoResolution {
    fn into_resolution(self) -> Result<Resolution, MetricsError>;
}

impl IntoResolution for Resolution {
    fn into_resolution(self) -> Result<Resolution, MetricsError> {
        Ok(self)
    }
}

impl IntoResolution for &str {
    fn into_resolution(self) -> Result<Resolution, MetricsError> {
        self.parse()
    }
}

impl IntoResolution for String {
    fn into_resolution(self) -> Result<Resolution, MetricsError> {
        self.parse()
    }
}

impl IntoResolution for &String {
    fn into_resolution(self) -> Result<Resolution, MetricsError> {
        self.parse()
    }
}

/// How Unix seconds are turned into calendar time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeBasis {
    /// The machine's local time zone.
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl TimeBasis {
    pub fn utc() -> Self {
        TimeBasis::Fixed(Utc.fix())
    }

    /// A fixed offset east of UTC, `None` when out of range.
    pub fn from_offset_hours(hours: i32) -> Option<Self> {
        hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .map(TimeBasis::Fixed)
    }

    /// Wall-clock time for `timestamp`, truncated to the second.
    pub fn to_calendar(self, timestamp: i64) -> Result<NaiveDateTime, MetricsError> {
        let converted = match self {
            TimeBasis::Local => Local
                .timestamp_opt(timestamp, 0)
                .single()
                .map(|dt| dt.naive_local()),
            TimeBasis::Fixed(offset) => offset
                .timestamp_opt(timestamp, 0)
                .single()
                .map(|dt| dt.naive_local()),
        };
        converted.ok_or(MetricsError::InvalidTimestamp(timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};

    #[test]
    fn parses_day_and_week_spellings() {
        assert_eq!("day".parse::<Resolution>().unwrap(), Resolution::Daily);
        assert_eq!("Weekly".parse::<Resolution>().unwrap(), Resolution::Weekly);
        assert_eq!(" w ".parse::<Resolution>().unwrap(), Resolution::Weekly);
    }

    #[test]
    fn month_is_rejected() {
        match "month".parse::<Resolution>() {
            Err(MetricsError::InvalidArgument(msg)) => {
                assert!(msg.contains("only day and week periods are supported"))
            }
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[test]
    fn default_is_daily() {
        assert_eq!(Resolution::default(), Resolution::Daily);
        assert_eq!(Resolution::Weekly.to_string(), "week");
    }

    #[test]
    fn utc_basis_converts_exactly() {
        // 2024-01-07 00:00:00 UTC, a Sunday
        let t = TimeBasis::utc().to_calendar(1_704_585_600).unwrap();
        assert_eq!(t.date(), NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());
        assert_eq!(t.weekday(), WEEK_END);
    }

    #[test]
    fn offset_shifts_the_calendar_day() {
        let behind = TimeBasis::from_offset_hours(-5).unwrap();
        let t = behind.to_calendar(1_704_585_600).unwrap();
        assert_eq!(t.date(), NaiveDate::from_ymd_opt(2024, 1, 6).unwrap());
    }

    #[test]
    fn absurd_offset_is_refused() {
        assert!(TimeBasis::from_offset_hours(30).is_none());
    }

    #[test]
    fn out_of_range_timestamp_errors() {
        assert!(matches!(
            TimeBasis::utc().to_calendar(i64::MAX),
            Err(MetricsError::InvalidTimestamp(_))
        ));
    }
}
