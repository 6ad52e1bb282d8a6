//! # Timestamps and Windows
//!
//! RFC3339 timestamps as passed to `influxd backup -start/-end` and embedded in
//! the merge query, plus the half-open windows built from them.

use crate::error::{SideloadError, SideloadResult};
use chrono::{DateTime, FixedOffset, Local, SecondsFormat, SubsecRound, TimeDelta};
use std::cmp::Ordering;
use std::fmt;

/// Source of "now" for relative look-back windows
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in the local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// An instant together with the RFC3339 text it is rendered as.
///
/// Timestamps parsed from the command line keep their original spelling so
/// they reach `influxd` and the merge query verbatim. Timestamps computed from
/// another instant keep its sub-second part; clock readings are truncated to
/// the second. Either way UTC is written as `Z`.
///
/// Equality and ordering compare instants only.
#[derive(Debug, Clone)]
pub struct Timestamp {
    instant: DateTime<FixedOffset>,
    text: String,
}

impl Timestamp {
    /// Parse an RFC3339 timestamp, keeping its text as given
    pub fn parse(value: &str) -> SideloadResult<Self> {
        let instant = DateTime::parse_from_rfc3339(value)
            .map_err(|e| SideloadError::invalid_timestamp(value, e.to_string()))?;
        Ok(Self {
            instant,
            text: value.to_string(),
        })
    }

    /// Render an instant, with as many fractional digits as it needs
    pub fn from_instant(instant: DateTime<FixedOffset>) -> Self {
        Self {
            text: instant.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            instant,
        }
    }

    /// A clock reading, truncated to whole seconds
    pub fn from_clock(now: DateTime<FixedOffset>) -> Self {
        Self::from_instant(now.trunc_subsecs(0))
    }

    pub fn instant(&self) -> DateTime<FixedOffset> {
        self.instant
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Shift by a whole number of hours (negative moves backwards)
    pub fn add_hours(&self, hours: i64) -> SideloadResult<Self> {
        TimeDelta::try_hours(hours)
            .and_then(|delta| self.instant.checked_add_signed(delta))
            .map(Self::from_instant)
            .ok_or_else(|| {
                SideloadError::invalid_timestamp(
                    self.text.clone(),
                    format!("shifting by {} hours is out of range", hours),
                )
            })
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.instant == other.instant
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant.cmp(&other.instant)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Half-open interval `[start, end)` with `start < end`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    start: Timestamp,
    end: Timestamp,
}

impl TimeWindow {
    pub fn new(start: Timestamp, end: Timestamp) -> SideloadResult<Self> {
        if start >= end {
            return Err(SideloadError::InvalidWindow {
                start: start.text,
                end: end.text,
            });
        }
        Ok(Self { start, end })
    }

    /// Build a window from two RFC3339 strings
    pub fn parse(start: &str, end: &str) -> SideloadResult<Self> {
        Self::new(Timestamp::parse(start)?, Timestamp::parse(end)?)
    }

    /// Window ending at `now` and starting `since_hours` from it.
    ///
    /// `since_hours` is a look-back offset and is expected to be negative;
    /// both bounds come from the single `now` reading.
    pub fn trailing(now: DateTime<FixedOffset>, since_hours: i64) -> SideloadResult<Self> {
        let end = Timestamp::from_clock(now);
        let start = end.add_hours(since_hours)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> &Timestamp {
        &self.start
    }

    pub fn end(&self) -> &Timestamp {
        &self.end
    }

    pub fn duration(&self) -> TimeDelta {
        self.end.instant - self.start.instant
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_original_text() {
        let ts = Timestamp::parse("2021-01-01T00:00:00.500+02:00").unwrap();
        assert_eq!(ts.as_str(), "2021-01-01T00:00:00.500+02:00");
        assert_eq!(ts.to_string(), "2021-01-01T00:00:00.500+02:00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = Timestamp::parse("2021-13-01").unwrap_err();
        assert!(matches!(err, SideloadError::InvalidTimestamp { .. }));
        assert!(Timestamp::parse("").is_err());
    }

    #[test]
    fn test_from_instant_formats_seconds() {
        let instant = DateTime::parse_from_rfc3339("2021-06-26T10:15:30Z").unwrap();
        assert_eq!(
            Timestamp::from_instant(instant).as_str(),
            "2021-06-26T10:15:30Z"
        );

        let instant = DateTime::parse_from_rfc3339("2021-06-26T10:15:30-05:00").unwrap();
        assert_eq!(
            Timestamp::from_instant(instant).as_str(),
            "2021-06-26T10:15:30-05:00"
        );
    }

    #[test]
    fn test_from_instant_keeps_fractional_seconds() {
        let instant = DateTime::parse_from_rfc3339("2021-06-26T10:15:30.5Z").unwrap();
        assert_eq!(
            Timestamp::from_instant(instant).as_str(),
            "2021-06-26T10:15:30.500Z"
        );
    }

    #[test]
    fn test_add_hours_keeps_fractional_seconds() {
        let shifted = Timestamp::parse("2021-01-01T00:00:00.5Z")
            .unwrap()
            .add_hours(1)
            .unwrap();
        assert_eq!(shifted.as_str(), "2021-01-01T01:00:00.500Z");
        assert_eq!(
            Timestamp::parse(shifted.as_str()).unwrap(),
            Timestamp::parse("2021-01-01T01:00:00.5Z").unwrap()
        );
    }

    #[test]
    fn test_clock_readings_are_truncated() {
        let now = DateTime::parse_from_rfc3339("2021-06-26T10:15:30.999Z").unwrap();
        assert_eq!(Timestamp::from_clock(now).as_str(), "2021-06-26T10:15:30Z");

        let window = TimeWindow::trailing(now, -1).unwrap();
        assert_eq!(window.start().as_str(), "2021-06-26T09:15:30Z");
        assert_eq!(window.end().as_str(), "2021-06-26T10:15:30Z");
    }

    #[test]
    fn test_equality_ignores_spelling() {
        let a = Timestamp::parse("2021-01-01T00:00:00Z").unwrap();
        let b = Timestamp::parse("2021-01-01T02:00:00+02:00").unwrap();
        assert_eq!(a, b);
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_window_requires_start_before_end() {
        assert!(TimeWindow::parse("2021-01-01T00:00:00Z", "2021-01-01T01:00:00Z").is_ok());

        let err = TimeWindow::parse("2021-01-01T01:00:00Z", "2021-01-01T01:00:00Z").unwrap_err();
        assert!(matches!(err, SideloadError::InvalidWindow { .. }));

        assert!(TimeWindow::parse("2021-01-02T00:00:00Z", "2021-01-01T00:00:00Z").is_err());
    }

    #[test]
    fn test_trailing_window_uses_single_reading() {
        let now = DateTime::parse_from_rfc3339("2021-03-04T12:00:00Z").unwrap();
        let window = TimeWindow::trailing(now, -3).unwrap();
        assert_eq!(window.start().as_str(), "2021-03-04T09:00:00Z");
        assert_eq!(window.end().as_str(), "2021-03-04T12:00:00Z");
        assert_eq!(window.duration(), TimeDelta::hours(3));
    }

    #[test]
    fn test_trailing_window_rejects_non_negative_offset() {
        let now = DateTime::parse_from_rfc3339("2021-03-04T12:00:00Z").unwrap();
        assert!(TimeWindow::trailing(now, 0).is_err());
        assert!(TimeWindow::trailing(now, 2).is_err());
    }

    #[test]
    fn test_window_display() {
        let window = TimeWindow::parse("2021-01-01T00:00:00Z", "2021-01-01T01:00:00Z").unwrap();
        assert_eq!(
            window.to_string(),
            "[2021-01-01T00:00:00Z, 2021-01-01T01:00:00Z)"
        );
    }
}
