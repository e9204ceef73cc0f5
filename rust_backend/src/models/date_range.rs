//! Calendar date ranges used to bound the dated table queries.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};

/// Wire format for dates accepted by [`DateRange::parse`].
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Start of the range when the caller does not supply one.
pub const DEFAULT_START: &str = "2020-01-01";

/// Source of "today" for resolving an open-ended range.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a single date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Inclusive `(start, end)` pair of calendar dates.
///
/// Dated queries bind both ends as SQL `date` parameters against `datetime`
/// columns, so a timestamp is inside the range when
/// `start 00:00:00 <= ts <= end 00:00:00`. Rows created later on the end day
/// fall outside it; [`DateRange::contains_datetime`] mirrors that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> RepositoryResult<Self> {
        if start > end {
            return Err(RepositoryError::validation_with_context(
                format!("start date {} is after end date {}", start, end),
                ErrorContext::new("resolve_date_range").with_entity("date_range"),
            ));
        }
        Ok(Self { start, end })
    }

    /// Fill in missing ends: `start` falls back to [`DEFAULT_START`], `end` to
    /// `clock.today()`.
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        clock: &dyn Clock,
    ) -> RepositoryResult<Self> {
        let start = start.unwrap_or_else(default_start);
        let end = end.unwrap_or_else(|| clock.today());
        Self::new(start, end)
    }

    /// Same as [`DateRange::resolve`] for `YYYY-MM-DD` strings.
    pub fn parse(start: Option<&str>, end: Option<&str>, clock: &dyn Clock) -> RepositoryResult<Self> {
        let start = start.map(|s| parse_date(s, "start_date")).transpose()?;
        let end = end.map(|s| parse_date(s, "end_date")).transpose()?;
        Self::resolve(start, end, clock)
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn contains_datetime(&self, ts: NaiveDateTime) -> bool {
        self.start.and_time(NaiveTime::MIN) <= ts && ts <= self.end.and_time(NaiveTime::MIN)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..={}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn parse_date(raw: &str, field: &str) -> RepositoryResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|e| {
        RepositoryError::validation_with_context(
            format!("{} '{}' is not a YYYY-MM-DD date: {}", field, raw, e),
            ErrorContext::new("resolve_date_range").with_entity("date_range"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_start_matches_constant() {
        let parsed = NaiveDate::parse_from_str(DEFAULT_START, DATE_FORMAT).unwrap();
        assert_eq!(default_start(), parsed);
    }

    #[test]
    fn test_resolve_open_end_uses_clock() {
        let clock = FixedClock(date(2024, 6, 15));
        let range = DateRange::resolve(Some(date(2024, 1, 1)), None, &clock).unwrap();
        assert_eq!(range.end, date(2024, 6, 15));
    }

    #[test]
    fn test_resolve_open_start_uses_default() {
        let clock = FixedClock(date(2024, 6, 15));
        let range = DateRange::resolve(None, None, &clock).unwrap();
        assert_eq!(range.start, date(2020, 1, 1));
        assert_eq!(range.end, date(2024, 6, 15));
    }

    #[test]
    fn test_parse_rejects_bad_format() {
        let clock = FixedClock(date(2024, 6, 15));
        let err = DateRange::parse(Some("01/02/2023"), None, &clock).unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));
        assert!(err.to_string().contains("start_date"));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        assert!(DateRange::new(date(2023, 2, 1), date(2023, 1, 1)).is_err());
        assert!(DateRange::new(date(2023, 1, 1), date(2023, 1, 1)).is_ok());
    }

    #[test]
    fn test_datetime_inclusion_stops_at_end_midnight() {
        let range = DateRange::new(date(2023, 1, 1), date(2023, 1, 31)).unwrap();
        assert!(range.contains_datetime(date(2023, 1, 1).and_hms_opt(0, 0, 0).unwrap()));
        assert!(range.contains_datetime(date(2023, 1, 31).and_hms_opt(0, 0, 0).unwrap()));
        assert!(!range.contains_datetime(date(2023, 1, 31).and_hms_opt(9, 30, 0).unwrap()));
        assert!(!range.contains_datetime(date(2022, 12, 31).and_hms_opt(23, 59, 59).unwrap()));
        assert!(range.contains_date(date(2023, 1, 31)));
    }

    #[test]
    fn test_display() {
        let range = DateRange::new(date(2023, 1, 1), date(2023, 1, 31)).unwrap();
        assert_eq!(range.to_string(), "2023-01-01..=2023-01-31");
    }
}
