use crate::error::ClimateError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

/// Date format accepted at the boundary and written to reports.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Anything that can be resolved to a single calendar date.
pub trait AnyDate {
    fn to_naive_date(self) -> Result<NaiveDate, ClimateError>;
}

impl AnyDate for NaiveDate {
    fn to_naive_date(self) -> Result<NaiveDate, ClimateError> {
        Ok(self)
    }
}

impl AnyDate for &str {
    fn to_naive_date(self) -> Result<NaiveDate, ClimateError> {
        NaiveDate::parse_from_str(self.trim(), DATE_FORMAT).map_err(|_| {
            ClimateError::InvalidInput(format!(
                "'{}' is not a date in YYYY-MM-DD format",
                self
            ))
        })
    }
}

impl AnyDate for &String {
    fn to_naive_date(self) -> Result<NaiveDate, ClimateError> {
        self.as_str().to_naive_date()
    }
}

impl AnyDate for String {
    fn to_naive_date(self) -> Result<NaiveDate, ClimateError> {
        self.as_str().to_naive_date()
    }
}

/// An inclusive range of calendar days. `start` is never after `end`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = ClimateError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        DateRange::parse(raw.start, raw.end)
    }
}

impl DateRange {
    /// Builds a range from two dates; `start` must not be after `end`.
    ///
    /// # Errors
    ///
    /// Returns [`ClimateError::InvalidInput`] if either date cannot be parsed or the range is reversed.
    ///
    /// # Examples
    ///
    /// ```
    /// use climate_analyzer::DateRange;
    ///
    /// let range = DateRange::parse("2023-04-01", "2023-04-07").unwrap();
    /// assert_eq!(range.day_count(), 7);
    /// assert!(DateRange::parse("2023-04-07", "2023-04-01").is_err());
    /// assert!(DateRange::parse("2023/04/01", "2023-04-07").is_err());
    /// ```
    pub fn parse(start: impl AnyDate, end: impl AnyDate) -> Result<Self, ClimateError> {
        let start = start.to_naive_date()?;
        let end = end.to_naive_date()?;
        if start > end {
            return Err(ClimateError::InvalidInput(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the range, both ends included.
    pub fn day_count(&self) -> usize {
        usize::try_from((self.end - self.start).num_days() + 1).unwrap_or(0)
    }

    /// Iterates every day from `start` to `end`.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_range() {
        let range = DateRange::parse("2023-04-01", "2023-04-03").unwrap();
        let days: Vec<NaiveDate> = range.days().collect();
        assert_eq!(
            days,
            vec![
                NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 4, 2).unwrap(),
                NaiveDate::from_ymd_opt(2023, 4, 3).unwrap(),
            ]
        );
        assert_eq!(range.day_count(), 3);
    }

    #[test]
    fn test_single_day_range() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let range = DateRange::parse(day, day).unwrap();
        assert_eq!(range.days().count(), 1);
    }

    #[test]
    fn test_malformed_date_is_invalid_input() {
        let err = DateRange::parse("2023-13-01", "2023-12-31").unwrap_err();
        assert!(matches!(err, ClimateError::InvalidInput(_)));

        let err = DateRange::parse(String::from("yesterday"), "2023-12-31").unwrap_err();
        assert!(matches!(err, ClimateError::InvalidInput(_)));
    }

    #[test]
    fn test_reversed_range_is_invalid_input() {
        let err = DateRange::parse("2023-04-02", "2023-04-01").unwrap_err();
        assert!(matches!(err, ClimateError::InvalidInput(_)));
    }

    #[test]
    fn test_deserialize_goes_through_parse() {
        let range: DateRange =
            serde_json::from_str(r#"{"start":"2023-04-01","end":"2023-04-05"}"#).unwrap();
        assert_eq!(range.start(), NaiveDate::from_ymd_opt(2023, 4, 1).unwrap());
        assert_eq!(range.end(), NaiveDate::from_ymd_opt(2023, 4, 5).unwrap());
        assert_eq!(range.day_count(), 5);

        let reversed =
            serde_json::from_str::<DateRange>(r#"{"start":"2023-04-05","end":"2023-04-01"}"#);
        assert!(reversed.is_err());

        let json = serde_json::to_string(&range).unwrap();
        assert_eq!(serde_json::from_str::<DateRange>(&json).unwrap(), range);
    }

    #[test]
    fn test_reversed_fields_count_no_days() {
        let reversed = DateRange {
            start: NaiveDate::from_ymd_opt(2023, 4, 5).unwrap(),
            end: NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
        };
        assert_eq!(reversed.day_count(), 0);
        assert_eq!(reversed.days().count(), 0);
    }
}
