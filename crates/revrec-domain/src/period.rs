//! Accounting periods expressed as a calendar year-month.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{de::Deserializer, Deserialize, Serialize, Serializer};

use crate::error::DomainError;

/// A calendar month used to bucket recognised revenue, written as `YYYY-MM`.
///
/// Ordering follows the calendar, so `2023-12 < 2024-01`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, DomainError> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::OutOfRange(format!(
                "month {month} is outside 1..=12"
            )));
        }
        if !(1..=9999).contains(&year) {
            return Err(DomainError::OutOfRange(format!(
                "year {year} is outside 1..=9999"
            )));
        }
        Ok(Self { year, month })
    }

    /// Returns the period containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day() - Duration::days(1)
    }

    pub fn days(&self) -> u32 {
        self.last_day().day()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::from_date(date) == *self
    }

    pub fn next(&self) -> Self {
        self.shift(1)
    }

    pub fn previous(&self) -> Self {
        self.shift(-1)
    }

    /// Moves the period by `months`, which may be negative.
    pub fn shift(&self, months: i32) -> Self {
        let index = self.index() + months;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// Number of months from `self` to `other`; negative when `other` is earlier.
    pub fn months_until(&self, other: &Period) -> i32 {
        other.index() - self.index()
    }

    /// Enumerates every period from `start` through `end` inclusive.
    pub fn range(start: Period, end: Period) -> Vec<Period> {
        let count = start.months_until(&end);
        if count < 0 {
            return Vec::new();
        }
        (0..=count).map(|step| start.shift(step)).collect()
    }

    /// Clamps `date` into this period: dates before it map to the first day,
    /// dates after it map to the last day.
    pub fn clamp_date(&self, date: NaiveDate) -> NaiveDate {
        date.clamp(self.first_day(), self.last_day())
    }

    fn index(&self) -> i32 {
        self.year * 12 + self.month as i32 - 1
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::OutOfRange(format!("`{value}` is not a YYYY-MM period"));
        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Period::new(year, month)
    }
}

impl Serialize for Period {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_and_formats_year_month() {
        let period: Period = "2024-03".parse().unwrap();
        assert_eq!(period.year(), 2024);
        assert_eq!(period.month(), 3);
        assert_eq!(period.to_string(), "2024-03");
    }

    #[test]
    fn rejects_malformed_periods() {
        for raw in ["2024-13", "2024-00", "2024-3", "24-03", "2024/03", "abcd-ef", ""] {
            assert!(raw.parse::<Period>().is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn orders_across_year_boundary() {
        let dec = Period::new(2023, 12).unwrap();
        let jan = Period::new(2024, 1).unwrap();
        assert!(dec < jan);
        assert_eq!(dec.next(), jan);
        assert_eq!(jan.previous(), dec);
        assert_eq!(dec.months_until(&jan), 1);
    }

    #[test]
    fn range_is_inclusive_and_empty_when_reversed() {
        let start = Period::new(2023, 11).unwrap();
        let end = Period::new(2024, 2).unwrap();
        let labels: Vec<String> = Period::range(start, end)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(labels, ["2023-11", "2023-12", "2024-01", "2024-02"]);
        assert!(Period::range(end, start).is_empty());
    }

    #[test]
    fn day_bounds_follow_calendar() {
        let feb = Period::new(2024, 2).unwrap();
        assert_eq!(feb.first_day(), date(2024, 2, 1));
        assert_eq!(feb.last_day(), date(2024, 2, 29));
        assert_eq!(feb.days(), 29);
        assert_eq!(Period::new(2023, 2).unwrap().days(), 28);
        assert!(feb.contains(date(2024, 2, 15)));
        assert!(!feb.contains(date(2024, 3, 1)));
        assert_eq!(feb.clamp_date(date(2024, 5, 9)), date(2024, 2, 29));
        assert_eq!(feb.clamp_date(date(2023, 5, 9)), date(2024, 2, 1));
    }

    #[test]
    fn serializes_as_string() {
        let period = Period::new(2024, 3).unwrap();
        let json = serde_json::to_string(&period).unwrap();
        assert_eq!(json, "\"2024-03\"");
        let back: Period = serde_json::from_str(&json).unwrap();
        assert_eq!(back, period);
    }
}
