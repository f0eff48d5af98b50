//! Calendar month keys (`YYYY-MM`).

use core::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{EngineError, ResultEngine};

/// A calendar month, serialized as `YYYY-MM`.
///
/// Used as the budget basis month and as the window of every monthly
/// aggregation. Membership is decided on the UTC calendar date of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> ResultEngine<Self> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::InvalidMonth(format!(
                "{year:04}-{month:02}: month must be between 1 and 12"
            )));
        }
        Ok(Self { year, month })
    }

    /// The month of `now`, in UTC.
    pub fn current() -> Self {
        Self::of(&Utc::now())
    }

    pub fn of(date: &DateTime<Utc>) -> Self {
        Self::of_day(date.date_naive())
    }

    pub fn of_day(day: NaiveDate) -> Self {
        Self {
            year: day.year(),
            month: day.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn previous(self) -> Self {
        Self::of_day(
            self.first_day()
                .checked_sub_months(Months::new(1))
                .unwrap_or(NaiveDate::MIN),
        )
    }

    pub fn next(self) -> Self {
        Self::of_day(
            self.first_day()
                .checked_add_months(Months::new(1))
                .unwrap_or(NaiveDate::MAX),
        )
    }

    /// `true` if `date` falls within this calendar month (both ends inclusive).
    pub fn contains(self, date: &DateTime<Utc>) -> bool {
        self.contains_day(date.date_naive())
    }

    pub fn contains_day(self, day: NaiveDate) -> bool {
        day.year() == self.year && day.month() == self.month
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidMonth(format!("expected YYYY-MM, got \"{s}\""));

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
