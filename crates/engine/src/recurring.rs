//! Automatic (recurring) payments that turn into expenses when due.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use core::fmt;
use std::str::FromStr;

use crate::EngineError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl Frequency {
    /// The due date following `date`.
    ///
    /// Month and year steps clamp to the last day of a shorter month
    /// (`2024-01-31` monthly gives `2024-02-29`).
    pub fn advance(self, date: NaiveDate) -> NaiveDate {
        let next = match self {
            Frequency::Weekly => date.checked_add_days(Days::new(7)),
            Frequency::Monthly => date.checked_add_months(Months::new(1)),
            Frequency::Yearly => date.checked_add_months(Months::new(12)),
        };
        next.unwrap_or(NaiveDate::MAX)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Weekly => f.write_str("weekly"),
            Frequency::Monthly => f.write_str("monthly"),
            Frequency::Yearly => f.write_str("yearly"),
        }
    }
}

impl FromStr for Frequency {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(EngineError::Validation(format!("unknown frequency: {other}"))),
        }
    }
}

/// A payment executed automatically on its due date.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringPayment {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub currency: String,
    pub category_id: String,
    pub frequency: Frequency,
    pub next_due: NaiveDate,
    pub active: bool,
    #[serde(default)]
    pub times_executed: u32,
    /// `None` keeps the payment running until it is paused or deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_executions: Option<u32>,
}

impl RecurringPayment {
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.active && self.next_due <= today
    }

    /// Records one execution: bumps the counter, then either deactivates
    /// the payment or moves `next_due` forward.
    pub(crate) fn record_execution(&mut self) {
        self.times_executed += 1;
        let exhausted = self
            .max_executions
            .is_some_and(|max| self.times_executed >= max);
        if exhausted {
            self.active = false;
        } else {
            self.next_due = self.frequency.advance(self.next_due);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn payment(max_executions: Option<u32>) -> RecurringPayment {
        RecurringPayment {
            id: "p1".to_string(),
            name: "Gym".to_string(),
            amount: 30.0,
            currency: "EUR".to_string(),
            category_id: "7".to_string(),
            frequency: Frequency::Monthly,
            next_due: day(2024, 1, 31),
            active: true,
            times_executed: 0,
            max_executions,
        }
    }

    #[test]
    fn advance_clamps_month_end() {
        assert_eq!(Frequency::Monthly.advance(day(2024, 1, 31)), day(2024, 2, 29));
        assert_eq!(Frequency::Weekly.advance(day(2024, 12, 28)), day(2025, 1, 4));
        assert_eq!(Frequency::Yearly.advance(day(2024, 2, 29)), day(2025, 2, 28));
    }

    #[test]
    fn execution_advances_due_date() {
        let mut p = payment(None);
        p.record_execution();
        assert_eq!(p.times_executed, 1);
        assert!(p.active);
        assert_eq!(p.next_due, day(2024, 2, 29));
    }

    #[test]
    fn execution_deactivates_at_limit() {
        let mut p = payment(Some(1));
        p.record_execution();
        assert!(!p.active);
        assert_eq!(p.next_due, day(2024, 1, 31));
        assert!(!p.is_due(day(2024, 3, 1)));
    }
}
