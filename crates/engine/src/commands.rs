//! Command structs for ledger operations.
//!
//! These types group parameters for create/update operations on a
//! [`Snapshot`](crate::Snapshot), keeping call sites readable and avoiding
//! long argument lists. Patches follow field-merge semantics: `None` leaves
//! the stored value untouched.

use chrono::{DateTime, NaiveDate, Utc};

use crate::{Bucket, Frequency};

/// Create an income record.
#[derive(Clone, Debug)]
pub struct NewIncome {
    pub amount: f64,
    pub currency: String,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
}

impl NewIncome {
    #[must_use]
    pub fn new(amount: f64, currency: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            amount,
            currency: currency.into(),
            date,
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Create an expense record.
#[derive(Clone, Debug)]
pub struct NewExpense {
    pub category_id: String,
    pub amount: f64,
    pub currency: String,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
}

impl NewExpense {
    #[must_use]
    pub fn new(
        category_id: impl Into<String>,
        amount: f64,
        currency: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            category_id: category_id.into(),
            amount,
            currency: currency.into(),
            date,
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Create a category.
#[derive(Clone, Debug)]
pub struct NewCategory {
    pub name: String,
    pub icon: String,
    pub color: String,
    pub limit: f64,
    pub currency: Option<String>,
    pub bucket: Bucket,
}

impl NewCategory {
    #[must_use]
    pub fn new(name: impl Into<String>, limit: f64) -> Self {
        Self {
            name: name.into(),
            icon: "Tag".to_string(),
            color: "blue".to_string(),
            limit,
            currency: None,
            bucket: Bucket::default(),
        }
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Currency of the limit; defaults to the settings currency.
    #[must_use]
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    #[must_use]
    pub fn bucket(mut self, bucket: Bucket) -> Self {
        self.bucket = bucket;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct IncomePatch {
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub description: Option<Option<String>>,
}

impl IncomePatch {
    #[must_use]
    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    #[must_use]
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct ExpensePatch {
    pub category_id: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub description: Option<Option<String>>,
}

impl ExpensePatch {
    #[must_use]
    pub fn category_id(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    #[must_use]
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub limit: Option<f64>,
    pub currency: Option<String>,
    pub bucket: Option<Bucket>,
}

impl CategoryPatch {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: f64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    #[must_use]
    pub fn bucket(mut self, bucket: Bucket) -> Self {
        self.bucket = Some(bucket);
        self
    }
}

/// Schedule a recurring payment.
#[derive(Clone, Debug)]
pub struct NewRecurringPayment {
    pub name: String,
    pub amount: f64,
    pub currency: Option<String>,
    pub category_id: String,
    pub frequency: Frequency,
    pub start: NaiveDate,
    pub max_executions: Option<u32>,
}

impl NewRecurringPayment {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        amount: f64,
        category_id: impl Into<String>,
        start: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
            currency: None,
            category_id: category_id.into(),
            frequency: Frequency::default(),
            start,
            max_executions: None,
        }
    }

    #[must_use]
    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    #[must_use]
    pub fn max_executions(mut self, max: u32) -> Self {
        self.max_executions = Some(max);
        self
    }
}
