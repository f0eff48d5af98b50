//! The snapshot: the whole persisted state of the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Category, Expense, Income, RecurringPayment, Settings, presets::default_categories,
    transactions::iso_date,
};

/// Current snapshot schema version, see [`crate::migrate_snapshot`].
pub const SNAPSHOT_VERSION: u32 = 1;

/// Income, expenses, categories and settings of one user.
///
/// The engine treats a snapshot as an immutable input: every operation
/// returns a new snapshot (or a report) and the caller replaces its copy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: u32,
    pub income: Vec<Income>,
    pub expenses: Vec<Expense>,
    pub categories: Vec<Category>,
    pub settings: Settings,
    #[serde(default)]
    pub recurring_payments: Vec<RecurringPayment>,
    #[serde(with = "iso_date")]
    pub last_updated: DateTime<Utc>,
}

impl Snapshot {
    /// The state used when nothing has been persisted yet.
    pub fn bootstrap() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            income: Vec::new(),
            expenses: Vec::new(),
            categories: default_categories(),
            settings: Settings::default(),
            recurring_payments: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    /// Returns the snapshot with `last_updated` set to `now`.
    #[must_use]
    pub fn touched(mut self, now: DateTime<Utc>) -> Self {
        self.last_updated = now;
        self
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::bootstrap()
    }
}
