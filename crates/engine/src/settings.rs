//! User settings and their bootstrap defaults.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Bucket, EngineError, MonthKey, ResultEngine};

/// Tolerance used when checking that allocation percentages sum to 100.
pub const ALLOCATION_EPSILON: f64 = 0.01;

/// Utilization percentage from which a category is flagged.
pub const DEFAULT_WARNING_THRESHOLD: f64 = 80.0;

pub const DEFAULT_CURRENCY: &str = "EUR";

/// Percentages of income assigned to each bucket.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BudgetAllocation {
    pub essentials: f64,
    pub investments: f64,
    pub fun: f64,
}

impl Default for BudgetAllocation {
    fn default() -> Self {
        Self {
            essentials: 50.0,
            investments: 20.0,
            fun: 30.0,
        }
    }
}

impl BudgetAllocation {
    pub fn new(essentials: f64, investments: f64, fun: f64) -> Self {
        Self {
            essentials,
            investments,
            fun,
        }
    }

    pub fn percent(&self, bucket: Bucket) -> f64 {
        match bucket {
            Bucket::Essentials => self.essentials,
            Bucket::Investments => self.investments,
            Bucket::Fun => self.fun,
        }
    }

    pub fn total(&self) -> f64 {
        self.essentials + self.investments + self.fun
    }
}

/// Checks that every percentage is in `0..=100` and that they sum to 100.
///
/// The allocator does not call this; it is applied when the user edits the
/// allocation.
pub fn validate_allocation(allocation: &BudgetAllocation) -> ResultEngine<()> {
    for bucket in Bucket::ALL {
        let value = allocation.percent(bucket);
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(EngineError::Validation(format!(
                "{bucket} allocation must be between 0 and 100, got {value}"
            )));
        }
    }
    let total = allocation.total();
    if (total - 100.0).abs() > ALLOCATION_EPSILON {
        return Err(EngineError::Validation(format!(
            "allocation must sum to 100%, got {total}%"
        )));
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Simple,
    Pro,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Simple => f.write_str("simple"),
            Mode::Pro => f.write_str("pro"),
        }
    }
}

impl FromStr for Mode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Mode::Simple),
            "pro" => Ok(Mode::Pro),
            other => Err(EngineError::Validation(format!("unknown mode: {other}"))),
        }
    }
}

/// The single settings instance of a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub default_currency: String,
    pub mode: Mode,
    pub budget_allocation: BudgetAllocation,
    pub custom_allocation: bool,
    /// When `true` limits are recalculated as soon as income or allocation
    /// change; otherwise the user is asked first.
    pub auto_calc_limits: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_basis_month: Option<MonthKey>,
    pub warning_threshold: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_currency: DEFAULT_CURRENCY.to_string(),
            mode: Mode::Simple,
            budget_allocation: BudgetAllocation::default(),
            custom_allocation: false,
            auto_calc_limits: false,
            budget_basis_month: None,
            warning_threshold: DEFAULT_WARNING_THRESHOLD,
        }
    }
}

/// Field-merge update of [`Settings`]. `None` leaves a field unchanged.
#[derive(Clone, Debug, Default)]
pub struct SettingsPatch {
    pub default_currency: Option<String>,
    pub mode: Option<Mode>,
    pub custom_allocation: Option<bool>,
    pub auto_calc_limits: Option<bool>,
    pub budget_basis_month: Option<Option<MonthKey>>,
    pub warning_threshold: Option<f64>,
}

impl SettingsPatch {
    #[must_use]
    pub fn default_currency(mut self, code: impl Into<String>) -> Self {
        self.default_currency = Some(code.into());
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    pub fn auto_calc_limits(mut self, enabled: bool) -> Self {
        self.auto_calc_limits = Some(enabled);
        self
    }

    #[must_use]
    pub fn budget_basis_month(mut self, month: Option<MonthKey>) -> Self {
        self.budget_basis_month = Some(month);
        self
    }

    #[must_use]
    pub fn warning_threshold(mut self, threshold: f64) -> Self {
        self.warning_threshold = Some(threshold);
        self
    }
}

impl Settings {
    /// Returns the settings with `patch` merged in.
    pub fn merged(&self, patch: SettingsPatch) -> ResultEngine<Settings> {
        let mut next = self.clone();
        if let Some(code) = patch.default_currency {
            let code = code.trim().to_ascii_uppercase();
            if code.is_empty() {
                return Err(EngineError::Validation(
                    "default currency must not be empty".to_string(),
                ));
            }
            next.default_currency = code;
        }
        if let Some(mode) = patch.mode {
            next.mode = mode;
        }
        if let Some(custom) = patch.custom_allocation {
            next.custom_allocation = custom;
        }
        if let Some(auto) = patch.auto_calc_limits {
            next.auto_calc_limits = auto;
        }
        if let Some(month) = patch.budget_basis_month {
            next.budget_basis_month = month;
        }
        if let Some(threshold) = patch.warning_threshold {
            if !threshold.is_finite() || threshold <= 0.0 {
                return Err(EngineError::Validation(format!(
                    "warning threshold must be > 0, got {threshold}"
                )));
            }
            next.warning_threshold = threshold;
        }
        Ok(next)
    }
}
