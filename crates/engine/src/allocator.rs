//! Budget allocation: splits a month's income into bucket pools and derives
//! category limits from them.
//!
//! Two formulas live here and must stay separate. [`recalc_category_limits`]
//! is the equal split used to rewrite limits; [`suggest_preset_limits`] is the
//! scale-factor suggestion offered once, when categories are created from a
//! preset.

use core::fmt;

use serde::Serialize;

use crate::{
    Bucket, BudgetAllocation, Category, EngineError, MonthKey, RateTable, ResultEngine, Settings,
    Snapshot, aggregation::BucketAmounts, convert, presets::PresetGroup,
    settings::ALLOCATION_EPSILON,
};

/// Share of the fun pool suggested for a category created by hand.
const MANUAL_LIMIT_SHARE: f64 = 0.05;

/// How a recalculation reaches the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RecalcMode {
    /// Run as soon as income or allocation change.
    Automatic,
    /// Offer the recalculation and wait for confirmation.
    Manual,
}

impl From<&Settings> for RecalcMode {
    fn from(settings: &Settings) -> Self {
        if settings.auto_calc_limits {
            RecalcMode::Automatic
        } else {
            RecalcMode::Manual
        }
    }
}

/// What changed and made a recalculation relevant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RecalcReason {
    Income,
    Allocation,
}

impl fmt::Display for RecalcReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecalcReason::Income => f.write_str("income changed"),
            RecalcReason::Allocation => f.write_str("allocation changed"),
        }
    }
}

/// `requested`, else the configured basis month, else the current month.
pub fn resolve_basis_month(settings: &Settings, requested: Option<MonthKey>) -> MonthKey {
    resolve_basis_month_or(settings, requested, MonthKey::current())
}

/// Like [`resolve_basis_month`], with an explicit `fallback` for hosts that
/// carry their own clock.
pub fn resolve_basis_month_or(
    settings: &Settings,
    requested: Option<MonthKey>,
    fallback: MonthKey,
) -> MonthKey {
    requested
        .or(settings.budget_basis_month)
        .unwrap_or(fallback)
}

/// Income of `month` converted to the settings currency.
pub fn basis_income(snapshot: &Snapshot, month: MonthKey, rates: &RateTable) -> f64 {
    let target = snapshot.settings.default_currency.as_str();
    snapshot
        .income
        .iter()
        .filter(|income| month.contains(&income.date))
        .map(|income| convert(income.amount, &income.currency, target, rates))
        .sum()
}

/// Splits `income` into bucket pools.
///
/// Percentages that do not sum to 100 are scaled so the pools cover the
/// whole income. An allocation summing to zero (or to something that is not
/// a finite positive number) cannot be scaled and is rejected.
pub fn allocation_pools(income: f64, allocation: &BudgetAllocation) -> ResultEngine<BucketAmounts> {
    let total = allocation.total();
    if !total.is_finite() || total <= 0.0 {
        return Err(EngineError::Validation(format!(
            "allocation percentages must sum to a positive value, got {total}%"
        )));
    }
    let scale = if (total - 100.0).abs() > ALLOCATION_EPSILON {
        tracing::warn!("allocation sums to {total}%, normalizing to 100%");
        100.0 / total
    } else {
        1.0
    };
    let pool = |bucket| income * allocation.percent(bucket) * scale / 100.0;
    Ok(BucketAmounts {
        essentials: pool(Bucket::Essentials),
        investments: pool(Bucket::Investments),
        fun: pool(Bucket::Fun),
    })
}

/// New category limits from the income of the basis month.
///
/// Each bucket's pool is split equally over the categories assigned to it
/// and rounded to a whole unit; buckets without categories leave their pool
/// unused. Limits are written in the settings currency. Fails with
/// `InsufficientData` when the month has no income, leaving the caller's
/// categories as they were.
pub fn recalc_category_limits(
    snapshot: &Snapshot,
    basis_month: Option<MonthKey>,
    rates: &RateTable,
) -> ResultEngine<Vec<Category>> {
    let month = resolve_basis_month(&snapshot.settings, basis_month);
    let income = basis_income(snapshot, month, rates);
    if income <= 0.0 {
        return Err(EngineError::InsufficientData(format!(
            "no income recorded for {month}"
        )));
    }

    let pools = allocation_pools(income, &snapshot.settings.budget_allocation)?;
    let currency = snapshot.settings.default_currency.as_str();

    let mut categories = snapshot.categories.clone();
    for bucket in Bucket::ALL {
        let members = categories
            .iter()
            .filter(|category| category.allocation_bucket == bucket)
            .count();
        if members == 0 {
            continue;
        }
        let limit = (pools.get(bucket) / members as f64).round();
        for category in categories
            .iter_mut()
            .filter(|category| category.allocation_bucket == bucket)
        {
            category.limit = limit;
            category.currency = currency.to_string();
        }
    }

    tracing::info!(
        "recalculated {} category limits from {month} income {income:.2} {currency}",
        categories.len()
    );
    Ok(categories)
}

impl Snapshot {
    /// The snapshot with limits from [`recalc_category_limits`].
    pub fn with_recalculated_limits(
        &self,
        basis_month: Option<MonthKey>,
        rates: &RateTable,
    ) -> ResultEngine<Snapshot> {
        let categories = recalc_category_limits(self, basis_month, rates)?;
        let mut next = self.clone();
        next.categories = categories;
        Ok(next)
    }
}

/// Suggested limits for every item of `group`, in item order.
///
/// The bucket pool is distributed in proportion to the items' average
/// limits. Without income the averages themselves are suggested.
pub fn suggest_preset_limits(
    group: &PresetGroup,
    month_income: f64,
    allocation: &BudgetAllocation,
) -> Vec<f64> {
    let pool = (month_income * allocation.percent(group.bucket) / 100.0).round();
    let avg_total = group.avg_limit_total();
    group
        .items
        .iter()
        .map(|item| {
            if month_income > 0.0 && pool > 0.0 && avg_total > 0.0 {
                (item.avg_limit * pool / avg_total).round()
            } else {
                item.avg_limit
            }
        })
        .collect()
}

pub fn suggest_manual_limit(month_income: f64, allocation: &BudgetAllocation) -> f64 {
    (month_income * allocation.fun / 100.0 * MANUAL_LIMIT_SHARE).round()
}
