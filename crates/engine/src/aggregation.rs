//! Aggregations over the ledger: monthly totals, per-category spending and
//! budget utilization.
//!
//! Every amount is converted to the requested currency with [`convert`]
//! before it is summed. Nothing here rounds; rounding is a display concern.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::{
    Bucket, BudgetAllocation, Category, Dated, Expense, Income, MonthKey, RateTable, Snapshot,
    allocator, categories::OTHER_CATEGORY_ID, convert, settings::DEFAULT_WARNING_THRESHOLD,
};

/// Income, expenses and their difference for one window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotals {
    pub total_income: f64,
    pub total_expenses: f64,
    pub balance: f64,
}

impl MonthlyTotals {
    fn new(total_income: f64, total_expenses: f64) -> Self {
        Self {
            total_income,
            total_expenses,
            balance: total_income - total_expenses,
        }
    }
}

/// Totals of a single day.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DailyTotals {
    pub day: NaiveDate,
    pub totals: MonthlyTotals,
}

/// Spend on one category and its share of the total.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategorySpending {
    pub category: Category,
    pub spent: f64,
    pub percentage: f64,
}

/// How much of a category's limit has been used.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BudgetUtilization {
    pub category: Category,
    pub spent: f64,
    pub limit: f64,
    pub utilization: f64,
    pub warning: bool,
}

impl BudgetUtilization {
    pub fn over_budget(&self) -> bool {
        self.utilization > 100.0
    }
}

/// Result of [`within_budget`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetCheck {
    pub within_budget: bool,
    pub warning: bool,
    pub percentage: f64,
}

fn sum_converted<'a, T: Dated + 'a>(
    items: impl Iterator<Item = &'a T>,
    target: &str,
    rates: &RateTable,
) -> f64 {
    items
        .map(|item| convert(item.amount(), item.currency(), target, rates))
        .sum()
}

/// Income, expenses and balance of `month`, converted to `target`.
pub fn monthly_totals(
    income: &[Income],
    expenses: &[Expense],
    month: MonthKey,
    target: &str,
    rates: &RateTable,
) -> MonthlyTotals {
    let total_income = sum_converted(
        income.iter().filter(|item| month.contains(&item.date)),
        target,
        rates,
    );
    let total_expenses = sum_converted(
        expenses.iter().filter(|item| month.contains(&item.date)),
        target,
        rates,
    );
    MonthlyTotals::new(total_income, total_expenses)
}

/// Per-day totals of `month`, ordered by day. Days without records are
/// omitted. The rows add up to [`monthly_totals`] for the same month.
pub fn daily_totals(
    income: &[Income],
    expenses: &[Expense],
    month: MonthKey,
    target: &str,
    rates: &RateTable,
) -> Vec<DailyTotals> {
    let mut days: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for item in income.iter().filter(|item| month.contains(&item.date)) {
        days.entry(item.date.date_naive()).or_default().0 +=
            convert(item.amount, &item.currency, target, rates);
    }
    for item in expenses.iter().filter(|item| month.contains(&item.date)) {
        days.entry(item.date.date_naive()).or_default().1 +=
            convert(item.amount, &item.currency, target, rates);
    }
    days.into_iter()
        .map(|(day, (income, expenses))| DailyTotals {
            day,
            totals: MonthlyTotals::new(income, expenses),
        })
        .collect()
}

/// Spend per category, converted to `target`, sorted by `spent` descending.
///
/// Every category appears, with zero when it has no expenses. Spend on ids
/// that no longer resolve is collected in a trailing "Other" row, present
/// only when that spend is non-zero, or added to a stored category whose id
/// is already `other`. Ties keep the category order.
pub fn category_spending(
    expenses: &[Expense],
    categories: &[Category],
    target: &str,
    rates: &RateTable,
) -> Vec<CategorySpending> {
    let mut by_category: HashMap<&str, f64> = HashMap::new();
    let mut total = 0.0;
    for expense in expenses {
        let amount = convert(expense.amount, &expense.currency, target, rates);
        *by_category.entry(expense.category_id.as_str()).or_default() += amount;
        total += amount;
    }

    let known: f64 = categories
        .iter()
        .filter_map(|category| by_category.get(category.id.as_str()))
        .sum();
    let dangling = total - known;

    let share = |spent: f64| if total > 0.0 { spent / total * 100.0 } else { 0.0 };

    let mut rows: Vec<CategorySpending> = categories
        .iter()
        .map(|category| {
            let spent = by_category.get(category.id.as_str()).copied().unwrap_or(0.0);
            CategorySpending {
                category: category.clone(),
                spent,
                percentage: share(spent),
            }
        })
        .collect();

    if dangling > 1e-9 {
        // A stored category may already carry the "other" id.
        match rows
            .iter_mut()
            .find(|row| row.category.id == OTHER_CATEGORY_ID)
        {
            Some(row) => {
                row.spent += dangling;
                row.percentage = share(row.spent);
            }
            None => rows.push(CategorySpending {
                category: Category::other(target),
                spent: dangling,
                percentage: share(dangling),
            }),
        }
    }

    // `sort_by` is stable, so equal spends keep their category order.
    rows.sort_by(|a, b| b.spent.total_cmp(&a.spent));
    rows
}

/// Utilization with the default 80% warning threshold.
pub fn budget_utilization(spending: &[CategorySpending]) -> Vec<BudgetUtilization> {
    budget_utilization_with_threshold(spending, DEFAULT_WARNING_THRESHOLD)
}

/// `utilization = spent / limit * 100` (0 when the limit is 0) and
/// `warning = utilization >= threshold`.
pub fn budget_utilization_with_threshold(
    spending: &[CategorySpending],
    threshold: f64,
) -> Vec<BudgetUtilization> {
    spending
        .iter()
        .map(|row| {
            let limit = row.category.limit;
            let utilization = if limit > 0.0 {
                row.spent / limit * 100.0
            } else {
                0.0
            };
            BudgetUtilization {
                category: row.category.clone(),
                spent: row.spent,
                limit,
                utilization,
                warning: utilization >= threshold,
            }
        })
        .collect()
}

pub fn within_budget(spent: f64, limit: f64, threshold: f64) -> BudgetCheck {
    let percentage = if limit > 0.0 { spent / limit * 100.0 } else { 0.0 };
    BudgetCheck {
        within_budget: percentage <= 100.0,
        warning: percentage >= threshold,
        percentage,
    }
}

/// A reporting window relative to a reference date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Period {
    Daily,
    /// Sunday to Saturday.
    Weekly,
    Monthly,
}

impl Period {
    /// First and last day (inclusive) of the window containing `reference`.
    pub fn range(self, reference: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Period::Daily => (reference, reference),
            Period::Weekly => {
                let offset = u64::from(reference.weekday().num_days_from_sunday());
                let start = reference
                    .checked_sub_days(Days::new(offset))
                    .unwrap_or(reference);
                let end = start.checked_add_days(Days::new(6)).unwrap_or(start);
                (start, end)
            }
            Period::Monthly => {
                let month = MonthKey::of_day(reference);
                (month.first_day(), month.last_day())
            }
        }
    }
}

/// Records whose UTC calendar date falls within `period` around `reference`.
pub fn filter_by_period<T: Dated + Clone>(
    items: &[T],
    period: Period,
    reference: NaiveDate,
) -> Vec<T> {
    let (start, end) = period.range(reference);
    items
        .iter()
        .filter(|item| {
            let day = item.date().date_naive();
            day >= start && day <= end
        })
        .cloned()
        .collect()
}

/// Top-level numbers for the dashboard.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardStats {
    pub current_balance: f64,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    /// Expenses as a percentage of income.
    pub budget_utilization: f64,
    pub savings_rate: f64,
    pub top_categories: Vec<CategorySpending>,
}

/// Dashboard numbers for `month` in the settings currency.
pub fn dashboard_stats(snapshot: &Snapshot, month: MonthKey, rates: &RateTable) -> DashboardStats {
    let target = snapshot.settings.default_currency.as_str();
    let totals = monthly_totals(&snapshot.income, &snapshot.expenses, month, target, rates);
    let month_expenses: Vec<Expense> = snapshot
        .expenses
        .iter()
        .filter(|expense| month.contains(&expense.date))
        .cloned()
        .collect();
    let mut top_categories =
        category_spending(&month_expenses, &snapshot.categories, target, rates);
    top_categories.truncate(5);

    let ratio = |value: f64| {
        if totals.total_income > 0.0 {
            value / totals.total_income * 100.0
        } else {
            0.0
        }
    };

    DashboardStats {
        current_balance: totals.balance,
        monthly_income: totals.total_income,
        monthly_expenses: totals.total_expenses,
        budget_utilization: ratio(totals.total_expenses),
        savings_rate: ratio(totals.balance),
        top_categories,
    }
}

/// Per-bucket amounts of a [`MonthlyBudget`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct BucketAmounts {
    pub essentials: f64,
    pub investments: f64,
    pub fun: f64,
}

impl BucketAmounts {
    pub fn get(&self, bucket: Bucket) -> f64 {
        match bucket {
            Bucket::Essentials => self.essentials,
            Bucket::Investments => self.investments,
            Bucket::Fun => self.fun,
        }
    }

    fn add(&mut self, bucket: Bucket, amount: f64) {
        match bucket {
            Bucket::Essentials => self.essentials += amount,
            Bucket::Investments => self.investments += amount,
            Bucket::Fun => self.fun += amount,
        }
    }
}

/// What each bucket was allotted for a month and what was spent from it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthlyBudget {
    pub month: MonthKey,
    pub total_income: f64,
    pub allocated: BucketAmounts,
    pub spent: BucketAmounts,
    pub currency: String,
}

/// Allocated versus spent per bucket for `month`, in the settings currency.
///
/// Allocations use the same pools as the limit recalculation. Expenses on a
/// deleted category count toward the default bucket.
pub fn monthly_budget(snapshot: &Snapshot, month: MonthKey, rates: &RateTable) -> MonthlyBudget {
    let currency = snapshot.settings.default_currency.clone();
    let total_income = allocator::basis_income(snapshot, month, rates);
    let allocated = allocator::allocation_pools(total_income, &snapshot.settings.budget_allocation)
        .unwrap_or_else(|_| pools_as_is(total_income, &snapshot.settings.budget_allocation));

    let mut spent = BucketAmounts::default();
    for expense in snapshot
        .expenses
        .iter()
        .filter(|expense| month.contains(&expense.date))
    {
        let bucket = snapshot
            .category(&expense.category_id)
            .map(|category| category.allocation_bucket)
            .unwrap_or_default();
        spent.add(
            bucket,
            convert(expense.amount, &expense.currency, &currency, rates),
        );
    }

    MonthlyBudget {
        month,
        total_income,
        allocated,
        spent,
        currency,
    }
}

fn pools_as_is(income: f64, allocation: &BudgetAllocation) -> BucketAmounts {
    BucketAmounts {
        essentials: income * allocation.essentials / 100.0,
        investments: income * allocation.investments / 100.0,
        fun: income * allocation.fun / 100.0,
    }
}
