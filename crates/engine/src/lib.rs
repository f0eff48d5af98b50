//! Personal budget engine.
//!
//! Pure functions over a [`Snapshot`]: ledger operations return a new
//! snapshot, reports are computed from it. Currency rates are passed in as a
//! [`RateTable`]; the engine never performs I/O.

pub use aggregation::{
    BucketAmounts, BudgetCheck, BudgetUtilization, CategorySpending, DailyTotals,
    DashboardStats, MonthlyBudget, MonthlyTotals, Period, budget_utilization,
    budget_utilization_with_threshold, category_spending, daily_totals, dashboard_stats,
    filter_by_period, monthly_budget, monthly_totals, within_budget,
};
pub use allocator::{
    RecalcMode, RecalcReason, allocation_pools, basis_income, recalc_category_limits,
    resolve_basis_month, resolve_basis_month_or, suggest_manual_limit, suggest_preset_limits,
};
pub use categories::{Bucket, Category, OTHER_CATEGORY_ID, OTHER_LABEL};
pub use commands::{
    CategoryPatch, ExpensePatch, IncomePatch, NewCategory, NewExpense, NewIncome,
    NewRecurringPayment,
};
pub use currency::{BASE_CURRENCY, CurrencyRate, RateTable, convert};
pub use error::EngineError;
pub use insights::{Insight, InsightKind, insights};
pub use migration::migrate_snapshot;
pub use money::{format_amount, round2};
pub use month::MonthKey;
pub use ops::DueRun;
pub use presets::{CATEGORY_PRESETS, PresetGroup, PresetItem, default_categories, preset_group};
pub use recurring::{Frequency, RecurringPayment};
pub use settings::{
    ALLOCATION_EPSILON, BudgetAllocation, DEFAULT_CURRENCY, DEFAULT_WARNING_THRESHOLD, Mode,
    Settings, SettingsPatch, validate_allocation,
};
pub use snapshot::{SNAPSHOT_VERSION, Snapshot};
pub use transactions::{Dated, Expense, Income, parse_date};

mod aggregation;
mod allocator;
mod categories;
mod commands;
mod currency;
mod error;
mod insights;
mod migration;
mod money;
mod month;
mod ops;
mod presets;
mod recurring;
mod settings;
mod snapshot;
mod transactions;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
