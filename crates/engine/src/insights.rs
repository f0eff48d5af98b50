use serde::Serialize;

use crate::{
    MonthKey, RateTable, Snapshot,
    aggregation::{dashboard_stats, monthly_totals},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Success,
    Info,
    Warning,
}

/// A short observation about a month of spending.
///
/// `code` is stable and meant for matching; `message` is for people.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub code: &'static str,
    pub message: String,
}

impl Insight {
    fn new(kind: InsightKind, code: &'static str, message: String) -> Self {
        Self {
            kind,
            code,
            message,
        }
    }
}

/// Insights for `month`, in the settings currency.
///
/// Always contains one savings-rate insight, followed by utilization,
/// concentration and income-trend insights when they apply.
pub fn insights(snapshot: &Snapshot, month: MonthKey, rates: &RateTable) -> Vec<Insight> {
    let stats = dashboard_stats(snapshot, month, rates);
    let mut out = Vec::new();

    let savings = stats.savings_rate;
    out.push(if savings >= 20.0 {
        Insight::new(
            InsightKind::Success,
            "savings.excellent",
            format!("Excellent savings rate of {savings:.1}%."),
        )
    } else if savings >= 10.0 {
        Insight::new(
            InsightKind::Info,
            "savings.good",
            format!("Savings rate of {savings:.1}%, consider saving a bit more."),
        )
    } else if savings >= 0.0 {
        Insight::new(
            InsightKind::Warning,
            "savings.low",
            format!("Low savings rate of {savings:.1}%, review your expenses."),
        )
    } else {
        Insight::new(
            InsightKind::Warning,
            "savings.negative",
            format!(
                "You are spending {:.1}% more than you earn.",
                savings.abs()
            ),
        )
    });

    let utilization = stats.budget_utilization;
    if utilization > 90.0 {
        out.push(Insight::new(
            InsightKind::Warning,
            "utilization.high",
            format!("{utilization:.1}% of income already spent this month."),
        ));
    } else if utilization > 70.0 {
        out.push(Insight::new(
            InsightKind::Info,
            "utilization.moderate",
            format!("{utilization:.1}% of income spent this month."),
        ));
    }

    if let Some(top) = stats.top_categories.first()
        && top.percentage > 40.0
    {
        out.push(Insight::new(
            InsightKind::Warning,
            "category.concentration",
            format!(
                "{} accounts for {:.1}% of your spending.",
                top.category.name, top.percentage
            ),
        ));
    }

    let target = snapshot.settings.default_currency.as_str();
    let previous = monthly_totals(
        &snapshot.income,
        &snapshot.expenses,
        month.previous(),
        target,
        rates,
    );
    if previous.total_income > 0.0 {
        let change =
            (stats.monthly_income - previous.total_income) / previous.total_income * 100.0;
        if change > 10.0 {
            out.push(Insight::new(
                InsightKind::Success,
                "income.up",
                format!("Income up {change:.1}% on last month."),
            ));
        } else if change < -10.0 {
            out.push(Insight::new(
                InsightKind::Warning,
                "income.down",
                format!("Income down {:.1}% on last month.", change.abs()),
            ));
        }
    }

    out
}
