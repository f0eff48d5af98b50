//! Plain-text rendering of engine reports.

use chrono::{DateTime, Utc};
use engine::{
    Bucket, BudgetUtilization, CATEGORY_PRESETS, Category, DashboardStats, Expense, Income,
    Insight, InsightKind, MonthKey, MonthlyBudget, RateTable, RecurringPayment, Settings,
    Snapshot, format_amount, round2,
};

/// `format_amount` keeping the sign.
pub fn money(amount: f64, currency: &str, rates: &RateTable) -> String {
    let formatted = format_amount(amount, currency, rates);
    if round2(amount) < 0.0 {
        format!("-{formatted}")
    } else {
        formatted
    }
}

fn day(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn income_list(items: &[&Income], rates: &RateTable) -> String {
    if items.is_empty() {
        return "No income recorded.".to_string();
    }
    items
        .iter()
        .map(|item| {
            format!(
                "{}  {:>14}  {}  {}",
                day(&item.date),
                money(item.amount, &item.currency, rates),
                item.id,
                item.description.as_deref().unwrap_or("")
            )
            .trim_end()
            .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn expense_list(snapshot: &Snapshot, items: &[Expense], rates: &RateTable) -> String {
    if items.is_empty() {
        return "No expenses recorded.".to_string();
    }
    items
        .iter()
        .map(|item| {
            format!(
                "{}  {:>14}  {:<20}  {}  {}",
                day(&item.date),
                money(item.amount, &item.currency, rates),
                snapshot.category_label(&item.category_id),
                item.id,
                item.description.as_deref().unwrap_or("")
            )
            .trim_end()
            .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn categories(categories: &[Category], rates: &RateTable) -> String {
    let mut lines = Vec::new();
    for bucket in Bucket::ALL {
        let members: Vec<&Category> = categories
            .iter()
            .filter(|category| category.allocation_bucket == bucket)
            .collect();
        if members.is_empty() {
            continue;
        }
        lines.push(format!("[{bucket}]"));
        for category in members {
            lines.push(format!(
                "  {:<24} {:>14}  {}",
                category.name,
                money(category.limit, &category.currency, rates),
                category.id
            ));
        }
    }
    if lines.is_empty() {
        return "No categories.".to_string();
    }
    lines.join("\n")
}

pub fn presets() -> String {
    CATEGORY_PRESETS
        .iter()
        .map(|group| {
            let items: Vec<&str> = group.items.iter().map(|item| item.name).collect();
            format!("{} ({}): {}", group.name, group.bucket, items.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Old and new limit side by side.
pub fn limits_preview(before: &[Category], after: &[Category], rates: &RateTable) -> String {
    before
        .iter()
        .zip(after)
        .map(|(old, new)| {
            format!(
                "  {:<24} {:>14} -> {:>14}",
                new.name,
                money(old.limit, &old.currency, rates),
                money(new.limit, &new.currency, rates)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn summary(
    month: MonthKey,
    stats: &DashboardStats,
    currency: &str,
    rates: &RateTable,
) -> String {
    let mut lines = vec![
        format!("{month}"),
        format!("  Income     {:>14}", money(stats.monthly_income, currency, rates)),
        format!("  Expenses   {:>14}", money(stats.monthly_expenses, currency, rates)),
        format!("  Balance    {:>14}", money(stats.current_balance, currency, rates)),
        format!("  Spent      {:>13.1}%", stats.budget_utilization),
        format!("  Saved      {:>13.1}%", stats.savings_rate),
    ];
    let top: Vec<_> = stats
        .top_categories
        .iter()
        .filter(|row| row.spent > 0.0)
        .collect();
    if !top.is_empty() {
        lines.push("  Top categories".to_string());
        for row in top {
            lines.push(format!(
                "    {:<22} {:>14} {:>6.1}%",
                row.category.name,
                money(row.spent, currency, rates),
                row.percentage
            ));
        }
    }
    lines.join("\n")
}

pub fn utilization(rows: &[BudgetUtilization], currency: &str, rates: &RateTable) -> String {
    if rows.is_empty() {
        return "No categories.".to_string();
    }
    rows.iter()
        .map(|row| {
            let flag = if row.over_budget() {
                "  OVER"
            } else if row.warning {
                "  !"
            } else {
                ""
            };
            let limit = if row.limit > 0.0 {
                money(row.limit, &row.category.currency, rates)
            } else {
                "-".to_string()
            };
            format!(
                "{:<24} {:>14} / {:>14} {:>6.1}%{flag}",
                row.category.name,
                money(row.spent, currency, rates),
                limit,
                row.utilization
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn budget(report: &MonthlyBudget, rates: &RateTable) -> String {
    let currency = report.currency.as_str();
    let mut lines = vec![format!(
        "{}  income {}",
        report.month,
        money(report.total_income, currency, rates)
    )];
    for bucket in Bucket::ALL {
        let allocated = report.allocated.get(bucket);
        let spent = report.spent.get(bucket);
        lines.push(format!(
            "  {:<12} {:>14} allocated {:>14} spent {:>14} left",
            bucket.as_str(),
            money(allocated, currency, rates),
            money(spent, currency, rates),
            money(allocated - spent, currency, rates)
        ));
    }
    lines.join("\n")
}

pub fn insights(list: &[Insight]) -> String {
    list.iter()
        .map(|insight| {
            let tag = match insight.kind {
                InsightKind::Success => "ok",
                InsightKind::Info => "info",
                InsightKind::Warning => "warn",
            };
            format!("[{tag:<4}] {}", insight.message)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn rates(table: &RateTable, fetched_at: Option<DateTime<Utc>>) -> String {
    let mut lines: Vec<String> = table
        .iter()
        .map(|rate| {
            format!(
                "{:<4} {:<20} {:>4} {:>12.4}",
                rate.code, rate.name, rate.symbol, rate.rate
            )
        })
        .collect();
    lines.push(match fetched_at {
        Some(at) => format!("fetched {}", at.format("%Y-%m-%d %H:%M UTC")),
        None => "built-in rates".to_string(),
    });
    lines.join("\n")
}

pub fn payments(snapshot: &Snapshot, rates: &RateTable) -> String {
    if snapshot.recurring_payments.is_empty() {
        return "No automatic payments.".to_string();
    }
    snapshot
        .recurring_payments
        .iter()
        .map(|payment| payment_line(snapshot, payment, rates))
        .collect::<Vec<_>>()
        .join("\n")
}

fn payment_line(snapshot: &Snapshot, payment: &RecurringPayment, rates: &RateTable) -> String {
    let runs = match payment.max_executions {
        Some(max) => format!("{}/{max}", payment.times_executed),
        None => payment.times_executed.to_string(),
    };
    let state = if payment.active { "active" } else { "paused" };
    format!(
        "{:<20} {:>12} {:<8} next {}  {:<18} runs {runs:<6} {state}  {}",
        payment.name,
        money(payment.amount, &payment.currency, rates),
        payment.frequency.to_string(),
        payment.next_due,
        snapshot.category_label(&payment.category_id),
        payment.id
    )
}

pub fn settings(settings: &Settings) -> String {
    let allocation = settings.budget_allocation;
    let basis = settings
        .budget_basis_month
        .map_or_else(|| "current month".to_string(), |month| month.to_string());
    [
        format!("currency           {}", settings.default_currency),
        format!("mode               {}", settings.mode),
        format!(
            "allocation         {}/{}/{}{}",
            allocation.essentials,
            allocation.investments,
            allocation.fun,
            if settings.custom_allocation { " (custom)" } else { "" }
        ),
        format!("auto calc limits   {}", settings.auto_calc_limits),
        format!("basis month        {basis}"),
        format!("warning threshold  {}%", settings.warning_threshold),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_keeps_sign() {
        let rates = RateTable::supported();
        assert_eq!(money(-1234.5, "EUR", &rates), "-€1,234.50");
        assert_eq!(money(12.0, "USD", &rates), "$12.00");
        assert_eq!(money(-0.001, "EUR", &rates), "€0.00");
    }

    #[test]
    fn settings_block() {
        let text = settings(&Settings::default());
        assert!(text.contains("allocation         50/20/30\n"));
        assert!(text.contains("basis month        current month"));
    }

    #[test]
    fn presets_list_every_group() {
        assert_eq!(presets().lines().count(), CATEGORY_PRESETS.len());
    }
}
