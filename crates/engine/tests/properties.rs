use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use engine::{
    Bucket, BudgetAllocation, Category, CategorySpending, Expense, Income, MonthKey, RateTable,
    Snapshot, budget_utilization_with_threshold, convert, daily_totals, monthly_totals,
    recalc_category_limits, within_budget,
};

const CODES: [&str; 7] = ["EUR", "USD", "GBP", "JPY", "CAD", "AUD", "CHF"];

fn june() -> MonthKey {
    "2024-06".parse().unwrap()
}

fn category(index: usize, bucket: Bucket) -> Category {
    Category {
        id: format!("c{index}"),
        name: format!("Category {index}"),
        icon: "Tag".to_string(),
        color: "blue".to_string(),
        limit: 0.0,
        currency: "EUR".to_string(),
        allocation_bucket: bucket,
    }
}

fn bucket_strategy() -> impl Strategy<Value = Bucket> {
    prop_oneof![
        Just(Bucket::Essentials),
        Just(Bucket::Investments),
        Just(Bucket::Fun)
    ]
}

/// An allocation summing to exactly 100.
fn allocation_strategy() -> impl Strategy<Value = BudgetAllocation> {
    (0u32..=100)
        .prop_flat_map(|essentials| (Just(essentials), 0u32..=(100 - essentials)))
        .prop_map(|(essentials, investments)| {
            BudgetAllocation::new(
                f64::from(essentials),
                f64::from(investments),
                f64::from(100 - essentials - investments),
            )
        })
}

fn snapshot_with(income: f64, allocation: BudgetAllocation, buckets: &[Bucket]) -> Snapshot {
    let mut snapshot = Snapshot::bootstrap();
    snapshot.settings.budget_allocation = allocation;
    snapshot.categories = buckets
        .iter()
        .enumerate()
        .map(|(index, bucket)| category(index, *bucket))
        .collect();
    snapshot.income = vec![Income {
        id: "i1".to_string(),
        amount: income,
        currency: "EUR".to_string(),
        date: Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap(),
        description: None,
    }];
    snapshot
}

proptest! {
    #[test]
    fn recalculation_is_idempotent(
        income in 1.0f64..100_000.0,
        allocation in allocation_strategy(),
        buckets in prop::collection::vec(bucket_strategy(), 0..12),
    ) {
        let rates = RateTable::supported();
        let snapshot = snapshot_with(income, allocation, &buckets);
        let first = snapshot.with_recalculated_limits(Some(june()), &rates).unwrap();
        let second = first.with_recalculated_limits(Some(june()), &rates).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn bucket_limits_stay_within_rounding_of_pool(
        income in 1.0f64..100_000.0,
        allocation in allocation_strategy(),
        buckets in prop::collection::vec(bucket_strategy(), 1..12),
    ) {
        let rates = RateTable::supported();
        let snapshot = snapshot_with(income, allocation, &buckets);
        let categories = recalc_category_limits(&snapshot, Some(june()), &rates).unwrap();

        for bucket in Bucket::ALL {
            let members: Vec<&Category> = categories
                .iter()
                .filter(|category| category.allocation_bucket == bucket)
                .collect();
            if members.is_empty() {
                continue;
            }
            let pool = income * allocation.percent(bucket) / 100.0;
            let total: f64 = members.iter().map(|category| category.limit).sum();
            let slack = members.len() as f64 * 0.5 + 1e-6;
            prop_assert!((total - pool).abs() <= slack, "bucket {bucket}: {total} vs pool {pool}");
            prop_assert!(members.iter().all(|category| category.limit == members[0].limit));
        }
    }

    #[test]
    fn currency_round_trip(
        amount in 0.01f64..10_000_000.0,
        from in 0usize..CODES.len(),
        to in 0usize..CODES.len(),
    ) {
        let rates = RateTable::supported();
        let there = convert(amount, CODES[from], CODES[to], &rates);
        let back = convert(there, CODES[to], CODES[from], &rates);
        prop_assert!((back - amount).abs() <= amount * 1e-12);
    }

    #[test]
    fn daily_totals_add_up_to_month(
        incomes in prop::collection::vec((1.0f64..5_000.0, 1u32..=30, 0usize..CODES.len()), 0..20),
        expenses in prop::collection::vec((1.0f64..1_000.0, 1u32..=30, 0usize..CODES.len()), 0..40),
    ) {
        let rates = RateTable::supported();
        let income: Vec<Income> = incomes
            .iter()
            .enumerate()
            .map(|(index, (amount, day, code))| Income {
                id: format!("i{index}"),
                amount: *amount,
                currency: CODES[*code].to_string(),
                date: Utc.with_ymd_and_hms(2024, 6, *day, 9, 0, 0).unwrap(),
                description: None,
            })
            .collect();
        let expenses: Vec<Expense> = expenses
            .iter()
            .enumerate()
            .map(|(index, (amount, day, code))| Expense {
                id: format!("e{index}"),
                category_id: "1".to_string(),
                amount: *amount,
                currency: CODES[*code].to_string(),
                date: Utc.with_ymd_and_hms(2024, 6, *day, 18, 0, 0).unwrap(),
                description: None,
            })
            .collect();

        let month = monthly_totals(&income, &expenses, june(), "EUR", &rates);
        let days = daily_totals(&income, &expenses, june(), "EUR", &rates);
        let income_sum: f64 = days.iter().map(|day| day.totals.total_income).sum();
        let expense_sum: f64 = days.iter().map(|day| day.totals.total_expenses).sum();

        let income_tolerance = 1e-6 * (1.0 + month.total_income);
        let expense_tolerance = 1e-6 * (1.0 + month.total_expenses);
        prop_assert!((income_sum - month.total_income).abs() <= income_tolerance);
        prop_assert!((expense_sum - month.total_expenses).abs() <= expense_tolerance);
    }

    #[test]
    fn more_spending_never_improves_the_check(
        limit in 1.0f64..10_000.0,
        spent in 0.0f64..20_000.0,
        extra in 0.0f64..5_000.0,
        threshold in 1.0f64..100.0,
    ) {
        let before = within_budget(spent, limit, threshold);
        let after = within_budget(spent + extra, limit, threshold);
        prop_assert!(after.percentage >= before.percentage);
        prop_assert!(!before.warning || after.warning);
        prop_assert!(before.within_budget || !after.within_budget);
    }

    #[test]
    fn more_spending_never_lowers_utilization(
        limit in 0.0f64..10_000.0,
        spent in 0.0f64..20_000.0,
        extra in 0.0f64..5_000.0,
        threshold in 1.0f64..100.0,
    ) {
        let mut budgeted = category(0, Bucket::Essentials);
        budgeted.limit = limit;
        let row = |spent: f64| CategorySpending {
            category: budgeted.clone(),
            spent,
            percentage: 0.0,
        };

        let before = budget_utilization_with_threshold(&[row(spent)], threshold);
        let after = budget_utilization_with_threshold(&[row(spent + extra)], threshold);
        prop_assert!(after[0].utilization >= before[0].utilization);
        prop_assert!(!before[0].warning || after[0].warning);
        prop_assert!(!before[0].over_budget() || after[0].over_budget());
    }
}
