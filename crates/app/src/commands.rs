//! Command handlers.
//!
//! Every handler loads the snapshot, applies one engine operation and saves
//! the result. Nothing is saved when the operation fails.

use std::{fs, io::Write};

use chrono::{DateTime, Utc};
use engine::{
    BudgetAllocation, CategoryPatch, EngineError, Expense, MonthKey, NewCategory, NewExpense,
    NewIncome, NewRecurringPayment, Period, RateTable, RecalcMode, RecalcReason, SettingsPatch,
    Snapshot, basis_income, budget_utilization_with_threshold, category_spending,
    dashboard_stats, filter_by_period, insights, monthly_budget, recalc_category_limits,
    resolve_basis_month_or, suggest_manual_limit,
};
use storage::{RateCache, RateSource, SnapshotStore};

use crate::{
    cli::{
        AllocationCommand, CategoryCommand, Command, ExpenseCommand, ExpenseListArgs,
        IncomeCommand, PaymentsCommand, RatesCommand, RecalcArgs, SettingsCommand,
        SettingsSetArgs,
    },
    error::{AppError, Result},
    render,
};

/// Everything a command needs: where data lives, the rates to convert with
/// and where to print.
pub struct Context<S, W> {
    pub store: S,
    pub cache: RateCache,
    pub source: Box<dyn RateSource>,
    pub rates: RateTable,
    pub now: DateTime<Utc>,
    pub out: W,
}

impl<S: SnapshotStore, W: Write> Context<S, W> {
    pub fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Income(income) => self.income(income.command),
            Command::Expense(expense) => self.expense(expense.command),
            Command::Category(category) => self.category(category.command),
            Command::Allocation(allocation) => self.allocation(allocation.command),
            Command::Settings(settings) => self.settings(settings.command),
            Command::Summary(args) => self.summary(args.month),
            Command::Spending(args) => self.spending(args.month),
            Command::Budget(args) => self.budget(args.month),
            Command::Insights(args) => self.insights(args.month),
            Command::Recalc(args) => self.recalc(args),
            Command::Rates(rates) => self.rates(rates.command),
            Command::Payments(payments) => self.payments(payments.command),
            Command::Export(args) => self.export(args.out.as_deref()),
            Command::Import(args) => self.import(&args.file),
            Command::Clear(args) => self.clear(args.yes),
        }
    }

    fn say(&mut self, text: impl AsRef<str>) -> Result<()> {
        writeln!(self.out, "{}", text.as_ref())?;
        Ok(())
    }

    fn month_or_current(&self, month: Option<MonthKey>) -> MonthKey {
        month.unwrap_or_else(|| MonthKey::of(&self.now))
    }

    fn basis_month(&self, snapshot: &Snapshot, requested: Option<MonthKey>) -> MonthKey {
        resolve_basis_month_or(&snapshot.settings, requested, MonthKey::of(&self.now))
    }

    fn income(&mut self, command: IncomeCommand) -> Result<()> {
        let snapshot = self.store.load()?;
        match command {
            IncomeCommand::Add(args) => {
                let currency = args
                    .currency
                    .unwrap_or_else(|| snapshot.settings.default_currency.clone());
                let mut cmd = NewIncome::new(args.amount, currency, args.date.unwrap_or(self.now));
                if let Some(description) = args.description {
                    cmd = cmd.description(description);
                }
                let (next, id) = snapshot.add_income(cmd)?;
                let next = self.after_change(next, RecalcReason::Income)?;
                self.store.save(next)?;
                self.say(format!("income {id} added"))
            }
            IncomeCommand::List(args) => {
                let month = self.month_or_current(args.month);
                let items: Vec<_> = snapshot
                    .income
                    .iter()
                    .filter(|item| month.contains(&item.date))
                    .collect();
                let text = render::income_list(&items, &self.rates);
                self.say(text)
            }
            IncomeCommand::Delete(args) => {
                let next = snapshot.delete_income(&args.id)?;
                self.store.save(next)?;
                self.say(format!("income {} deleted", args.id))
            }
        }
    }

    fn expense(&mut self, command: ExpenseCommand) -> Result<()> {
        let snapshot = self.store.load()?;
        match command {
            ExpenseCommand::Add(args) => {
                let category = snapshot.resolve_category(&args.category)?;
                let category_id = category.id.clone();
                let currency = args
                    .currency
                    .unwrap_or_else(|| snapshot.settings.default_currency.clone());
                let mut cmd = NewExpense::new(
                    category_id,
                    args.amount,
                    currency,
                    args.date.unwrap_or(self.now),
                );
                if let Some(description) = args.description {
                    cmd = cmd.description(description);
                }
                let (next, id) = snapshot.add_expense(cmd)?;
                let saved = self.store.save(next)?;
                self.say(format!("expense {id} added"))?;
                self.warn_if_over_limit(&saved, &args.category)
            }
            ExpenseCommand::List(args) => {
                let items = self.select_expenses(&snapshot, &args)?;
                let text = render::expense_list(&snapshot, &items, &self.rates);
                self.say(text)
            }
            ExpenseCommand::Delete(args) => {
                let next = snapshot.delete_expense(&args.id)?;
                self.store.save(next)?;
                self.say(format!("expense {} deleted", args.id))
            }
        }
    }

    fn select_expenses(&self, snapshot: &Snapshot, args: &ExpenseListArgs) -> Result<Vec<Expense>> {
        if let Some(period) = args.period.as_deref() {
            let period = match period {
                "daily" => Period::Daily,
                "weekly" => Period::Weekly,
                "monthly" => Period::Monthly,
                other => return Err(AppError::Input(format!("unknown period: {other}"))),
            };
            let reference = args.on.unwrap_or_else(|| self.now.date_naive());
            return Ok(filter_by_period(&snapshot.expenses, period, reference));
        }
        let month = self.month_or_current(args.month);
        Ok(snapshot
            .expenses
            .iter()
            .filter(|item| month.contains(&item.date))
            .cloned()
            .collect())
    }

    /// Prints a note when the category crossed its warning threshold this
    /// month.
    fn warn_if_over_limit(&mut self, snapshot: &Snapshot, category: &str) -> Result<()> {
        let Ok(category) = snapshot.resolve_category(category) else {
            return Ok(());
        };
        let month = MonthKey::of(&self.now);
        let target = snapshot.settings.default_currency.as_str();
        let expenses: Vec<Expense> = snapshot
            .expenses
            .iter()
            .filter(|expense| expense.category_id == category.id && month.contains(&expense.date))
            .cloned()
            .collect();
        let spending = category_spending(
            &expenses,
            std::slice::from_ref(category),
            target,
            &self.rates,
        );
        let report =
            budget_utilization_with_threshold(&spending, snapshot.settings.warning_threshold);
        if let Some(row) = report.first().filter(|row| row.warning) {
            let text = format!(
                "{} is at {:.1}% of its limit this month",
                row.category.name, row.utilization
            );
            self.say(text)?;
        }
        Ok(())
    }

    fn category(&mut self, command: CategoryCommand) -> Result<()> {
        let snapshot = self.store.load()?;
        match command {
            CategoryCommand::Add(args) => {
                let limit = match args.limit {
                    Some(limit) => limit,
                    None => {
                        let month = self.basis_month(&snapshot, None);
                        let income = basis_income(&snapshot, month, &self.rates);
                        suggest_manual_limit(income, &snapshot.settings.budget_allocation)
                    }
                };
                let mut cmd = NewCategory::new(args.name, limit).bucket(args.bucket);
                if let Some(icon) = args.icon {
                    cmd = cmd.icon(icon);
                }
                if let Some(color) = args.color {
                    cmd = cmd.color(color);
                }
                if let Some(currency) = args.currency {
                    cmd = cmd.currency(currency);
                }
                let (next, id) = snapshot.add_category(cmd)?;
                self.store.save(next)?;
                self.say(format!("category {id} added with limit {limit}"))
            }
            CategoryCommand::Preset(args) => {
                let Some(group) = args.group else {
                    return self.say(render::presets());
                };
                let (next, added) =
                    snapshot.add_preset_categories(&group, &args.only, args.month, &self.rates)?;
                if added == 0 {
                    return self.say("no new categories, all of them already exist");
                }
                self.store.save(next)?;
                self.say(format!("{added} categories added"))
            }
            CategoryCommand::List => {
                let text = render::categories(&snapshot.categories, &self.rates);
                self.say(text)
            }
            CategoryCommand::Delete(args) => {
                let id = snapshot.resolve_category(&args.category)?.id.clone();
                let next = snapshot.delete_category(&id)?;
                self.store.save(next)?;
                self.say(format!("category {id} deleted"))
            }
            CategoryCommand::Bucket(args) => {
                let id = snapshot.resolve_category(&args.category)?.id.clone();
                let next =
                    snapshot.update_category(&id, CategoryPatch::default().bucket(args.bucket))?;
                self.store.save(next)?;
                self.say(format!("category {id} moved to {}", args.bucket))
            }
        }
    }

    fn allocation(&mut self, command: AllocationCommand) -> Result<()> {
        let snapshot = self.store.load()?;
        let next = match command {
            AllocationCommand::Set(args) => snapshot.set_allocation(BudgetAllocation::new(
                args.essentials,
                args.investments,
                args.fun,
            ))?,
            AllocationCommand::Reset => snapshot.reset_allocation(),
        };
        let next = self.after_change(next, RecalcReason::Allocation)?;
        let saved = self.store.save(next)?;
        let allocation = saved.settings.budget_allocation;
        self.say(format!(
            "allocation is now {}/{}/{}",
            allocation.essentials, allocation.investments, allocation.fun
        ))
    }

    fn settings(&mut self, command: SettingsCommand) -> Result<()> {
        let snapshot = self.store.load()?;
        match command {
            SettingsCommand::Show => {
                let text = render::settings(&snapshot.settings);
                self.say(text)
            }
            SettingsCommand::Set(args) => {
                let next = snapshot.update_settings(settings_patch(args))?;
                let saved = self.store.save(next)?;
                let text = render::settings(&saved.settings);
                self.say(text)
            }
        }
    }

    fn summary(&mut self, month: Option<MonthKey>) -> Result<()> {
        let snapshot = self.store.load()?;
        let month = self.month_or_current(month);
        let stats = dashboard_stats(&snapshot, month, &self.rates);
        let text = render::summary(month, &stats, &snapshot.settings.default_currency, &self.rates);
        self.say(text)
    }

    fn spending(&mut self, month: Option<MonthKey>) -> Result<()> {
        let snapshot = self.store.load()?;
        let month = self.month_or_current(month);
        let target = snapshot.settings.default_currency.as_str();
        let expenses: Vec<Expense> = snapshot
            .expenses
            .iter()
            .filter(|expense| month.contains(&expense.date))
            .cloned()
            .collect();
        let spending = category_spending(&expenses, &snapshot.categories, target, &self.rates);
        let report =
            budget_utilization_with_threshold(&spending, snapshot.settings.warning_threshold);
        let text = render::utilization(&report, target, &self.rates);
        self.say(text)
    }

    fn budget(&mut self, month: Option<MonthKey>) -> Result<()> {
        let snapshot = self.store.load()?;
        let month = self.month_or_current(month);
        let report = monthly_budget(&snapshot, month, &self.rates);
        let text = render::budget(&report, &self.rates);
        self.say(text)
    }

    fn insights(&mut self, month: Option<MonthKey>) -> Result<()> {
        let snapshot = self.store.load()?;
        let month = self.month_or_current(month);
        let text = render::insights(&insights(&snapshot, month, &self.rates));
        self.say(text)
    }

    fn recalc(&mut self, args: RecalcArgs) -> Result<()> {
        let snapshot = self.store.load()?;
        let month = self.basis_month(&snapshot, args.month);
        let categories = recalc_category_limits(&snapshot, Some(month), &self.rates)?;
        let preview = render::limits_preview(&snapshot.categories, &categories, &self.rates);
        if !args.yes {
            self.say(format!("New limits from {month} income:"))?;
            self.say(preview)?;
            return self.say("run again with --yes to apply");
        }
        let mut next = snapshot;
        next.categories = categories;
        self.store.save(next)?;
        self.say(format!("limits recalculated from {month} income:"))?;
        self.say(preview)
    }

    /// Recalculation trigger after income or allocation changed.
    ///
    /// In automatic mode the limits are rewritten right away; a month
    /// without income keeps the old limits. In manual mode the user is told
    /// how to apply them.
    fn after_change(&mut self, snapshot: Snapshot, reason: RecalcReason) -> Result<Snapshot> {
        let month = self.basis_month(&snapshot, None);
        match RecalcMode::from(&snapshot.settings) {
            RecalcMode::Automatic => {
                match snapshot.with_recalculated_limits(Some(month), &self.rates) {
                    Ok(next) => {
                        tracing::info!("limits recalculated automatically, {reason}");
                        self.say(format!("category limits recalculated ({reason})"))?;
                        Ok(next)
                    }
                    Err(EngineError::InsufficientData(message)) => {
                        self.say(format!("limits left unchanged: {message}"))?;
                        Ok(snapshot)
                    }
                    Err(err) => Err(err.into()),
                }
            }
            RecalcMode::Manual => {
                self.say(format!(
                    "{reason}: run `budgetwise recalc` to review new category limits"
                ))?;
                Ok(snapshot)
            }
        }
    }

    fn rates(&mut self, command: RatesCommand) -> Result<()> {
        match command {
            RatesCommand::Show => {
                let text = render::rates(&self.rates, self.cache.fetched_at());
                self.say(text)
            }
            RatesCommand::Refresh => {
                self.rates = self.cache.refresh(self.source.as_mut(), self.now)?;
                let text = render::rates(&self.rates, Some(self.now));
                self.say(text)
            }
        }
    }

    fn payments(&mut self, command: PaymentsCommand) -> Result<()> {
        let snapshot = self.store.load()?;
        match command {
            PaymentsCommand::Add(args) => {
                let category_id = snapshot.resolve_category(&args.category)?.id.clone();
                let start = args.start.unwrap_or_else(|| self.now.date_naive());
                let mut cmd = NewRecurringPayment::new(args.name, args.amount, category_id, start)
                    .frequency(args.frequency);
                if let Some(currency) = args.currency {
                    cmd = cmd.currency(currency);
                }
                if let Some(max) = args.max {
                    cmd = cmd.max_executions(max);
                }
                let (next, id) = snapshot.add_recurring_payment(cmd)?;
                self.store.save(next)?;
                self.say(format!("payment {id} scheduled from {start}"))
            }
            PaymentsCommand::List => {
                let text = render::payments(&snapshot, &self.rates);
                self.say(text)
            }
            PaymentsCommand::Run(args) => {
                let today = args.today.unwrap_or_else(|| self.now.date_naive());
                let run = snapshot.run_due_payments(today);
                if run.created.is_empty() {
                    return self.say("no payments due");
                }
                let count = run.created.len();
                self.store.save(run.snapshot)?;
                self.say(format!("{count} payments executed"))
            }
            PaymentsCommand::Pause(args) => {
                let next = snapshot.set_payment_active(&args.id, false)?;
                self.store.save(next)?;
                self.say(format!("payment {} paused", args.id))
            }
            PaymentsCommand::Resume(args) => {
                let next = snapshot.set_payment_active(&args.id, true)?;
                self.store.save(next)?;
                self.say(format!("payment {} resumed", args.id))
            }
            PaymentsCommand::Delete(args) => {
                let next = snapshot.delete_recurring_payment(&args.id)?;
                self.store.save(next)?;
                self.say(format!("payment {} deleted", args.id))
            }
        }
    }

    fn export(&mut self, out: Option<&std::path::Path>) -> Result<()> {
        let payload = self.store.export()?;
        match out {
            Some(path) => {
                fs::write(path, payload)?;
                self.say(format!("exported to {}", path.display()))
            }
            None => self.say(payload),
        }
    }

    fn import(&mut self, file: &std::path::Path) -> Result<()> {
        let payload = fs::read_to_string(file)?;
        let snapshot = self.store.import(&payload)?;
        self.say(format!(
            "imported {} income, {} expenses, {} categories",
            snapshot.income.len(),
            snapshot.expenses.len(),
            snapshot.categories.len()
        ))
    }

    fn clear(&mut self, yes: bool) -> Result<()> {
        if !yes {
            return self.say("this deletes all data; run again with --yes");
        }
        self.store.clear()?;
        self.say("all data cleared")
    }
}

fn settings_patch(args: SettingsSetArgs) -> SettingsPatch {
    let mut patch = SettingsPatch::default();
    if let Some(currency) = args.currency {
        patch = patch.default_currency(currency);
    }
    if let Some(mode) = args.mode {
        patch = patch.mode(mode);
    }
    if let Some(auto) = args.auto_calc {
        patch = patch.auto_calc_limits(auto);
    }
    if let Some(month) = args.basis_month {
        patch = patch.budget_basis_month(Some(month));
    } else if args.clear_basis_month {
        patch = patch.budget_basis_month(None);
    }
    if let Some(threshold) = args.warning_threshold {
        patch = patch.warning_threshold(threshold);
    }
    patch
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use clap::Parser;
    use storage::{MemoryStore, MockRateSource};

    use super::*;
    use crate::cli::Cli;

    fn context() -> Context<MemoryStore, Vec<u8>> {
        let dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../target/test_stores/app_missing");
        Context {
            store: MemoryStore::new(),
            cache: RateCache::with_default_ttl(dir),
            source: Box::new(MockRateSource::seeded(1)),
            rates: RateTable::supported(),
            now: Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap(),
            out: Vec::new(),
        }
    }

    fn exec(ctx: &mut Context<MemoryStore, Vec<u8>>, args: &[&str]) -> Result<String> {
        ctx.out.clear();
        let mut argv = vec!["budgetwise"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();
        ctx.run(cli.command)?;
        Ok(String::from_utf8(ctx.out.clone()).unwrap())
    }

    #[test]
    fn manual_mode_suggests_recalc() {
        let mut ctx = context();
        let out = exec(&mut ctx, &["income", "add", "2000"]).unwrap();
        assert!(out.contains("run `budgetwise recalc`"));
        let snapshot = ctx.store.load().unwrap();
        assert_eq!(snapshot.income.len(), 1);
        assert_eq!(snapshot.categories[0].limit, 400.0);

        let preview = exec(&mut ctx, &["recalc"]).unwrap();
        assert!(preview.contains("--yes"));
        assert_eq!(ctx.store.load().unwrap().categories[0].limit, 400.0);

        exec(&mut ctx, &["recalc", "--yes"]).unwrap();
        // Four essentials categories share 1000.
        assert_eq!(ctx.store.load().unwrap().categories[0].limit, 250.0);
    }

    #[test]
    fn automatic_mode_recalculates_on_income_and_allocation() {
        let mut ctx = context();
        exec(&mut ctx, &["settings", "set", "--auto-calc", "true"]).unwrap();
        let out = exec(&mut ctx, &["income", "add", "2000"]).unwrap();
        assert!(out.contains("category limits recalculated (income changed)"));
        assert_eq!(ctx.store.load().unwrap().categories[0].limit, 250.0);

        exec(&mut ctx, &["allocation", "set", "60", "10", "30"]).unwrap();
        let snapshot = ctx.store.load().unwrap();
        assert!(snapshot.settings.custom_allocation);
        assert_eq!(snapshot.categories[0].limit, 300.0);
    }

    #[test]
    fn recalc_prefers_configured_basis_month() {
        let mut ctx = context();
        exec(&mut ctx, &["income", "add", "4000", "--date", "2024-05-10"]).unwrap();
        exec(&mut ctx, &["income", "add", "2000"]).unwrap();
        exec(&mut ctx, &["settings", "set", "--basis-month", "2024-05"]).unwrap();

        let out = exec(&mut ctx, &["recalc", "--yes"]).unwrap();
        assert!(out.contains("2024-05"));
        assert_eq!(ctx.store.load().unwrap().categories[0].limit, 500.0);

        exec(&mut ctx, &["settings", "set", "--clear-basis-month"]).unwrap();
        exec(&mut ctx, &["recalc", "--yes"]).unwrap();
        assert_eq!(ctx.store.load().unwrap().categories[0].limit, 250.0);
    }

    #[test]
    fn automatic_mode_without_income_keeps_limits() {
        let mut ctx = context();
        exec(&mut ctx, &["settings", "set", "--auto-calc", "true"]).unwrap();
        let out = exec(&mut ctx, &["allocation", "reset"]).unwrap();
        assert!(out.contains("limits left unchanged"));
        assert_eq!(ctx.store.load().unwrap().categories[0].limit, 400.0);
    }

    #[test]
    fn bad_allocation_is_not_saved() {
        let mut ctx = context();
        let err = exec(&mut ctx, &["allocation", "set", "60", "30", "30"]).unwrap_err();
        assert!(matches!(err, AppError::Engine(EngineError::Validation(_))));
        assert!(!ctx.store.load().unwrap().settings.custom_allocation);
    }

    #[test]
    fn expense_by_category_name_and_warning() {
        let mut ctx = context();
        let out = exec(
            &mut ctx,
            &["expense", "add", "350", "--category", "groceries", "--date", "2024-06-10"],
        )
        .unwrap();
        assert!(out.contains("Groceries is at 87.5% of its limit this month"));

        let err = exec(&mut ctx, &["expense", "add", "5", "--category", "Grocerie"]).unwrap_err();
        assert!(err.to_string().contains("did you mean 'Groceries'?"));

        let listed = exec(
            &mut ctx,
            &["expense", "list", "--period", "weekly", "--on", "2024-06-12"],
        )
        .unwrap();
        assert!(listed.contains("Groceries"));
    }

    #[test]
    fn payments_run_creates_expenses() {
        let mut ctx = context();
        exec(
            &mut ctx,
            &["payments", "add", "Gym", "30", "--category", "Healthcare", "--start", "2024-06-01"],
        )
        .unwrap();
        let out = exec(&mut ctx, &["payments", "run"]).unwrap();
        assert_eq!(out.trim(), "1 payments executed");
        let snapshot = ctx.store.load().unwrap();
        assert_eq!(snapshot.expenses.len(), 1);
        assert_eq!(snapshot.expenses[0].category_id, "7");

        let again = exec(&mut ctx, &["payments", "run"]).unwrap();
        assert_eq!(again.trim(), "no payments due");
    }

    #[test]
    fn clear_needs_confirmation() {
        let mut ctx = context();
        exec(&mut ctx, &["income", "add", "100"]).unwrap();
        exec(&mut ctx, &["clear"]).unwrap();
        assert_eq!(ctx.store.load().unwrap().income.len(), 1);
        exec(&mut ctx, &["clear", "--yes"]).unwrap();
        assert!(ctx.store.load().unwrap().income.is_empty());
    }
}
