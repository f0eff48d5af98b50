use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use engine::{Bucket, Frequency, Mode, MonthKey, parse_date};

#[derive(Parser, Debug)]
#[command(name = "budgetwise")]
#[command(about = "Track income and expenses and keep category budgets in line with income")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override the data directory.
    #[arg(long, global = true)]
    pub data_dir: Option<String>,
    /// Override the log level (e.g. debug, info, warn).
    #[arg(long, global = true)]
    pub level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record and inspect income.
    Income(Income),
    /// Record and inspect expenses.
    Expense(Expense),
    /// Manage spending categories.
    Category(Category),
    /// Change how income is split between buckets.
    Allocation(Allocation),
    Settings(Settings),
    /// Income, expenses and balance of a month.
    Summary(MonthArgs),
    /// Spend per category with limit utilization.
    Spending(MonthArgs),
    /// Allocated versus spent per bucket.
    Budget(MonthArgs),
    Insights(MonthArgs),
    /// Recalculate category limits from a month's income.
    Recalc(RecalcArgs),
    Rates(Rates),
    /// Automatic payments that become expenses when due.
    Payments(Payments),
    /// Print the snapshot as JSON, or write it to a file.
    Export(ExportArgs),
    /// Replace all data with a previously exported snapshot.
    Import(ImportArgs),
    /// Delete all stored data.
    Clear(ConfirmArgs),
}

#[derive(Args, Debug, Default)]
pub struct MonthArgs {
    /// Month as YYYY-MM, defaults to the current month.
    #[arg(long)]
    pub month: Option<MonthKey>,
}

#[derive(Args, Debug)]
pub struct Income {
    #[command(subcommand)]
    pub command: IncomeCommand,
}

#[derive(Subcommand, Debug)]
pub enum IncomeCommand {
    Add(IncomeAddArgs),
    List(MonthArgs),
    Delete(IdArgs),
}

#[derive(Args, Debug)]
pub struct IncomeAddArgs {
    pub amount: f64,
    /// Currency code, defaults to the settings currency.
    #[arg(long)]
    pub currency: Option<String>,
    /// YYYY-MM-DD or RFC 3339, defaults to now.
    #[arg(long, value_parser = parse_datetime)]
    pub date: Option<DateTime<Utc>>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args, Debug)]
pub struct Expense {
    #[command(subcommand)]
    pub command: ExpenseCommand,
}

#[derive(Subcommand, Debug)]
pub enum ExpenseCommand {
    Add(ExpenseAddArgs),
    List(ExpenseListArgs),
    Delete(IdArgs),
}

#[derive(Args, Debug)]
pub struct ExpenseAddArgs {
    pub amount: f64,
    /// Category name or id.
    #[arg(long)]
    pub category: String,
    #[arg(long)]
    pub currency: Option<String>,
    #[arg(long, value_parser = parse_datetime)]
    pub date: Option<DateTime<Utc>>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args, Debug)]
pub struct ExpenseListArgs {
    #[arg(long, conflicts_with = "period")]
    pub month: Option<MonthKey>,
    /// Only the day, week (Sunday to Saturday) or month around `--on`.
    #[arg(long, value_parser = ["daily", "weekly", "monthly"])]
    pub period: Option<String>,
    /// Reference day for `--period`, defaults to today.
    #[arg(long, value_parser = parse_day, requires = "period")]
    pub on: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct Category {
    #[command(subcommand)]
    pub command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    Add(CategoryAddArgs),
    /// Add categories from a preset group, or list the groups.
    Preset(PresetArgs),
    List,
    Delete(CategoryRefArgs),
    /// Move a category to another bucket.
    Bucket(CategoryBucketArgs),
}

#[derive(Args, Debug)]
pub struct CategoryAddArgs {
    pub name: String,
    /// Monthly limit, defaults to a suggestion based on this month's income.
    #[arg(long)]
    pub limit: Option<f64>,
    #[arg(long, default_value_t = Bucket::Essentials)]
    pub bucket: Bucket,
    #[arg(long)]
    pub icon: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
    #[arg(long)]
    pub currency: Option<String>,
}

#[derive(Args, Debug)]
pub struct PresetArgs {
    /// Preset group name; omit to list the groups.
    pub group: Option<String>,
    /// Only add these subcategories.
    #[arg(long = "only", num_args = 1..)]
    pub only: Vec<String>,
    /// Month whose income scales the suggested limits.
    #[arg(long)]
    pub month: Option<MonthKey>,
}

#[derive(Args, Debug)]
pub struct CategoryRefArgs {
    /// Category name or id.
    pub category: String,
}

#[derive(Args, Debug)]
pub struct CategoryBucketArgs {
    pub category: String,
    pub bucket: Bucket,
}

#[derive(Args, Debug)]
pub struct Allocation {
    #[command(subcommand)]
    pub command: AllocationCommand,
}

#[derive(Subcommand, Debug)]
pub enum AllocationCommand {
    /// Set the three percentages; they must sum to 100.
    Set(AllocationSetArgs),
    /// Back to 50/20/30.
    Reset,
}

#[derive(Args, Debug)]
pub struct AllocationSetArgs {
    pub essentials: f64,
    pub investments: f64,
    pub fun: f64,
}

#[derive(Args, Debug)]
pub struct Settings {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    Show,
    Set(SettingsSetArgs),
}

#[derive(Args, Debug, Default)]
pub struct SettingsSetArgs {
    #[arg(long)]
    pub currency: Option<String>,
    #[arg(long)]
    pub mode: Option<Mode>,
    /// Recalculate limits automatically when income or allocation change.
    #[arg(long)]
    pub auto_calc: Option<bool>,
    #[arg(long, conflicts_with = "clear_basis_month")]
    pub basis_month: Option<MonthKey>,
    /// Use the current month as basis again.
    #[arg(long)]
    pub clear_basis_month: bool,
    #[arg(long)]
    pub warning_threshold: Option<f64>,
}

#[derive(Args, Debug, Default)]
pub struct RecalcArgs {
    /// Basis month, defaults to the configured one or the current month.
    #[arg(long)]
    pub month: Option<MonthKey>,
    /// Apply the new limits instead of only showing them.
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct Rates {
    #[command(subcommand)]
    pub command: RatesCommand,
}

#[derive(Subcommand, Debug)]
pub enum RatesCommand {
    Show,
    /// Fetch new rates and cache them.
    Refresh,
}

#[derive(Args, Debug)]
pub struct Payments {
    #[command(subcommand)]
    pub command: PaymentsCommand,
}

#[derive(Subcommand, Debug)]
pub enum PaymentsCommand {
    Add(PaymentAddArgs),
    List,
    /// Turn every due payment into an expense.
    Run(PaymentRunArgs),
    Pause(IdArgs),
    Resume(IdArgs),
    Delete(IdArgs),
}

#[derive(Args, Debug)]
pub struct PaymentAddArgs {
    pub name: String,
    pub amount: f64,
    /// Category name or id.
    #[arg(long)]
    pub category: String,
    #[arg(long, default_value_t = Frequency::Monthly)]
    pub frequency: Frequency,
    /// First due date, defaults to today.
    #[arg(long, value_parser = parse_day)]
    pub start: Option<NaiveDate>,
    #[arg(long)]
    pub currency: Option<String>,
    /// Stop after this many executions.
    #[arg(long)]
    pub max: Option<u32>,
}

#[derive(Args, Debug, Default)]
pub struct PaymentRunArgs {
    /// Run as of this day instead of today.
    #[arg(long, value_parser = parse_day)]
    pub today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct IdArgs {
    pub id: String,
}

#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    pub file: PathBuf,
}

#[derive(Args, Debug, Default)]
pub struct ConfirmArgs {
    #[arg(long)]
    pub yes: bool,
}

fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_date(raw).ok_or_else(|| format!("invalid date: {raw} (expected YYYY-MM-DD or RFC 3339)"))
}

fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid day: {raw} (expected YYYY-MM-DD)"))
}
