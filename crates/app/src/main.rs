use std::process::ExitCode;

use chrono::{Duration, Utc};
use clap::Parser;
use storage::{JsonFileStore, MockRateSource, RateCache};

use crate::{cli::Cli, commands::Context, error::Result};

mod cli;
mod commands;
mod config;
mod error;
mod render;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = config::load(&cli.global)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "budgetwise={level},engine={level},storage={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("using data directory {}", settings.data_dir);
    let now = Utc::now();
    let cache = RateCache::new(
        &settings.data_dir,
        Duration::minutes(settings.rates_ttl_minutes),
    );
    let rates = cache.rates(now);

    let mut context = Context {
        store: JsonFileStore::new(&settings.data_dir),
        cache,
        source: Box::new(MockRateSource::new()),
        rates,
        now,
        out: std::io::stdout().lock(),
    };
    context.run(cli.command)
}
