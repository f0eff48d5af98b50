//! Currency rates: a small on-disk cache and the sources that fill it.

use std::{fs, path::PathBuf};

use chrono::{DateTime, Duration, Utc};
use engine::RateTable;
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{RATES_FILE, Result};

pub const DEFAULT_RATES_TTL_MINUTES: i64 = 60;

/// Largest relative move the mock source applies to a rate.
const JITTER: f64 = 0.05;

/// Where fresh rates come from.
pub trait RateSource {
    fn fetch(&mut self) -> Result<RateTable>;
}

/// Stand-in for a real FX feed: the supported table with every non-base
/// rate moved by up to ±5%.
#[derive(Debug)]
pub struct MockRateSource {
    rng: StdRng,
}

impl MockRateSource {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic source, for tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for MockRateSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RateSource for MockRateSource {
    fn fetch(&mut self) -> Result<RateTable> {
        let rng = &mut self.rng;
        Ok(RateTable::supported()
            .map_rates(|rate| rate.rate * rng.gen_range((1.0 - JITTER)..(1.0 + JITTER))))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedRates {
    fetched_at: DateTime<Utc>,
    rates: RateTable,
}

/// Rates cached in `rates.json` next to the snapshot.
#[derive(Debug, Clone)]
pub struct RateCache {
    path: PathBuf,
    ttl: Duration,
}

impl RateCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: dir.into().join(RATES_FILE),
            ttl,
        }
    }

    pub fn with_default_ttl(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, Duration::minutes(DEFAULT_RATES_TTL_MINUTES))
    }

    /// The cached table when it is younger than the TTL, otherwise the
    /// supported-currency table. A missing or unreadable cache is not an
    /// error.
    pub fn rates(&self, now: DateTime<Utc>) -> RateTable {
        match self.cached() {
            Some(cached) if now - cached.fetched_at < self.ttl => cached.rates,
            Some(_) => {
                tracing::debug!("cached rates expired, using defaults");
                RateTable::supported()
            }
            None => RateTable::supported(),
        }
    }

    /// When the cached rates were fetched, if there are any.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.cached().map(|cached| cached.fetched_at)
    }

    pub fn store(&self, rates: &RateTable, now: DateTime<Utc>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(&CachedRates {
            fetched_at: now,
            rates: rates.clone(),
        })?;
        fs::write(&self.path, payload)?;
        Ok(())
    }

    /// Fetches from `source` and caches the result.
    pub fn refresh(&self, source: &mut dyn RateSource, now: DateTime<Utc>) -> Result<RateTable> {
        let rates = source.fetch()?;
        self.store(&rates, now)?;
        tracing::info!("refreshed {} currency rates", rates.len());
        Ok(rates)
    }

    fn cached(&self) -> Option<CachedRates> {
        let content = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&content) {
            Ok(cached) => Some(cached),
            Err(err) => {
                tracing::warn!("ignoring unreadable rate cache {}: {err}", self.path.display());
                None
            }
        }
    }
}
