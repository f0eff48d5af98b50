//! Persistence for budget snapshots and currency rates.
//!
//! The engine never touches storage itself: a host loads a snapshot through
//! a [`SnapshotStore`], hands it to the engine and saves what comes back.

pub use error::{Result, StorageError};
pub use rates::{DEFAULT_RATES_TTL_MINUTES, MockRateSource, RateCache, RateSource};
pub use store::{JsonFileStore, MemoryStore, SnapshotStore, validate_import};

mod error;
mod rates;
mod store;

pub(crate) const SNAPSHOT_FILE: &str = "snapshot.json";
pub(crate) const RATES_FILE: &str = "rates.json";
