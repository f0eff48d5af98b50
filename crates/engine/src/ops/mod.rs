//! Ledger operations on a [`Snapshot`].
//!
//! Every operation borrows the snapshot and returns a new one; on error the
//! input is left exactly as it was, so the caller can keep using it.

use crate::{EngineError, ResultEngine};

mod categories;
mod expenses;
mod income;
mod recurring;
mod settings;

pub use recurring::DueRun;

/// Position of the record with `id`, or `KeyNotFound` labeled with `label`.
fn position_by_id<T>(
    items: &[T],
    id: &str,
    label: &str,
    id_of: impl Fn(&T) -> &str,
) -> ResultEngine<usize> {
    items
        .iter()
        .position(|item| id_of(item) == id)
        .ok_or_else(|| EngineError::KeyNotFound(format!("{label} {id}")))
}
