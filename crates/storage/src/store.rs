use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{SubsecRound, Utc};
use engine::{EngineError, Snapshot, migrate_snapshot};
use serde_json::Value;

use crate::{RATES_FILE, Result, SNAPSHOT_FILE};

/// Load/save/export/import/clear of the whole snapshot.
pub trait SnapshotStore {
    /// The persisted snapshot, migrated to the current version, or the
    /// bootstrap snapshot when nothing has been saved yet.
    fn load(&self) -> Result<Snapshot>;

    /// Persists `snapshot` with `last_updated` set to now and returns the
    /// stored value.
    fn save(&mut self, snapshot: Snapshot) -> Result<Snapshot>;

    /// Forgets everything that was persisted.
    fn clear(&mut self) -> Result<()>;

    /// The current snapshot as pretty-printed JSON.
    fn export(&self) -> Result<String> {
        let snapshot = self.load()?;
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    /// Replaces the stored snapshot with `payload`.
    ///
    /// Nothing is written unless the payload passes [`validate_import`].
    fn import(&mut self, payload: &str) -> Result<Snapshot> {
        let snapshot = match validate_import(payload) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!("import rejected: {err}");
                return Err(err);
            }
        };
        let stored = self.save(snapshot)?;
        tracing::info!(
            "imported {} income, {} expenses, {} categories",
            stored.income.len(),
            stored.expenses.len(),
            stored.categories.len()
        );
        Ok(stored)
    }
}

/// Checks that `payload` is a JSON object with `income` and `expenses`
/// arrays and migrates it to a [`Snapshot`].
pub fn validate_import(payload: &str) -> Result<Snapshot> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|err| EngineError::ImportFormat(format!("payload is not JSON: {err}")))?;
    for key in ["income", "expenses"] {
        if !value.get(key).is_some_and(Value::is_array) {
            return Err(EngineError::ImportFormat(format!("missing `{key}` array")).into());
        }
    }
    let snapshot = migrate_snapshot(value).map_err(|err| match err {
        EngineError::Json(err) => EngineError::ImportFormat(err.to_string()),
        other => other,
    })?;
    Ok(snapshot)
}

fn stamp(snapshot: Snapshot) -> Snapshot {
    // Millisecond precision is what the JSON form keeps.
    snapshot.touched(Utc::now().trunc_subsecs(3))
}

/// Stores the snapshot as `snapshot.json` inside a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE)
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Snapshot> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no snapshot at {}, starting fresh", path.display());
                return Ok(Snapshot::bootstrap());
            }
            Err(err) => return Err(err.into()),
        };
        let value: Value = serde_json::from_str(&content)?;
        Ok(migrate_snapshot(value)?)
    }

    fn save(&mut self, snapshot: Snapshot) -> Result<Snapshot> {
        fs::create_dir_all(&self.dir)?;
        let snapshot = stamp(snapshot);
        let payload = serde_json::to_string_pretty(&snapshot)?;
        fs::write(self.path(), payload)?;
        tracing::debug!("snapshot saved to {}", self.path().display());
        Ok(snapshot)
    }

    fn clear(&mut self) -> Result<()> {
        for file in [SNAPSHOT_FILE, RATES_FILE] {
            match fs::remove_file(self.dir.join(file)) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        tracing::info!("cleared data in {}", self.dir.display());
        Ok(())
    }
}

/// Keeps the snapshot in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Option<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
        }
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Snapshot> {
        Ok(self.snapshot.clone().unwrap_or_else(Snapshot::bootstrap))
    }

    fn save(&mut self, snapshot: Snapshot) -> Result<Snapshot> {
        let snapshot = stamp(snapshot);
        self.snapshot = Some(snapshot.clone());
        Ok(snapshot)
    }

    fn clear(&mut self) -> Result<()> {
        self.snapshot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use engine::{NewIncome, parse_date};

    use super::*;
    use crate::StorageError;

    #[test]
    fn import_requires_both_arrays() {
        for payload in [
            r#"{"income":[],"categories":[]}"#,
            r#"{"income":{},"expenses":[]}"#,
            r#"[1, 2]"#,
            "not json",
        ] {
            let err = validate_import(payload).unwrap_err();
            assert!(
                matches!(err, StorageError::Engine(EngineError::ImportFormat(_))),
                "{payload}: {err}"
            );
        }
    }

    #[test]
    fn import_accepts_minimal_payload() {
        let snapshot = validate_import(r#"{"income":[],"expenses":[]}"#).unwrap();
        assert_eq!(snapshot.categories.len(), 10);
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load().unwrap().categories.len(), 10);

        let date = parse_date("2024-06-01").unwrap();
        let (snapshot, _) = Snapshot::bootstrap()
            .add_income(NewIncome::new(100.0, "EUR", date))
            .unwrap();
        let saved = store.save(snapshot).unwrap();
        assert_eq!(store.load().unwrap(), saved);

        let exported = store.export().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().income.is_empty());

        let imported = store.import(&exported).unwrap();
        assert_eq!(imported.income, saved.income);
    }
}
