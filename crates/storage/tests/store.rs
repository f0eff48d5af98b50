use std::path::PathBuf;

use chrono::{Duration, TimeZone, Utc};
use engine::{BudgetAllocation, EngineError, NewExpense, NewIncome, RateTable, Snapshot};
use storage::{JsonFileStore, MockRateSource, RateCache, SnapshotStore, StorageError};
use uuid::Uuid;

fn test_dir() -> PathBuf {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_stores");
    root.join(Uuid::new_v4().to_string())
}

fn populated() -> Snapshot {
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    let (snapshot, _) = Snapshot::bootstrap()
        .add_income(NewIncome::new(2500.0, "EUR", at).description("Salary"))
        .unwrap();
    let (snapshot, _) = snapshot
        .add_expense(NewExpense::new("1", 84.3, "USD", at))
        .unwrap();
    snapshot
        .set_allocation(BudgetAllocation::new(55.0, 15.0, 30.0))
        .unwrap()
}

#[test]
fn missing_file_loads_bootstrap() {
    let store = JsonFileStore::new(test_dir());
    let snapshot = store.load().unwrap();
    assert!(snapshot.income.is_empty());
    assert_eq!(snapshot.categories.len(), 10);
}

#[test]
fn save_then_load() {
    let mut store = JsonFileStore::new(test_dir());
    let saved = store.save(populated()).unwrap();
    let loaded = store.load().unwrap();
    assert_eq!(loaded, saved);
    assert!(loaded.settings.custom_allocation);
    std::fs::remove_dir_all(store.dir()).unwrap();
}

#[test]
fn rejected_import_keeps_previous_snapshot() {
    let mut store = JsonFileStore::new(test_dir());
    let saved = store.save(populated()).unwrap();

    let err = store
        .import(r#"{"income":[],"categories":[]}"#)
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::Engine(EngineError::ImportFormat(_))
    ));
    assert_eq!(store.load().unwrap(), saved);
    std::fs::remove_dir_all(store.dir()).unwrap();
}

#[test]
fn export_import_between_stores() {
    let mut source = JsonFileStore::new(test_dir());
    let saved = source.save(populated()).unwrap();
    let exported = source.export().unwrap();
    assert!(exported.contains("\n  \"income\""));

    let mut target = JsonFileStore::new(test_dir());
    let imported = target.import(&exported).unwrap();
    assert_eq!(imported.income, saved.income);
    assert_eq!(imported.expenses, saved.expenses);
    assert_eq!(imported.settings, saved.settings);
    assert_eq!(target.load().unwrap(), imported);

    std::fs::remove_dir_all(source.dir()).unwrap();
    std::fs::remove_dir_all(target.dir()).unwrap();
}

#[test]
fn legacy_file_is_migrated_on_load() {
    let dir = test_dir();
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("snapshot.json"),
        r#"{
            "income": [{"id": "i1", "amount": 1000, "currency": "EUR", "date": "2024-05-01"}],
            "expenses": [],
            "settings": {"defaultCurrency": "GBP", "theme": "dark"},
            "lastUpdated": "2024-05-02T10:00:00.000Z"
        }"#,
    )
    .unwrap();

    let store = JsonFileStore::new(&dir);
    let snapshot = store.load().unwrap();
    assert_eq!(snapshot.version, engine::SNAPSHOT_VERSION);
    assert_eq!(snapshot.settings.default_currency, "GBP");
    assert_eq!(snapshot.income.len(), 1);
    assert_eq!(snapshot.categories.len(), 10);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn clear_removes_snapshot_and_rates() {
    let dir = test_dir();
    let mut store = JsonFileStore::new(&dir);
    store.save(populated()).unwrap();
    let cache = RateCache::with_default_ttl(&dir);
    cache.store(&RateTable::supported(), Utc::now()).unwrap();

    store.clear().unwrap();
    assert!(!store.path().exists());
    assert!(cache.fetched_at().is_none());
    assert!(store.load().unwrap().income.is_empty());
    // Clearing twice is fine.
    store.clear().unwrap();
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn rate_cache_respects_ttl() {
    let dir = test_dir();
    let cache = RateCache::new(&dir, Duration::minutes(60));
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    assert_eq!(cache.rates(now), RateTable::supported());

    let refreshed = cache
        .refresh(&mut MockRateSource::seeded(42), now)
        .unwrap();
    assert_ne!(refreshed, RateTable::supported());
    assert_eq!(cache.rates(now + Duration::minutes(59)), refreshed);
    assert_eq!(cache.rates(now + Duration::minutes(61)), RateTable::supported());
    assert_eq!(cache.fetched_at(), Some(now));
    std::fs::remove_dir_all(&dir).unwrap();
}
