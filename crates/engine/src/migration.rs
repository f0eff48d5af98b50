//! Upgrades persisted snapshots to the current schema.
//!
//! Documents written before snapshots carried a `version` field are
//! version 0. They may miss whole collections, carry the category bucket
//! under `allocation` and hold settings with missing or malformed fields.
//! Version 0 is rebuilt field by field; the current version is read as is.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{
    BudgetAllocation, EngineError, MonthKey, ResultEngine, Settings, Snapshot,
    presets::default_categories, settings::Mode, snapshot::SNAPSHOT_VERSION,
    transactions::parse_date,
};

/// Settings keys that only the old web front end used.
const DROPPED_SETTINGS: &[&str] = &["theme", "notifications"];

/// Reads `value` as a snapshot of any supported version.
pub fn migrate_snapshot(value: Value) -> ResultEngine<Snapshot> {
    let Value::Object(document) = value else {
        return Err(EngineError::ImportFormat(
            "snapshot must be a JSON object".to_string(),
        ));
    };

    let version = match document.get("version") {
        None => 0,
        Some(raw) => raw
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| EngineError::ImportFormat(format!("invalid snapshot version {raw}")))?,
    };

    match version {
        0 => migrate_v0(document),
        SNAPSHOT_VERSION => Ok(serde_json::from_value(Value::Object(document))?),
        other => Err(EngineError::ImportFormat(format!(
            "unsupported snapshot version {other}, newest known is {SNAPSHOT_VERSION}"
        ))),
    }
}

fn migrate_v0(mut document: Map<String, Value>) -> ResultEngine<Snapshot> {
    tracing::info!("migrating unversioned snapshot to version {SNAPSHOT_VERSION}");

    let settings = migrate_settings(document.remove("settings"));

    let categories = match document.remove("categories") {
        Some(Value::Array(items)) => {
            let items = items
                .into_iter()
                .map(|item| migrate_category(item, &settings.default_currency))
                .collect();
            serde_json::from_value(Value::Array(items))?
        }
        Some(other) => {
            tracing::warn!("categories is {}, using defaults", kind_of(&other));
            default_categories()
        }
        None => default_categories(),
    };

    let last_updated = document
        .get("lastUpdated")
        .and_then(Value::as_str)
        .and_then(parse_date)
        .unwrap_or_else(Utc::now);

    Ok(Snapshot {
        version: SNAPSHOT_VERSION,
        income: collection(&mut document, "income")?,
        expenses: collection(&mut document, "expenses")?,
        categories,
        settings,
        recurring_payments: collection(&mut document, "recurringPayments")?,
        last_updated,
    })
}

/// A missing or non-array collection reads as empty. Items inside a
/// present array must be well formed.
fn collection<T: DeserializeOwned>(
    document: &mut Map<String, Value>,
    key: &str,
) -> ResultEngine<Vec<T>> {
    match document.remove(key) {
        Some(value @ Value::Array(_)) => Ok(serde_json::from_value(value)?),
        Some(other) => {
            tracing::warn!("{key} is {}, using an empty list", kind_of(&other));
            Ok(Vec::new())
        }
        None => Ok(Vec::new()),
    }
}

fn migrate_category(item: Value, currency: &str) -> Value {
    let Value::Object(mut fields) = item else {
        return item;
    };
    if let Some(bucket) = fields.remove("allocation") {
        fields.entry("allocationBucket").or_insert(bucket);
    }
    fields
        .entry("currency")
        .or_insert_with(|| Value::String(currency.to_string()));
    fields
        .entry("icon")
        .or_insert_with(|| Value::String("Tag".to_string()));
    fields
        .entry("color")
        .or_insert_with(|| Value::String("blue".to_string()));
    fields.entry("limit").or_insert_with(|| Value::from(0.0));
    Value::Object(fields)
}

fn migrate_settings(raw: Option<Value>) -> Settings {
    let defaults = Settings::default();
    let mut fields = match raw {
        Some(Value::Object(fields)) => fields,
        Some(other) => {
            tracing::warn!("settings is {}, using defaults", kind_of(&other));
            return defaults;
        }
        None => return defaults,
    };
    for key in DROPPED_SETTINGS {
        fields.remove(*key);
    }

    Settings {
        default_currency: field(&mut fields, "defaultCurrency", defaults.default_currency, |v| {
            v.as_str()
                .map(|code| code.trim().to_ascii_uppercase())
                .filter(|code| !code.is_empty())
        }),
        mode: field(&mut fields, "mode", defaults.mode, |v| {
            v.as_str().and_then(|s| s.parse::<Mode>().ok())
        }),
        budget_allocation: field(
            &mut fields,
            "budgetAllocation",
            defaults.budget_allocation,
            |v| serde_json::from_value::<BudgetAllocation>(v.clone()).ok(),
        ),
        custom_allocation: field(
            &mut fields,
            "customAllocation",
            defaults.custom_allocation,
            Value::as_bool,
        ),
        auto_calc_limits: field(
            &mut fields,
            "autoCalcLimits",
            defaults.auto_calc_limits,
            Value::as_bool,
        ),
        budget_basis_month: field(
            &mut fields,
            "budgetBasisMonth",
            defaults.budget_basis_month,
            |v| v.as_str().and_then(|s| s.parse::<MonthKey>().ok()).map(Some),
        ),
        warning_threshold: field(
            &mut fields,
            "warningThreshold",
            defaults.warning_threshold,
            |v| v.as_f64().filter(|t| t.is_finite() && *t > 0.0),
        ),
    }
}

/// Reads one settings field. Absent and `null` take the default silently,
/// anything that does not parse takes it with a warning.
fn field<T>(
    fields: &mut Map<String, Value>,
    key: &str,
    default: T,
    parse: impl FnOnce(&Value) -> Option<T>,
) -> T {
    match fields.remove(key) {
        None | Some(Value::Null) => default,
        Some(value) => parse(&value).unwrap_or_else(|| {
            tracing::warn!("settings.{key} has malformed value {value}, using default");
            default
        }),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::Bucket;

    use super::*;

    #[test]
    fn empty_v0_document_gets_defaults() {
        let snapshot = migrate_snapshot(json!({})).unwrap();
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert!(snapshot.income.is_empty());
        assert!(snapshot.expenses.is_empty());
        assert_eq!(snapshot.categories, default_categories());
        assert_eq!(snapshot.settings, Settings::default());
    }

    #[test]
    fn settings_are_merged_field_by_field() {
        let snapshot = migrate_snapshot(json!({
            "income": [],
            "expenses": [],
            "settings": {
                "defaultCurrency": "usd",
                "mode": "turbo",
                "customAllocation": true,
                "budgetAllocation": {"essentials": 60, "investments": 10, "fun": 30},
                "budgetBasisMonth": "2024-13",
                "theme": "dark",
                "notifications": true
            }
        }))
        .unwrap();

        let settings = snapshot.settings;
        assert_eq!(settings.default_currency, "USD");
        assert_eq!(settings.mode, Mode::Simple);
        assert!(settings.custom_allocation);
        assert_eq!(settings.budget_allocation, BudgetAllocation::new(60.0, 10.0, 30.0));
        assert!(settings.budget_basis_month.is_none());
        assert!(!settings.auto_calc_limits);
    }

    #[test]
    fn category_allocation_is_renamed() {
        let snapshot = migrate_snapshot(json!({
            "income": [],
            "expenses": [{
                "id": "e1",
                "categoryId": "c1",
                "amount": 12.5,
                "currency": "EUR",
                "date": "2024-06-01T10:00:00.000Z"
            }],
            "categories": [
                {
                    "id": "c1",
                    "name": "Travel",
                    "icon": "Plane",
                    "color": "teal",
                    "limit": 100,
                    "allocation": "fun"
                },
                {"id": "c2", "name": "Rent", "limit": 900}
            ],
            "lastUpdated": "2024-06-02T00:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(snapshot.categories[0].allocation_bucket, Bucket::Fun);
        assert_eq!(snapshot.categories[0].currency, "EUR");
        assert_eq!(snapshot.categories[1].allocation_bucket, Bucket::Essentials);
        assert_eq!(snapshot.categories[1].icon, "Tag");
        assert_eq!(snapshot.expenses.len(), 1);
        assert_eq!(snapshot.last_updated.to_rfc3339(), "2024-06-02T00:00:00+00:00");
    }

    #[test]
    fn current_version_round_trips() {
        let at = parse_date("2024-06-02T08:30:00.250Z").unwrap();
        let snapshot = Snapshot::bootstrap().touched(at);
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(migrate_snapshot(value).unwrap(), snapshot);
    }

    #[test]
    fn rejects_unknown_versions_and_non_objects() {
        assert!(matches!(
            migrate_snapshot(json!({"version": 99})),
            Err(EngineError::ImportFormat(_))
        ));
        assert!(matches!(
            migrate_snapshot(json!([])),
            Err(EngineError::ImportFormat(_))
        ));
    }
}
