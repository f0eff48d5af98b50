//! Internal helpers for validation and name normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation logic so every ledger operation enforces the same invariants.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Fresh record id.
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Amounts must be finite and strictly positive.
pub(crate) fn validate_amount(amount: f64, label: &str) -> ResultEngine<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(EngineError::Validation(format!(
            "{label} amount must be > 0, got {amount}"
        )));
    }
    Ok(())
}

/// Limits must be finite and non-negative.
pub(crate) fn validate_limit(limit: f64) -> ResultEngine<()> {
    if !limit.is_finite() || limit < 0.0 {
        return Err(EngineError::Validation(format!(
            "category limit must be >= 0, got {limit}"
        )));
    }
    Ok(())
}

pub(crate) fn normalize_currency(code: &str) -> ResultEngine<String> {
    let code = code.trim().to_ascii_uppercase();
    if code.is_empty() {
        return Err(EngineError::Validation(
            "currency must not be empty".to_string(),
        ));
    }
    Ok(code)
}

/// Trims and collapses inner whitespace; rejects empty names.
pub(crate) fn normalize_display(value: &str, label: &str) -> ResultEngine<String> {
    let out = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if out.is_empty() {
        return Err(EngineError::Validation(format!(
            "{label} must not be empty"
        )));
    }
    Ok(out)
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Comparison key for names: lowercase, accents stripped, punctuation
/// collapsed to single spaces. `"Café  & Bar"` and `"cafe bar"` share a key.
pub(crate) fn normalize_key(value: &str) -> String {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in value.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    out.trim_end().to_string()
}
