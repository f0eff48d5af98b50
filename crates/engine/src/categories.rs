//! Spending categories and the allocation buckets they belong to.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Label used for expenses whose category no longer exists.
pub const OTHER_LABEL: &str = "Other";

/// Id of the synthetic row collecting spend on dangling category ids.
pub const OTHER_CATEGORY_ID: &str = "other";

/// One of the three percentage buckets income is split into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    #[default]
    Essentials,
    Investments,
    Fun,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Essentials, Bucket::Investments, Bucket::Fun];

    pub const fn as_str(self) -> &'static str {
        match self {
            Bucket::Essentials => "essentials",
            Bucket::Investments => "investments",
            Bucket::Fun => "fun",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bucket {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "essentials" => Ok(Bucket::Essentials),
            "investments" => Ok(Bucket::Investments),
            "fun" => Ok(Bucket::Fun),
            other => Err(EngineError::Validation(format!("unknown bucket: {other}"))),
        }
    }
}

/// A spending category.
///
/// `icon` is a stable string key; resolving it to something drawable is the
/// presentation layer's job. `limit` is the monthly spending limit expressed
/// in `currency`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub limit: f64,
    pub currency: String,
    #[serde(default, alias = "allocation")]
    pub allocation_bucket: Bucket,
}

impl Category {
    /// The row used to report spend on categories that were deleted.
    pub fn other(currency: &str) -> Self {
        Self {
            id: OTHER_CATEGORY_ID.to_string(),
            name: OTHER_LABEL.to_string(),
            icon: "MoreHorizontal".to_string(),
            color: "#6B7280".to_string(),
            limit: 0.0,
            currency: currency.to_string(),
            allocation_bucket: Bucket::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_defaults_to_essentials_when_missing() {
        let json = r##"{
            "id": "1",
            "name": "Groceries",
            "icon": "ShoppingCart",
            "color": "#22C55E",
            "limit": 400,
            "currency": "EUR"
        }"##;
        let category: Category = serde_json::from_str(json).unwrap();
        assert_eq!(category.allocation_bucket, Bucket::Essentials);
    }

    #[test]
    fn legacy_allocation_field_is_accepted() {
        let json = r##"{
            "id": "4",
            "name": "Entertainment",
            "icon": "Film",
            "color": "#EF4444",
            "limit": 200,
            "currency": "EUR",
            "allocation": "fun"
        }"##;
        let category: Category = serde_json::from_str(json).unwrap();
        assert_eq!(category.allocation_bucket, Bucket::Fun);

        let back = serde_json::to_value(&category).unwrap();
        assert_eq!(back["allocationBucket"], "fun");
    }

    #[test]
    fn bucket_from_str() {
        assert_eq!("Investments".parse::<Bucket>().unwrap(), Bucket::Investments);
        assert!("savings".parse::<Bucket>().is_err());
    }
}
