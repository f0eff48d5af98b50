//! Income and expense records.
//!
//! Both records carry a strictly positive amount in their own currency and
//! a UTC timestamp. Conversion to a reporting currency happens only inside
//! the aggregation functions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single income record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    pub id: String,
    pub amount: f64,
    pub currency: String,
    #[serde(with = "iso_date")]
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A single expense record.
///
/// `category_id` is a soft reference: the category may have been deleted
/// since, in which case the expense is reported under "Other".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub category_id: String,
    pub amount: f64,
    pub currency: String,
    #[serde(with = "iso_date")]
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Records that carry an amount, a currency and a date.
pub trait Dated {
    fn date(&self) -> DateTime<Utc>;
    fn amount(&self) -> f64;
    fn currency(&self) -> &str;
}

impl Dated for Income {
    fn date(&self) -> DateTime<Utc> {
        self.date
    }

    fn amount(&self) -> f64 {
        self.amount
    }

    fn currency(&self) -> &str {
        &self.currency
    }
}

impl Dated for Expense {
    fn date(&self) -> DateTime<Utc> {
        self.date
    }

    fn amount(&self) -> f64 {
        self.amount
    }

    fn currency(&self) -> &str {
        &self.currency
    }
}

/// Parses an ISO-8601 date: either a full RFC 3339 timestamp or a bare
/// `YYYY-MM-DD`, which is read as midnight UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub(crate) mod iso_date {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn parse_date_accepts_both_shapes() {
        let full = parse_date("2024-06-15T10:30:00.000Z").unwrap();
        assert_eq!(full, Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap());

        let offset = parse_date("2024-06-15T12:30:00+02:00").unwrap();
        assert_eq!(offset, full);

        let day = parse_date("2024-06-15").unwrap();
        assert_eq!(day, Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap());

        assert!(parse_date("15/06/2024").is_none());
    }

    #[test]
    fn expense_json_shape() {
        let json = r#"{
            "id": "e1",
            "categoryId": "1",
            "amount": 12.5,
            "currency": "EUR",
            "date": "2024-06-01"
        }"#;
        let expense: Expense = serde_json::from_str(json).unwrap();
        assert_eq!(expense.category_id, "1");
        assert!(expense.description.is_none());

        let back = serde_json::to_value(&expense).unwrap();
        assert_eq!(back["categoryId"], "1");
        assert_eq!(back["date"], "2024-06-01T00:00:00.000Z");
        assert!(back.get("description").is_none());
    }
}
