use serde::{Deserialize, Serialize};

/// Code of the base currency. Every rate in a [`RateTable`] is expressed as
/// units of the currency per one unit of `BASE_CURRENCY`.
pub const BASE_CURRENCY: &str = "EUR";

/// One row of the exchange-rate table.
///
/// `rate` is how many units of `code` buy one unit of the base currency, so
/// the base currency itself always has `rate = 1`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRate {
    pub code: String,
    pub name: String,
    pub rate: f64,
    pub symbol: String,
}

impl CurrencyRate {
    pub fn new(code: &str, name: &str, rate: f64, symbol: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            rate,
            symbol: symbol.to_string(),
        }
    }
}

/// Exchange-rate table injected into every conversion.
///
/// The engine never fetches rates; the caller owns the table and passes it
/// by reference.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateTable {
    rates: Vec<CurrencyRate>,
}

impl RateTable {
    pub fn new(rates: Vec<CurrencyRate>) -> Self {
        Self { rates }
    }

    /// The currencies the dashboard ships with, relative to EUR.
    pub fn supported() -> Self {
        Self::new(vec![
            CurrencyRate::new("EUR", "Euro", 1.0, "€"),
            CurrencyRate::new("USD", "US Dollar", 1.1, "$"),
            CurrencyRate::new("GBP", "British Pound", 0.85, "£"),
            CurrencyRate::new("JPY", "Japanese Yen", 130.0, "¥"),
            CurrencyRate::new("CAD", "Canadian Dollar", 1.45, "C$"),
            CurrencyRate::new("AUD", "Australian Dollar", 1.65, "A$"),
            CurrencyRate::new("CHF", "Swiss Franc", 0.95, "CHF"),
        ])
    }

    pub fn get(&self, code: &str) -> Option<&CurrencyRate> {
        self.rates.iter().find(|rate| rate.code == code)
    }

    /// Rate for `code`, falling back to `1.0` when the code is unknown or
    /// its rate is not a positive finite number.
    pub fn rate(&self, code: &str) -> f64 {
        match self.get(code) {
            Some(rate) if rate.rate.is_finite() && rate.rate > 0.0 => rate.rate,
            Some(_) | None => {
                tracing::debug!("no usable rate for currency {code}, assuming 1");
                1.0
            }
        }
    }

    /// Display symbol for `code`, or the code itself when unknown.
    pub fn symbol<'a>(&'a self, code: &'a str) -> &'a str {
        self.get(code).map_or(code, |rate| rate.symbol.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CurrencyRate> {
        self.rates.iter()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Returns a copy of the table with every rate passed through `f`.
    ///
    /// The base currency is left at `1.0`.
    pub fn map_rates(&self, mut f: impl FnMut(&CurrencyRate) -> f64) -> Self {
        let rates = self
            .rates
            .iter()
            .map(|rate| {
                let mut next = rate.clone();
                if rate.code != BASE_CURRENCY {
                    next.rate = f(rate);
                }
                next
            })
            .collect();
        Self { rates }
    }
}

impl From<Vec<CurrencyRate>> for RateTable {
    fn from(rates: Vec<CurrencyRate>) -> Self {
        Self::new(rates)
    }
}

/// Converts `amount` from `from` to `to` going through the base currency.
///
/// Unknown codes and unusable rates are treated as rate `1`. No rounding is applied.
pub fn convert(amount: f64, from: &str, to: &str, rates: &RateTable) -> f64 {
    if from == to {
        return amount;
    }
    let base_amount = amount / rates.rate(from);
    base_amount * rates.rate(to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_through_base() {
        let rates = RateTable::supported();
        assert!((convert(110.0, "USD", "EUR", &rates) - 100.0).abs() < 1e-9);
        assert!((convert(100.0, "EUR", "GBP", &rates) - 85.0).abs() < 1e-9);
        assert!((convert(1.1, "USD", "GBP", &rates) - 0.85).abs() < 1e-9);
    }

    #[test]
    fn same_currency_is_identity() {
        let rates = RateTable::default();
        assert_eq!(convert(42.5, "USD", "USD", &rates), 42.5);
    }

    #[test]
    fn unknown_code_falls_back_to_one() {
        let rates = RateTable::supported();
        assert_eq!(convert(10.0, "XYZ", "EUR", &rates), 10.0);
        assert!((convert(10.0, "XYZ", "USD", &rates) - 11.0).abs() < 1e-9);
    }

    #[test]
    fn unusable_rate_falls_back_to_one() {
        let rates = RateTable::new(vec![
            CurrencyRate::new("EUR", "Euro", 1.0, "€"),
            CurrencyRate::new("USD", "US Dollar", 0.0, "$"),
            CurrencyRate::new("GBP", "British Pound", f64::NAN, "£"),
            CurrencyRate::new("JPY", "Japanese Yen", f64::INFINITY, "¥"),
            CurrencyRate::new("CHF", "Swiss Franc", -0.95, "CHF"),
        ]);
        assert_eq!(convert(50.0, "USD", "EUR", &rates), 50.0);
        assert_eq!(convert(50.0, "EUR", "USD", &rates), 50.0);
        assert_eq!(convert(50.0, "GBP", "EUR", &rates), 50.0);
        assert_eq!(convert(50.0, "EUR", "JPY", &rates), 50.0);
        assert_eq!(rates.rate("CHF"), 1.0);
    }

    #[test]
    fn map_rates_keeps_base() {
        let doubled = RateTable::supported().map_rates(|rate| rate.rate * 2.0);
        assert_eq!(doubled.rate("EUR"), 1.0);
        assert!((doubled.rate("USD") - 2.2).abs() < 1e-9);
    }

    #[test]
    fn symbol_falls_back_to_code() {
        let rates = RateTable::supported();
        assert_eq!(rates.symbol("GBP"), "£");
        assert_eq!(rates.symbol("SEK"), "SEK");
    }
}
