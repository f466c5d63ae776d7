//! Currency rate table and the rate-source contract

use std::collections::{BTreeMap, HashMap};
use serde::{Serialize, Deserialize};
use crate::ConversionError;
use tally_core::format_fixed;
use tracing::{debug, warn};

/// Fractional digits shown for currency amounts and rates
pub const CURRENCY_DECIMALS: u32 = 4;

/// Base currency of the built-in table
pub const BASE_CURRENCY: &str = "CNY";

/// Source of a fresh rate table
///
/// Rates are "units of this currency per one unit of the base currency".
pub trait RateSource {
    fn fetch(&self) -> Result<HashMap<String, f64>, ConversionError>;
}

/// A rate source that always returns the same table
#[derive(Debug, Clone, Default)]
pub struct StaticRateSource {
    rates: HashMap<String, f64>,
}

impl StaticRateSource {
    pub fn new(rates: HashMap<String, f64>) -> Self {
        StaticRateSource { rates }
    }
}

impl RateSource for StaticRateSource {
    fn fetch(&self) -> Result<HashMap<String, f64>, ConversionError> {
        Ok(self.rates.clone())
    }
}

/// Exchange rates relative to a base currency (rate 1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRates {
    base: String,
    rates: BTreeMap<String, f64>,
    /// Number of successful refreshes applied
    revision: u64,
}

impl CurrencyRates {
    /// The built-in CNY-based table
    pub fn builtin() -> Self {
        let rates = [
            (BASE_CURRENCY, 1.0),
            ("USD", 0.14),
            ("EUR", 0.13),
            ("GBP", 0.11),
            ("JPY", 15.5),
        ];
        CurrencyRates {
            base: BASE_CURRENCY.to_string(),
            rates: rates.iter().map(|(c, r)| (c.to_string(), *r)).collect(),
            revision: 0,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn codes(&self) -> Vec<&str> {
        self.rates.keys().map(|c| c.as_str()).collect()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(&normalize(code))
    }

    pub fn rate(&self, code: &str) -> Result<f64, ConversionError> {
        self.rates
            .get(&normalize(code))
            .copied()
            .ok_or_else(|| ConversionError::UnknownUnit(code.trim().to_string()))
    }

    /// Set (or add) a single rate; the base currency stays at 1
    pub fn set_rate(&mut self, code: &str, rate: f64) -> Result<(), ConversionError> {
        let code = normalize(code);
        if code.is_empty() {
            return Err(ConversionError::UnknownUnit(code));
        }
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ConversionError::InvalidScale { symbol: code, scale: rate });
        }
        if code == self.base {
            return Err(ConversionError::PivotLocked(code));
        }
        self.rates.insert(code, rate);
        Ok(())
    }

    /// `value * rate(to) / rate(from)`
    pub fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64, ConversionError> {
        let from_rate = self.rate(from)?;
        let to_rate = self.rate(to)?;
        if !value.is_finite() {
            return Err(ConversionError::NonFinite);
        }
        Ok(value * to_rate / from_rate)
    }

    /// "1 FROM = r TO" with the rate at currency precision
    pub fn rate_display(&self, from: &str, to: &str) -> Result<String, ConversionError> {
        let rate = self.convert(1.0, from, to)?;
        Ok(format!(
            "1 {} = {} {}",
            normalize(from),
            format_fixed(rate, CURRENCY_DECIMALS),
            normalize(to)
        ))
    }

    /// Replace the whole table with validated rates
    ///
    /// The base currency is added at rate 1 when absent; a table that
    /// prices the base at anything else is rejected.
    pub fn replace(&mut self, rates: HashMap<String, f64>) -> Result<(), ConversionError> {
        let mut table = BTreeMap::new();
        for (code, rate) in rates {
            let code = normalize(&code);
            if !rate.is_finite() || rate <= 0.0 {
                return Err(ConversionError::InvalidScale { symbol: code, scale: rate });
            }
            if code == self.base && rate != 1.0 {
                return Err(ConversionError::DuplicatePivot(code));
            }
            table.insert(code, rate);
        }
        table.insert(self.base.clone(), 1.0);
        self.rates = table;
        self.revision += 1;
        Ok(())
    }

    /// Pull a new table from the source
    ///
    /// The latest successful fetch wins. On failure the current table is
    /// kept and the failure is logged; returns whether rates changed.
    pub fn refresh(&mut self, source: &dyn RateSource) -> bool {
        match source.fetch().and_then(|rates| self.replace(rates)) {
            Ok(()) => {
                debug!(revision = self.revision, currencies = self.rates.len(), "exchange rates refreshed");
                true
            }
            Err(e) => {
                warn!(error = %e, "exchange rate refresh failed, keeping previous rates");
                false
            }
        }
    }
}

impl Default for CurrencyRates {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSource;

    impl RateSource for FailingSource {
        fn fetch(&self) -> Result<HashMap<String, f64>, ConversionError> {
            Err(ConversionError::RatesUnavailable("offline".into()))
        }
    }

    #[test]
    fn test_convert_via_rates() {
        let rates = CurrencyRates::builtin();
        assert!((rates.convert(100.0, "CNY", "USD").unwrap() - 14.0).abs() < 1e-9);
        let eur = rates.convert(1.0, "usd", "eur").unwrap();
        assert!((eur - 0.13 / 0.14).abs() < 1e-12);
    }

    #[test]
    fn test_rate_display() {
        let rates = CurrencyRates::builtin();
        assert_eq!(rates.rate_display("USD", "EUR").unwrap(), "1 USD = 0.9286 EUR");
        assert_eq!(rates.rate_display("CNY", "JPY").unwrap(), "1 CNY = 15.5000 JPY");
    }

    #[test]
    fn test_unknown_currency() {
        let rates = CurrencyRates::builtin();
        assert_eq!(rates.convert(1.0, "CNY", "XXX"), Err(ConversionError::UnknownUnit("XXX".into())));
    }

    #[test]
    fn test_refresh_latest_wins() {
        let mut rates = CurrencyRates::builtin();
        let first = StaticRateSource::new(HashMap::from([("USD".to_string(), 0.15)]));
        let second = StaticRateSource::new(HashMap::from([("usd".to_string(), 0.16), ("CHF".to_string(), 0.12)]));
        assert!(rates.refresh(&first));
        assert!(rates.refresh(&second));
        assert_eq!(rates.rate("USD").unwrap(), 0.16);
        assert_eq!(rates.rate("CNY").unwrap(), 1.0);
        assert!(rates.contains("CHF"));
        assert!(!rates.contains("EUR"));
        assert_eq!(rates.revision(), 2);
    }

    #[test]
    fn test_refresh_failure_keeps_rates() {
        let mut rates = CurrencyRates::builtin();
        let before = rates.clone();
        assert!(!rates.refresh(&FailingSource));
        assert_eq!(rates, before);

        let bad = StaticRateSource::new(HashMap::from([("USD".to_string(), -1.0)]));
        assert!(!rates.refresh(&bad));
        assert_eq!(rates, before);
    }

    #[test]
    fn test_set_rate() {
        let mut rates = CurrencyRates::builtin();
        rates.set_rate("krw", 190.0).unwrap();
        assert_eq!(rates.rate("KRW").unwrap(), 190.0);
        assert!(rates.set_rate("CNY", 2.0).is_err());
        assert!(rates.set_rate("USD", 0.0).is_err());
    }
}
