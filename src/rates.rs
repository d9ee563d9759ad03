// 💱 Exchange Rate Table - country → conversion factor
// Loaded once per process; unknown countries always convert at 1.0

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Factor applied when a country is absent from the table
const DEFAULT_RATE: f64 = 1.0;

/// Immutable country → factor lookup with a total contract: `rate` always
/// produces a factor, no matter the input.
pub struct ExchangeRates {
    rates: HashMap<String, f64>,
}

impl ExchangeRates {
    /// Load rates from a JSON object file (`{"Chile": 0.0012, ...}`).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read exchange rates file: {:?}", path.as_ref()))?;

        let rates: HashMap<String, f64> =
            serde_json::from_str(&content).context("Failed to parse exchange rates JSON")?;

        Ok(ExchangeRates { rates })
    }

    /// Build a table from an in-memory map.
    pub fn from_rates(rates: HashMap<String, f64>) -> Self {
        ExchangeRates { rates }
    }

    /// Load from file, falling back to the built-in table when the source
    /// is unavailable. The fallback is logged, never surfaced to callers.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_file(path.as_ref()) {
            Ok(rates) => rates,
            Err(err) => {
                eprintln!("⚠️  Error loading exchange rates ({err:#}); using built-in table");
                Self::fallback()
            }
        }
    }

    /// Built-in table used when the external source cannot be read.
    pub fn fallback() -> Self {
        let rates = HashMap::from([
            ("Argentina".to_string(), 0.0028),
            ("Brasil".to_string(), 0.19),
            ("Chile".to_string(), 0.0012),
            ("Colombia".to_string(), 0.00024),
            ("México".to_string(), 0.056),
            ("Perú".to_string(), 0.27),
            ("Uruguay".to_string(), 0.026),
            ("Ecuador".to_string(), 1.0),
            ("España".to_string(), 1.1),
            ("Estados Unidos".to_string(), 1.0),
        ]);
        ExchangeRates { rates }
    }

    /// Conversion factor for a country; 1.0 when the country is unknown.
    pub fn rate(&self, country: &str) -> f64 {
        self.rates.get(country).copied().unwrap_or(DEFAULT_RATE)
    }

    /// Convert a native amount to the common unit, rounded to 2 decimals.
    pub fn convert(&self, country: &str, amount: f64) -> f64 {
        (amount * self.rate(country) * 100.0).round() / 100.0
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ExchangeRates {
        ExchangeRates::from_rates(HashMap::from([
            ("Chile".to_string(), 0.0012),
            ("Argentina".to_string(), 0.0028),
        ]))
    }

    #[test]
    fn test_known_country_rate() {
        assert_eq!(table().rate("Chile"), 0.0012);
    }

    #[test]
    fn test_unknown_country_defaults_to_identity() {
        let rates = table();
        assert_eq!(rates.rate("País Inexistente"), 1.0);
        assert_eq!(rates.convert("País Inexistente", 500.0), 500.0);
    }

    #[test]
    fn test_convert_rounds_to_two_decimals() {
        let rates = table();
        assert_eq!(rates.convert("Chile", 1000.0), 1.2);
        assert_eq!(rates.convert("Argentina", 2000.0), 5.6);
        // 123.456 * 0.0012 = 0.1481472 → 0.15
        assert_eq!(rates.convert("Chile", 123.456), 0.15);
    }

    #[test]
    fn test_fallback_table_covers_known_countries() {
        let rates = ExchangeRates::fallback();
        assert_eq!(rates.rate("Chile"), 0.0012);
        assert_eq!(rates.rate("Estados Unidos"), 1.0);
        assert_eq!(rates.rate("Atlántida"), 1.0);
    }

    #[test]
    fn test_load_or_default_falls_back_on_missing_file() {
        let rates = ExchangeRates::load_or_default("/nonexistent/rates.json");
        assert_eq!(rates.rate("Chile"), 0.0012);
    }
}
