//! Configuration structures for tally.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::categories::CategorySetting;
use crate::money::{HEADLINE_DIGITS, LINE_DIGITS};
use crate::tax::STANDARD_WHT_RATES;

/// Main configuration for tally.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    /// Tax entry configuration.
    pub tax: TaxConfig,

    /// Display formatting.
    pub display: DisplayConfig,

    /// Report defaults.
    pub report: ReportConfig,

    /// Extra or overriding cost categories.
    pub categories: Vec<CategorySetting>,
}

/// Tax entry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxConfig {
    /// Withholding-tax rates offered to users, in percent.
    pub allowed_wht_rates: Vec<Decimal>,

    /// Reject rates that are not in `allowed_wht_rates`.
    pub enforce_allowed_wht_rates: bool,
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self {
            allowed_wht_rates: STANDARD_WHT_RATES.iter().map(|r| Decimal::from(*r)).collect(),
            enforce_allowed_wht_rates: false,
        }
    }
}

impl TaxConfig {
    /// Whether `rate` may be used under this configuration.
    pub fn accepts_wht_rate(&self, rate: Decimal) -> bool {
        !self.enforce_allowed_wht_rates || self.allowed_wht_rates.contains(&rate)
    }
}

/// Display formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Currency symbol prefixed to amounts.
    pub currency_symbol: String,

    /// Fraction digits for line amounts.
    pub line_fraction_digits: u32,

    /// Fraction digits for headline totals.
    pub headline_fraction_digits: u32,

    /// Label locale: `th` or `en`.
    pub locale: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "฿".to_string(),
            line_fraction_digits: LINE_DIGITS,
            headline_fraction_digits: HEADLINE_DIGITS,
            locale: "th".to_string(),
        }
    }
}

/// Report configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output format when `--format` is not given: `json`, `csv` or `text`.
    pub default_format: String,

    /// Number of categories listed in text reports (0 = all).
    pub top_categories: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            default_format: "text".to_string(),
            top_categories: 0,
        }
    }
}

impl TallyConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
