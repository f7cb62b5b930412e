//! CLI commands.

pub mod config;
pub mod event;
pub mod lead;
pub mod report;
pub mod tax;

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use console::style;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use tally_core::categories::{CategoryRegistry, Locale};
use tally_core::models::config::DisplayConfig;
use tally_core::money::{format_thai, round_display};
use tally_core::TallyConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// The requested format, else the configured default.
    pub fn resolve(requested: Option<Self>, config: &TallyConfig) -> anyhow::Result<Self> {
        match requested {
            Some(format) => Ok(format),
            None => OutputFormat::from_str(&config.report.default_format, true)
                .map_err(|e| anyhow::anyhow!("Invalid report.default_format: {}", e)),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tally")
        .join("config.json")
}

/// Load `--config`, else the default file if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<TallyConfig> {
    if let Some(path) = config_path {
        debug!("Loading config from {}", path);
        return Ok(TallyConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading config from {}", path.display());
        Ok(TallyConfig::from_file(&path)?)
    } else {
        Ok(TallyConfig::default())
    }
}

/// Category labels for the configured locale.
pub fn categories(config: &TallyConfig) -> (CategoryRegistry, Locale) {
    let locale = config.display.locale.parse::<Locale>().unwrap_or_else(|e| {
        warn!("{}, using Thai labels", e);
        Locale::default()
    });
    (CategoryRegistry::with_settings(&config.categories), locale)
}

/// Money formatting with the configured symbol and precision.
pub struct Money<'a> {
    display: &'a DisplayConfig,
}

impl<'a> Money<'a> {
    pub fn new(display: &'a DisplayConfig) -> Self {
        Self { display }
    }

    /// Line amount, e.g. `฿1,070.00`.
    pub fn line(&self, amount: Decimal) -> String {
        self.format(amount, self.display.line_fraction_digits)
    }

    /// Headline total, e.g. `฿1,070`.
    pub fn headline(&self, amount: Decimal) -> String {
        self.format(amount, self.display.headline_fraction_digits)
    }

    fn format(&self, amount: Decimal, digits: u32) -> String {
        let body = format_thai(amount.abs(), digits);
        if round_display(amount, digits) < Decimal::ZERO {
            format!("-{}{}", self.display.currency_symbol, body)
        } else {
            format!("{}{}", self.display.currency_symbol, body)
        }
    }
}

pub fn percent(value: Decimal) -> String {
    format!("{:.2}%", round_display(value, 2))
}

/// Write to `output` or stdout.
pub fn emit(output: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, output)?;
            println!(
                "{} Output written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => println!("{}", output),
    }
    Ok(())
}

pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))
}
