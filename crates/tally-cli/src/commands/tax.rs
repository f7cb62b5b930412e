//! Tax command - compute VAT and withholding tax for one amount.

use std::str::FromStr;

use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use tally_core::tax::{compute_tax, TaxBreakdown, VatMode};

use super::{load_config, Money, OutputFormat};

/// Arguments for the tax command.
#[derive(Args)]
pub struct TaxArgs {
    /// Amount as entered
    #[arg(required = true, allow_hyphen_values = true)]
    amount: String,

    /// How the amount relates to VAT: none, included or excluded
    #[arg(long, default_value = "none")]
    vat_mode: String,

    /// Withholding-tax rate in percent
    #[arg(long, default_value = "0")]
    wht: String,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
}

#[derive(Serialize)]
struct TaxOutput {
    amount: Decimal,
    vat_mode: VatMode,
    wht_rate: Decimal,
    #[serde(flatten)]
    breakdown: TaxBreakdown,
}

pub async fn run(args: TaxArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let amount = parse_decimal("amount", &args.amount)?;
    let wht_rate = parse_decimal("--wht", &args.wht)?;
    let vat_mode: VatMode = args.vat_mode.parse()?;

    if !config.tax.accepts_wht_rate(wht_rate) {
        anyhow::bail!(
            "Withholding tax rate {}% is not one of the allowed rates: {}",
            wht_rate,
            config
                .tax
                .allowed_wht_rates
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let breakdown = compute_tax(amount, vat_mode, wht_rate)?;
    info!("Computed tax for {} ({}, WHT {}%)", amount, vat_mode, wht_rate);

    let output = TaxOutput {
        amount,
        vat_mode,
        wht_rate,
        breakdown,
    };

    let rendered = match OutputFormat::resolve(args.format, &config)? {
        OutputFormat::Json => serde_json::to_string_pretty(&output)?,
        OutputFormat::Csv => format_csv(&output)?,
        OutputFormat::Text => format_text(&output, &Money::new(&config.display)),
    };
    println!("{}", rendered);

    Ok(())
}

fn parse_decimal(name: &str, value: &str) -> anyhow::Result<Decimal> {
    let value = value.trim();
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|_| anyhow::anyhow!("Invalid {}: {:?}", name, value))
}

fn format_csv(output: &TaxOutput) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "amount",
        "vat_mode",
        "wht_rate",
        "base_amount",
        "vat_amount",
        "total_with_vat",
        "wht_amount",
        "net_payable",
    ])?;

    let b = &output.breakdown;
    wtr.write_record([
        output.amount.to_string(),
        output.vat_mode.to_string(),
        output.wht_rate.to_string(),
        b.base_amount.to_string(),
        b.vat_amount.to_string(),
        b.total_with_vat.to_string(),
        b.wht_amount.to_string(),
        b.net_payable.to_string(),
    ])?;

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_text(output: &TaxOutput, money: &Money) -> String {
    let b = &output.breakdown;
    let mut text = String::new();

    text.push_str(&format!("Amount:      {} ({})\n", money.line(output.amount), output.vat_mode));
    text.push_str(&format!("Base:        {}\n", money.line(b.base_amount)));
    text.push_str(&format!("VAT 7%:      {}\n", money.line(b.vat_amount)));
    text.push_str(&format!("Total:       {}\n", money.line(b.total_with_vat)));
    text.push_str(&format!("WHT {}%:    {}\n", output.wht_rate, money.line(b.wht_amount)));
    text.push_str(&format!("Net payable: {}", money.line(b.net_payable)));

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_is_strict() {
        assert_eq!(parse_decimal("amount", " 1070.50 ").unwrap(), Decimal::new(107050, 2));
        assert_eq!(parse_decimal("amount", "1e3").unwrap(), Decimal::from(1000));
        assert!(parse_decimal("amount", "abc").is_err());
        assert!(parse_decimal("amount", "").is_err());
    }
}
