//! Lead command - price, payments and outstanding balance of a CRM lead.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Args;
use console::style;
use serde::Serialize;

use tally_core::crm::{needs_follow_up, LeadFinancials};
use tally_core::models::{Installment, Lead, LeadStatus};

use super::{emit, load_config, read_json, Money, OutputFormat};

/// Arguments for the lead command.
#[derive(Args)]
pub struct LeadArgs {
    /// Lead JSON file
    #[arg(required = true)]
    input: PathBuf,

    /// Date to check follow-ups against, YYYY-MM-DD (default: today)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
}

#[derive(Serialize)]
struct LeadReport<'a> {
    id: &'a str,
    customer_name: &'a str,
    status: LeadStatus,
    needs_follow_up: bool,
    #[serde(flatten)]
    financials: LeadFinancials,
    installments: &'a [Installment],
}

pub async fn run(args: LeadArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let lead: Lead = read_json(&args.input)?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let report = LeadReport {
        id: &lead.id,
        customer_name: &lead.customer_name,
        status: lead.status,
        needs_follow_up: needs_follow_up(&lead, today),
        financials: LeadFinancials::compute(&lead)?,
        installments: &lead.installments,
    };

    let output = match OutputFormat::resolve(args.format, &config)? {
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
        OutputFormat::Csv => format_csv(&report)?,
        OutputFormat::Text => format_text(&report, &Money::new(&config.display)),
    };

    emit(&output, args.output.as_deref())
}

/// The payment schedule, one row per installment.
fn format_csv(report: &LeadReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["installment_number", "amount", "due_date", "is_paid", "paid_date"])?;
    for row in report.installments {
        wtr.write_record([
            row.installment_number.to_string(),
            row.amount.to_string(),
            row.due_date.map(|d| d.to_string()).unwrap_or_default(),
            row.is_paid.to_string(),
            row.paid_date.map(|d| d.to_string()).unwrap_or_default(),
        ])?;
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_text(report: &LeadReport, money: &Money) -> String {
    let f = &report.financials;
    let mut output = String::new();

    output.push_str(&format!(
        "Lead: {} [{} / {}]\n",
        report.customer_name,
        report.status.label(),
        report.status.label_th()
    ));
    if report.needs_follow_up {
        output.push_str(&format!(
            "{} Event date has passed and the lead is still open\n",
            style("⚠").yellow()
        ));
    }

    output.push_str(&format!("\nPrice:          {}\n", money.line(f.base_price)));
    output.push_str(&format!("VAT:            {}\n", money.line(f.tax.vat_amount)));
    output.push_str(&format!("WHT:            {}\n", money.line(f.tax.wht_amount)));
    output.push_str(&format!("Net total:      {}\n", money.line(f.net_total)));

    output.push_str(&format!("\nDeposit:        {}\n", money.line(f.deposit)));
    for row in report.installments {
        let mark = if row.is_paid {
            style("✓").green().to_string()
        } else {
            style("·").dim().to_string()
        };
        let due = row
            .due_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        output.push_str(&format!(
            "  {} #{} {} due {}\n",
            mark,
            row.installment_number,
            money.line(row.amount),
            due
        ));
    }
    output.push_str(&format!("Total paid:     {}\n", money.line(f.total_paid)));
    output.push_str(&format!("Outstanding:    {}", money.headline(f.outstanding)));

    output
}
