//! Report command - period report over many job costing files.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use serde::Deserialize;
use tracing::{debug, error, info};

use tally_core::aggregate::{Period, PeriodReport};
use tally_core::categories::{CategoryRegistry, Locale};
use tally_core::models::JobEvent;

use super::{categories, emit, load_config, percent, read_json, Money, OutputFormat};

/// Arguments for the report command.
#[derive(Args)]
pub struct ReportArgs {
    /// Input files or glob pattern of job event JSON files
    #[arg(required = true)]
    input: String,

    /// Only events in this month, YYYY-MM
    #[arg(short, long)]
    month: Option<Period>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Skip files that fail to load
    #[arg(long)]
    continue_on_error: bool,
}

/// A file holds one event or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum EventFile {
    Many(Vec<JobEvent>),
    One(Box<JobEvent>),
}

pub async fn run(args: ReportArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No JSON files found matching: {}", args.input);
    }

    info!("Loading {} files", files.len());

    let mut events = Vec::new();
    let mut failed = 0;
    for path in &files {
        match read_json::<EventFile>(path) {
            Ok(EventFile::Many(batch)) => events.extend(batch),
            Ok(EventFile::One(event)) => events.push(*event),
            Err(e) if args.continue_on_error => {
                error!("{}", e);
                failed += 1;
            }
            Err(e) => return Err(e),
        }
    }

    let period = args.month.unwrap_or_default();
    let report = PeriodReport::build(&events, period)?;
    let (registry, locale) = categories(&config);

    let output = match OutputFormat::resolve(args.format, &config)? {
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
        OutputFormat::Csv => format_csv(&report)?,
        OutputFormat::Text => format_text(
            &report,
            &Money::new(&config.display),
            &registry,
            locale,
            config.report.top_categories,
        ),
    };

    emit(&output, args.output.as_deref())?;

    if failed > 0 {
        eprintln!(
            "{} {} of {} files could not be loaded",
            style("✗").red(),
            failed,
            files.len()
        );
    }

    debug!("Report built in {:?}", start.elapsed());
    Ok(())
}

/// One row per event.
fn format_csv(report: &PeriodReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "event_name",
        "revenue",
        "net_receivable",
        "total_cost",
        "profit",
        "margin_percent",
        "cost_vat",
        "cost_wht",
        "net_vat_payable",
    ])?;

    for event in &report.events {
        wtr.write_record([
            event.event_name.clone(),
            event.revenue.to_string(),
            event.revenue_tax.net_receivable().to_string(),
            event.total_cost().to_string(),
            event.profit.to_string(),
            event.margin_percent.round_dp(2).to_string(),
            event.costs.total_vat.to_string(),
            event.costs.total_wht.to_string(),
            event.net_vat_payable.to_string(),
        ])?;
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_text(
    report: &PeriodReport,
    money: &Money,
    registry: &CategoryRegistry,
    locale: Locale,
    top_categories: usize,
) -> String {
    let t = &report.totals;
    let mut output = String::new();

    output.push_str(&format!("Period: {} ({} events)\n\n", report.period, t.event_count));

    for event in &report.events {
        output.push_str(&format!(
            "  {:<30} revenue {:>14}  cost {:>14}  profit {:>14}  {:>8}\n",
            event.event_name,
            money.headline(event.revenue),
            money.headline(event.total_cost()),
            money.headline(event.profit),
            percent(event.margin_percent)
        ));
    }

    output.push_str(&format!("\nRevenue:          {}\n", money.headline(t.total_revenue)));
    output.push_str(&format!("Net receivable:   {}\n", money.headline(t.total_net_revenue)));
    output.push_str(&format!("Total cost:       {}\n", money.headline(t.total_cost)));
    output.push_str(&format!("Profit:           {}\n", money.headline(t.profit)));
    output.push_str(&format!("Margin:           {}\n", percent(t.margin_percent)));
    output.push_str(&format!("Output VAT:       {}\n", money.line(t.revenue_vat)));
    output.push_str(&format!("Input VAT:        {}\n", money.line(t.cost_vat)));
    output.push_str(&format!("WHT on costs:     {}\n", money.line(t.cost_wht)));
    output.push_str(&format!("WHT on revenue:   {}\n", money.line(t.revenue_wht)));

    let limit = if top_categories == 0 {
        report.categories.len()
    } else {
        top_categories
    };
    if !report.categories.is_empty() {
        output.push_str("\nBy category:\n");
        for category in report.categories.iter().take(limit) {
            output.push_str(&format!(
                "  {:<20} {:>14}\n",
                registry.label(&category.category, locale),
                money.headline(category.amount)
            ));
        }
    }

    output.trim_end().to_string()
}
