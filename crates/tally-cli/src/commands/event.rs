//! Event command - profit, margin and tax summary of one job costing sheet.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use tally_core::aggregate::EventSummary;
use tally_core::categories::{CategoryRegistry, Locale};
use tally_core::models::JobEvent;
use tally_core::tax::Taxable;

use super::{categories, emit, load_config, percent, read_json, Money, OutputFormat};

/// Arguments for the event command.
#[derive(Args)]
pub struct EventArgs {
    /// Job event JSON file (with `cost_items` or `job_cost_items`)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
}

pub async fn run(args: EventArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let event: JobEvent = read_json(&args.input)?;
    info!(
        "Summarizing event {:?} with {} cost items",
        event.event_name,
        event.cost_items.len()
    );

    let summary = EventSummary::compute(&event)?;
    let (registry, locale) = categories(&config);

    let output = match OutputFormat::resolve(args.format, &config)? {
        OutputFormat::Json => serde_json::to_string_pretty(&summary)?,
        OutputFormat::Csv => format_csv(&event)?,
        OutputFormat::Text => format_text(&summary, &Money::new(&config.display), &registry, locale),
    };

    emit(&output, args.output.as_deref())
}

/// One row per cost item.
fn format_csv(event: &JobEvent) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "category",
        "description",
        "amount",
        "vat_mode",
        "vat_amount",
        "wht_rate",
        "wht_amount",
        "net_payable",
    ])?;

    for item in &event.cost_items {
        let input = item.taxable()?;
        let tax = input.compute()?;
        wtr.write_record([
            item.category.clone(),
            item.description.clone(),
            item.amount.to_string(),
            input.vat_mode.to_string(),
            tax.vat_amount.to_string(),
            input.wht_rate.to_string(),
            tax.wht_amount.to_string(),
            tax.net_payable.to_string(),
        ])?;
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

pub(crate) fn format_text(
    summary: &EventSummary,
    money: &Money,
    registry: &CategoryRegistry,
    locale: Locale,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Event: {}\n", summary.event_name));
    output.push_str("\nRevenue:\n");
    output.push_str(&format!("  Selling price:  {}\n", money.line(summary.revenue)));
    output.push_str(&format!("  Output VAT:     {}\n", money.line(summary.revenue_tax.vat_amount)));
    output.push_str(&format!("  WHT withheld:   {}\n", money.line(summary.revenue_tax.wht_amount)));
    output.push_str(&format!(
        "  Net receivable: {}\n",
        money.line(summary.revenue_tax.net_receivable())
    ));

    output.push_str(&format!("\nCosts ({} items):\n", summary.costs.item_count));
    for category in &summary.categories {
        output.push_str(&format!(
            "  {:<20} {}\n",
            registry.label(&category.category, locale),
            money.line(category.amount)
        ));
    }
    output.push_str(&format!("  Input VAT:      {}\n", money.line(summary.costs.total_vat)));
    output.push_str(&format!("  WHT deducted:   {}\n", money.line(summary.costs.total_wht)));
    output.push_str(&format!("  Net payable:    {}\n", money.line(summary.costs.total_net)));

    output.push_str("\nResult:\n");
    output.push_str(&format!("  Total cost:     {}\n", money.headline(summary.total_cost())));
    output.push_str(&format!("  Profit:         {}\n", money.headline(summary.profit)));
    output.push_str(&format!("  Margin:         {}\n", percent(summary.margin_percent)));
    output.push_str(&format!("  Net VAT:        {}", money.line(summary.net_vat_payable)));

    output
}
