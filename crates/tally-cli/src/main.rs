//! CLI application for event job costing and Thai tax summaries.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, event, lead, report, tax};

/// tally - VAT, withholding tax and profit for event jobs
#[derive(Parser)]
#[command(name = "tally")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute VAT and withholding tax for an amount
    Tax(tax::TaxArgs),

    /// Summarize one job event and its cost items
    Event(event::EventArgs),

    /// Show a lead's payments and outstanding balance
    Lead(lead::LeadArgs),

    /// Build a period report over many job events
    Report(report::ReportArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Tax(args) => tax::run(args, config_path).await,
        Commands::Event(args) => event::run(args, config_path).await,
        Commands::Lead(args) => lead::run(args, config_path).await,
        Commands::Report(args) => report::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
