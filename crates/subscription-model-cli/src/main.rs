mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::carbon::CarbonArgs;
use commands::financials::FinancialsArgs;
use commands::marketing::{AuditArgs, TierMetricsArgs};
use commands::seasonality::SeasonalityArgs;
use commands::sensitivity::SensitivityArgs;
use commands::simulate::SimulateArgs;

/// Subscription business simulation
#[derive(Parser)]
#[command(
    name = "submodel",
    version,
    about = "Monthly subscription business simulation",
    long_about = "Projects customers, tier revenue, marketing funnel volumes, carbon \
                  offset cost and free cash flow month by month from a scenario of \
                  business assumptions, with NPV and payback analysis."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log diagnostics to stderr (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monthly projection for a scenario
    Simulate(SimulateArgs),
    /// Run the projection and compute NPV and payback month
    Financials(FinancialsArgs),
    /// Marketing funnel volumes per acquisition tier
    TierMetrics(TierMetricsArgs),
    /// Audit funnel CPL/CVR against benchmark ranges
    Audit(AuditArgs),
    /// Derive default tons of carbon per customer for each tier
    Carbon(CarbonArgs),
    /// Blend a 12-month seasonal curve with uniform demand
    Seasonality(SeasonalityArgs),
    /// Two-way sensitivity of an output metric to two assumptions
    Sensitivity(SensitivityArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Simulate(args) => commands::simulate::run_simulate(args),
        Commands::Financials(args) => commands::financials::run_financials(args),
        Commands::TierMetrics(args) => commands::marketing::run_tier_metrics(args),
        Commands::Audit(args) => commands::marketing::run_audit(args),
        Commands::Carbon(args) => commands::carbon::run_carbon(args),
        Commands::Seasonality(args) => commands::seasonality::run_seasonality(args),
        Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity(args),
        Commands::Version => {
            println!("submodel {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
