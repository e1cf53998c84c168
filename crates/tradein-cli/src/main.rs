mod commands;
mod input;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::entries::EntriesArgs;
use commands::export::ExportArgs;
use commands::options::OptionsArgs;
use commands::ViewArgs;

/// Trade-in market share and representative performance reports
#[derive(Parser)]
#[command(
    name = "tradein",
    version,
    about = "Maple vs Cashify trade-in market share reports",
    long_about = "Reads Maple and Cashify trade-in exports (CSV or spreadsheet), \
                  applies period and location filters and reports market share, \
                  target attainment and weekoff losses per representative, store \
                  and region."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log more to stderr (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Representative scorecard: share, target, weekoff losses, averages
    Scorecard(ViewArgs),
    /// Region-wise market share and store breakdown
    Regions(ViewArgs),
    /// Review of every representative in scope
    Summary(ViewArgs),
    /// Month-over-month share, category and region split from --year/--month on
    Trend(ViewArgs),
    /// Values available for the period and location selectors
    Options(OptionsArgs),
    /// Month-to-date KPIs from a daily entry log
    Entries(EntriesArgs),
    /// Write the summary, region and monthly trend tables as CSV files
    Export(ExportArgs),
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

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Scorecard(args) => commands::scorecard::run_scorecard(args),
        Commands::Regions(args) => commands::regions::run_regions(args),
        Commands::Summary(args) => commands::summary::run_summary(args),
        Commands::Trend(args) => commands::trend::run_trend(args),
        Commands::Options(args) => commands::options::run_options(args),
        Commands::Entries(args) => commands::entries::run_entries(args),
        Commands::Export(args) => commands::export::run_export(args),
        Commands::Version => {
            println!("tradein {}", env!("CARGO_PKG_VERSION"));
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
