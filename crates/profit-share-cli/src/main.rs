mod commands;
mod input;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::filter::LevelFilter;

use commands::detail_totals::DetailTotalsArgs;
use commands::update::UpdateArgs;

/// Year-end profit sharing update
#[derive(Parser)]
#[command(
    name = "psu",
    version,
    about = "Year-end profit sharing update",
    long_about = "Allocates contributions, incoming forfeitures and earnings across the \
                  plan roster for a profit year, enforces the annual contribution cap, \
                  and prints the PAY444 ledger with the PAY444A override report."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "report", global = true)]
    output: OutputFormat,

    /// Log to stderr; repeat for more detail
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the profit share update and render the report
    Update(UpdateArgs),
    /// Aggregate profit detail rows per member without allocating
    DetailTotals(DetailTotalsArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Report,
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Update(args) => commands::update::run_update(args),
        Commands::DetailTotals(args) => commands::detail_totals::run_detail_totals(args),
        Commands::Version => {
            println!("psu {}", env!("CARGO_PKG_VERSION"));
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
