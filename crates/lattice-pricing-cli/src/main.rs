mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::pricing::{FactorsArgs, LatticeArgs, PriceArgs};
use output::OutputFormat;

/// Binomial lattice option pricing
#[derive(Parser)]
#[command(
    name = "bopm",
    version,
    about = "Binomial lattice option pricing",
    long_about = "Prices CALL and PUT options on a recombining binomial lattice with \
                  decimal precision: builds the price tree, seeds terminal payoffs and \
                  discounts them back to a present value. Lattice layers (spot, exercise, \
                  continuation, option value) can be printed for inspection."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Enable debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Price an option and report its present value
    Price(PriceArgs),
    /// Print one valued lattice layer, one row per down-move level
    Lattice(LatticeArgs),
    /// Derive Cox-Ross-Rubinstein up/down factors from volatility
    Factors(FactorsArgs),
    /// Print version information
    Version,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Price(args) => commands::pricing::run_price(args),
        Commands::Lattice(args) => commands::pricing::run_lattice(args),
        Commands::Factors(args) => commands::pricing::run_factors(args),
        Commands::Version => {
            println!("bopm {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
