//! netprint CLI
//!
//! Command-line front end for the netprint extraction engine

use clap::{Parser, Subcommand, ValueEnum};
use netprint_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    /// Human-readable logs
    Pretty,
    /// JSON structured logs
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "netprint")]
#[command(about = "netprint - network service footprint modeling", long_about = None)]
struct Cli {
    /// Log output format (filter with RUST_LOG)
    #[arg(long, value_enum, global = true, default_value = "pretty")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate a service definition
    Validate(commands::validate::ValidateArgs),
    /// Extract device footprints for a key list
    Footprint(commands::footprint::FootprintArgs),
    /// Classify every device/key into a service type
    Classify(commands::footprint::FootprintArgs),
    /// Pick named fields out of a footprint
    Select(commands::select::SelectArgs),
    /// Diff a desired footprint against an observed one
    Diff(commands::diff::DiffArgs),
}

fn main() {
    let cli = Cli::parse();

    init(match cli.log_format {
        LogFormat::Pretty => Profile::Development,
        LogFormat::Json => Profile::Production,
    });

    let result = match cli.command {
        Commands::Validate(args) => commands::validate::execute(args),
        Commands::Footprint(args) => commands::footprint::execute(args),
        Commands::Classify(args) => commands::footprint::execute_classify(args),
        Commands::Select(args) => commands::select::execute(args),
        Commands::Diff(args) => commands::diff::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
