//! Footprint and classify commands
//!
//! Usage: netprint footprint --service <FILE> --chunks <FILE> --keys <FILE> [--report] [--output <FILE>]

use super::{read_json, write_json};
use clap::Args;
use netprint_core::pipeline::ProcessReport;
use netprint_core::{process, ChunkStore, ConversionRegistry, ServiceDefinition};
use netprint_core::{log_op_end, log_op_start};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Args)]
pub struct FootprintArgs {
    /// Service definition (JSON, or YAML by extension)
    #[arg(short, long)]
    pub service: PathBuf,

    /// Per-device chunks produced by the flattener (JSON)
    #[arg(short, long)]
    pub chunks: PathBuf,

    /// Extraction keys (JSON array of strings)
    #[arg(short, long)]
    pub keys: PathBuf,

    /// Emit the full report (footprints, bitmaps, types, failures, diagnostics)
    #[arg(long)]
    pub report: bool,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn run(args: &FootprintArgs) -> Result<ProcessReport, Box<dyn std::error::Error>> {
    let start = Instant::now();
    log_op_start!("cli_footprint", service_file = %args.service.display());

    let registry = ConversionRegistry::with_defaults();
    let service = ServiceDefinition::load(&args.service)?.compile(&registry)?;
    let store: ChunkStore = read_json(&args.chunks)?;
    let keys: Vec<String> = read_json(&args.keys)?;

    let report = process(&service, &store, &keys, &registry);
    for failure in &report.failures {
        eprintln!(
            "✗ {}/{}: [{}] {}",
            failure.device_name, failure.key, failure.error.code, failure.error.message
        );
    }
    if !report.diagnostics.is_empty() {
        eprintln!("! {} data-quality issues", report.diagnostics.len());
    }

    log_op_end!(
        "cli_footprint",
        duration_ms = start.elapsed().as_millis() as u64
    );
    Ok(report)
}

/// Execute footprint command
pub fn execute(args: FootprintArgs) -> Result<(), Box<dyn std::error::Error>> {
    let report = run(&args)?;
    if args.report {
        write_json(args.output.as_deref(), &report)
    } else {
        write_json(args.output.as_deref(), &report.processed.device_footprint_db)
    }
}

/// Execute classify command
pub fn execute_classify(args: FootprintArgs) -> Result<(), Box<dyn std::error::Error>> {
    let report = run(&args)?;
    if args.report {
        write_json(args.output.as_deref(), &report)
    } else {
        write_json(args.output.as_deref(), &report.processed.service_type_db)
    }
}
