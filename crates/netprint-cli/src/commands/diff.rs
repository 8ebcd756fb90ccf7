//! Diff command
//!
//! Usage: netprint diff --desired <FILE> --observed <FILE> [--summary] [--output <FILE>]

use super::{read_json, write_json};
use clap::Args;
use netprint_core::diff::{change_report, diff_footprints};
use netprint_core::footprint::DeviceFootprintDb;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Desired (templated) footprint (JSON)
    #[arg(short, long)]
    pub desired: PathBuf,

    /// Observed footprint (JSON)
    #[arg(short = 'b', long)]
    pub observed: PathBuf,

    /// Print only whether each device changed
    #[arg(long)]
    pub summary: bool,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute diff command
pub fn execute(args: DiffArgs) -> Result<(), Box<dyn std::error::Error>> {
    let desired: DeviceFootprintDb = read_json(&args.desired)?;
    let observed: DeviceFootprintDb = read_json(&args.observed)?;

    let diff_db = diff_footprints(&desired, &observed).map_err(|err| {
        for orphan in err.details().unwrap_or_default() {
            eprintln!("  unpaired: {}", orphan);
        }
        err
    })?;

    if args.summary {
        write_json(args.output.as_deref(), &change_report(&diff_db))
    } else {
        write_json(args.output.as_deref(), &diff_db)
    }
}
