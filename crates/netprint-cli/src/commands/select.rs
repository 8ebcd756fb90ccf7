//! Select command
//!
//! Usage: netprint select --footprint <FILE> --field <NAME>...

use super::{read_json, write_json};
use clap::Args;
use netprint_core::footprint::{select_fields, DeviceFootprintDb};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct SelectArgs {
    /// Device footprint (JSON, as written by `footprint`)
    #[arg(short, long)]
    pub footprint: PathBuf,

    /// Field name to pick; repeat for several
    #[arg(long = "field", required = true)]
    pub fields: Vec<String>,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute select command
pub fn execute(args: SelectArgs) -> Result<(), Box<dyn std::error::Error>> {
    let footprint: DeviceFootprintDb = read_json(&args.footprint)?;
    let selected = select_fields(&footprint, &args.fields);
    write_json(args.output.as_deref(), &selected)
}
