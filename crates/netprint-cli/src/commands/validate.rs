//! Validate command
//!
//! Usage: netprint validate --service <FILE>

use clap::Args;
use netprint_core::{ConversionRegistry, ServiceDefinition};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Service definition (JSON, or YAML by extension)
    #[arg(short, long)]
    pub service: PathBuf,
}

/// Execute validate command
pub fn execute(args: ValidateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let definition = ServiceDefinition::load(&args.service)?;
    let compiled = definition.compile(&ConversionRegistry::with_defaults())?;

    let summary = serde_json::json!({
        "ServiceName": compiled.name,
        "Rules": compiled.rules.len(),
        "ServiceComponents": compiled.component_names(),
        "ServiceTypes": compiled
            .catalog
            .definitions
            .iter()
            .map(|d| d.name.as_str())
            .collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
