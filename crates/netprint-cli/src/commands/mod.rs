pub mod diff;
pub mod footprint;
pub mod select;
pub mod validate;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Read and parse a JSON input file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let value = serde_json::from_str(&text)
        .map_err(|e| format!("cannot parse {}: {}", path.display(), e))?;
    Ok(value)
}

/// Pretty-print `value` as JSON to `output`, or stdout when absent
pub fn write_json<T: Serialize>(
    output: Option<&Path>,
    value: &T,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            eprintln!("✓ Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
