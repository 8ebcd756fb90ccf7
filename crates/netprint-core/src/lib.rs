//! netprint core - declarative extraction, classification and diff engine
//!
//! This crate turns per-device chunks of flat telemetry records into keyed
//! footprints and reasons about them:
//! - Rule-driven path interpreter with direct/indirect linkage,
//!   full/partial matching, filter capture, split-search and combine-by
//! - Parallel footprint assembly with per-device failure isolation
//! - Service component bitmaps and best-match service-type classification
//! - Structural compliance diff between desired and observed footprints
//!
//! Everything here is pure and synchronous: no network or storage access.

pub mod chunk;
pub mod classify;
pub mod component;
pub mod conversion;
pub mod definition;
pub mod diff;
pub mod errors;
pub mod footprint;
pub mod interpreter;
pub mod logging_facility;
pub mod pipeline;
pub mod rule;
pub mod value;

// Re-export commonly used types
pub use chunk::{ChunkStore, DeviceChunks};
pub use classify::{classify, Classification, ServiceTypeCatalog, ServiceTypeDefinition};
pub use component::{evaluate, ServiceComponent, ServiceComponentBitmap};
pub use conversion::ConversionRegistry;
pub use definition::{CompiledService, ServiceDefinition};
pub use diff::{diff, diff_footprints, DiffEntry};
pub use errors::{ExError, ExErrorKind, NetprintError, Result};
pub use footprint::{assemble, AssemblyReport, DeviceFootprintDb};
pub use interpreter::{extract, Extraction};
pub use pipeline::{process, ProcessReport, ProcessedData};
pub use rule::{RuleSet, ServiceConstructPathEntry};
pub use value::{Data, Record, Value, ValueType};
