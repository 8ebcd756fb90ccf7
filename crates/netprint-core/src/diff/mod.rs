//! Compliance diff engine.
//!
//! Compares a desired (templated) footprint with an observed one and
//! reports, per device and key, which fields must change, be added or be
//! deleted.
//!
//! ## Entry points
//!
//! ```
//! use netprint_core::diff::diff;
//! use netprint_core::value::{Data, Value};
//!
//! let desired: Data = [("a".to_string(), Value::Int(1))].into_iter().collect();
//! let entry = diff("100", &desired, &Data::new());
//! assert_eq!(entry.to_add.len(), 1);
//! ```
//!
//! ## Guarantees
//!
//! - `diff` never fails: absence on either side is an add or delete signal.
//! - `diff_footprints` pairs devices by name and entries by key; anything
//!   left unpaired is reported as a misalignment error instead of being
//!   compared against an unrelated entry.
//! - Output maps are ordered, so identical inputs serialize identically.

pub mod engine;
pub mod model;

pub use engine::{change_report, diff, diff_footprints};
pub use model::{DeviceChangeStatus, DeviceDiffDb, DeviceDiffEntry, DiffEntry};
