//! Diff output types.

use crate::value::Data;
use serde::{Deserialize, Serialize};

/// Structural difference between a desired and an observed record for one key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffEntry {
    #[serde(rename = "Key")]
    pub key: String,
    /// Desired values of fields present on both sides with different values
    #[serde(rename = "ToChange", default)]
    pub to_change: Data,
    /// Desired values of fields missing from the observed record
    #[serde(rename = "ToAdd", default)]
    pub to_add: Data,
    /// Observed values of fields the desired record does not have
    #[serde(rename = "ToDelete", default)]
    pub to_delete: Data,
}

impl DiffEntry {
    pub fn has_changes(&self) -> bool {
        !(self.to_change.is_empty() && self.to_add.is_empty() && self.to_delete.is_empty())
    }
}

/// Diff entries for every key of one device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceDiffEntry {
    #[serde(rename = "DeviceName")]
    pub device_name: String,
    #[serde(rename = "DiffData", default)]
    pub diff_data: Vec<DiffEntry>,
}

impl DeviceDiffEntry {
    /// True when any key of the device has a change
    pub fn has_changes(&self) -> bool {
        self.diff_data.iter().any(DiffEntry::has_changes)
    }
}

pub type DeviceDiffDb = Vec<DeviceDiffEntry>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceChangeStatus {
    #[serde(rename = "DeviceName")]
    pub device_name: String,
    #[serde(rename = "Changed")]
    pub changed: bool,
}
