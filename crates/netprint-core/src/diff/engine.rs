//! Diff computation.

use crate::diff::model::{DeviceChangeStatus, DeviceDiffDb, DeviceDiffEntry, DiffEntry};
use crate::errors::{ExError, NetprintError};
use crate::footprint::DeviceFootprintEntry;
use crate::value::Data;
use std::collections::{BTreeMap, BTreeSet};

/// Compare the desired and observed records of one key
pub fn diff(key: &str, desired: &Data, observed: &Data) -> DiffEntry {
    let mut entry = DiffEntry {
        key: key.to_string(),
        ..DiffEntry::default()
    };

    for (field, want) in desired {
        match observed.get(field) {
            Some(have) if have == want => {}
            Some(_) => {
                entry.to_change.insert(field.clone(), want.clone());
            }
            None => {
                entry.to_add.insert(field.clone(), want.clone());
            }
        }
    }

    for (field, have) in observed {
        if !desired.contains_key(field) {
            entry.to_delete.insert(field.clone(), have.clone());
        }
    }

    entry
}

/// Diff two footprints device by device and key by key.
///
/// Devices pair by `DeviceName` and entries by `Key`; output follows the
/// desired footprint's order.
///
/// # Errors
///
/// Returns `FootprintMisaligned` listing every device or `device/key` that
/// appears on only one side (or more than once on one side).
pub fn diff_footprints(
    desired: &[DeviceFootprintEntry],
    observed: &[DeviceFootprintEntry],
) -> Result<DeviceDiffDb, ExError> {
    let mut orphans = Vec::new();

    let observed_by_device = index_unique(
        observed.iter().map(|d| (d.device_name.as_str(), d)),
        &mut orphans,
        |name| format!("{} (duplicate device in observed)", name),
    );
    let desired_by_device = index_unique(
        desired.iter().map(|d| (d.device_name.as_str(), d)),
        &mut orphans,
        |name| format!("{} (duplicate device in desired)", name),
    );

    let mut result = Vec::with_capacity(desired.len());
    let mut seen_devices = BTreeSet::new();

    for want in desired {
        if !seen_devices.insert(want.device_name.as_str()) {
            continue;
        }
        let Some(have) = observed_by_device.get(want.device_name.as_str()) else {
            orphans.push(format!("{} (desired only)", want.device_name));
            continue;
        };
        if let Some(entry) = diff_device(want, have, &mut orphans) {
            result.push(entry);
        }
    }

    for have in observed {
        if !desired_by_device.contains_key(have.device_name.as_str()) {
            orphans.push(format!("{} (observed only)", have.device_name));
        }
    }

    if orphans.is_empty() {
        Ok(result)
    } else {
        Err(ExError::from(NetprintError::FootprintMisaligned { orphans }).with_op("diff_footprints"))
    }
}

fn diff_device(
    desired: &DeviceFootprintEntry,
    observed: &DeviceFootprintEntry,
    orphans: &mut Vec<String>,
) -> Option<DeviceDiffEntry> {
    let device = desired.device_name.as_str();
    let before = orphans.len();

    let observed_by_key = index_unique(
        observed.device_data.iter().map(|e| (e.key.as_str(), e)),
        orphans,
        |key| format!("{}/{} (duplicate key in observed)", device, key),
    );
    let desired_by_key = index_unique(
        desired.device_data.iter().map(|e| (e.key.as_str(), e)),
        orphans,
        |key| format!("{}/{} (duplicate key in desired)", device, key),
    );

    let mut diff_data = Vec::with_capacity(desired.device_data.len());
    let mut seen_keys = BTreeSet::new();
    for want in &desired.device_data {
        if !seen_keys.insert(want.key.as_str()) {
            continue;
        }
        match observed_by_key.get(want.key.as_str()) {
            Some(have) => diff_data.push(diff(&want.key, &want.data, &have.data)),
            None => orphans.push(format!("{}/{} (desired only)", device, want.key)),
        }
    }
    for have in &observed.device_data {
        if !desired_by_key.contains_key(have.key.as_str()) {
            orphans.push(format!("{}/{} (observed only)", device, have.key));
        }
    }

    (orphans.len() == before).then(|| DeviceDiffEntry {
        device_name: desired.device_name.clone(),
        diff_data,
    })
}

/// Index items by name, recording names that appear more than once
fn index_unique<'a, T>(
    items: impl Iterator<Item = (&'a str, &'a T)>,
    orphans: &mut Vec<String>,
    duplicate: impl Fn(&str) -> String,
) -> BTreeMap<&'a str, &'a T> {
    let mut index = BTreeMap::new();
    for (name, item) in items {
        if index.insert(name, item).is_some() {
            orphans.push(duplicate(name));
        }
    }
    index
}

/// Whether each device of a diff has any change
pub fn change_report(diff_db: &[DeviceDiffEntry]) -> Vec<DeviceChangeStatus> {
    diff_db
        .iter()
        .map(|device| DeviceChangeStatus {
            device_name: device.device_name.clone(),
            changed: device.has_changes(),
        })
        .collect()
}
