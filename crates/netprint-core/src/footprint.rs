//! Footprint assembler
//!
//! Runs the path interpreter for every (device, key) pair. Devices are
//! independent and are processed in parallel; keys within one device run
//! sequentially in caller order.

use crate::chunk::{ChunkStore, DeviceChunks};
use crate::conversion::ConversionRegistry;
use crate::errors::ExError;
use crate::interpreter::extract;
use crate::rule::RuleSet;
use crate::value::Data;
use crate::{log_op_end, log_op_error, log_op_start};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

/// Extracted data for one key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDataEntry {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Data")]
    pub data: Data,
}

/// Extracted data for every key of one device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceFootprintEntry {
    #[serde(rename = "DeviceName")]
    pub device_name: String,
    #[serde(rename = "DeviceData", default)]
    pub device_data: Vec<DeviceDataEntry>,
}

pub type DeviceFootprintDb = Vec<DeviceFootprintEntry>;

/// Serializable form of an `ExError` raised inside a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_index: Option<usize>,
}

impl From<&ExError> for Diagnostic {
    fn from(err: &ExError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.message().to_string(),
            device: err.device().map(str::to_string),
            key: err.key().map(str::to_string),
            rule_index: err.rule_index(),
        }
    }
}

/// One (device, key) extraction that could not complete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceFailure {
    #[serde(rename = "DeviceName")]
    pub device_name: String,
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Error")]
    pub error: Diagnostic,
}

/// Outcome of one assembly pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssemblyReport {
    pub footprint: DeviceFootprintDb,
    #[serde(default)]
    pub failures: Vec<DeviceFailure>,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl AssemblyReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.diagnostics.is_empty()
    }
}

struct DeviceOutcome {
    entry: DeviceFootprintEntry,
    issues: Vec<ExError>,
    failures: Vec<(String, ExError)>,
}

/// Build the footprint of every device in `store` over `keys`.
///
/// An extraction that hits a configuration error is listed in `failures`
/// and its key is left out of that device's entry. Every other key of the
/// device, and every other device, completes.
pub fn assemble(
    store: &ChunkStore,
    keys: &[String],
    rules: &RuleSet,
    registry: &ConversionRegistry,
) -> AssemblyReport {
    let start = Instant::now();
    log_op_start!(
        "assemble",
        device_count = store.devices().len(),
        key_count = keys.len(),
        rule_count = rules.len()
    );

    // worker threads do not inherit the caller's span
    let span = tracing::Span::current();
    let outcomes: Vec<DeviceOutcome> = store
        .devices()
        .par_iter()
        .map(|device| {
            let _entered = span.enter();
            assemble_device(device, keys, rules, registry)
        })
        .collect();

    let mut report = AssemblyReport::default();
    for outcome in outcomes {
        for issue in &outcome.issues {
            tracing::warn!(
                device = issue.device(),
                key = issue.key(),
                rule_index = issue.rule_index(),
                err_code = issue.code(),
                "data-quality issue: {}",
                issue.message()
            );
            report.diagnostics.push(Diagnostic::from(issue));
        }
        for (key, err) in outcome.failures {
            log_op_error!(
                "assemble_key",
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                device = %outcome.entry.device_name,
                key = %key,
                rule_index = err.rule_index()
            );
            report.failures.push(DeviceFailure {
                device_name: outcome.entry.device_name.clone(),
                key,
                error: Diagnostic::from(&err),
            });
        }
        report.footprint.push(outcome.entry);
    }

    log_op_end!(
        "assemble",
        duration_ms = start.elapsed().as_millis() as u64,
        device_count = report.footprint.len(),
        failure_count = report.failures.len()
    );
    report
}

fn assemble_device(
    device: &DeviceChunks,
    keys: &[String],
    rules: &RuleSet,
    registry: &ConversionRegistry,
) -> DeviceOutcome {
    let mut outcome = DeviceOutcome {
        entry: DeviceFootprintEntry {
            device_name: device.device_name.clone(),
            device_data: Vec::with_capacity(keys.len()),
        },
        issues: Vec::new(),
        failures: Vec::new(),
    };

    for key in keys {
        match extract(key, device, rules, registry) {
            Ok(extraction) => {
                outcome.issues.extend(extraction.issues);
                outcome.entry.device_data.push(DeviceDataEntry {
                    key: extraction.key,
                    data: extraction.data,
                });
            }
            Err(err) => outcome.failures.push((key.clone(), err)),
        }
    }

    outcome
}

/// Per device, per key: the subset of fields named in `names`
pub type SelectedFields = BTreeMap<String, BTreeMap<String, Data>>;

/// Look up named fields across a footprint.
///
/// Every device and key appears in the result; a name absent from a key's
/// data is simply left out.
pub fn select_fields(footprint: &[DeviceFootprintEntry], names: &[String]) -> SelectedFields {
    footprint
        .iter()
        .map(|device| {
            let per_key = device
                .device_data
                .iter()
                .map(|entry| {
                    let selected: Data = names
                        .iter()
                        .filter_map(|name| {
                            entry.data.get(name).map(|v| (name.clone(), v.clone()))
                        })
                        .collect();
                    (entry.key.clone(), selected)
                })
                .collect();
            (device.device_name.clone(), per_key)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::ServiceConstructPathEntry;
    use crate::value::Value;

    fn store() -> ChunkStore {
        serde_json::from_str(
            r#"[
                {"DeviceName": "leaf-1", "Chunks": {"bd": [
                    {"l2BD.id": 100, "l2BD.accEncap": "vxlan-100"},
                    {"l2BD.id": 200, "l2BD.accEncap": "vxlan-200"}]}},
                {"DeviceName": "leaf-2", "Chunks": {"bd": [
                    {"l2BD.id": 100, "l2BD.accEncap": "vxlan-100"}]}}
            ]"#,
        )
        .unwrap()
    }

    fn rules() -> RuleSet {
        let rules: Vec<ServiceConstructPathEntry> = serde_json::from_str(
            r#"[{"ChunkName": "bd", "KeyDName": "l2BD.accEncap", "KeyLink": "direct",
                 "MatchType": "full", "CommonKeysList": ["l2BD.id"]}]"#,
        )
        .unwrap();
        RuleSet::new(rules, &ConversionRegistry::with_defaults(), None).unwrap()
    }

    fn keys() -> Vec<String> {
        vec!["vxlan-200".to_string(), "vxlan-100".to_string()]
    }

    #[test]
    fn test_assemble_preserves_device_and_key_order() {
        let report = assemble(&store(), &keys(), &rules(), &ConversionRegistry::with_defaults());

        assert!(report.is_clean());
        let devices: Vec<_> = report.footprint.iter().map(|d| d.device_name.as_str()).collect();
        assert_eq!(devices, vec!["leaf-1", "leaf-2"]);

        let leaf1 = &report.footprint[0];
        let keys: Vec<_> = leaf1.device_data.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["vxlan-200", "vxlan-100"]);
        assert_eq!(leaf1.device_data[0].data["l2BD.id"], Value::Int(200));

        let leaf2 = &report.footprint[1];
        assert!(leaf2.device_data[0].data.is_empty());
        assert_eq!(leaf2.device_data[1].data["l2BD.id"], Value::Int(100));
    }

    #[test]
    fn test_configuration_error_isolated_to_key() {
        let rules: Vec<ServiceConstructPathEntry> = serde_json::from_str(
            r#"[{"ChunkName": "bd", "KeyDName": "l2BD.accEncap", "KeyLink": "direct",
                 "MatchType": "full", "CommonKeysList": ["l2BD.accEncap", "l2BD.fabEncap"]},
                {"ChunkName": "svi", "KeySName": "l2BD.fabEncap", "KeySType": "string",
                 "KeyDName": "sviIf.vlan", "KeyDType": "integer",
                 "KeyLink": "indirect", "MatchType": "full"}]"#,
        )
        .unwrap();
        let rules = RuleSet::new(rules, &ConversionRegistry::with_defaults(), None).unwrap();
        let store: ChunkStore = serde_json::from_str(
            r#"[{"DeviceName": "leaf-1", "Chunks": {
                "bd": [{"l2BD.accEncap": "vxlan-100", "l2BD.fabEncap": "100"},
                       {"l2BD.accEncap": "vxlan-200"}],
                "svi": [{"sviIf.vlan": 100}]}}]"#,
        )
        .unwrap();

        // validated against the defaults, run against an empty registry
        let report = assemble(&store, &keys(), &rules, &ConversionRegistry::empty());

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].device_name, "leaf-1");
        assert_eq!(report.failures[0].key, "vxlan-100");
        assert_eq!(report.failures[0].error.code, "ERR_UNREGISTERED_CONVERSION");
        assert_eq!(report.failures[0].error.rule_index, Some(1));

        let leaf1 = &report.footprint[0];
        let keys: Vec<_> = leaf1.device_data.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["vxlan-200"]);
        assert_eq!(leaf1.device_data[0].data["l2BD.accEncap"], Value::from("vxlan-200"));
    }

    #[test]
    fn test_select_fields() {
        let report = assemble(&store(), &keys(), &rules(), &ConversionRegistry::with_defaults());
        let selected = select_fields(
            &report.footprint,
            &["l2BD.id".to_string(), "bgpInst.asn".to_string()],
        );

        assert_eq!(selected["leaf-1"]["vxlan-100"]["l2BD.id"], Value::Int(100));
        assert_eq!(selected["leaf-1"]["vxlan-100"].len(), 1);
        assert!(selected["leaf-2"]["vxlan-200"].is_empty());
    }

    #[test]
    fn test_report_serializes_footprint_keys() {
        let report = assemble(&store(), &keys(), &rules(), &ConversionRegistry::with_defaults());
        let json = serde_json::to_value(&report.footprint).unwrap();
        assert_eq!(json[0]["DeviceName"], "leaf-1");
        assert_eq!(json[0]["DeviceData"][0]["Key"], "vxlan-200");
        assert_eq!(json[0]["DeviceData"][0]["Data"]["l2BD.id"], 200);
    }
}
