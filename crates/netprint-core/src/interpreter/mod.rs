//! Path interpreter
//!
//! Executes a validated rule list against one device's chunks for one
//! extraction key, accumulating a single `Data` record. Rules run strictly
//! in order because later rules may read fields earlier ones wrote.
//!
//! Missing fields and empty chunks are not errors: the rule simply
//! contributes nothing. A field whose runtime type does not fit the match
//! step is a data-quality issue scoped to that rule application; the rule
//! skips the offending records and extraction continues. Only a
//! configuration error (a conversion pair nobody registered) fails the call.

pub mod filter;
pub mod probe;

pub use filter::{FilterDb, FilterEntry, NOT_EXISTS};
pub use probe::{build_probes, Probe};

use crate::chunk::DeviceChunks;
use crate::conversion::{ConversionError, ConversionRegistry};
use crate::errors::{ExError, NetprintError};
use crate::rule::{field_name, Linkage, MatchType, RuleSet, ServiceConstructPathEntry};
use crate::value::{Data, Record, Value};

/// Result of running a rule list for one key
#[derive(Debug, Clone)]
pub struct Extraction {
    pub key: String,
    pub data: Data,
    /// Data-quality issues, each labeled with device, key and rule index
    pub issues: Vec<ExError>,
}

/// Run `rules` for `key` against one device's chunks.
///
/// # Errors
///
/// Fails only on a configuration error. The error carries the device, key
/// and rule index.
pub fn extract(
    key: &str,
    device: &DeviceChunks,
    rules: &RuleSet,
    registry: &ConversionRegistry,
) -> Result<Extraction, ExError> {
    let mut run = Run {
        key,
        device,
        registry,
        data: Data::new(),
        filters: FilterDb::new(),
        issues: Vec::new(),
    };

    for (rule_index, rule) in rules.iter().enumerate() {
        run.apply(rule_index, rule).map_err(|err| {
            ExError::from(err)
                .with_op("extract")
                .with_device(&device.device_name)
                .with_key(key)
                .with_rule_index(rule_index)
        })?;
    }

    tracing::debug!(
        device = %device.device_name,
        key = key,
        fields = run.data.len(),
        issues = run.issues.len(),
        "extraction finished"
    );

    Ok(Extraction {
        key: key.to_string(),
        data: run.data,
        issues: run.issues,
    })
}

struct Run<'a> {
    key: &'a str,
    device: &'a DeviceChunks,
    registry: &'a ConversionRegistry,
    data: Data,
    filters: FilterDb,
    issues: Vec<ExError>,
}

impl<'a> Run<'a> {
    fn apply(
        &mut self,
        rule_index: usize,
        rule: &ServiceConstructPathEntry,
    ) -> Result<(), NetprintError> {
        let device = self.device;
        let chunk = device.lookup(&rule.chunk_name);

        let candidates: Vec<&Record> = match rule.match_type {
            MatchType::NoMatch => chunk.iter().collect(),
            MatchType::Full | MatchType::Partial => match self.seed(rule_index, rule)? {
                Some(seed) => self.select(rule_index, rule, chunk, &seed),
                None => Vec::new(),
            },
        };

        let Some(first) = candidates.first() else {
            return Ok(());
        };

        copy_fields(&rule.common_keys, &rule.common_keys_prefix, "", first, &mut self.data);

        if let Some(filter) = rule.active_filter() {
            self.filters
                .capture(&filter.name, &filter.key, candidates.iter().copied());
        }

        for entry in &rule.split_search {
            let probes = build_probes(&entry.directives, &self.filters);
            for record in &candidates {
                for probe in probes.iter().filter(|p| p.matches(record)) {
                    copy_fields(
                        &entry.keys,
                        &entry.keys_prefix,
                        &probe.postfix,
                        record,
                        &mut self.data,
                    );
                }
            }
        }

        if let Some(combine) = &rule.combine_by {
            let mut options: Vec<&Value> = Vec::new();
            for record in &candidates {
                if let Some(option) = record.get(&combine.option_name) {
                    if !options.contains(&option) {
                        options.push(option);
                    }
                }
            }
            for option in options {
                let Some(segment) = option.postfix_segment() else {
                    continue;
                };
                let postfix = format!(".{}", segment);
                for record in candidates
                    .iter()
                    .filter(|r| r.get(&combine.option_name) == Some(option))
                {
                    copy_fields(&combine.option_keys, "", &postfix, record, &mut self.data);
                }
            }
        }

        Ok(())
    }

    /// Seed value for a rule with a match step; `None` when it has none
    fn seed(
        &mut self,
        rule_index: usize,
        rule: &ServiceConstructPathEntry,
    ) -> Result<Option<Value>, NetprintError> {
        let raw = match rule.linkage {
            Linkage::Direct => Value::from(self.key),
            Linkage::Indirect => match self.data.get(&rule.key_source_name) {
                Some(v) if !v.is_null() => v.clone(),
                _ => return Ok(None),
            },
            Linkage::NoLink => return Ok(None),
        };

        let Some((from, to)) = rule.conversion() else {
            return Ok(Some(raw));
        };
        match self.registry.convert(from, to, &raw) {
            Ok(seed) => Ok(Some(seed)),
            Err(err @ ConversionError::Unregistered { .. }) => Err(err.at_rule(rule_index)),
            Err(err @ ConversionError::Failed { .. }) => {
                self.issue(rule_index, err.at_rule(rule_index));
                Ok(None)
            }
        }
    }

    /// Records of `chunk` accepted by the rule's match step
    fn select<'c>(
        &mut self,
        rule_index: usize,
        rule: &ServiceConstructPathEntry,
        chunk: &'c [Record],
        seed: &Value,
    ) -> Vec<&'c Record> {
        let field = &rule.key_dest_name;

        if rule.match_type == MatchType::Partial && seed.as_str().is_none() {
            self.issue(
                rule_index,
                NetprintError::TypeMismatch {
                    rule_index,
                    field: rule.key_source_name.clone(),
                    expected: "string".to_string(),
                    found: seed.type_name().to_string(),
                },
            );
            return Vec::new();
        }

        let mut selected = Vec::new();
        let mut mismatched: Option<&'static str> = None;
        let mut mismatches = 0usize;

        for record in chunk {
            let value = match record.get(field) {
                Some(v) if !v.is_null() => v,
                _ => continue,
            };
            let accepted = match rule.match_type {
                MatchType::Full => {
                    if value.value_type() != seed.value_type() {
                        mismatched.get_or_insert(value.type_name());
                        mismatches += 1;
                        continue;
                    }
                    value == seed
                }
                MatchType::Partial => match (value.as_str(), seed.as_str()) {
                    (Some(v), Some(s)) => v.contains(s) || s.contains(v),
                    _ => {
                        mismatched.get_or_insert(value.type_name());
                        mismatches += 1;
                        continue;
                    }
                },
                MatchType::NoMatch => true,
            };
            if accepted {
                selected.push(record);
            }
        }

        if let Some(found) = mismatched {
            let expected = seed.type_name().to_string();
            let err = ExError::from(NetprintError::TypeMismatch {
                rule_index,
                field: field.clone(),
                expected,
                found: found.to_string(),
            });
            let message = format!("{} ({} records skipped)", err.message(), mismatches);
            self.push_issue(rule_index, err.with_message(message));
        }

        selected
    }

    fn issue(&mut self, rule_index: usize, err: NetprintError) {
        self.push_issue(rule_index, ExError::from(err));
    }

    fn push_issue(&mut self, rule_index: usize, err: ExError) {
        let err = err
            .with_op("extract")
            .with_device(&self.device.device_name)
            .with_key(self.key)
            .with_rule_index(rule_index);
        self.issues.push(err);
    }
}

/// Copy each present field of `record` named in `keys` into `data`
fn copy_fields(keys: &[String], prefix: &str, postfix: &str, record: &Record, data: &mut Data) {
    for key in keys {
        if let Some(value) = record.get(key) {
            data.insert(field_name(prefix, key, postfix), value.clone());
        }
    }
}
