//! Declarative extraction rules and their load-time validation
//!
//! A rule list is an ordered program: later rules may read fields written
//! by earlier ones. `RuleSet::new` checks that contract once so the
//! interpreter never discovers an ordering mistake at runtime.

use crate::conversion::ConversionRegistry;
use crate::errors::{NetprintError, Result};
use crate::value::ValueType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How a rule obtains its seed value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Linkage {
    /// The seed is the extraction key itself
    Direct,
    /// The seed is a field written by an earlier rule
    Indirect,
    /// The rule has no seed
    #[default]
    NoLink,
}

/// How candidate records are selected from the rule's chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchType {
    /// `record[KeyDestName] == seed`
    Full,
    /// Symmetric substring containment between `record[KeyDestName]` and seed
    Partial,
    /// Every record in the chunk
    #[default]
    NoMatch,
}

/// Capture of a field's distinct values under a label for later split-search
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Filter {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Key", default)]
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSearchDirective {
    /// Label of a captured filter
    #[serde(rename = "SearchFrom")]
    pub search_from: String,
    /// Record field compared against each captured value
    #[serde(rename = "SearchFor")]
    pub search_for: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SplitSearchEntry {
    #[serde(rename = "SplitSearchKeys", default)]
    pub keys: Vec<String>,
    #[serde(rename = "SplitSearchDirectives", default)]
    pub directives: Vec<SplitSearchDirective>,
    #[serde(rename = "SplitSearchKeysPrefix", default)]
    pub keys_prefix: String,
}

/// Aggregate copied keys per distinct value of an option field
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CombineBy {
    #[serde(rename = "CombineByOptionName")]
    pub option_name: String,
    #[serde(rename = "CombineByOptionKeys", default)]
    pub option_keys: Vec<String>,
}

/// One extraction rule
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServiceConstructPathEntry {
    #[serde(rename = "ChunkName")]
    pub chunk_name: String,
    #[serde(rename = "KeySourceName", alias = "KeySName", default)]
    pub key_source_name: String,
    #[serde(
        rename = "KeySourceType",
        alias = "KeySType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub key_source_type: Option<ValueType>,
    #[serde(rename = "KeyDestName", alias = "KeyDName", default)]
    pub key_dest_name: String,
    #[serde(
        rename = "KeyDestType",
        alias = "KeyDType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub key_dest_type: Option<ValueType>,
    #[serde(rename = "Linkage", alias = "KeyLink", default)]
    pub linkage: Linkage,
    #[serde(rename = "MatchType", default)]
    pub match_type: MatchType,
    #[serde(rename = "CommonKeysList", default)]
    pub common_keys: Vec<String>,
    #[serde(rename = "CommonKeysListPrefix", default)]
    pub common_keys_prefix: String,
    #[serde(rename = "Filter", default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(rename = "SplitSearch", default)]
    pub split_search: Vec<SplitSearchEntry>,
    #[serde(rename = "CombineBy", default, skip_serializing_if = "Option::is_none")]
    pub combine_by: Option<CombineBy>,
}

impl ServiceConstructPathEntry {
    /// Declared (source, destination) conversion pair, when both types are set
    pub fn conversion(&self) -> Option<(ValueType, ValueType)> {
        self.key_source_type.zip(self.key_dest_type)
    }

    /// True when the rule filters its chunk against a seed value
    pub fn has_match_step(&self) -> bool {
        self.match_type != MatchType::NoMatch
    }

    /// The configured filter, ignoring an empty placeholder object
    pub fn active_filter(&self) -> Option<&Filter> {
        self.filter.as_ref().filter(|f| !f.name.is_empty())
    }
}

/// Name under which a copied value is stored in `Data`
pub fn field_name(prefix: &str, name: &str, postfix: &str) -> String {
    if prefix.is_empty() {
        format!("{}{}", name, postfix)
    } else {
        format!("{}.{}{}", prefix, name, postfix)
    }
}

/// Fields written by the rules seen so far
#[derive(Debug, Default)]
struct WrittenFields {
    exact: BTreeSet<String>,
    /// Stems of fields written with a dynamic `.value` postfix
    dynamic: BTreeSet<String>,
}

impl WrittenFields {
    fn contains(&self, field: &str) -> bool {
        self.exact.contains(field) || self.dynamic.iter().any(|stem| field.starts_with(stem.as_str()))
    }

    fn record(&mut self, rule: &ServiceConstructPathEntry) {
        for key in &rule.common_keys {
            self.exact
                .insert(field_name(&rule.common_keys_prefix, key, ""));
        }
        for entry in &rule.split_search {
            for key in &entry.keys {
                self.dynamic
                    .insert(field_name(&entry.keys_prefix, key, "."));
            }
        }
        if let Some(combine) = &rule.combine_by {
            for key in &combine.option_keys {
                self.dynamic.insert(format!("{}.", key));
            }
        }
    }
}

/// An ordered, validated rule list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<ServiceConstructPathEntry>,
}

impl RuleSet {
    /// Validate `rules` and wrap them for the interpreter.
    ///
    /// `known_chunks` is the set of chunk names the service declares; pass
    /// `None` when chunk definitions are not available.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error found, labeled with the
    /// offending rule index.
    pub fn new(
        rules: Vec<ServiceConstructPathEntry>,
        registry: &ConversionRegistry,
        known_chunks: Option<&BTreeSet<String>>,
    ) -> Result<Self> {
        let mut written = WrittenFields::default();
        let mut captured: BTreeSet<&str> = BTreeSet::new();

        for (rule_index, rule) in rules.iter().enumerate() {
            if rule.chunk_name.is_empty() {
                return Err(NetprintError::InvalidRule {
                    rule_index,
                    reason: "ChunkName is empty".to_string(),
                });
            }
            if let Some(known) = known_chunks {
                if !known.contains(&rule.chunk_name) {
                    return Err(NetprintError::UnknownChunk {
                        rule_index,
                        chunk_name: rule.chunk_name.clone(),
                    });
                }
            }

            if rule.has_match_step() {
                validate_match_step(rule_index, rule, registry, &written)?;
            }

            if let Some(filter) = rule.active_filter() {
                captured.insert(filter.name.as_str());
            }

            for entry in &rule.split_search {
                let directives = entry.directives.len();
                if !(1..=2).contains(&directives) {
                    return Err(NetprintError::InvalidSplitSearch {
                        rule_index,
                        directives,
                    });
                }
                if let Some(missing) = entry
                    .directives
                    .iter()
                    .find(|d| !captured.contains(d.search_from.as_str()))
                {
                    return Err(NetprintError::UnknownFilter {
                        rule_index,
                        filter: missing.search_from.clone(),
                    });
                }
            }

            if let Some(combine) = &rule.combine_by {
                if combine.option_name.is_empty() {
                    return Err(NetprintError::InvalidRule {
                        rule_index,
                        reason: "CombineByOptionName is empty".to_string(),
                    });
                }
            }

            written.record(rule);
        }

        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[ServiceConstructPathEntry] {
        &self.rules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ServiceConstructPathEntry> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn validate_match_step(
    rule_index: usize,
    rule: &ServiceConstructPathEntry,
    registry: &ConversionRegistry,
    written: &WrittenFields,
) -> Result<()> {
    if rule.key_dest_name.is_empty() {
        return Err(NetprintError::InvalidRule {
            rule_index,
            reason: "a match step needs KeyDestName".to_string(),
        });
    }
    if rule.match_type == MatchType::Partial
        && rule.key_dest_type.is_some_and(|t| t != ValueType::String)
    {
        return Err(NetprintError::InvalidRule {
            rule_index,
            reason: "partial match compares strings; KeyDestType must be string".to_string(),
        });
    }
    if let Some((from, to)) = rule.conversion() {
        if !registry.is_registered(from, to) {
            return Err(NetprintError::UnregisteredConversion {
                rule_index,
                from,
                to,
            });
        }
    }

    match rule.linkage {
        Linkage::Direct => Ok(()),
        Linkage::Indirect => {
            if rule.key_source_name.is_empty() {
                return Err(NetprintError::InvalidRule {
                    rule_index,
                    reason: "indirect linkage needs KeySourceName".to_string(),
                });
            }
            if !written.contains(&rule.key_source_name) {
                return Err(NetprintError::RuleOrderViolation {
                    rule_index,
                    field: rule.key_source_name.clone(),
                });
            }
            Ok(())
        }
        Linkage::NoLink => Err(NetprintError::InvalidRule {
            rule_index,
            reason: "a match step needs direct or indirect linkage".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(json: &str) -> ServiceConstructPathEntry {
        serde_json::from_str(json).unwrap()
    }

    fn direct_bd() -> ServiceConstructPathEntry {
        rule(
            r#"{"ChunkName": "bd", "KeySType": "string", "KeyDName": "l2BD.accEncap",
                "KeyDType": "string", "KeyLink": "direct", "MatchType": "full",
                "CommonKeysList": ["l2BD.id", "l2BD.name"]}"#,
        )
    }

    #[test]
    fn test_legacy_key_names_accepted() {
        let r = direct_bd();
        assert_eq!(r.linkage, Linkage::Direct);
        assert_eq!(r.match_type, MatchType::Full);
        assert_eq!(r.key_dest_name, "l2BD.accEncap");
        assert_eq!(r.conversion(), Some((ValueType::String, ValueType::String)));
    }

    #[test]
    fn test_empty_filter_object_is_inactive() {
        let r = rule(r#"{"ChunkName": "bd", "Filter": {"Name": "", "Key": ""}}"#);
        assert!(r.filter.is_some());
        assert!(r.active_filter().is_none());
    }

    #[test]
    fn test_field_name() {
        assert_eq!(field_name("", "l2BD.id", ""), "l2BD.id");
        assert_eq!(field_name("evpn", "rt", ".v10"), "evpn.rt.v10");
    }

    #[test]
    fn test_indirect_reads_earlier_common_key() {
        let second = rule(
            r#"{"ChunkName": "svi", "KeySName": "l2BD.id", "KeyDName": "sviIf.vlan",
                "KeyLink": "indirect", "MatchType": "full", "CommonKeysList": ["sviIf.id"]}"#,
        );
        let set = RuleSet::new(
            vec![direct_bd(), second],
            &ConversionRegistry::with_defaults(),
            None,
        )
        .unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_indirect_before_writer_is_rejected() {
        let reader = rule(
            r#"{"ChunkName": "svi", "KeySName": "l2BD.id", "KeyDName": "sviIf.vlan",
                "KeyLink": "indirect", "MatchType": "full"}"#,
        );
        let err = RuleSet::new(
            vec![reader, direct_bd()],
            &ConversionRegistry::with_defaults(),
            None,
        )
        .unwrap_err();
        assert_eq!(
            err,
            NetprintError::RuleOrderViolation {
                rule_index: 0,
                field: "l2BD.id".to_string()
            }
        );
    }

    #[test]
    fn test_indirect_reads_split_search_output_by_stem() {
        let writer = rule(
            r#"{"ChunkName": "evpn", "Filter": {"Name": "af", "Key": "rttp.type"},
                "SplitSearch": [{"SplitSearchKeys": ["rtt.rtt"],
                                 "SplitSearchDirectives": [{"SearchFrom": "af", "SearchFor": "rttp.type"}],
                                 "SplitSearchKeysPrefix": "evpn"}]}"#,
        );
        let reader = rule(
            r#"{"ChunkName": "evpn", "KeySName": "evpn.rtt.rtt.import", "KeyDName": "rtt.rtt",
                "KeyLink": "indirect", "MatchType": "full"}"#,
        );
        assert!(RuleSet::new(vec![writer, reader], &ConversionRegistry::empty(), None).is_ok());
    }

    #[test]
    fn test_unregistered_conversion_rejected() {
        let r = rule(
            r#"{"ChunkName": "bd", "KeySType": "string", "KeyDName": "l2BD.id",
                "KeyDType": "integer", "KeyLink": "direct", "MatchType": "full"}"#,
        );
        let err = RuleSet::new(vec![r], &ConversionRegistry::empty(), None).unwrap_err();
        assert!(matches!(
            err,
            NetprintError::UnregisteredConversion { rule_index: 0, .. }
        ));
    }

    #[test]
    fn test_unknown_chunk_rejected() {
        let known: BTreeSet<String> = ["evpn".to_string()].into_iter().collect();
        let err = RuleSet::new(
            vec![direct_bd()],
            &ConversionRegistry::with_defaults(),
            Some(&known),
        )
        .unwrap_err();
        assert_eq!(
            err,
            NetprintError::UnknownChunk {
                rule_index: 0,
                chunk_name: "bd".to_string()
            }
        );
    }

    #[test]
    fn test_split_search_arity_and_filter_checked() {
        let three = rule(
            r#"{"ChunkName": "evpn", "Filter": {"Name": "af", "Key": "k"},
                "SplitSearch": [{"SplitSearchKeys": ["x"], "SplitSearchDirectives": [
                    {"SearchFrom": "af", "SearchFor": "a"},
                    {"SearchFrom": "af", "SearchFor": "b"},
                    {"SearchFrom": "af", "SearchFor": "c"}]}]}"#,
        );
        assert_eq!(
            RuleSet::new(vec![three], &ConversionRegistry::empty(), None).unwrap_err(),
            NetprintError::InvalidSplitSearch {
                rule_index: 0,
                directives: 3
            }
        );

        let uncaptured = rule(
            r#"{"ChunkName": "evpn",
                "SplitSearch": [{"SplitSearchKeys": ["x"], "SplitSearchDirectives": [
                    {"SearchFrom": "af", "SearchFor": "a"}]}]}"#,
        );
        assert_eq!(
            RuleSet::new(vec![uncaptured], &ConversionRegistry::empty(), None).unwrap_err(),
            NetprintError::UnknownFilter {
                rule_index: 0,
                filter: "af".to_string()
            }
        );
    }

    #[test]
    fn test_match_without_linkage_rejected() {
        let r = rule(r#"{"ChunkName": "bd", "KeyDName": "x", "MatchType": "partial"}"#);
        assert!(matches!(
            RuleSet::new(vec![r], &ConversionRegistry::empty(), None),
            Err(NetprintError::InvalidRule { rule_index: 0, .. })
        ));
    }
}
