//! Split-search probe construction

use super::filter::FilterDb;
use crate::rule::SplitSearchDirective;
use crate::value::{Record, Value};

/// A set of field/value pairs a record must carry, plus the postfix used to
/// name the fields copied from matching records
#[derive(Debug, Clone, PartialEq)]
pub struct Probe {
    pub pairs: Vec<(String, Value)>,
    pub postfix: String,
}

impl Probe {
    /// True when the record carries every pair of the probe
    pub fn matches(&self, record: &Record) -> bool {
        self.pairs
            .iter()
            .all(|(field, value)| record.get(field) == Some(value))
    }
}

/// Build the probes for one directive set.
///
/// Produces the cross product of the value lists captured under each
/// directive's `SearchFrom`, in row-major order (the first directive varies
/// slowest). Each probe's postfix is `.v1` or `.v1.v2`. An uncaptured filter
/// contributes an empty list and therefore no probes.
pub fn build_probes(directives: &[SplitSearchDirective], filters: &FilterDb) -> Vec<Probe> {
    if directives.is_empty() {
        return Vec::new();
    }

    let mut probes = vec![Probe {
        pairs: Vec::with_capacity(directives.len()),
        postfix: String::new(),
    }];

    for directive in directives {
        let values = filters.values(&directive.search_from);
        let mut next = Vec::with_capacity(probes.len() * values.len());
        for probe in &probes {
            for value in values {
                let mut pairs = probe.pairs.clone();
                pairs.push((directive.search_for.clone(), value.clone()));
                next.push(Probe {
                    pairs,
                    postfix: format!("{}.{}", probe.postfix, value),
                });
            }
        }
        probes = next;
    }

    probes
}
