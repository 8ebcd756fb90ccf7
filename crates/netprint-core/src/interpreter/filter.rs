//! Per-extraction side table of captured filter values

use crate::value::{Record, Value};

/// Value recorded when a filtered record lacks the filter's key
pub const NOT_EXISTS: &str = "not-exists";

#[derive(Debug, Clone, PartialEq)]
pub struct FilterEntry {
    pub name: String,
    pub values: Vec<Value>,
}

/// Captured filter values, scoped to one `extract` call.
///
/// Values are never `Null`: an absent or null field is captured as the
/// `not-exists` sentinel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterDb {
    entries: Vec<FilterEntry>,
}

impl FilterDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the distinct values of `key` across `records`, in first-seen order
    pub fn capture<'a>(
        &mut self,
        name: &str,
        key: &str,
        records: impl IntoIterator<Item = &'a Record>,
    ) {
        let mut values: Vec<Value> = Vec::new();
        for record in records {
            let value = match record.get(key) {
                Some(v) if !v.is_null() => v.clone(),
                _ => Value::from(NOT_EXISTS),
            };
            if !values.contains(&value) {
                values.push(value);
            }
        }
        self.entries.push(FilterEntry {
            name: name.to_string(),
            values,
        });
    }

    /// Values captured under `name`; the most recent capture wins
    pub fn values(&self, name: &str) -> &[Value] {
        self.entries
            .iter()
            .rev()
            .find(|e| e.name == name)
            .map(|e| e.values.as_slice())
            .unwrap_or(&[])
    }

    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }
}
