//! Service component evaluation
//!
//! A service component is a named conjunction of predicates over one
//! extracted `Data` record. Evaluating every component of a service yields
//! a bitmap with one entry per component, in declaration order.

use crate::footprint::DeviceFootprintEntry;
use crate::value::{Data, Value};
use serde::{Deserialize, Serialize};

/// Expected value that accepts any present field
pub const ANY_VALUE: &str = "anyValue";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentMatch {
    /// The field is present and equals `Value` (or `Value` is `anyValue`)
    Equal,
    /// The field is present and differs from `Value`
    NotEqual,
    /// Some field name contains `Name` as a substring
    Subkey,
}

/// A single predicate against a `Data` record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentKey {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value", default)]
    pub value: Value,
    #[serde(rename = "MatchType")]
    pub match_type: ComponentMatch,
}

impl ComponentKey {
    pub fn holds(&self, data: &Data) -> bool {
        match self.match_type {
            ComponentMatch::Subkey => data.keys().any(|k| k.contains(self.name.as_str())),
            ComponentMatch::Equal => data.get(&self.name).is_some_and(|v| {
                *v == self.value || self.value.as_str() == Some(ANY_VALUE)
            }),
            ComponentMatch::NotEqual => data.get(&self.name).is_some_and(|v| *v != self.value),
        }
    }
}

/// A named predicate that holds iff all of its keys hold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceComponent {
    #[serde(rename = "ComponentName")]
    pub name: String,
    #[serde(rename = "ComponentKeys", default)]
    pub keys: Vec<ComponentKey>,
}

impl ServiceComponent {
    pub fn holds(&self, data: &Data) -> bool {
        self.keys.iter().all(|key| key.holds(data))
    }
}

/// One bitmap entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentBit {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: bool,
}

pub type ServiceComponentBitmap = Vec<ComponentBit>;

/// Value of a named bit, if the bitmap has it
pub fn bit(bitmap: &[ComponentBit], name: &str) -> Option<bool> {
    bitmap.iter().find(|b| b.name == name).map(|b| b.value)
}

/// Bitmap for one key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLayout {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Data")]
    pub data: ServiceComponentBitmap,
}

/// Bitmaps for every key of one device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceFootprintEntry {
    #[serde(rename = "DeviceName")]
    pub device_name: String,
    #[serde(rename = "ServiceLayouts", default)]
    pub service_layouts: Vec<ServiceLayout>,
}

pub type ServiceFootprintDb = Vec<ServiceFootprintEntry>;

/// Evaluate every component against one record
pub fn evaluate(components: &[ServiceComponent], data: &Data) -> ServiceComponentBitmap {
    components
        .iter()
        .map(|component| ComponentBit {
            name: component.name.clone(),
            value: component.holds(data),
        })
        .collect()
}

/// Evaluate every component for every (device, key) of a footprint
pub fn build_service_footprint(
    components: &[ServiceComponent],
    footprint: &[DeviceFootprintEntry],
) -> ServiceFootprintDb {
    footprint
        .iter()
        .map(|device| ServiceFootprintEntry {
            device_name: device.device_name.clone(),
            service_layouts: device
                .device_data
                .iter()
                .map(|entry| ServiceLayout {
                    key: entry.key.clone(),
                    data: evaluate(components, &entry.data),
                })
                .collect(),
        })
        .collect()
}
