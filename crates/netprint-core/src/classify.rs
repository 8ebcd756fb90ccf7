//! Service-type classifier
//!
//! Scores a component bitmap against a catalog of type definitions and
//! picks the best match. Ties go to the definition declared first.

use crate::component::{bit, ComponentBit, ServiceFootprintEntry};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Classification of a bitmap with no true component
pub const NOT_EXIST: &str = "not-exist";
/// Classification when no definition qualifies
pub const NOT_DEFINED: &str = "not-defined";

/// A named target bitmap pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTypeDefinition {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Components", default)]
    pub components: BTreeMap<String, bool>,
}

impl ServiceTypeDefinition {
    /// Count of components the definition expects to be true
    pub fn weight(&self) -> usize {
        self.components.values().filter(|expected| **expected).count()
    }

    /// Score against `bitmap`, or `None` when any named component disagrees.
    ///
    /// A component the bitmap does not carry counts as a disagreement.
    pub fn score(&self, bitmap: &[ComponentBit]) -> Option<usize> {
        let qualifies = self
            .components
            .iter()
            .all(|(name, expected)| bit(bitmap, name) == Some(*expected));
        qualifies.then(|| self.weight())
    }
}

/// The type definitions of one service family, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTypeCatalog {
    #[serde(rename = "Family", default)]
    pub family: String,
    #[serde(rename = "Definitions", default)]
    pub definitions: Vec<ServiceTypeDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Defined(String),
    NotExist,
    NotDefined,
}

impl Classification {
    pub fn as_str(&self) -> &str {
        match self {
            Classification::Defined(name) => name,
            Classification::NotExist => NOT_EXIST,
            Classification::NotDefined => NOT_DEFINED,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Classification {
    fn from(s: &str) -> Self {
        match s {
            NOT_EXIST => Classification::NotExist,
            NOT_DEFINED => Classification::NotDefined,
            name => Classification::Defined(name.to_string()),
        }
    }
}

impl Serialize for Classification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Classification {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Classification::from(s.as_str()))
    }
}

/// Best-matching type for one bitmap
pub fn classify(bitmap: &[ComponentBit], catalog: &ServiceTypeCatalog) -> Classification {
    if bitmap.iter().all(|b| !b.value) {
        return Classification::NotExist;
    }

    let mut best: Option<(&ServiceTypeDefinition, usize)> = None;
    for definition in &catalog.definitions {
        let Some(score) = definition.score(bitmap) else {
            continue;
        };
        if best.map_or(true, |(_, lead)| score > lead) {
            best = Some((definition, score));
        }
    }

    best.map_or(Classification::NotDefined, |(definition, _)| {
        Classification::Defined(definition.name.clone())
    })
}

/// Classification for one key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTypeEntry {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "ServiceType")]
    pub service_type: Classification,
}

/// Classifications for every key of one device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceServiceTypes {
    #[serde(rename = "DeviceName")]
    pub device_name: String,
    #[serde(rename = "ServiceTypes", default)]
    pub service_types: Vec<ServiceTypeEntry>,
}

pub type ServiceTypeDb = Vec<DeviceServiceTypes>;

/// Classify every (device, key) bitmap of a service footprint
pub fn classify_footprint(
    service_footprint: &[ServiceFootprintEntry],
    catalog: &ServiceTypeCatalog,
) -> ServiceTypeDb {
    service_footprint
        .iter()
        .map(|device| DeviceServiceTypes {
            device_name: device.device_name.clone(),
            service_types: device
                .service_layouts
                .iter()
                .map(|layout| ServiceTypeEntry {
                    key: layout.key.clone(),
                    service_type: classify(&layout.data, catalog),
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ServiceLayout;

    fn bitmap(bits: &[(&str, bool)]) -> Vec<ComponentBit> {
        bits.iter()
            .map(|(name, value)| ComponentBit {
                name: name.to_string(),
                value: *value,
            })
            .collect()
    }

    fn definition(name: &str, components: &[(&str, bool)]) -> ServiceTypeDefinition {
        ServiceTypeDefinition {
            name: name.to_string(),
            components: components
                .iter()
                .map(|(c, v)| (c.to_string(), *v))
                .collect(),
        }
    }

    fn vni_catalog() -> ServiceTypeCatalog {
        ServiceTypeCatalog {
            family: "VNI".to_string(),
            definitions: vec![
                definition("L2VNI-IR", &[("L2VNI", true), ("IR", true), ("PIM", false)]),
                definition("L2VNI-PIM", &[("L2VNI", true), ("PIM", true), ("IR", false)]),
                definition("L2VNI", &[("L2VNI", true)]),
                definition("L2VNI-IR-AGW", &[("L2VNI", true), ("IR", true), ("AGW", true)]),
            ],
        }
    }

    #[test]
    fn test_all_false_is_not_exist() {
        let bm = bitmap(&[("L2VNI", false), ("IR", false)]);
        assert_eq!(classify(&bm, &vni_catalog()), Classification::NotExist);
        assert_eq!(classify(&bm, &ServiceTypeCatalog::default()), Classification::NotExist);
    }

    #[test]
    fn test_richest_definition_wins() {
        let bm = bitmap(&[("L2VNI", true), ("IR", true), ("PIM", false), ("AGW", true)]);
        assert_eq!(
            classify(&bm, &vni_catalog()),
            Classification::Defined("L2VNI-IR-AGW".to_string())
        );
    }

    #[test]
    fn test_false_assertion_disqualifies() {
        let bm = bitmap(&[("L2VNI", true), ("IR", true), ("PIM", true), ("AGW", false)]);
        // L2VNI-IR expects PIM false, L2VNI-PIM expects IR false
        assert_eq!(
            classify(&bm, &vni_catalog()),
            Classification::Defined("L2VNI".to_string())
        );
    }

    #[test]
    fn test_tie_goes_to_first_declared() {
        let catalog = ServiceTypeCatalog {
            family: "VNI".to_string(),
            definitions: vec![
                definition("first", &[("A", true)]),
                definition("second", &[("B", true)]),
            ],
        };
        let bm = bitmap(&[("A", true), ("B", true)]);
        assert_eq!(classify(&bm, &catalog), Classification::Defined("first".to_string()));
    }

    #[test]
    fn test_no_qualifier_is_not_defined() {
        let bm = bitmap(&[("L2VNI", false), ("IR", true)]);
        assert_eq!(classify(&bm, &vni_catalog()), Classification::NotDefined);
    }

    #[test]
    fn test_missing_component_disqualifies() {
        let catalog = ServiceTypeCatalog {
            family: "VNI".to_string(),
            definitions: vec![definition("needs-x", &[("X", false)])],
        };
        assert_eq!(
            classify(&bitmap(&[("A", true)]), &catalog),
            Classification::NotDefined
        );
    }

    #[test]
    fn test_classification_serializes_as_string() {
        assert_eq!(
            serde_json::to_string(&Classification::NotExist).unwrap(),
            "\"not-exist\""
        );
        assert_eq!(
            serde_json::to_string(&Classification::Defined("L2VNI".into())).unwrap(),
            "\"L2VNI\""
        );
        let back: Classification = serde_json::from_str("\"not-defined\"").unwrap();
        assert_eq!(back, Classification::NotDefined);
    }

    #[test]
    fn test_classify_footprint() {
        let sfp = vec![ServiceFootprintEntry {
            device_name: "leaf-1".to_string(),
            service_layouts: vec![
                ServiceLayout {
                    key: "100".to_string(),
                    data: bitmap(&[("L2VNI", true), ("IR", false), ("PIM", false), ("AGW", false)]),
                },
                ServiceLayout {
                    key: "200".to_string(),
                    data: bitmap(&[("L2VNI", false), ("IR", false), ("PIM", false), ("AGW", false)]),
                },
            ],
        }];
        let db = classify_footprint(&sfp, &vni_catalog());
        assert_eq!(db[0].service_types[0].service_type.as_str(), "L2VNI");
        assert_eq!(db[0].service_types[1].service_type, Classification::NotExist);
    }
}
