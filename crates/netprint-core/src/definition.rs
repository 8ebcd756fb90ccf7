//! Service definitions
//!
//! A service definition bundles everything needed to model one service
//! family: the chunks to collect, the extraction rules, the service
//! components and the service-type catalog. It is loaded from JSON or YAML
//! and validated once by `compile` before any extraction runs.

use crate::classify::{ServiceTypeCatalog, NOT_DEFINED, NOT_EXIST};
use crate::component::ServiceComponent;
use crate::conversion::ConversionRegistry;
use crate::errors::{NetprintError, Result};
use crate::rule::{RuleSet, ServiceConstructPathEntry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRef {
    #[serde(rename = "Path")]
    pub path: String,
}

/// A chunk and the flattener paths that fill it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkDefinition {
    #[serde(rename = "ChunkName")]
    pub chunk_name: String,
    #[serde(rename = "Paths", default)]
    pub paths: Vec<PathRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    #[serde(rename = "ServiceName")]
    pub service_name: String,
    #[serde(rename = "DMEProcessing", default)]
    pub dme_processing: Vec<ChunkDefinition>,
    #[serde(rename = "ServiceConstructPath", default)]
    pub service_construct_path: Vec<ServiceConstructPathEntry>,
    #[serde(rename = "ServiceComponents", default)]
    pub service_components: Vec<ServiceComponent>,
    #[serde(rename = "ServiceTypes", default)]
    pub service_types: ServiceTypeCatalog,
}

/// A validated service definition, ready for extraction
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledService {
    pub name: String,
    pub rules: RuleSet,
    pub components: Vec<ServiceComponent>,
    pub catalog: ServiceTypeCatalog,
}

impl CompiledService {
    /// Component names in declaration order
    pub fn component_names(&self) -> Vec<String> {
        self.components.iter().map(|c| c.name.clone()).collect()
    }
}

impl ServiceDefinition {
    /// # Errors
    ///
    /// Returns `Serialization` when the text is not a valid definition.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// # Errors
    ///
    /// Returns `Serialization` when the text is not a valid definition.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a definition file; `.yaml`/`.yml` are read as YAML, anything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns `Io` when the file cannot be read and `Serialization` when
    /// it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| NetprintError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        if is_yaml {
            Self::from_yaml_str(&text)
        } else {
            Self::from_json_str(&text)
        }
    }

    /// Chunk names declared in `DMEProcessing`, or `None` when it is empty
    pub fn known_chunks(&self) -> Option<BTreeSet<String>> {
        if self.dme_processing.is_empty() {
            return None;
        }
        Some(
            self.dme_processing
                .iter()
                .map(|c| c.chunk_name.clone())
                .collect(),
        )
    }

    /// Validate the definition and produce a `CompiledService`.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error: an invalid rule list, a
    /// duplicate or empty component, a type definition naming an unknown
    /// component, a duplicate type name, or a type name reserved for the
    /// classification sentinels.
    pub fn compile(&self, registry: &ConversionRegistry) -> Result<CompiledService> {
        if self.service_name.trim().is_empty() {
            return Err(NetprintError::InvalidDefinition {
                reason: "ServiceName is empty".to_string(),
            });
        }

        let known = self.known_chunks();
        let rules = RuleSet::new(
            self.service_construct_path.clone(),
            registry,
            known.as_ref(),
        )?;

        let mut component_names = BTreeSet::new();
        for component in &self.service_components {
            if !component_names.insert(component.name.as_str()) {
                return Err(NetprintError::DuplicateComponent {
                    name: component.name.clone(),
                });
            }
            if component.keys.is_empty() {
                return Err(NetprintError::EmptyComponent {
                    name: component.name.clone(),
                });
            }
        }

        let mut type_names = BTreeSet::new();
        for definition in &self.service_types.definitions {
            if definition.name == NOT_EXIST || definition.name == NOT_DEFINED {
                return Err(NetprintError::ReservedServiceType {
                    name: definition.name.clone(),
                });
            }
            if !type_names.insert(definition.name.as_str()) {
                return Err(NetprintError::DuplicateServiceType {
                    name: definition.name.clone(),
                });
            }
            if let Some(unknown) = definition
                .components
                .keys()
                .find(|c| !component_names.contains(c.as_str()))
            {
                return Err(NetprintError::UnknownComponent {
                    type_name: definition.name.clone(),
                    component: unknown.clone(),
                });
            }
        }

        let mut catalog = self.service_types.clone();
        if catalog.family.is_empty() {
            catalog.family = self.service_name.clone();
        }

        Ok(CompiledService {
            name: self.service_name.clone(),
            rules,
            components: self.service_components.clone(),
            catalog,
        })
    }
}
