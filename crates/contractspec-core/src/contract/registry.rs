//! Registries of canonical specs and their file format.
//!
//! A registry file is a JSON or YAML document holding every registry; the
//! operation list is keyed internally by `name.v{version}`.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::OperationSpec;
use crate::error::{Error, Result};
use crate::schema::SchemaModel;

/// Operation specs keyed by `name.v{version}`, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<OperationSpec>", into = "Vec<OperationSpec>")]
pub struct OperationRegistry {
    specs: IndexMap<String, OperationSpec>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a spec; a second spec with the same key is rejected
    pub fn register(&mut self, spec: OperationSpec) -> Result<()> {
        let key = spec.key();
        if self.specs.contains_key(&key) {
            return Err(Error::DuplicateSpec(key));
        }
        self.specs.insert(key, spec);
        Ok(())
    }

    /// Insert or replace a spec, returning the previous one
    pub fn upsert(&mut self, spec: OperationSpec) -> Option<OperationSpec> {
        self.specs.insert(spec.key(), spec)
    }

    pub fn remove(&mut self, key: &str) -> Option<OperationSpec> {
        self.specs.shift_remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&OperationSpec> {
        self.specs.get(key)
    }

    /// Highest version registered under a canonical name
    pub fn latest(&self, name: &str) -> Option<&OperationSpec> {
        self.specs
            .values()
            .filter(|spec| spec.meta.name == name)
            .max_by_key(|spec| spec.meta.version)
    }

    pub fn specs(&self) -> &IndexMap<String, OperationSpec> {
        &self.specs
    }

    pub fn iter(&self) -> impl Iterator<Item = &OperationSpec> {
        self.specs.values()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl TryFrom<Vec<OperationSpec>> for OperationRegistry {
    type Error = Error;

    fn try_from(specs: Vec<OperationSpec>) -> Result<Self> {
        let mut registry = Self::new();
        for spec in specs {
            registry.register(spec)?;
        }
        Ok(registry)
    }
}

impl From<OperationRegistry> for Vec<OperationSpec> {
    fn from(registry: OperationRegistry) -> Self {
        registry.specs.into_values().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSpec {
    pub name: String,
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<SchemaModel>,
}

/// A product feature grouping operations, events and presentations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSpec {
    pub key: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Operation registry keys
    #[serde(default)]
    pub operations: Vec<String>,
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub presentations: Vec<String>,
}

/// Entry of the presentation, form, data-view and workflow registries.
///
/// These are carried through export verbatim, so only the identifying
/// fields are typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorSpec {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub details: IndexMap<String, JsonValue>,
}

fn default_version() -> u32 {
    1
}

pub type PresentationSpec = DescriptorSpec;
pub type FormSpec = DescriptorSpec;
pub type DataViewSpec = DescriptorSpec;
pub type WorkflowSpec = DescriptorSpec;

/// Every registry the exporter understands
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRegistries {
    #[serde(default)]
    pub operations: OperationRegistry,
    #[serde(default)]
    pub events: Vec<EventSpec>,
    #[serde(default)]
    pub features: Vec<FeatureSpec>,
    #[serde(default)]
    pub presentations: Vec<PresentationSpec>,
    #[serde(default)]
    pub forms: Vec<FormSpec>,
    #[serde(default, alias = "dataviews")]
    pub data_views: Vec<DataViewSpec>,
    #[serde(default)]
    pub workflows: Vec<WorkflowSpec>,
}

impl ContractRegistries {
    pub fn with_operations(operations: OperationRegistry) -> Self {
        Self {
            operations,
            ..Default::default()
        }
    }

    /// Load registries from a JSON or YAML file, chosen by extension
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        if is_json(path) {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }

    /// Write registries to a JSON or YAML file, chosen by extension
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            serde_yaml::to_string(self)?
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}
