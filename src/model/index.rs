use serde::{Deserialize, Serialize};

use super::item::ComponentType;

/// Summary entry in a registry's `registry.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ComponentType,
    #[serde(default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub registry_dependencies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegistryIndex {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub items: Vec<IndexEntry>,
}

impl RegistryIndex {
    pub fn get(&self, name: &str) -> Option<&IndexEntry> {
        self.items.iter().find(|e| e.name == name)
    }

    pub fn list(&self, kind: Option<ComponentType>) -> Vec<&IndexEntry> {
        self.items
            .iter()
            .filter(|e| kind.is_none_or(|k| e.kind == k))
            .collect()
    }
}
