use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::item::ComponentType;
use super::reference::DEFAULT_NAMESPACE;

pub const DEFAULT_REGISTRY_URL: &str = "https://kitn-ai.github.io/registry/r/{type}/{name}.json";

pub const SCHEMA_URL: &str = "https://kitn.dev/schema/config.json";

/// Namespace (`@kitn`) to URL template (`https://…/{type}/{name}.json`).
pub type Registries = BTreeMap<String, String>;

/// Project-relative directories components are installed into.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Aliases {
    pub base: String,
    pub agents: String,
    pub tools: String,
    pub skills: String,
    pub storage: String,
}

impl Aliases {
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            base: base.to_string(),
            agents: format!("{base}/agents"),
            tools: format!("{base}/tools"),
            skills: format!("{base}/skills"),
            storage: format!("{base}/storage"),
        }
    }

    /// Default directory for a component type. Packages normally carry
    /// their own `installDir`; this is the fallback.
    pub fn dir_for(&self, kind: ComponentType) -> &str {
        match kind {
            ComponentType::Agent => &self.agents,
            ComponentType::Tool => &self.tools,
            ComponentType::Skill => &self.skills,
            ComponentType::Storage => &self.storage,
            ComponentType::Package => &self.base,
        }
    }
}

impl Default for Aliases {
    fn default() -> Self {
        Self::with_base("src/ai")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InstalledComponent {
    pub files: Vec<String>,
    pub version: String,
    pub content_hash: String,
}

/// Contents of `kitn.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectConfig {
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    pub framework: String,
    #[serde(default)]
    pub aliases: Aliases,
    #[serde(default = "default_registries")]
    pub registries: Registries,
    #[serde(
        rename = "_installed",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub installed: BTreeMap<String, InstalledComponent>,
}

fn default_registries() -> Registries {
    Registries::from([(DEFAULT_NAMESPACE.to_string(), DEFAULT_REGISTRY_URL.to_string())])
}

impl ProjectConfig {
    pub fn new(framework: &str) -> Self {
        Self {
            schema: Some(SCHEMA_URL.to_string()),
            runtime: None,
            framework: framework.to_string(),
            aliases: Aliases::default(),
            registries: default_registries(),
            installed: BTreeMap::new(),
        }
    }
}
