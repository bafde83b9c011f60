use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    #[serde(alias = "kitn:agent")]
    Agent,
    #[serde(alias = "kitn:tool")]
    Tool,
    #[serde(alias = "kitn:skill")]
    Skill,
    #[serde(alias = "kitn:storage")]
    Storage,
    #[serde(alias = "kitn:package")]
    Package,
}

impl ComponentType {
    /// Directory segment substituted for `{type}` in registry URLs.
    pub fn registry_dir(self) -> &'static str {
        match self {
            Self::Agent => "agents",
            Self::Tool => "tools",
            Self::Skill => "skills",
            Self::Storage => "storage",
            Self::Package => "package",
        }
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Agent => write!(f, "agent"),
            Self::Tool => write!(f, "tool"),
            Self::Skill => write!(f, "skill"),
            Self::Storage => write!(f, "storage"),
            Self::Package => write!(f, "package"),
        }
    }
}

impl FromStr for ComponentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix("kitn:").unwrap_or(s) {
            "agent" | "agents" => Ok(Self::Agent),
            "tool" | "tools" => Ok(Self::Tool),
            "skill" | "skills" => Ok(Self::Skill),
            "storage" => Ok(Self::Storage),
            "package" => Ok(Self::Package),
            other => Err(format!(
                "unknown component type '{other}' (expected agent, tool, skill, storage or package)"
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryFile {
    pub path: String,
    pub content: String,
}

/// A component descriptor as served by the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryItem {
    #[serde(rename = "type")]
    pub kind: ComponentType,
    pub name: String,
    #[serde(default = "default_item_version")]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dev_dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub registry_dependencies: Vec<String>,
    #[serde(default)]
    pub files: Vec<RegistryFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tsconfig: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
}

fn default_item_version() -> String {
    "0.0.0".to_string()
}
