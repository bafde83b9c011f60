use std::fs;
use std::path::{Path, PathBuf};

use crate::error::KitnError;
use crate::model::{InstalledComponent, ProjectConfig};

pub const CONFIG_FILE: &str = "kitn.json";

/// The project's `kitn.json`, the record of what was installed and where.
pub struct ProjectStore {
    root: PathBuf,
    config: ProjectConfig,
}

impl ProjectStore {
    /// Open the nearest project at or above `start_dir`.
    pub fn open(start_dir: &Path) -> Result<Self, KitnError> {
        let root = find_project_root(start_dir).ok_or(KitnError::NotInitialized)?;
        let config = load_config(&root)?;
        Ok(Self { root, config })
    }

    pub fn init(root: &Path, config: ProjectConfig) -> Result<Self, KitnError> {
        let config_path = root.join(CONFIG_FILE);
        if config_path.exists() {
            return Err(KitnError::AlreadyInitialized(config_path));
        }

        fs::create_dir_all(root).map_err(|source| KitnError::DirCreate {
            path: root.to_path_buf(),
            source,
        })?;

        let store = Self {
            root: root.to_path_buf(),
            config,
        };
        store.save()?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn installed(&self, key: &str) -> Option<&InstalledComponent> {
        self.config.installed.get(key)
    }

    pub fn record_installed(
        &mut self,
        key: String,
        record: InstalledComponent,
    ) -> Result<(), KitnError> {
        self.config.installed.insert(key, record);
        self.save()
    }

    /// Drop a component's record. The `_installed` key disappears from the
    /// file once the last record is gone.
    pub fn remove_installed(&mut self, key: &str) -> Result<InstalledComponent, KitnError> {
        let record = self
            .config
            .installed
            .remove(key)
            .ok_or_else(|| KitnError::NotInstalled {
                name: key.to_string(),
            })?;
        self.save()?;
        Ok(record)
    }

    pub fn add_registry(&mut self, namespace: &str, template: &str) -> Result<(), KitnError> {
        let invalid = |reason: &str| KitnError::InvalidRegistry {
            namespace: namespace.to_string(),
            reason: reason.to_string(),
        };

        if !namespace.starts_with('@') || namespace.len() < 2 || namespace.contains('/') {
            return Err(invalid("namespace must look like @name"));
        }
        if !template.contains("{name}") {
            return Err(invalid("URL template must contain {name}"));
        }
        if self.config.registries.contains_key(namespace) {
            return Err(invalid("namespace is already configured"));
        }

        self.config
            .registries
            .insert(namespace.to_string(), template.to_string());
        self.save()
    }

    pub fn remove_registry(&mut self, namespace: &str) -> Result<String, KitnError> {
        let template = self.config.registries.remove(namespace).ok_or_else(|| {
            KitnError::RegistryNotConfigured {
                namespace: namespace.to_string(),
            }
        })?;
        self.save()?;
        Ok(template)
    }

    /// Rewrite `kitn.json` through a temp file and rename so readers never
    /// see a half-written config.
    pub fn save(&self) -> Result<(), KitnError> {
        let path = self.root.join(CONFIG_FILE);
        let tmp = self.root.join(format!(".{CONFIG_FILE}.tmp"));
        let mut content = serde_json::to_string_pretty(&self.config)?;
        content.push('\n');

        fs::write(&tmp, content).map_err(|source| KitnError::FileWrite {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| KitnError::FileWrite { path, source })?;
        Ok(())
    }
}

fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

fn load_config(root: &Path) -> Result<ProjectConfig, KitnError> {
    let path = root.join(CONFIG_FILE);
    let content = fs::read_to_string(&path).map_err(|source| KitnError::FileRead {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| KitnError::ConfigParse { path, source })
}
