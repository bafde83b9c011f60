//! Materializes resolved components into the project.
//!
//! Files are written component by component in resolved order. A file
//! that the project already tracks is never replaced silently: unless the
//! caller asks for overwrite, differing local content is reported as a
//! conflict and left alone. Per-file I/O failures are collected in the
//! report and never stop the run.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Component, Path};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde_json::{Map, Value};

use crate::error::KitnError;
use crate::hash::content_hash_many;
use crate::model::{ComponentType, InstalledComponent, RegistryItem};
use crate::pm::{self, DependencyRunner, PackageManager};
use crate::resolve::Resolved;
use crate::store::ProjectStore;

#[derive(Debug, Clone, Copy, Default)]
pub struct InstallOptions {
    pub overwrite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Written,
    Unchanged,
    Conflict,
    Excluded,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct FileReport {
    /// Project-relative path, or the registry path for excluded and
    /// rejected files.
    pub path: String,
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone)]
pub struct ComponentReport {
    pub key: String,
    pub version: String,
    pub previous_version: Option<String>,
    pub files: Vec<FileReport>,
}

impl ComponentReport {
    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.outcome)).count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct InstallReport {
    pub components: Vec<ComponentReport>,
    pub dependencies: Vec<String>,
    pub dev_dependencies: Vec<String>,
    pub package_manager: Option<PackageManager>,
    pub dependencies_installed: usize,
}

impl InstallReport {
    fn count(&self, pred: impl Fn(&FileOutcome) -> bool + Copy) -> usize {
        self.components.iter().map(|c| c.count(pred)).sum()
    }

    pub fn written(&self) -> usize {
        self.count(|o| *o == FileOutcome::Written)
    }

    pub fn unchanged(&self) -> usize {
        self.count(|o| *o == FileOutcome::Unchanged)
    }

    pub fn conflicts(&self) -> usize {
        self.count(|o| *o == FileOutcome::Conflict)
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed(_)))
    }

    pub fn summary(&self) -> String {
        let mut line = format!(
            "{} files written, {} skipped due to conflict, {} dependencies installed",
            self.written(),
            self.conflicts(),
            self.dependencies_installed
        );
        if self.failed() > 0 {
            line.push_str(&format!(", {} failed", self.failed()));
        }
        line
    }
}

#[derive(Debug, Clone, Default)]
pub struct RemoveReport {
    pub removed: Vec<String>,
    pub skipped: Vec<(String, String)>,
}

pub struct Installer<'a, R> {
    runner: &'a R,
}

impl<'a, R: DependencyRunner> Installer<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    /// Write every component's files in order and record each component
    /// in the project config as soon as it is done.
    pub fn install_files(
        &self,
        store: &mut ProjectStore,
        resolved: &[Resolved],
        options: InstallOptions,
    ) -> Result<InstallReport, KitnError> {
        let mut report = InstallReport::default();

        for component in resolved {
            let key = component.reference.install_key();
            let item = &component.item;
            tracing::info!("installing {key}@{}", item.version);

            let (component_report, record) = self.install_component(store, &key, item, options);
            if let Some(record) = record {
                store.record_installed(key, record)?;
            }
            report.components.push(component_report);
        }

        let (deps, dev_deps) = collect_dependencies(store.root(), resolved);
        report.dependencies = deps;
        report.dev_dependencies = dev_deps;
        Ok(report)
    }

    /// Add the collected packages with the project's package manager, one
    /// invocation per dependency kind for the whole run.
    pub async fn install_dependencies(
        &self,
        root: &Path,
        report: &mut InstallReport,
    ) -> Result<(), KitnError> {
        if report.dependencies.is_empty() && report.dev_dependencies.is_empty() {
            return Ok(());
        }

        let Some(manager) = pm::detect(root) else {
            tracing::warn!(
                "no lockfile found; install these packages manually: {}",
                report
                    .dependencies
                    .iter()
                    .chain(&report.dev_dependencies)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(" ")
            );
            return Ok(());
        };
        report.package_manager = Some(manager);

        if !report.dependencies.is_empty() {
            self.runner
                .run(root, &manager.add_command(&report.dependencies))
                .await?;
            report.dependencies_installed += report.dependencies.len();
        }
        if !report.dev_dependencies.is_empty() {
            self.runner
                .run(root, &manager.add_dev_command(&report.dev_dependencies))
                .await?;
            report.dependencies_installed += report.dev_dependencies.len();
        }
        Ok(())
    }

    /// Delete the files a component owns and drop its record. Files that
    /// are already gone or cannot be deleted are skipped.
    pub fn remove(&self, store: &mut ProjectStore, key: &str) -> Result<RemoveReport, KitnError> {
        let record = store
            .installed(key)
            .cloned()
            .ok_or_else(|| KitnError::NotInstalled {
                name: key.to_string(),
            })?;

        let root = store.root().to_path_buf();
        let mut report = RemoveReport::default();

        for file in &record.files {
            if !is_safe_relative(file) {
                tracing::warn!("not removing {file}: path escapes the project");
                report.skipped.push((file.clone(), "unsafe path".to_string()));
                continue;
            }

            if let Some(owner) = other_owner(store, key, file) {
                tracing::warn!("not removing {file}: also installed by '{owner}'");
                report
                    .skipped
                    .push((file.clone(), format!("also installed by '{owner}'")));
                continue;
            }

            let path = root.join(file);
            match fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!("removed {}", path.display());
                    prune_empty_dirs(&root, path.parent());
                    report.removed.push(file.clone());
                }
                Err(source) => {
                    let err = KitnError::FileRemove { path, source };
                    tracing::warn!("skipping {file}: {}", describe(&err));
                    report.skipped.push((file.clone(), describe(&err)));
                }
            }
        }

        store.remove_installed(key)?;
        Ok(report)
    }

    fn install_component(
        &self,
        store: &ProjectStore,
        key: &str,
        item: &RegistryItem,
        options: InstallOptions,
    ) -> (ComponentReport, Option<InstalledComponent>) {
        let root = store.root();
        let previous = store.installed(key);
        let base = base_dir(store, item);
        let excludes = ExcludeMatcher::new(&item.exclude);

        let mut files = Vec::with_capacity(item.files.len());
        let mut tracked = Vec::new();
        let mut finals: Vec<String> = Vec::new();
        let mut any_succeeded = false;
        let mut conflicted = false;

        for file in &item.files {
            if excludes.is_match(&file.path) {
                tracing::debug!("{key}: excluded {}", file.path);
                files.push(FileReport {
                    path: file.path.clone(),
                    outcome: FileOutcome::Excluded,
                });
                continue;
            }

            if !is_safe_relative(&base) || !is_safe_relative(&file.path) {
                let err = KitnError::UnsafePath {
                    path: format!("{base}/{}", file.path),
                };
                tracing::warn!("{key}: {err}");
                files.push(FileReport {
                    path: file.path.clone(),
                    outcome: FileOutcome::Failed(err.to_string()),
                });
                continue;
            }

            let rel = format!("{base}/{}", file.path);
            let was_tracked = previous.is_some_and(|p| p.files.contains(&rel));
            let owner = other_owner(store, key, &rel);
            let target = root.join(&rel);

            let outcome = match fs::read(&target) {
                Ok(local) if local == file.content.as_bytes() => {
                    finals.push(file.content.clone());
                    FileOutcome::Unchanged
                }
                Ok(local) if was_tracked && !options.overwrite => {
                    tracing::warn!("{key}: {rel} differs from the registry, leaving it untouched");
                    finals.push(String::from_utf8_lossy(&local).into_owned());
                    FileOutcome::Conflict
                }
                Ok(local) if owner.is_some() && !options.overwrite => {
                    tracing::warn!(
                        "{key}: {rel} belongs to '{}', leaving it untouched",
                        owner.unwrap_or_default()
                    );
                    finals.push(String::from_utf8_lossy(&local).into_owned());
                    FileOutcome::Conflict
                }
                Ok(_) => write_file(&target, &file.content, &mut finals),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    write_file(&target, &file.content, &mut finals)
                }
                Err(source) => FileOutcome::Failed(describe(&KitnError::FileRead {
                    path: target.clone(),
                    source,
                })),
            };

            match &outcome {
                FileOutcome::Failed(reason) => {
                    tracing::warn!("{key}: {rel}: {reason}");
                    if was_tracked {
                        tracked.push(rel.clone());
                    }
                }
                // Another component's file: not taken over.
                FileOutcome::Conflict if !was_tracked => {
                    any_succeeded = true;
                    conflicted = true;
                }
                FileOutcome::Conflict => {
                    any_succeeded = true;
                    conflicted = true;
                    tracked.push(rel.clone());
                }
                _ => {
                    any_succeeded = true;
                    tracked.push(rel.clone());
                }
            }
            tracing::debug!("{key}: {rel}: {outcome:?}");
            files.push(FileReport { path: rel, outcome });
        }

        // Files dropped from the descriptor stay on disk and stay owned.
        if let Some(prev) = previous {
            for orphan in &prev.files {
                if !tracked.contains(orphan) {
                    tracked.push(orphan.clone());
                }
            }
        }

        if item.kind == ComponentType::Package {
            if let Some(paths) = &item.tsconfig {
                if let Err(err) = merge_tsconfig_paths(root, paths) {
                    tracing::warn!("{key}: could not update tsconfig.json: {}", describe(&err));
                }
            }
        }

        let report = ComponentReport {
            key: key.to_string(),
            version: item.version.clone(),
            previous_version: previous.map(|p| p.version.clone()),
            files,
        };

        let nothing_landed = !item.files.is_empty() && !any_succeeded;
        if nothing_landed && previous.is_none() {
            return (report, None);
        }

        // Conflicted files still hold the old release, so keep its version.
        let version = match previous {
            Some(prev) if conflicted => prev.version.clone(),
            _ => item.version.clone(),
        };
        let record = InstalledComponent {
            files: tracked,
            version,
            content_hash: content_hash_many(finals.iter().map(String::as_str)),
        };
        (report, Some(record))
    }
}

/// First component other than `key` whose record tracks `rel`.
fn other_owner<'s>(store: &'s ProjectStore, key: &str, rel: &str) -> Option<&'s str> {
    store
        .config()
        .installed
        .iter()
        .find(|(other, record)| other.as_str() != key && record.files.iter().any(|f| f == rel))
        .map(|(other, _)| other.as_str())
}

fn base_dir(store: &ProjectStore, item: &RegistryItem) -> String {
    let aliases = &store.config().aliases;
    let base = match (&item.kind, &item.install_dir) {
        (ComponentType::Package, Some(dir)) => dir.as_str(),
        (kind, _) => aliases.dir_for(*kind),
    };
    base.trim_start_matches("./").trim_end_matches('/').to_string()
}

fn write_file(target: &Path, content: &str, finals: &mut Vec<String>) -> FileOutcome {
    if let Some(parent) = target.parent() {
        if let Err(source) = fs::create_dir_all(parent) {
            return FileOutcome::Failed(describe(&KitnError::DirCreate {
                path: parent.to_path_buf(),
                source,
            }));
        }
    }
    match fs::write(target, content) {
        Ok(()) => {
            finals.push(content.to_string());
            FileOutcome::Written
        }
        Err(source) => FileOutcome::Failed(describe(&KitnError::FileWrite {
            path: target.to_path_buf(),
            source,
        })),
    }
}

fn is_safe_relative(path: &str) -> bool {
    !path.is_empty()
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn prune_empty_dirs(root: &Path, mut dir: Option<&Path>) {
    while let Some(current) = dir {
        if current == root || !current.starts_with(root) {
            break;
        }
        let is_empty = fs::read_dir(current)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if !is_empty || fs::remove_dir(current).is_err() {
            break;
        }
        dir = current.parent();
    }
}

/// Error message including its sources, for per-file report lines.
fn describe(err: &KitnError) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    message
}

struct ExcludeMatcher {
    globs: GlobSet,
    literals: Vec<String>,
}

impl ExcludeMatcher {
    fn new(patterns: &[String]) -> Self {
        let mut builder = GlobSetBuilder::new();
        let mut literals = Vec::new();
        for pattern in patterns {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => {
                    tracing::warn!("invalid exclude pattern '{pattern}': {e}");
                    literals.push(pattern.clone());
                }
            }
        }
        let globs = builder.build().unwrap_or_else(|e| {
            tracing::warn!("ignoring exclude patterns: {e}");
            GlobSet::empty()
        });
        Self { globs, literals }
    }

    fn is_match(&self, path: &str) -> bool {
        self.globs.is_match(path) || self.literals.iter().any(|l| l == path)
    }
}

/// Runtime and dev packages across the set, first-seen order, minus those
/// `package.json` already declares.
fn collect_dependencies(root: &Path, resolved: &[Resolved]) -> (Vec<String>, Vec<String>) {
    let declared = declared_packages(root);
    let mut seen = HashSet::new();
    let mut deps = Vec::new();
    let mut dev_deps = Vec::new();

    for component in resolved {
        for dep in &component.item.dependencies {
            if !declared.contains(package_name(dep)) && seen.insert(package_name(dep).to_string()) {
                deps.push(dep.clone());
            }
        }
    }
    for component in resolved {
        for dep in &component.item.dev_dependencies {
            if !declared.contains(package_name(dep)) && seen.insert(package_name(dep).to_string()) {
                dev_deps.push(dep.clone());
            }
        }
    }
    (deps, dev_deps)
}

fn declared_packages(root: &Path) -> HashSet<String> {
    let Ok(content) = fs::read_to_string(root.join("package.json")) else {
        return HashSet::new();
    };
    let Ok(json) = serde_json::from_str::<Value>(&content) else {
        tracing::warn!("package.json is not valid JSON; not checking declared dependencies");
        return HashSet::new();
    };

    ["dependencies", "devDependencies", "peerDependencies"]
        .iter()
        .filter_map(|section| json.get(section).and_then(Value::as_object))
        .flat_map(|deps| deps.keys().cloned())
        .collect()
}

/// `zod@^3` -> `zod`, `@ai-sdk/openai@1` -> `@ai-sdk/openai`.
fn package_name(dep: &str) -> &str {
    let search_from = usize::from(dep.starts_with('@'));
    match dep[search_from..].find('@') {
        Some(i) => &dep[..search_from + i],
        None => dep,
    }
}

fn merge_tsconfig_paths(
    root: &Path,
    paths: &BTreeMap<String, Vec<String>>,
) -> Result<(), KitnError> {
    let path = root.join("tsconfig.json");
    let mut config = match fs::read_to_string(&path) {
        Ok(content) => serde_json::from_str::<Value>(&content)
            .map_err(|source| KitnError::ConfigParse {
                path: path.clone(),
                source,
            })?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Value::Object(Map::new()),
        Err(source) => return Err(KitnError::FileRead { path, source }),
    };

    let Some(obj) = config.as_object_mut() else {
        return Ok(());
    };
    let options = obj
        .entry("compilerOptions")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(options) = options.as_object_mut() else {
        return Ok(());
    };
    let existing = options
        .entry("paths")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(existing) = existing.as_object_mut() else {
        return Ok(());
    };

    let mut changed = false;
    for (alias, targets) in paths {
        let value = Value::from(targets.clone());
        if existing.get(alias) != Some(&value) {
            existing.insert(alias.clone(), value);
            changed = true;
        }
    }
    if !changed {
        return Ok(());
    }

    let mut content = serde_json::to_string_pretty(&config)?;
    content.push('\n');
    fs::write(&path, content).map_err(|source| KitnError::FileWrite { path, source })?;
    tracing::info!("updated tsconfig.json paths");
    Ok(())
}
