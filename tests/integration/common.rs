use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::{Value, json};
use tempfile::TempDir;

pub struct TestEnv {
    pub project_dir: TempDir,
    pub registry_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            project_dir: TempDir::new().expect("failed to create project_dir"),
            registry_dir: TempDir::new().expect("failed to create registry_dir"),
        }
    }

    /// Build a kitn Command pointed at project_dir.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("kitn"));
        cmd.arg("--cwd")
            .arg(self.project_dir.path())
            .env_remove("KITN_CWD")
            .env_remove("KITN_REGISTRY_URL")
            .env("RUST_LOG", "off");
        cmd
    }

    pub fn project_path(&self, rel: &str) -> PathBuf {
        self.project_dir.path().join(rel)
    }

    /// URL template serving components out of registry_dir.
    pub fn registry_template(&self) -> String {
        registry_template(self.registry_dir.path())
    }

    /// Shorthand: init the project against the local registry.
    pub fn init_project(&self) {
        self.cmd()
            .args(["init", "--registry"])
            .arg(self.registry_template())
            .assert()
            .success();
    }

    /// Publish a component into the local registry and refresh registry.json.
    pub fn publish(&self, item: Value) {
        publish(self.registry_dir.path(), item);
    }

    pub fn config(&self) -> Value {
        let raw = fs::read_to_string(self.project_path("kitn.json")).unwrap();
        serde_json::from_str(&raw).unwrap()
    }
}

pub fn registry_template(dir: &Path) -> String {
    format!("file://{}/{{type}}/{{name}}.json", dir.display())
}

pub fn publish(dir: &Path, item: Value) {
    let name = item["name"].as_str().unwrap().to_string();
    let kind = item["type"].as_str().unwrap().trim_start_matches("kitn:");
    let type_dir = match kind {
        "agent" => "agents",
        "tool" => "tools",
        "skill" => "skills",
        other => other,
    };
    fs::create_dir_all(dir.join(type_dir)).unwrap();
    fs::write(
        dir.join(type_dir).join(format!("{name}.json")),
        serde_json::to_string_pretty(&item).unwrap(),
    )
    .unwrap();

    let index_path = dir.join("registry.json");
    let mut index: Value = fs::read_to_string(&index_path)
        .ok()
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_else(|| json!({ "version": "1", "items": [] }));
    let items = index["items"].as_array_mut().unwrap();
    items.retain(|e| e["name"] != item["name"]);
    items.push(json!({
        "name": name,
        "type": item["type"],
        "description": item.get("description").cloned().unwrap_or(json!("")),
        "version": item.get("version").cloned().unwrap_or(json!("0.0.0")),
        "registryDependencies": item.get("registryDependencies").cloned().unwrap_or(json!([])),
    }));
    fs::write(index_path, serde_json::to_string_pretty(&index).unwrap()).unwrap();
}

/// A tool with one file and one npm dependency.
pub fn tool(name: &str, content: &str, registry_deps: &[&str]) -> Value {
    json!({
        "name": name,
        "type": "kitn:tool",
        "version": "1.0.0",
        "description": format!("The {name} tool"),
        "dependencies": ["zod"],
        "registryDependencies": registry_deps,
        "files": [{ "path": format!("{name}.ts"), "content": content }],
    })
}
