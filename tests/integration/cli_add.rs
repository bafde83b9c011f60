use predicates::prelude::*;
use serde_json::json;
use std::fs;

use crate::common::{TestEnv, tool};

const ECHO: &str = "export const echo = (s: string) => s;\n";

#[test]
fn add_writes_files_and_records_component() {
    let env = TestEnv::new();
    env.publish(tool("echo", ECHO, &[]));
    env.init_project();

    env.cmd()
        .args(["add", "echo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Installing 1 component(s)"))
        .stdout(predicate::str::contains(
            "1 files written, 0 skipped due to conflict, 0 dependencies installed",
        ))
        .stdout(predicate::str::contains(
            "No package manager detected. Install manually: zod",
        ));

    let written = fs::read_to_string(env.project_path("src/ai/tools/echo.ts")).unwrap();
    assert_eq!(written, ECHO);

    let record = &env.config()["_installed"]["echo"];
    assert_eq!(record["version"], "1.0.0");
    assert_eq!(record["files"], json!(["src/ai/tools/echo.ts"]));
    let hash = record["contentHash"].as_str().unwrap();
    assert_eq!(hash.len(), 8);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn re_adding_unchanged_component_is_a_no_op() {
    let env = TestEnv::new();
    env.publish(tool("echo", ECHO, &[]));
    env.init_project();

    env.cmd().args(["add", "echo"]).assert().success();
    let before = env.config();

    env.cmd()
        .args(["add", "echo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unchanged"))
        .stdout(predicate::str::contains("0 files written, 0 skipped due to conflict"));

    assert_eq!(env.config(), before);
}

#[test]
fn changed_remote_conflicts_without_overwrite() {
    let env = TestEnv::new();
    env.publish(tool("echo", ECHO, &[]));
    env.init_project();
    env.cmd().args(["add", "echo"]).assert().success();

    let updated = "export const echo = (s: string) => s.trim();\n";
    env.publish(tool("echo", updated, &[]));

    env.cmd()
        .args(["add", "echo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("conflict"))
        .stdout(predicate::str::contains("1 skipped due to conflict"));
    let on_disk = fs::read_to_string(env.project_path("src/ai/tools/echo.ts")).unwrap();
    assert_eq!(on_disk, ECHO);

    env.cmd()
        .args(["add", "echo", "--overwrite"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 files written"));
    let on_disk = fs::read_to_string(env.project_path("src/ai/tools/echo.ts")).unwrap();
    assert_eq!(on_disk, updated);
}

#[test]
fn update_replaces_installed_files() {
    let env = TestEnv::new();
    env.publish(tool("echo", ECHO, &[]));
    env.init_project();
    env.cmd().args(["add", "echo"]).assert().success();
    let old_hash = env.config()["_installed"]["echo"]["contentHash"].clone();

    let mut item = tool("echo", "export const echo = 2;\n", &[]);
    item["version"] = json!("1.1.0");
    env.publish(item);

    env.cmd()
        .arg("update")
        .assert()
        .success()
        .stdout(predicate::str::contains("Updating 1 component(s)"))
        .stdout(predicate::str::contains("1.0.0 -> 1.1.0"));

    let on_disk = fs::read_to_string(env.project_path("src/ai/tools/echo.ts")).unwrap();
    assert_eq!(on_disk, "export const echo = 2;\n");
    let record = &env.config()["_installed"]["echo"];
    assert_eq!(record["version"], "1.1.0");
    assert_ne!(record["contentHash"], old_hash);
}

#[test]
fn update_of_unknown_component_fails() {
    let env = TestEnv::new();
    env.init_project();

    env.cmd()
        .args(["update", "echo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'echo' is not installed"));
}

#[test]
fn dependencies_install_before_dependents() {
    let env = TestEnv::new();
    env.publish(tool("b", "export const b = 1;\n", &[]));
    env.publish(tool("c", "export const c = 1;\n", &["b"]));
    let mut agent = tool("a", "export const a = 1;\n", &["b", "c"]);
    agent["type"] = json!("kitn:agent");
    env.publish(agent);
    env.init_project();

    let output = env.cmd().args(["add", "a"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();

    let pos = |needle: &str| stdout.find(needle).unwrap();
    assert!(stdout.contains("Installing 3 component(s)"));
    assert!(pos("  b (1.0.0)") < pos("  c (1.0.0)"));
    assert!(pos("  c (1.0.0)") < pos("  a (1.0.0)"));

    assert!(env.project_path("src/ai/agents/a.ts").exists());
    assert!(env.project_path("src/ai/tools/b.ts").exists());
    assert!(env.project_path("src/ai/tools/c.ts").exists());
    let installed = env.config()["_installed"].clone();
    assert_eq!(installed.as_object().unwrap().len(), 3);
}

#[test]
fn circular_dependency_writes_nothing() {
    let env = TestEnv::new();
    env.publish(tool("a", "a\n", &["b"]));
    env.publish(tool("b", "b\n", &["a"]));
    env.init_project();

    env.cmd()
        .args(["add", "a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("circular dependency: a -> b -> a"));

    assert!(!env.project_path("src").exists());
    assert!(env.config().get("_installed").is_none());
}

#[test]
fn missing_component_fails() {
    let env = TestEnv::new();
    env.publish(tool("echo", ECHO, &[]));
    env.init_project();

    env.cmd()
        .args(["add", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'nope' not found"));
}

#[test]
fn invalid_reference_fails() {
    let env = TestEnv::new();
    env.init_project();

    env.cmd()
        .args(["add", "@acme"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid component reference"));
}

#[test]
fn namespaced_component_is_keyed_by_namespace() {
    let env = TestEnv::new();
    let acme = tempfile::TempDir::new().unwrap();
    crate::common::publish(acme.path(), tool("ping", "ping\n", &[]));
    env.init_project();

    env.cmd()
        .args(["registry", "add", "@acme"])
        .arg(crate::common::registry_template(acme.path()))
        .assert()
        .success();

    env.cmd().args(["add", "@acme/ping"]).assert().success();

    assert!(env.project_path("src/ai/tools/ping.ts").exists());
    assert!(env.config()["_installed"]["@acme/ping"].is_object());
}

#[test]
fn list_shows_installed_status() {
    let env = TestEnv::new();
    env.publish(tool("echo", ECHO, &[]));
    env.publish(tool("weather", "w\n", &[]));
    env.init_project();
    env.cmd().args(["add", "echo"]).assert().success();

    env.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("echo (tool) - The echo tool [installed 1.0.0]"))
        .stdout(predicate::str::contains("weather (tool)"));

    env.cmd()
        .args(["list", "--installed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("echo"))
        .stdout(predicate::str::contains("weather").not());

    env.cmd()
        .args(["list", "--type", "agent"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No components found."));
}

#[test]
fn info_describes_component() {
    let env = TestEnv::new();
    env.publish(tool("echo", ECHO, &[]));
    env.init_project();

    env.cmd()
        .args(["info", "echo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Name:         echo"))
        .stdout(predicate::str::contains("Type:         tool"))
        .stdout(predicate::str::contains("Dependencies: zod"))
        .stdout(predicate::str::contains("Installed:    no"))
        .stdout(predicate::str::contains("  - echo.ts"));
}
