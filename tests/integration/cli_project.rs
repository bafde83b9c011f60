use predicates::prelude::*;
use std::fs;

use crate::common::TestEnv;

#[test]
fn init_creates_config() {
    let env = TestEnv::new();

    env.cmd()
        .args(["init", "--framework", "hono", "--runtime", "bun"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized kitn"))
        .stdout(predicate::str::contains("Next: kitn add <component>"));

    let config = env.config();
    assert_eq!(config["framework"], "hono");
    assert_eq!(config["runtime"], "bun");
    assert_eq!(config["aliases"]["tools"], "src/ai/tools");
    assert!(config["registries"]["@kitn"].as_str().unwrap().contains("{name}"));
    assert!(config.get("_installed").is_none());
}

#[test]
fn init_suggests_detected_package_manager() {
    let env = TestEnv::new();
    fs::write(env.project_path("bun.lock"), "").unwrap();

    env.cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Next: bunx kitn add <component>"));
}

#[test]
fn init_custom_base_sets_aliases() {
    let env = TestEnv::new();

    env.cmd()
        .args(["init", "--base", "lib/ai/"])
        .assert()
        .success();

    let config = env.config();
    assert_eq!(config["aliases"]["base"], "lib/ai");
    assert_eq!(config["aliases"]["agents"], "lib/ai/agents");
}

#[test]
fn init_twice_fails() {
    let env = TestEnv::new();

    env.init_project();

    env.cmd()
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn init_rejects_template_without_name() {
    let env = TestEnv::new();

    env.cmd()
        .args(["init", "--registry", "https://example.com/r/registry.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("{name}"));

    assert!(!env.project_path("kitn.json").exists());
}

#[test]
fn commands_require_init() {
    let env = TestEnv::new();

    env.cmd()
        .args(["add", "echo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("run `kitn init` first"));

    env.cmd()
        .args(["registry", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("run `kitn init` first"));
}

#[test]
fn commands_find_config_in_parent_directory() {
    let env = TestEnv::new();
    env.init_project();
    let nested = env.project_path("src/routes");
    fs::create_dir_all(&nested).unwrap();

    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("kitn"));
    cmd.arg("--cwd")
        .arg(&nested)
        .args(["registry", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("@kitn"));
}
