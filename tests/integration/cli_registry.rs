use predicates::prelude::*;

use crate::common::TestEnv;

#[test]
fn registry_list_shows_default() {
    let env = TestEnv::new();
    env.init_project();

    env.cmd()
        .args(["registry", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("@kitn: file://"));
}

#[test]
fn registry_add_and_remove() {
    let env = TestEnv::new();
    env.init_project();

    env.cmd()
        .args([
            "registry",
            "add",
            "@acme",
            "https://acme.dev/r/{type}/{name}.json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added registry '@acme'"));
    assert_eq!(
        env.config()["registries"]["@acme"],
        "https://acme.dev/r/{type}/{name}.json"
    );

    env.cmd()
        .args(["registry", "remove", "@acme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed registry '@acme'"));
    assert!(env.config()["registries"].get("@acme").is_none());
}

#[test]
fn registry_add_duplicate_fails() {
    let env = TestEnv::new();
    env.init_project();

    env.cmd()
        .args(["registry", "add", "@kitn", "https://x.dev/{name}.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already configured"));
}

#[test]
fn registry_add_rejects_bad_namespace() {
    let env = TestEnv::new();
    env.init_project();

    env.cmd()
        .args(["registry", "add", "acme", "https://x.dev/{name}.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("namespace must look like @name"));
}

#[test]
fn registry_remove_unknown_fails() {
    let env = TestEnv::new();
    env.init_project();

    env.cmd()
        .args(["registry", "remove", "@nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no registry configured"));
}
