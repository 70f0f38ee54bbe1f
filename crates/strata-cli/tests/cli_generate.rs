use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const MANIFEST: &str = r#"
[project]
name = "cli-demo"

[dependencies]
requests = "*"
"#;

const CATALOG: &str = r#"
[[package]]
name = "requests"
version = "2.31.0"
hashes = [{ sha256 = "r231" }]

[[package]]
name = "requests"
version = "2.30.0"

[[package]]
name = "requests"
version = "2.29.0"
"#;

fn strata_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("strata").unwrap();
    cmd.env("HOME", home.path()).env_remove("RUST_LOG");
    cmd
}

fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("Strata.toml"), MANIFEST).unwrap();
    fs::write(tmp.path().join("catalog.toml"), CATALOG).unwrap();
    tmp
}

#[test]
fn test_generate_to_stdout_prints_sorted_json() {
    let tmp = project();
    strata_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["generate", "-", "--seed", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"2.31.0\""))
        .stdout(predicate::str::contains("sha256:r231"))
        .stderr(predicate::str::contains("3 stack(s)"));
}

#[test]
fn test_generate_to_directory() {
    let tmp = project();
    let out = tmp.path().join("stacks");
    strata_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["generate", out.to_str().unwrap(), "--count", "2"])
        .assert()
        .success();

    assert!(out.join("00001").join("Strata.toml").is_file());
    assert!(out.join("00002").join("Strata.lock").is_file());
    assert!(!out.join("00003").exists());
}

#[test]
fn test_generate_dry_run_writes_nothing() {
    let tmp = project();
    let out = tmp.path().join("stacks");
    strata_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["generate", out.to_str().unwrap(), "--dry-run"])
        .assert()
        .success()
        .stderr(predicate::str::contains("3 stack(s) computed"));
    assert!(!out.join("00001").exists());
}

#[test]
fn test_generate_rejects_unknown_decision() {
    let tmp = project();
    strata_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["generate", "-", "--decision", "greedy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("greedy"));
}

#[test]
fn test_generate_rejects_non_positive_count() {
    let tmp = project();
    strata_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["generate", "-", "--count", "-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("count"));
}

#[test]
fn test_generate_rejects_context_for_directory() {
    let tmp = project();
    let out = tmp.path().join("stacks");
    strata_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["generate", out.to_str().unwrap(), "--context", "{\"a\": 1}"])
        .assert()
        .failure();
}

#[test]
fn test_generate_without_manifest_fails() {
    let tmp = TempDir::new().unwrap();
    strata_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["generate", "-"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Strata.toml"));
}
