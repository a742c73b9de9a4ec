use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(deprecated)]
fn kestrel_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("kestrel")
}

fn kestrel(home: &TempDir) -> Command {
    let mut cmd = Command::new(kestrel_bin());
    cmd.env("KESTREL_HOME", home.path());
    cmd
}

#[test]
fn test_launch_help() {
    let mut cmd = Command::new(kestrel_bin());
    cmd.arg("launch").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--args"))
        .stdout(predicate::str::contains("--engine-path"));
}

#[test]
fn test_launch_unknown_profile() {
    let home = TempDir::new().unwrap();
    kestrel(&home)
        .arg("launch")
        .arg("nonexistent-profile-12345")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found"));
}

#[test]
fn test_launch_frozen_profile_fails() {
    let home = TempDir::new().unwrap();
    kestrel(&home).arg("create").arg("shop").assert().success();
    kestrel(&home).arg("freeze").arg("shop").assert().success();

    kestrel(&home)
        .arg("launch")
        .arg("shop")
        .assert()
        .failure()
        .stderr(predicate::str::contains("frozen"))
        .stderr(predicate::str::contains("thaw"));
}

#[test]
fn test_launch_with_missing_directory_fails() {
    let home = TempDir::new().unwrap();
    kestrel(&home).arg("create").arg("shop").assert().success();

    let output = kestrel(&home)
        .arg("info")
        .arg("shop")
        .arg("--json")
        .output()
        .unwrap();
    let record: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let dir = PathBuf::from(record["path"].as_str().unwrap());
    std::fs::remove_dir_all(&dir).unwrap();

    kestrel(&home)
        .arg("launch")
        .arg("shop")
        .assert()
        .failure()
        .stderr(predicate::str::contains("directory missing"));
}
