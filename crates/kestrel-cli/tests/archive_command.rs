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
fn test_freeze_and_thaw_round_trip() {
    let home = TempDir::new().unwrap();
    kestrel(&home).arg("create").arg("shop").assert().success();

    kestrel(&home)
        .arg("freeze")
        .arg("shop")
        .assert()
        .success()
        .stdout(predicate::str::contains("Frozen into"));

    kestrel(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("frozen"));

    kestrel(&home)
        .arg("thaw")
        .arg("shop")
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored to"));

    kestrel(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("active"));
}

#[test]
fn test_freeze_twice_is_a_noop() {
    let home = TempDir::new().unwrap();
    kestrel(&home).arg("create").arg("shop").assert().success();
    kestrel(&home).arg("freeze").arg("shop").assert().success();

    kestrel(&home)
        .arg("freeze")
        .arg("shop")
        .assert()
        .success()
        .stdout(predicate::str::contains("already frozen"));
}

#[test]
fn test_thaw_active_is_a_noop() {
    let home = TempDir::new().unwrap();
    kestrel(&home).arg("create").arg("shop").assert().success();

    kestrel(&home)
        .arg("thaw")
        .arg("shop")
        .assert()
        .success()
        .stdout(predicate::str::contains("already active"));
}

#[test]
fn test_freeze_unknown_profile() {
    let home = TempDir::new().unwrap();
    kestrel(&home)
        .arg("freeze")
        .arg("nonexistent-profile-12345")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found"));
}

#[test]
fn test_export_to_directory_picks_file_name() {
    let home = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    kestrel(&home).arg("create").arg("shop").assert().success();

    kestrel(&home)
        .arg("export")
        .arg("shop")
        .arg(dest.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 'shop'"));

    assert!(dest.path().join("shop.tar.gz").is_file());
}

#[test]
fn test_export_frozen_profile_fails() {
    let home = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    kestrel(&home).arg("create").arg("shop").assert().success();
    kestrel(&home).arg("freeze").arg("shop").assert().success();

    kestrel(&home)
        .arg("export")
        .arg("shop")
        .arg(dest.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("thaw it before exporting"));
}

#[test]
fn test_frozen_profile_survives_round_trip_with_content() {
    let home = TempDir::new().unwrap();
    kestrel(&home).arg("create").arg("shop").assert().success();

    // Drop a file into the profile directory so the archive has payload.
    let output = kestrel(&home)
        .arg("info")
        .arg("shop")
        .arg("--json")
        .output()
        .unwrap();
    let record: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let dir = PathBuf::from(record["path"].as_str().unwrap());
    std::fs::write(dir.join("Cookies"), b"session-bytes").unwrap();

    kestrel(&home).arg("freeze").arg("shop").assert().success();
    assert!(!dir.exists());

    kestrel(&home).arg("thaw").arg("shop").assert().success();
    assert_eq!(std::fs::read(dir.join("Cookies")).unwrap(), b"session-bytes");
}
