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
fn test_help_lists_commands() {
    let mut cmd = Command::new(kestrel_bin());
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("launch"))
        .stdout(predicate::str::contains("freeze"))
        .stdout(predicate::str::contains("thaw"));
}

#[test]
fn test_init_creates_store() {
    let home = TempDir::new().unwrap();
    kestrel(&home)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    assert!(home.path().join("data").join("profiles.json").is_file());
    assert!(home.path().join("profiles").is_dir());
}

#[test]
fn test_create_and_list() {
    let home = TempDir::new().unwrap();
    kestrel(&home)
        .arg("create")
        .arg("shop")
        .arg("--tags")
        .arg("eu,retail")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created profile 'shop'"));

    kestrel(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("shop"))
        .stdout(predicate::str::contains("active"))
        .stdout(predicate::str::contains("chromium"))
        .stdout(predicate::str::contains("eu,retail"))
        .stdout(predicate::str::contains("1 profile(s)"));
}

#[test]
fn test_list_empty_store() {
    let home = TempDir::new().unwrap();
    kestrel(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No profiles yet"));
}

#[test]
fn test_create_rejects_duplicate_name() {
    let home = TempDir::new().unwrap();
    kestrel(&home).arg("create").arg("shop").assert().success();

    kestrel(&home)
        .arg("create")
        .arg("shop")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Already exists"));
}

#[test]
fn test_create_rejects_unknown_engine() {
    let home = TempDir::new().unwrap();
    kestrel(&home)
        .arg("create")
        .arg("shop")
        .arg("--engine")
        .arg("safari")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown engine"));
}

#[test]
fn test_info_outputs_json() {
    let home = TempDir::new().unwrap();
    kestrel(&home).arg("create").arg("shop").assert().success();

    kestrel(&home)
        .arg("info")
        .arg("shop")
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"shop\""))
        .stdout(predicate::str::contains("\"status\""))
        .stdout(predicate::str::contains("\"fingerprint\""));
}

#[test]
fn test_info_unknown_profile() {
    let home = TempDir::new().unwrap();
    kestrel(&home)
        .arg("info")
        .arg("nonexistent-profile-12345")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found"));
}

#[test]
fn test_resolves_by_id_prefix() {
    let home = TempDir::new().unwrap();
    kestrel(&home).arg("create").arg("shop").assert().success();

    let output = kestrel(&home)
        .arg("info")
        .arg("shop")
        .arg("--json")
        .output()
        .unwrap();
    let record: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let id = record["id"].as_str().unwrap();

    kestrel(&home)
        .arg("info")
        .arg(&id[..8])
        .assert()
        .success()
        .stdout(predicate::str::contains("shop"));
}

#[test]
fn test_rename_profile() {
    let home = TempDir::new().unwrap();
    kestrel(&home).arg("create").arg("old-name").assert().success();

    kestrel(&home)
        .arg("rename")
        .arg("old-name")
        .arg("new-name")
        .assert()
        .success()
        .stdout(predicate::str::contains("Renamed 'old-name' to 'new-name'"));

    kestrel(&home)
        .arg("info")
        .arg("new-name")
        .assert()
        .success();
}

#[test]
fn test_tag_add_and_remove() {
    let home = TempDir::new().unwrap();
    kestrel(&home).arg("create").arg("shop").assert().success();

    kestrel(&home)
        .arg("tag")
        .arg("shop")
        .arg("alpha,beta")
        .assert()
        .success()
        .stdout(predicate::str::contains("alpha, beta"));

    kestrel(&home)
        .arg("tag")
        .arg("shop")
        .arg("--remove")
        .arg("alpha")
        .assert()
        .success()
        .stdout(predicate::str::contains("beta"))
        .stdout(predicate::str::contains("alpha").not());
}

#[test]
fn test_mark_sets_kind() {
    let home = TempDir::new().unwrap();
    kestrel(&home).arg("create").arg("shop").assert().success();

    kestrel(&home)
        .arg("mark")
        .arg("shop")
        .arg("--kind")
        .arg("temp")
        .assert()
        .success()
        .stdout(predicate::str::contains("Marked 'shop' as temp"));
}

#[test]
fn test_update_starring_reorders_list() {
    let home = TempDir::new().unwrap();
    kestrel(&home).arg("create").arg("aaa").assert().success();
    kestrel(&home).arg("create").arg("zzz").assert().success();

    kestrel(&home)
        .arg("update")
        .arg("zzz")
        .arg("--starred")
        .assert()
        .success();

    kestrel(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("* zzz"));
}

#[test]
fn test_clone_copies_settings() {
    let home = TempDir::new().unwrap();
    kestrel(&home)
        .arg("create")
        .arg("src")
        .arg("--tags")
        .arg("keep-me")
        .assert()
        .success();

    kestrel(&home)
        .arg("clone")
        .arg("src")
        .arg("dup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cloned 'src' into 'dup'"));

    kestrel(&home)
        .arg("info")
        .arg("dup")
        .assert()
        .success()
        .stdout(predicate::str::contains("keep-me"));
}

#[test]
fn test_remove_requires_confirmation() {
    let home = TempDir::new().unwrap();
    kestrel(&home).arg("create").arg("shop").assert().success();

    kestrel(&home)
        .arg("remove")
        .arg("shop")
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("cancelled"));

    kestrel(&home).arg("info").arg("shop").assert().success();
}

#[test]
fn test_remove_force_skips_prompt() {
    let home = TempDir::new().unwrap();
    kestrel(&home).arg("create").arg("shop").assert().success();

    kestrel(&home)
        .arg("remove")
        .arg("shop")
        .arg("--force")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 'shop'"));

    kestrel(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No profiles yet"));
}

#[test]
fn test_remove_unknown_profile_fails() {
    let home = TempDir::new().unwrap();
    kestrel(&home).arg("create").arg("shop").assert().success();

    kestrel(&home)
        .arg("remove")
        .arg("shop")
        .arg("missing")
        .arg("--force")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing"));

    // The resolvable one is still removed.
    kestrel(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No profiles yet"));
}
