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
fn test_config_show_defaults() {
    let home = TempDir::new().unwrap();
    kestrel(&home)
        .arg("config")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("(auto-detect)"))
        .stdout(predicate::str::contains("(unset)"));
}

#[test]
fn test_config_set_engine_path() {
    let home = TempDir::new().unwrap();
    kestrel(&home)
        .arg("config")
        .arg("set")
        .arg("--engine-path")
        .arg("/opt/browsers/chromium")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration saved"));

    kestrel(&home)
        .arg("config")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("/opt/browsers/chromium"));
}

#[test]
fn test_config_empty_engine_path_resets_to_autodetect() {
    let home = TempDir::new().unwrap();
    kestrel(&home)
        .arg("config")
        .arg("set")
        .arg("--engine-path")
        .arg("/opt/browsers/chromium")
        .assert()
        .success();

    kestrel(&home)
        .arg("config")
        .arg("set")
        .arg("--engine-path")
        .arg("")
        .assert()
        .success();

    kestrel(&home)
        .arg("config")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("(auto-detect)"));
}

#[test]
fn test_config_set_default_args() {
    let home = TempDir::new().unwrap();
    kestrel(&home)
        .arg("config")
        .arg("set")
        .arg("--default-args")
        .arg("--mute-audio --start-maximized")
        .assert()
        .success();

    kestrel(&home)
        .arg("config")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("--mute-audio --start-maximized"));
}

#[test]
fn test_config_set_env_pairs() {
    let home = TempDir::new().unwrap();
    kestrel(&home)
        .arg("config")
        .arg("set")
        .arg("--env")
        .arg("TZ=UTC,LANG=en_US.UTF-8")
        .assert()
        .success();

    kestrel(&home)
        .arg("config")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("TZ=UTC"))
        .stdout(predicate::str::contains("LANG=en_US.UTF-8"));
}

#[test]
fn test_config_rejects_malformed_env() {
    let home = TempDir::new().unwrap();
    kestrel(&home)
        .arg("config")
        .arg("set")
        .arg("--env")
        .arg("NOVALUE")
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEY=VALUE"));
}

#[test]
fn test_config_clear_env() {
    let home = TempDir::new().unwrap();
    kestrel(&home)
        .arg("config")
        .arg("set")
        .arg("--env")
        .arg("TZ=UTC")
        .assert()
        .success();

    kestrel(&home)
        .arg("config")
        .arg("set")
        .arg("--clear-env")
        .assert()
        .success();

    kestrel(&home)
        .arg("config")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Environment:     (none)"));
}
