//! End-to-end tests for the `validate` command.
//!
//! These tests invoke the actual CLI binary and validate the behavior of the
//! `validate` subcommand from a user's perspective.

mod common;

use common::prelude::*;

#[test]
fn test_validate_valid_config() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config_file = temp.child("distributors.yaml");
    config_file.write_str(configs::SINGLE_TARGET).unwrap();

    let mut cmd = cargo_bin_cmd!("git-distributor");

    cmd.current_dir(temp.path())
        .arg("validate")
        .arg("--config")
        .arg(config_file.path())
        .arg("--color")
        .arg("never")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("example-alias (git)"))
        .stdout(predicate::str::contains("password: configured"))
        .stdout(predicate::str::contains("inline-secret").not());
}

#[test]
fn test_validate_default_config_path() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("distributors.yaml")
        .write_str(configs::SINGLE_TARGET)
        .unwrap();

    let mut cmd = cargo_bin_cmd!("git-distributor");

    cmd.current_dir(temp.path())
        .env_remove("GIT_DISTRIBUTOR_CONFIG")
        .arg("validate")
        .assert()
        .success();
}

#[test]
fn test_validate_invalid_yaml() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config_file = temp.child("distributors.yaml");
    config_file.write_str(configs::INVALID_YAML).unwrap();

    let mut cmd = cargo_bin_cmd!("git-distributor");

    cmd.current_dir(temp.path())
        .arg("validate")
        .arg("--config")
        .arg(config_file.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Configuration parsing failed"));
}

#[test]
fn test_validate_duplicate_alias() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config_file = temp.child("distributors.yaml");
    config_file.write_str(configs::DUPLICATE_ALIAS).unwrap();

    let mut cmd = cargo_bin_cmd!("git-distributor");

    cmd.current_dir(temp.path())
        .arg("validate")
        .arg("--config")
        .arg(config_file.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Duplicate distributor alias 'same'"));
}

#[test]
fn test_validate_unknown_distributor_type() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config_file = temp.child("distributors.yaml");
    config_file
        .write_str(
            r#"
distributors:
  - type: ftp
    alias: legacy
    url: ftp://example.com/configs
"#,
        )
        .unwrap();

    let mut cmd = cargo_bin_cmd!("git-distributor");

    cmd.current_dir(temp.path())
        .arg("validate")
        .arg("--config")
        .arg(config_file.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Unknown distributor type 'ftp'"));
}

#[test]
fn test_validate_missing_file() {
    let temp = assert_fs::TempDir::new().unwrap();

    let mut cmd = cargo_bin_cmd!("git-distributor");

    cmd.current_dir(temp.path())
        .arg("validate")
        .arg("--config")
        .arg("does-not-exist.yaml")
        .assert()
        .failure();
}

#[test]
fn test_completions_bash() {
    let mut cmd = cargo_bin_cmd!("git-distributor");

    cmd.arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("git-distributor"));
}
