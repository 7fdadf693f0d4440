//! End-to-end tests for the `validate` command.
//!
//! These tests invoke the actual CLI binary and validate the behavior of the
//! `validate` subcommand from a user's perspective.

mod common;
use common::prelude::*;

#[test]
fn test_validate_help() {
    let mut cmd = cargo_bin_cmd!("gitolite-config");

    cmd.arg("validate")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("composes cleanly").or(predicate::str::contains("FILE")));
}

#[test]
fn test_validate_valid_config() {
    let fixture = ConfigFixture::new().with_incs();
    let mut cmd = cargo_bin_cmd!("gitolite-config");

    cmd.arg("validate")
        .arg(fixture.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("Files: 4"))
        .stdout(predicate::str::contains("Wildcard containers: 1"));
}

#[test]
fn test_validate_config_from_env() {
    let fixture = ConfigFixture::new().with_file("gitolite.conf", "@staff = bob\n");
    let mut cmd = cargo_bin_cmd!("gitolite-config");

    cmd.env("GITOLITE_CONFIG", fixture.root())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Groups: 1"));
}

#[test]
fn test_validate_unparseable_line() {
    let fixture = ConfigFixture::new().with_file("gitolite.conf", "repo foo\nnot a statement\n");
    let mut cmd = cargo_bin_cmd!("gitolite-config");

    cmd.arg("validate")
        .arg(fixture.root())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be processed"));
}

#[test]
fn test_validate_recursive_include() {
    let fixture = ConfigFixture::new()
        .with_file("gitolite.conf", "include \"other.conf\"\n")
        .with_file("other.conf", "include \"gitolite.conf\"\n");
    let mut cmd = cargo_bin_cmd!("gitolite-config");

    cmd.arg("validate")
        .arg(fixture.root())
        .assert()
        .failure()
        .stderr(predicate::str::contains("recursive reference"));
}

#[test]
fn test_validate_group_cycle() {
    let fixture = ConfigFixture::new().with_file("gitolite.conf", "@a = @b\n@b = @a\n");
    let mut cmd = cargo_bin_cmd!("gitolite-config");

    cmd.arg("validate")
        .arg(fixture.root())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot order groups"));
}

#[test]
fn test_validate_invalid_log_level() {
    let fixture = ConfigFixture::new().with_file("gitolite.conf", "@staff = bob\n");
    let mut cmd = cargo_bin_cmd!("gitolite-config");

    cmd.arg("--log-level")
        .arg("loud")
        .arg("validate")
        .arg(fixture.root())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid log level"));
}
