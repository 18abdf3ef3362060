//! Binary smoke tests
//!
//! The application is interactive, so only the non-interactive surface is
//! exercised here: help, version and argument rejection.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_describes_the_wizard() {
    Command::cargo_bin("imgforge")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("terminal wizard"))
        .stdout(predicate::str::contains("--dir"));
}

#[test]
fn version_matches_the_package() {
    Command::cargo_bin("imgforge")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_flags_are_rejected() {
    Command::cargo_bin("imgforge")
        .unwrap()
        .arg("--definitely-not-a-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected argument"));
}
