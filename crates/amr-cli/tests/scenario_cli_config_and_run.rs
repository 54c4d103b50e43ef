//! Config resolution and the run loop through the real binary.
//!
//! The store points at a closed local port, so preload and writes fail; the
//! collector must still drain stdin and exit cleanly.

use assert_cmd::Command;
use predicates::prelude::*;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("amr-collect").unwrap();
    cmd.env_clear().env("RUST_LOG", "info");
    cmd
}

fn with_store_env(cmd: &mut Command) -> &mut Command {
    cmd.env("COLLECT_INFLUXDB_HOSTNAME", "127.0.0.1")
        .env("COLLECT_INFLUXDB_PORT", "1")
        .env("COLLECT_INFLUXDB_USER", "collector")
        .env("COLLECT_INFLUXDB_PASS", "hunter2")
}

#[test]
fn config_fails_closed_without_password() {
    cli()
        .arg("config")
        .env("COLLECT_INFLUXDB_HOSTNAME", "127.0.0.1")
        .env("COLLECT_INFLUXDB_USER", "collector")
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_MISSING"))
        .stderr(predicate::str::contains("COLLECT_INFLUXDB_PASS"));
}

#[test]
fn config_prints_hash_and_redacts_password() {
    let mut cmd = cli();
    with_store_env(&mut cmd)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("config_hash="))
        .stdout(predicate::str::contains("<REDACTED>"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn unparseable_multiplier_is_fatal() {
    let mut cmd = cli();
    with_store_env(&mut cmd)
        .env("COLLECT_MULTIPLIER", "ten")
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_INVALID"));
}

#[test]
fn run_drains_stdin_when_store_is_down() {
    let input = concat!(
        r#"{"Time":"2020-01-01T00:00:00Z","Type":"SCM","Message":{"ID":1,"Type":12,"Consumption":10}}"#,
        "\n",
        "not json\n",
    );
    let mut cmd = cli();
    with_store_env(&mut cmd)
        .arg("run")
        .write_stdin(input)
        .assert()
        .success()
        .stderr(predicate::str::contains("starting cold"))
        .stderr(predicate::str::contains("input exhausted"))
        .stderr(predicate::str::contains("hunter2").not());
}
