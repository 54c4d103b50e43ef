use assert_cmd::Command;
use predicates::prelude::*;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("amr-collect").unwrap();
    cmd.env_clear();
    cmd
}

#[test]
fn prints_valid_checksum_for_id() {
    cli()
        .args(["checksum", "--id", "12345"])
        .assert()
        .success()
        .stdout(predicate::str::contains("serial_checksum=0xD9D0"));
}

#[test]
fn accepts_matching_pair() {
    cli()
        .args(["checksum", "--id", "12345", "--crc", "0xD9D0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid=true"));
}

#[test]
fn rejects_single_bit_flip() {
    cli()
        .args(["checksum", "--id", "12345", "--crc", "0xD9D1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CHECKSUM_INVALID"));
}
