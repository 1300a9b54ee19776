//! End-to-end CLI tests.
//!
//! The stamps below are syntactically plausible but undecodable, so
//! every probe fails during upstream construction and the tests never
//! touch the network.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn dnsrank() -> Command {
    Command::cargo_bin("dnsrank").expect("binary builds")
}

fn directory_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write");
    file
}

const SAMPLE: &str = "\
## Example (DNSCrypt)
Supports DNSCrypt
sdns://AAA
## Other (DoH)
DoH endpoint
sdns://AAA
";

#[test]
fn missing_directory_file_is_fatal() {
    dnsrank()
        .args(["--file", "/nonexistent/public-resolvers.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read resolver directory"));
}

#[test]
fn reports_candidate_and_qualified_counts() {
    let file = directory_file(SAMPLE);

    dnsrank()
        .arg("--file")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 candidate resolvers"))
        .stdout(predicate::str::contains("0 qualified after probing"));
}

#[test]
fn dnscrypt_filter_keeps_only_matching_entries() {
    let file = directory_file(SAMPLE);

    dnsrank()
        .arg("--dnscrypt")
        .arg("--file")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 candidate resolvers"));
}

#[test]
fn composed_filters_can_exclude_everything() {
    let file = directory_file(SAMPLE);

    // No section mentions both capabilities, so the AND is empty and
    // the run still succeeds with an empty report.
    dnsrank()
        .arg("--dnscrypt")
        .arg("--doh")
        .arg("--file")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0 candidate resolvers"));
}

#[test]
fn json_output_is_an_array() {
    let file = directory_file(SAMPLE);

    dnsrank()
        .arg("--output")
        .arg("json")
        .arg("--file")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("["));
}
