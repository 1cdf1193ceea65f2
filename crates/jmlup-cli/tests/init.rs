use std::fs;

mod common;

use common::{jmlup, parse_json, write_release};

#[test]
fn init_bootstraps_then_reports_noop() {
    let temp = tempfile::tempdir().expect("tempdir");
    let template = write_release(temp.path());

    let first = jmlup(temp.path(), &template)
        .args(["--json", "init"])
        .assert()
        .success();
    let payload = parse_json(&first);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["details"]["performed"], 6);
    assert_eq!(payload["details"]["stages"][0]["stage"], "fetch");
    assert_eq!(payload["details"]["stages"][2]["tool"], "javac");
    assert_eq!(payload["details"]["stages"][5]["tool"], "java");

    let bin = temp.path().join("toolchain/jdk/bin");
    assert!(bin.join("javac.orig").is_file());
    assert!(bin.join("java.orig").is_file());
    let launcher = fs::read_to_string(bin.join("javac")).expect("launcher");
    assert!(launcher.starts_with("#!/bin/sh"));
    assert!(launcher.contains("javac.orig"));

    let second = jmlup(temp.path(), &template)
        .args(["--json", "init"])
        .assert()
        .success();
    let payload = parse_json(&second);
    assert_eq!(payload["details"]["performed"], 0);
    assert!(payload["message"]
        .as_str()
        .expect("message")
        .contains("already bootstrapped"));
}

#[test]
fn init_human_output_lists_stages() {
    let temp = tempfile::tempdir().expect("tempdir");
    let template = write_release(temp.path());

    let assert = jmlup(temp.path(), &template)
        .args(["--no-color", "init"])
        .assert()
        .success();

    let out = common::stdout(&assert);
    assert!(out.contains("jmlup init"), "stdout: {out}");
    assert!(out.contains("substitute (javac)"), "stdout: {out}");
}

#[test]
fn offline_http_release_fails_without_touching_root() {
    let temp = tempfile::tempdir().expect("tempdir");

    let assert = jmlup(temp.path(), "https://example.invalid/openjml-{version}.zip")
        .args(["--json", "init"])
        .assert()
        .code(1);

    let payload = parse_json(&assert);
    assert_eq!(payload["status"], "user-error");
    assert_eq!(payload["details"]["code"], "JB205");
    assert!(!temp.path().join("toolchain/openjml.zip").exists());
}

#[test]
fn missing_archive_is_reported() {
    let temp = tempfile::tempdir().expect("tempdir");
    let template = format!("{}/absent-{{version}}.zip", temp.path().display());

    let assert = jmlup(temp.path(), &template)
        .args(["--json", "init"])
        .assert()
        .failure();

    let payload = parse_json(&assert);
    assert_ne!(payload["status"], "ok");
    assert!(!temp.path().join("toolchain/jdk").exists());
}
