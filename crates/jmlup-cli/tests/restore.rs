use std::fs;

mod common;

use common::{jmlup, parse_json, write_release};

#[test]
fn restore_puts_originals_back_and_is_idempotent() {
    let temp = tempfile::tempdir().expect("tempdir");
    let template = write_release(temp.path());
    jmlup(temp.path(), &template).arg("init").assert().success();
    let bin = temp.path().join("toolchain/jdk/bin");
    let original = fs::read(bin.join("javac.orig")).expect("backup");

    let assert = jmlup(temp.path(), &template)
        .args(["--json", "restore"])
        .assert()
        .success();
    let payload = parse_json(&assert);
    assert_eq!(payload["details"]["restored"], serde_json::json!(["javac", "java"]));
    assert_eq!(fs::read(bin.join("javac")).expect("restored"), original);
    assert!(!bin.join("javac.orig").exists());

    let again = jmlup(temp.path(), &template)
        .args(["--json", "restore"])
        .assert()
        .success();
    let payload = parse_json(&again);
    assert!(payload["message"]
        .as_str()
        .expect("message")
        .contains("nothing to restore"));
}

#[test]
fn init_after_restore_substitutes_again() {
    let temp = tempfile::tempdir().expect("tempdir");
    let template = write_release(temp.path());
    jmlup(temp.path(), &template).arg("init").assert().success();
    jmlup(temp.path(), &template).arg("restore").assert().success();

    let assert = jmlup(temp.path(), &template)
        .args(["--json", "init"])
        .assert()
        .success();

    let payload = parse_json(&assert);
    assert_eq!(payload["details"]["performed"], 2);
    assert!(temp.path().join("toolchain/jdk/bin/java.orig").is_file());
}
