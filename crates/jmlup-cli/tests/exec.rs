mod common;

use common::{jmlup, parse_json, write_release};

#[test]
fn exec_requires_bootstrap() {
    let temp = tempfile::tempdir().expect("tempdir");
    let template = write_release(temp.path());

    let assert = jmlup(temp.path(), &template)
        .args(["--json", "exec", "javac", "--", "-version"])
        .assert()
        .code(1);

    let payload = parse_json(&assert);
    assert_eq!(payload["details"]["reason"], "not_bootstrapped");
}

#[cfg(unix)]
#[test]
fn exec_expands_response_files() {
    let temp = tempfile::tempdir().expect("tempdir");
    let template = write_release(temp.path());
    jmlup(temp.path(), &template).arg("init").assert().success();
    std::fs::write(temp.path().join("args.txt"), "-g\n-d out\n").expect("args file");

    let assert = jmlup(temp.path(), &template)
        .args(["exec", "javac", "--", "@args.txt", "Main.java"])
        .assert()
        .success();

    let out = common::stdout(&assert);
    assert_eq!(out, "-g\n-d\nout\nMain.java\n");
}

#[cfg(unix)]
#[test]
fn substituted_launcher_expands_response_files() {
    let temp = tempfile::tempdir().expect("tempdir");
    let template = write_release(temp.path());
    jmlup(temp.path(), &template).arg("init").assert().success();
    std::fs::write(temp.path().join("args.txt"), "-version").expect("args file");

    let output = std::process::Command::new(temp.path().join("toolchain/jdk/bin/javac"))
        .current_dir(temp.path())
        .arg("@args.txt")
        .output()
        .expect("run launcher");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "-version\n");
}
