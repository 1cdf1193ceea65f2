#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::Path;

use assert_cmd::assert::Assert;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use zip::write::FileOptions;
use zip::ZipWriter;

pub const VERSION: &str = "0.17.0-test";

const ECHO_ARGS: &[u8] = b"#!/bin/sh\nfor a in \"$@\"; do printf '%s\\n' \"$a\"; done\n";

const ENV_KEYS: &[&str] = &[
    "JMLUP_ROOT",
    "JMLUP_VERSION",
    "JMLUP_URL_TEMPLATE",
    "JMLUP_SHA256",
    "JMLUP_JAVA_HOME_SUBDIR",
    "JMLUP_ONLINE",
    "JML_MODE",
    "NO_COLOR",
];

/// Writes `openjml-<VERSION>.zip` with echoing `bin/javac` and `bin/java` plus the runtime jar,
/// returning a path template that resolves to it.
pub fn write_release(dir: &Path) -> String {
    let archive = dir.join(format!("openjml-{VERSION}.zip"));
    let mut zip = ZipWriter::new(File::create(&archive).expect("create archive"));
    for name in ["bin/javac", "bin/java"] {
        zip.start_file(name, FileOptions::default().unix_permissions(0o755))
            .expect("start entry");
        zip.write_all(ECHO_ARGS).expect("write entry");
    }
    zip.start_file("jmlruntime.jar", FileOptions::default().unix_permissions(0o644))
        .expect("start jar");
    zip.write_all(b"PK\x05\x06").expect("write jar");
    zip.finish().expect("finish archive");
    format!("{}/openjml-{{version}}.zip", dir.display())
}

/// `jmlup` running in `cwd` against the local release, isolated from the caller's environment.
pub fn jmlup(cwd: &Path, template: &str) -> Command {
    let mut cmd = cargo_bin_cmd!("jmlup");
    for key in ENV_KEYS {
        cmd.env_remove(key);
    }
    cmd.current_dir(cwd)
        .env("JMLUP_ONLINE", "0")
        .args(["--root", "toolchain", "--release", VERSION, "--url-template", template]);
    cmd
}

pub fn parse_json(assert: &Assert) -> Value {
    serde_json::from_slice(&assert.get_output().stdout).expect("valid json")
}

pub fn stdout(assert: &Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stdout).into_owned()
}
