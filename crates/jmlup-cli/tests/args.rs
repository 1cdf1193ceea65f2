mod common;

use common::{jmlup, parse_json, stdout, write_release};

#[test]
fn args_prints_rac_flags_by_default() {
    let temp = tempfile::tempdir().expect("tempdir");
    let template = write_release(temp.path());

    let assert = jmlup(temp.path(), &template).arg("args").assert().success();

    assert_eq!(
        stdout(&assert).trim_end(),
        "-jml -rac -timeout 30 --nullable-by-default --specs-path specs/"
    );
}

#[test]
fn args_mode_comes_from_env_then_flag() {
    let temp = tempfile::tempdir().expect("tempdir");
    let template = write_release(temp.path());

    let env = jmlup(temp.path(), &template)
        .env("JML_MODE", "esc")
        .arg("args")
        .assert()
        .success();
    assert!(stdout(&env).starts_with("-jml -esc "));

    let flag = jmlup(temp.path(), &template)
        .env("JML_MODE", "esc")
        .args(["--json", "args", "--mode", "rac"])
        .assert()
        .success();
    let payload = parse_json(&flag);
    assert_eq!(payload["details"]["mode"], "rac");
    assert_eq!(
        payload["details"]["runtime_jvm_args"][0],
        "-Dorg.jmlspecs.openjml.rac=exception"
    );
}

#[test]
fn args_reads_mode_from_config_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let template = write_release(temp.path());
    std::fs::write(temp.path().join("jmlup.toml"), "mode = \"esc\"\ntimeout = 90\n")
        .expect("config");

    let assert = jmlup(temp.path(), &template).arg("args").assert().success();

    assert_eq!(
        stdout(&assert).trim_end(),
        "-jml -esc -timeout 90 --nullable-by-default --specs-path specs/"
    );
}
