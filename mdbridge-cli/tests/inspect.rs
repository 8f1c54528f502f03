use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn inspect_prints_nested_events() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("doc.md");
    fs::write(&input_path, "# Title\n").unwrap();

    let mut cmd = cargo_bin_cmd!("mdbridge");
    cmd.arg("inspect").arg(input_path.as_os_str());

    cmd.assert().success().stdout(
        predicate::str::contains("begin document")
            .and(predicate::str::contains("  begin header 1 [HTitle]"))
            .and(predicate::str::contains("    word \"Title\"")),
    );
}

#[test]
fn inspect_as_json() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("doc.md");
    fs::write(&input_path, "hello\n").unwrap();

    let mut cmd = cargo_bin_cmd!("mdbridge");
    cmd.arg("inspect")
        .arg(input_path.as_os_str())
        .arg("events-json");

    let output = cmd.assert().success().get_output().stdout.clone();
    let events: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(events[0]["event"], "begin_document");
    assert_eq!(events[0]["metadata"]["syntax"], "markdown/1.2");
}

#[test]
fn verbose_logs_go_to_stderr() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("doc.md");
    fs::write(&input_path, "hello\n").unwrap();

    let mut cmd = cargo_bin_cmd!("mdbridge");
    cmd.env_remove("RUST_LOG")
        .arg("-v")
        .arg("inspect")
        .arg(input_path.as_os_str());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("document visited"));
}
