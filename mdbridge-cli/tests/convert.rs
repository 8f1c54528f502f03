use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn convert_wiki_markdown_to_commonmark() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("page.md");
    fs::write(&input_path, "See [[Home|Main.WebHome]] and ~~old~~ text.\n").unwrap();

    let mut cmd = cargo_bin_cmd!("mdbridge");
    cmd.arg("convert")
        .arg(input_path.as_os_str())
        .arg("--to")
        .arg("commonmark/0.27");

    cmd.assert().success().stdout(
        predicate::str::contains("[Home](Main.WebHome)")
            .and(predicate::str::contains("<del>old</del>")),
    );
}

#[test]
fn convert_is_the_default_command() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("doc.md");
    fs::write(&input_path, "Some **bold** text\n").unwrap();

    let mut cmd = cargo_bin_cmd!("mdbridge");
    cmd.arg(input_path.as_os_str()).arg("--to").arg("plain/1.0");

    cmd.assert().success().stdout("Some bold text\n");
}

#[test]
fn convert_writes_output_file() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("doc.md");
    let output_path = dir.path().join("out.md");
    fs::write(&input_path, "* a\n* b\n").unwrap();

    let mut cmd = cargo_bin_cmd!("mdbridge");
    cmd.arg("convert")
        .arg(input_path.as_os_str())
        .arg("--to")
        .arg("markdown/1.0")
        .arg("-o")
        .arg(output_path.as_os_str());

    cmd.assert().success().stdout("");
    assert_eq!(fs::read_to_string(&output_path).unwrap(), "* a\n* b\n");
}

#[test]
fn unknown_target_syntax_fails() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("doc.md");
    fs::write(&input_path, "text\n").unwrap();

    let mut cmd = cargo_bin_cmd!("mdbridge");
    cmd.arg("convert")
        .arg(input_path.as_os_str())
        .arg("--to")
        .arg("docx/1.0");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Syntax 'docx/1.0' not found"));
}

#[test]
fn list_formats_shows_every_dialect() {
    let mut cmd = cargo_bin_cmd!("mdbridge");
    cmd.arg("--list-formats");

    cmd.assert().success().stdout(
        predicate::str::contains("commonmark/0.27")
            .and(predicate::str::contains("markdown+github/1.0"))
            .and(predicate::str::contains("plain/1.0")),
    );
}
