//! Command-line behaviour of the `repository` binary.

#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::Path;
use std::process::Command;

fn repository() -> Command {
    Command::new(env!("CARGO_BIN_EXE_repository"))
}

fn scaffold(root: &Path) {
    fs::create_dir(root.join(".template")).unwrap();
    fs::write(root.join(".template").join("README.md"), "# {{ . }}\n").unwrap();
    fs::write(
        root.join("index.html"),
        "<html><body><div><ul>\n    <li><a href=\"/beta\">beta</a></li>\n</ul></div></body></html>",
    )
    .unwrap();
    fs::write(root.join("README.md"), "# Index\n\n- [beta](/beta)\n").unwrap();
    fs::write(root.join("repository.json"), "[\"beta\"]").unwrap();
}

#[test]
fn missing_name_is_reported_on_stdout() {
    let tmp = tempfile::tempdir().unwrap();
    scaffold(tmp.path());

    let output = repository().current_dir(tmp.path()).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "repository: missing repository name argument\n"
    );
    assert_eq!(
        fs::read_to_string(tmp.path().join("repository.json")).unwrap(),
        "[\"beta\"]"
    );
    assert_eq!(
        fs::read_to_string(tmp.path().join("README.md")).unwrap(),
        "# Index\n\n- [beta](/beta)\n"
    );
}

#[test]
fn registers_relative_to_root() {
    let tmp = tempfile::tempdir().unwrap();
    scaffold(tmp.path());

    let output = repository()
        .arg("--root")
        .arg(tmp.path())
        .arg("alpha")
        .output()
        .unwrap();

    assert!(output.status.success(), "{:?}", output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("Registered alpha."));
    assert_eq!(
        fs::read_to_string(tmp.path().join("alpha").join("README.md")).unwrap(),
        "# alpha\n"
    );
    assert_eq!(
        fs::read_to_string(tmp.path().join("repository.json")).unwrap(),
        "[\n  \"alpha\",\n  \"beta\"\n]"
    );
}

#[test]
fn failure_is_prefixed_and_non_zero() {
    let tmp = tempfile::tempdir().unwrap();
    scaffold(tmp.path());
    fs::write(tmp.path().join("repository.json"), "{").unwrap();

    let output = repository()
        .current_dir(tmp.path())
        .arg("alpha")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("repository: cannot register alpha: "), "{stdout}");
    assert!(stdout.contains("repository.json"));
}

#[test]
fn help_is_left_to_clap() {
    let output = repository().arg("--help").output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage"));
}
