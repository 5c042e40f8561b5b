use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

const CART: &str = "class Cart\n{\n    void Add() { Count++; }\n    int Total() => 0;\n}\n";

fn capsule() -> Command {
    let mut cmd = Command::cargo_bin("capsule").expect("binary exists");
    cmd.env_remove("CAPSULE_OUTPUT_FILE").env_remove("CAPSULE_THEME");
    cmd
}

#[test]
fn help_displays_usage() {
    capsule()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("bundle"));
}

#[test]
fn redact_prints_hidden_bodies() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Cart.cs");
    fs::write(&file, CART).unwrap();

    capsule()
        .arg("redact")
        .arg(&file)
        .args(["--hide-method", "Total"])
        .assert()
        .success()
        .stdout(predicate::str::contains("int Total() { /* logic hidden */ }"))
        .stdout(predicate::str::contains("void Add() { Count++; }"));
}

#[test]
fn outline_of_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    capsule()
        .arg("outline")
        .arg(dir.path().join("Nope.cs"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn bundle_writes_markdown_next_to_sources() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Cart.cs"), CART).unwrap();

    capsule()
        .arg("bundle")
        .arg(dir.path())
        .args(["--hide-class", "Cart"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Saved 1 files to"));

    let written = fs::read_to_string(dir.path().join("AiContextMulti.md")).unwrap();
    assert!(written.contains("**Total files:** 1"));
    assert!(written.contains("/* whole class collapsed */"));
}

#[test]
fn project_config_changes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Cart.cs"), CART).unwrap();
    fs::create_dir_all(dir.path().join(".capsule")).unwrap();
    fs::write(
        dir.path().join(".capsule/config.toml"),
        "[project]\noutput_file = \"Context.md\"\n",
    )
    .unwrap();

    capsule().arg("bundle").arg(dir.path()).assert().success();
    assert!(dir.path().join("Context.md").exists());
    assert!(!dir.path().join("AiContextMulti.md").exists());
}
