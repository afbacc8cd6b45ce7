extern crate assert_cmd;
extern crate predicates;
extern crate tempfile;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::tempdir;

#[test]
fn help_names_the_farm() {
    Command::cargo_bin("buddhafarm")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("buddhafarm"));
}

#[test]
fn a_tiny_run_creates_and_fills_the_store() {
    let dir = tempdir().unwrap();
    Command::cargo_bin("buddhafarm")
        .unwrap()
        .current_dir(dir.path())
        .args(&[
            "--store",
            "tiny.bin",
            "--size",
            "8x8",
            "--points",
            "200",
            "--iterations",
            "50",
            "--batch-size",
            "50",
            "--threads",
            "1",
        ])
        .assert()
        .success();

    let bytes = fs::read(dir.path().join("tiny.bin")).unwrap();
    assert_eq!(&bytes[0..8], &200_u64.to_le_bytes());
    assert!(dir.path().join("buddhabrot-0.png").exists());
}

fn farm_a_little(dir: &Path) {
    Command::cargo_bin("buddhafarm")
        .unwrap()
        .current_dir(dir)
        .args(&[
            "--store",
            "field.bin",
            "--size",
            "8x8",
            "--points",
            "100",
            "--iterations",
            "50",
            "--batch-size",
            "50",
            "--threads",
            "1",
        ])
        .assert()
        .success();
}

fn reset_with_answer(dir: &Path, answer: &[u8]) -> std::process::Output {
    let mut child = Command::cargo_bin("buddhareset")
        .unwrap()
        .current_dir(dir)
        .args(&["--store", "field.bin"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.as_mut().unwrap().write_all(answer).unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn reset_wants_explicit_consent() {
    let dir = tempdir().unwrap();
    farm_a_little(dir.path());

    let output = reset_with_answer(dir.path(), b"no\n");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("untouched"));
    let bytes = fs::read(dir.path().join("field.bin")).unwrap();
    assert_eq!(&bytes[0..8], &100_u64.to_le_bytes());

    let output = reset_with_answer(dir.path(), b"Yes\n");
    assert!(output.status.success());
    let bytes = fs::read(dir.path().join("field.bin")).unwrap();
    assert_eq!(&bytes[0..8], &0_u64.to_le_bytes());
}
