//! CLI tests for `termdojo`.
//!
//! Spawns the binary and verifies exit codes and output for init, validate,
//! list, show and play.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use termdojo::exit_codes;
use termdojo::io::init::DojoPaths;
use termdojo::test_support::temp_workspace;

fn termdojo(dir: &Path, args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_termdojo"))
        .current_dir(dir)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn termdojo");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(stdin.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("termdojo output")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn init_then_validate() {
    let temp = tempfile::tempdir().expect("tempdir");
    let init = termdojo(temp.path(), &["init"], "");
    assert_eq!(init.status.code(), Some(exit_codes::OK));
    assert!(DojoPaths::new(temp.path()).missions_path.is_file());

    let again = termdojo(temp.path(), &["init"], "");
    assert_eq!(again.status.code(), Some(exit_codes::INVALID));

    let validate = termdojo(temp.path(), &["validate"], "");
    assert_eq!(validate.status.code(), Some(exit_codes::OK));
    assert!(stdout(&validate).starts_with("ok: "));
}

#[test]
fn validate_rejects_broken_pack() {
    let (temp, paths) = temp_workspace().expect("workspace");
    fs::write(
        &paths.missions_path,
        r#"{"version": 1, "missions": [
            {"id": "a", "skill_id": "s", "level": 0, "briefing": "b", "goal": {"teleport": "/"}}
        ]}"#,
    )
    .expect("write pack");
    let output = termdojo(temp.path(), &["validate"], "");
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown goal operation: teleport"));
}

#[test]
fn list_filters_by_level() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = termdojo(temp.path(), &["list", "--level", "0"], "");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let listing = stdout(&output);
    assert!(listing.lines().any(|line| line.starts_with("0.3-go-home\tL0\tcd")));
    assert!(listing.lines().all(|line| line.contains("\tL0\t")));
}

#[test]
fn show_prints_card() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = termdojo(temp.path(), &["show", "1.3-read-file"], "");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert!(stdout(&output).contains("== Read the Secret =="));

    let missing = termdojo(temp.path(), &["show", "9.9-nope"], "");
    assert_eq!(missing.status.code(), Some(exit_codes::INVALID));
}

#[test]
fn play_completes_mission() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = termdojo(temp.path(), &["play", "0.3-go-home"], "ls\ncd ~\n");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let text = stdout(&output);
    assert!(text.contains("You are in /tmp."));
    assert!(text.contains("Mission complete!"));
}

#[test]
fn play_exits_incomplete_when_input_ends() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = termdojo(temp.path(), &["play", "2.6-delete-file"], "ls\nrm keep.txt\n");
    assert_eq!(output.status.code(), Some(exit_codes::INCOMPLETE));
    assert!(!stdout(&output).contains("Mission complete!"));
}

#[test]
fn play_uses_configured_home() {
    let (temp, paths) = temp_workspace().expect("workspace");
    fs::write(&paths.config_path, "user = \"ada\"\nhome = \"/home/ada\"\n").expect("config");
    let output = termdojo(temp.path(), &["play", "0.1-where-am-i"], "cat /etc/passwd\npwd\n");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let text = stdout(&output);
    assert!(text.contains("ada:x:1000:1000::/home/ada:/bin/bash"));
}
