/*!
 * Integration tests for the treedump binary
 */

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn treedump() -> Command {
    Command::new(env!("CARGO_BIN_EXE_treedump"))
}

#[test]
fn shows_help() {
    treedump()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--preset"));
}

#[test]
fn dumps_current_directory_by_default() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("main.ts"), "console.log(1);\n").unwrap();

    treedump()
        .current_dir(dir.path())
        .args(["--report", "none", "-q"])
        .assert()
        .success();

    let text = fs::read_to_string(dir.path().join("project_context_dump.txt")).unwrap();
    assert!(text.contains("--- START FILE: main.ts ---\nconsole.log(1);\n"));
    assert!(!text.contains("START FILE: project_context_dump.txt"));
}

#[test]
fn skipped_files_still_exit_zero() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    fs::write(dir.path().join("ok.ts"), "ok();\n").unwrap();
    fs::write(dir.path().join("bad.ts"), b"caf\xe9\n").unwrap();
    let output = out.path().join("dump.txt");

    treedump()
        .arg(dir.path())
        .arg("-o")
        .arg(&output)
        .args(["--report", "json", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"files_skipped\": 1"))
        .stdout(predicate::str::contains("\"files_processed\": 1"));

    assert!(fs::read_to_string(output).unwrap().contains("ok();"));
}

#[test]
fn missing_root_is_fatal() {
    let out = tempdir().unwrap();
    let output = out.path().join("dump.txt");

    treedump()
        .arg(out.path().join("nope"))
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Target directory not found"));

    assert!(!output.exists());
}

#[test]
fn missing_output_directory_is_fatal() {
    let dir = tempdir().unwrap();

    treedump()
        .arg(dir.path())
        .arg("-o")
        .arg(dir.path().join("missing").join("dump.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Output directory not found"));
}

#[test]
fn allow_list_flags_switch_mode() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    fs::write(dir.path().join("readme.md"), "# hi\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "scratch\n").unwrap();
    let output = out.path().join("dump.md");

    treedump()
        .arg(dir.path())
        .arg("-o")
        .arg(&output)
        .args(["--include-ext", "md", "--style", "markdown", "--no-tree"])
        .args(["--report", "none"])
        .assert()
        .success();

    let text = fs::read_to_string(output).unwrap();
    assert!(text.contains("## File: readme.md\n```md\n# hi\n```"));
    assert!(!text.contains("notes.txt"));
}

#[test]
fn generates_completions() {
    treedump()
        .args(["--generate", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("treedump"));
}
