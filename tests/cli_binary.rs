//! Binary tests: run the compiled `repeatr` with a throwaway home directory
//!
//! These go through `main`, so they cover the real sink wiring (task stdout
//! streamed, stderr kept out of the terminal) and the exit code mapping.

#![cfg(unix)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

const REPEATR_BIN: &str = env!("CARGO_BIN_EXE_repeatr");

#[derive(Debug)]
struct CliOutput {
    stdout: String,
    stderr: String,
    exit_code: i32,
}

/// Home, config and data dirs all point inside `home`, and it is the cwd
fn run_repeatr(home: &Path, args: &[&str], stdin: &str) -> CliOutput {
    let mut child = Command::new(REPEATR_BIN)
        .args(args)
        .arg("--no-color")
        .current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("XDG_DATA_HOME", home.join(".local/share"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn repeatr");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    CliOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code().unwrap_or(-1),
    }
}

fn app_log(home: &Path) -> String {
    fs::read_to_string(home.join(".local/share/repeatr/logs/repeatr.log")).unwrap_or_default()
}

/// Writes a marker, prints one line to each stream and fails
fn failing_script(dir: &Path) -> PathBuf {
    let path = dir.join("task.sh");
    let body = r#"touch "$(dirname "$0")/invoked"
echo "task says hello"
echo "KeyError: missing column" >&2
exit 1
"#;
    fs::write(&path, body).unwrap();
    path
}

fn batch_args<'a>(script: &'a str, log: &'a str) -> Vec<&'a str> {
    vec!["--runtime", "sh", "--target", script, "--log-file", log, "--delay-ms", "0"]
}

#[test]
fn test_stdout_passes_through_and_stderr_goes_to_log() {
    let home = TempDir::new().unwrap();
    let script = failing_script(home.path());
    let log = home.path().join("failures.log");
    let (script, log_str) = (script.to_str().unwrap(), log.to_str().unwrap());

    let mut args = vec!["-n", "2", "-y"];
    args.extend(batch_args(script, log_str));
    let out = run_repeatr(home.path(), &args, "");

    assert_eq!(out.exit_code, 0, "{:?}", out);
    assert_eq!(out.stdout.matches("task says hello").count(), 2);
    assert!(!out.stderr.contains("KeyError"), "{:?}", out);
    assert!(out.stdout.contains("run 1: KeyError: missing column"));
    assert!(out.stdout.contains("Success rate: 0%"));

    let failures = fs::read_to_string(&log).unwrap();
    assert_eq!(failures.matches("=== iteration").count(), 2);
    assert!(failures.contains("KeyError: missing column"));
}

#[test]
fn test_interactive_answers_from_stdin() {
    let home = TempDir::new().unwrap();
    let script = failing_script(home.path());
    let log = home.path().join("failures.log");

    let out = run_repeatr(
        home.path(),
        &batch_args(script.to_str().unwrap(), log.to_str().unwrap()),
        "0\n1\ny\n",
    );

    assert_eq!(out.exit_code, 0, "{:?}", out);
    assert_eq!(out.stdout.matches("task says hello").count(), 1);
    assert!(out.stdout.contains("Total:     1"));
}

#[test]
fn test_missing_target_exits_one() {
    let home = TempDir::new().unwrap();
    let missing = home.path().join("nope.py");
    let log = home.path().join("failures.log");

    let mut args = vec!["-n", "1", "-y"];
    args.extend(batch_args(missing.to_str().unwrap(), log.to_str().unwrap()));
    let out = run_repeatr(home.path(), &args, "");

    assert_eq!(out.exit_code, 1, "{:?}", out);
    assert!(out.stderr.contains("Target not found"));
    assert!(!log.exists());
}

#[test]
fn test_declined_prompt_exits_one_without_running() {
    let home = TempDir::new().unwrap();
    let script = failing_script(home.path());
    let log = home.path().join("failures.log");

    let mut args = vec!["-n", "2"];
    args.extend(batch_args(script.to_str().unwrap(), log.to_str().unwrap()));
    let out = run_repeatr(home.path(), &args, "n\n");

    assert_eq!(out.exit_code, 1, "{:?}", out);
    assert!(out.stderr.contains("declined"));
    assert!(!home.path().join("invoked").exists());
}

#[test]
fn test_broken_user_config_is_fatal_and_logged() {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join(".config/repeatr");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("repeatr.yml"), "max_count: 0\n").unwrap();
    let script = failing_script(home.path());

    let out = run_repeatr(
        home.path(),
        &["-n", "1", "-y", "--runtime", "sh", "--target", script.to_str().unwrap()],
        "",
    );

    assert_ne!(out.exit_code, 0, "{:?}", out);
    assert!(out.stderr.contains("max_count must be at least 1"), "{:?}", out);
    assert!(!home.path().join("invoked").exists());
    assert!(app_log(home.path()).contains("max_count must be at least 1"));
}
