//! CLI integration tests for the `bramble` binary.
//!
//! Tests exercise the binary through `std::process::Command`, covering
//! command routing, file I/O, round-trip conversion, and exit codes.

use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::tempdir;

fn bramble_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_bramble"))
}

fn run(args: &[&str]) -> Output {
    Command::new(bramble_bin()).args(args).output().expect("failed to execute bramble binary")
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "expected exit code 0, got {:?}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn assert_failure(output: &Output) {
    assert!(
        !output.status.success(),
        "expected a non-zero exit code\nstdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn stdout_str(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

// =============================================================================
// Command routing
// =============================================================================

#[test]
fn no_args_prints_usage_and_fails() {
    let output = run(&[]);
    assert_failure(&output);
}

#[test]
fn unknown_subcommand_fails() {
    let output = run(&["frobnicate"]);
    assert_failure(&output);
}

#[test]
fn help_succeeds() {
    let output = run(&["--help"]);
    assert_success(&output);
    assert!(stdout_str(&output).contains("bramble"));
}

#[test]
fn version_succeeds() {
    let output = run(&["--version"]);
    assert_success(&output);
}

// =============================================================================
// json-to-cbor / cbor-to-json round trip
// =============================================================================

#[test]
fn json_to_cbor_then_back_round_trips() {
    let dir = tempdir().unwrap();
    let json_path = dir.path().join("in.json");
    std::fs::write(&json_path, r#"{"a":1,"b":[2,3],"c":"hi"}"#).unwrap();

    let cbor_path = dir.path().join("out.cbor");
    let output = run(&[
        "json-to-cbor",
        json_path.to_str().unwrap(),
        "-o",
        cbor_path.to_str().unwrap(),
    ]);
    assert_success(&output);
    assert!(cbor_path.exists());

    let roundtrip_path = dir.path().join("roundtrip.json");
    let output = run(&[
        "cbor-to-json",
        cbor_path.to_str().unwrap(),
        "-o",
        roundtrip_path.to_str().unwrap(),
    ]);
    assert_success(&output);

    let roundtripped = std::fs::read_to_string(&roundtrip_path).unwrap();
    assert_eq!(roundtripped, r#"{"a":1,"b":[2,3],"c":"hi"}"#);
}

#[test]
fn cbor_to_json_writes_to_stdout_without_output_flag() {
    let dir = tempdir().unwrap();
    let json_path = dir.path().join("in.json");
    std::fs::write(&json_path, r#"{"x":true}"#).unwrap();
    let cbor_path = dir.path().join("in.cbor");
    assert_success(&run(&["json-to-cbor", json_path.to_str().unwrap(), "-o", cbor_path.to_str().unwrap()]));

    let output = run(&["cbor-to-json", cbor_path.to_str().unwrap()]);
    assert_success(&output);
    assert_eq!(stdout_str(&output).trim_end(), r#"{"x":true}"#);
}

#[test]
fn cbor_to_json_pretty_indents_output() {
    let dir = tempdir().unwrap();
    let json_path = dir.path().join("in.json");
    std::fs::write(&json_path, r#"{"a":1}"#).unwrap();
    let cbor_path = dir.path().join("in.cbor");
    assert_success(&run(&["json-to-cbor", json_path.to_str().unwrap(), "-o", cbor_path.to_str().unwrap()]));

    let output = run(&["cbor-to-json", cbor_path.to_str().unwrap(), "--pretty"]);
    assert_success(&output);
    assert!(stdout_str(&output).contains('\n'));
}

#[test]
fn json_to_cbor_rejects_comments_without_tolerant_flag() {
    let dir = tempdir().unwrap();
    let json_path = dir.path().join("in.json");
    std::fs::write(&json_path, "// a comment\n{\"a\":1}").unwrap();
    let cbor_path = dir.path().join("out.cbor");
    let output = run(&[
        "json-to-cbor",
        json_path.to_str().unwrap(),
        "-o",
        cbor_path.to_str().unwrap(),
    ]);
    assert_failure(&output);
}

#[test]
fn json_to_cbor_accepts_comments_with_tolerant_flag() {
    let dir = tempdir().unwrap();
    let json_path = dir.path().join("in.json");
    std::fs::write(&json_path, "// a comment\n{\"a\":1}").unwrap();
    let cbor_path = dir.path().join("out.cbor");
    let output = run(&[
        "json-to-cbor",
        json_path.to_str().unwrap(),
        "-o",
        cbor_path.to_str().unwrap(),
        "--tolerant",
    ]);
    assert_success(&output);
}

// =============================================================================
// inspect
// =============================================================================

#[test]
fn inspect_reports_map_shape() {
    let dir = tempdir().unwrap();
    let json_path = dir.path().join("in.json");
    std::fs::write(&json_path, r#"{"a":1,"b":[1,2,3]}"#).unwrap();

    let output = run(&["inspect", json_path.to_str().unwrap()]);
    assert_success(&output);
    let text = stdout_str(&output);
    assert!(text.contains("map, 2 entries"));
}

#[test]
fn inspect_missing_file_fails() {
    let output = run(&["inspect", "/nonexistent/path/does-not-exist.json"]);
    assert_failure(&output);
}

// =============================================================================
// get / set
// =============================================================================

#[test]
fn get_returns_value_at_pointer() {
    let dir = tempdir().unwrap();
    let json_path = dir.path().join("in.json");
    std::fs::write(&json_path, r#"{"foo":["bar","baz"]}"#).unwrap();

    let output = run(&["get", json_path.to_str().unwrap(), "/foo/1"]);
    assert_success(&output);
    assert_eq!(stdout_str(&output).trim_end(), "\"baz\"");
}

#[test]
fn get_missing_pointer_fails() {
    let dir = tempdir().unwrap();
    let json_path = dir.path().join("in.json");
    std::fs::write(&json_path, r#"{"foo":1}"#).unwrap();

    let output = run(&["get", json_path.to_str().unwrap(), "/bar"]);
    assert_failure(&output);
}

#[test]
fn set_upserts_and_writes_output_file() {
    let dir = tempdir().unwrap();
    let json_path = dir.path().join("in.json");
    std::fs::write(&json_path, r#"{"a":1}"#).unwrap();
    let out_path = dir.path().join("out.json");

    let output = run(&[
        "set",
        json_path.to_str().unwrap(),
        "/b",
        "42",
        "-o",
        out_path.to_str().unwrap(),
    ]);
    assert_success(&output);

    let get_output = run(&["get", out_path.to_str().unwrap(), "/b"]);
    assert_success(&get_output);
    assert_eq!(stdout_str(&get_output).trim_end(), "42");
}
