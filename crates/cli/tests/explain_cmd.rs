//! CLI tests for the `z80lint explain` subcommand.

use std::process::Command;

use assert_cmd::cargo;

fn z80lint_cmd() -> Command {
    Command::new(cargo::cargo_bin!("z80lint"))
}

#[test]
fn explain_known_code_json_returns_explanation() {
    let output = z80lint_cmd()
        .args(["explain", "ASM1002", "--output", "json"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(json["id"], "ASM1002");
    assert!(json["explanation"].is_string());
}

#[test]
fn explain_unknown_code_json_returns_null_explanation() {
    let output = z80lint_cmd()
        .args(["explain", "ASM9999", "--output", "json"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(json["id"], "ASM9999");
    assert!(json["explanation"].is_null());
}

#[test]
fn explain_pretty_shows_human_readable_text() {
    let output = z80lint_cmd()
        .args(["explain", "ASM3002", "--output", "pretty"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("ASM3002") && stdout.contains("ENDM"),
        "unexpected output: {stdout}"
    );
}
