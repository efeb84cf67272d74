//! CLI tests for the `z80lint rules` and `z80lint tables` subcommands.

use std::fs;
use std::process::Command;

use assert_cmd::cargo;

fn z80lint_cmd() -> Command {
    Command::new(cargo::cargo_bin!("z80lint"))
}

#[test]
fn rules_json_lists_variants_and_kinds() {
    let output = z80lint_cmd()
        .args(["rules", "im", "--output", "json"])
        .output()
        .expect("run rules");
    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).expect("valid json");
    assert_eq!(json["mnemonic"], "IM");
    assert_eq!(json["dialect"], "z80");
    assert_eq!(json["variants"][0]["rule"], "IM %[0 1 2]");
    assert_eq!(json["variants"][0]["placeholders"][0]["kind"], "options");
}

#[test]
fn rules_legacy_dialect_degrades_composites() {
    let output = z80lint_cmd()
        .args(["rules", "JP", "--dialect", "z80-legacy", "--output", "pretty"])
        .output()
        .expect("run rules");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("JP (5 variant(s), z80-legacy)"), "stdout: {stdout}");
}

#[test]
fn rules_unknown_mnemonic_fails() {
    let output = z80lint_cmd()
        .args(["rules", "FROB"])
        .output()
        .expect("run rules");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("FROB"));
}

#[test]
fn tables_builtin_is_ok() {
    let output = z80lint_cmd()
        .args(["tables", "--output", "json"])
        .output()
        .expect("run tables");
    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).expect("valid json");
    assert_eq!(json["ok"], true);
    assert_eq!(json["name"], "z80");
    assert!(json["mnemonics"].as_u64().unwrap() > 100);
    let keywords: Vec<&str> = json["declarationKeywords"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(
        keywords,
        ["EXTERN", "SECTION", "DEFB", "DEFW", "DEFC", "MACRO", "PUBLIC"]
    );
}

#[test]
fn tables_pretty_lists_declaration_keywords() {
    let output = z80lint_cmd()
        .args(["tables", "--output", "pretty"])
        .output()
        .expect("run tables");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("declaration keywords: EXTERN, SECTION, DEFB"),
        "stdout: {stdout}"
    );
    assert!(stdout.contains("tables ok"), "stdout: {stdout}");
}

#[test]
fn tables_reports_undeclared_placeholders() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("typo.json");
    fs::write(
        &path,
        r#"{
            "name": "typo",
            "legend": { "r": { "tokens": ["A"] } },
            "instructions": { "ADC": ["ADC %r", "ADC %q"] },
            "directives": {}
        }"#,
    )
    .expect("write tables");
    let output = z80lint_cmd()
        .args(["tables", "--tables", &path.to_string_lossy(), "--output", "json"])
        .output()
        .expect("run tables");
    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).expect("valid json");
    assert_eq!(json["ok"], false);
    assert_eq!(json["undeclared"][0]["key"], "q");
    assert_eq!(json["undeclared"][0]["rule"], "ADC %q");
}
