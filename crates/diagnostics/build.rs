//! Generates the diagnostic registry tables from `registry/diagnostics.json`.
//!
//! Four files land in `OUT_DIR`, each `include!`d by `src/`:
//! - `generated_codes.rs`: one `pub const` per code
//! - `generated_explain.rs`: code → long description
//! - `generated_severity.rs`: code → default severity
//! - `generated_templates.rs`: (code, variant) → message template
//!
//! The registry is checked while it is read: ids follow `ASMnnnn`, ids and
//! constant names are unique, and templates only use declared context keys.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

const REGISTRY: &str = "registry/diagnostics.json";

#[derive(Deserialize)]
struct Registry {
    diagnostics: Vec<Entry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Entry {
    id: String,
    const_name: String,
    severity: String,
    summary: String,
    description: String,
    context_keys: Vec<String>,
    #[serde(default)]
    message_templates: BTreeMap<String, String>,
}

fn main() {
    println!("cargo:rerun-if-changed={REGISTRY}");

    let raw = fs::read_to_string(REGISTRY)
        .unwrap_or_else(|e| panic!("cannot read {REGISTRY}: {e}"));
    let registry: Registry =
        serde_json::from_str(&raw).unwrap_or_else(|e| panic!("{REGISTRY} is malformed: {e}"));
    check(&registry.diagnostics);

    let mut codes = format!("// Generated from {REGISTRY}. Do not edit.\n\n");
    let mut explain = String::from("match id {\n");
    let mut severity = String::from("match id {\n");
    let mut templates = String::from("match (id, variant) {\n");

    for e in &registry.diagnostics {
        let id = &e.id;
        let _ = writeln!(codes, "/// {}", e.summary);
        let _ = writeln!(codes, "pub const {}: &str = \"{id}\";\n", e.const_name);
        let _ = writeln!(explain, "    \"{id}\" => Some(\"{}\"),", escape(&e.description));
        let _ = writeln!(severity, "    \"{id}\" => Some({}),", severity_variant(e));
        for (variant, template) in &e.message_templates {
            let _ = writeln!(
                templates,
                "    (\"{id}\", \"{variant}\") => Some(\"{}\"),",
                escape(template)
            );
        }
    }
    for table in [&mut explain, &mut severity, &mut templates] {
        table.push_str("    _ => None,\n}\n");
    }

    let out = PathBuf::from(std::env::var_os("OUT_DIR").expect("cargo sets OUT_DIR"));
    emit(&out, "generated_codes.rs", &codes);
    emit(&out, "generated_explain.rs", &explain);
    emit(&out, "generated_severity.rs", &severity);
    emit(&out, "generated_templates.rs", &templates);
}

fn check(entries: &[Entry]) {
    let mut ids = BTreeSet::new();
    let mut names = BTreeSet::new();
    for e in entries {
        let id = e.id.as_str();
        let digits = id.strip_prefix("ASM").unwrap_or_default();
        if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            panic!("{id}: codes are spelled ASM followed by four digits");
        }
        let screaming = e.const_name.starts_with(|c: char| c.is_ascii_uppercase())
            && e
                .const_name
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_');
        if !screaming {
            panic!("{id}: constName `{}` must be SCREAMING_SNAKE_CASE", e.const_name);
        }
        if !ids.insert(id) {
            panic!("{id} is listed twice");
        }
        if !names.insert(e.const_name.as_str()) {
            panic!("{id}: constName `{}` is already taken", e.const_name);
        }
        for (variant, template) in &e.message_templates {
            for key in template_keys(template) {
                if !e.context_keys.iter().any(|k| k == key) {
                    panic!("{id}: template `{variant}` uses {{{key}}}, which contextKeys does not declare");
                }
            }
        }
    }
}

fn severity_variant(e: &Entry) -> &'static str {
    match e.severity.as_str() {
        "error" => "Severity::Error",
        "warn" => "Severity::Warn",
        "info" => "Severity::Info",
        other => panic!("{}: unknown severity `{other}`", e.id),
    }
}

fn emit(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap_or_else(|e| panic!("cannot write {name}: {e}"));
}

fn escape(value: &str) -> String {
    value.chars().flat_map(char::escape_default).collect()
}

/// Keys of every `{key}` in a template.
fn template_keys(template: &str) -> Vec<&str> {
    template
        .split('{')
        .skip(1)
        .filter_map(|rest| rest.split_once('}'))
        .map(|(key, _)| key.trim())
        .filter(|key| !key.is_empty())
        .collect()
}
