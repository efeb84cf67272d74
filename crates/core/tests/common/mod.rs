//! Shared test helpers for `z80lint_core` integration tests.

#![allow(unreachable_pub)]

use std::sync::LazyLock;
use z80lint_core::{DialectId, Diagnostic, Grammar, ValidationResult, validate};

/// Default grammar, compiled once per test binary.
pub static Z80: LazyLock<&'static Grammar> = LazyLock::new(|| {
    Grammar::builtin(DialectId::Z80).unwrap_or_else(|e| panic!("failed to load z80 grammar: {e}"))
});

/// Legacy grammar, compiled once per test binary.
#[allow(dead_code)]
pub static Z80_LEGACY: LazyLock<&'static Grammar> = LazyLock::new(|| {
    Grammar::builtin(DialectId::Z80Legacy)
        .unwrap_or_else(|e| panic!("failed to load z80-legacy grammar: {e}"))
});

/// Validate `src` with the default grammar.
#[allow(dead_code)]
pub fn check(src: &str) -> ValidationResult {
    validate(src, *Z80)
}

/// Diagnostic codes in report order.
#[allow(dead_code)]
pub fn codes_of(result: &ValidationResult) -> Vec<String> {
    result.issues.iter().map(|d| d.id.to_string()).collect()
}

/// All diagnostics with the given code.
#[allow(dead_code)]
pub fn with_code<'a>(result: &'a ValidationResult, code: &str) -> Vec<&'a Diagnostic> {
    result.issues.iter().filter(|d| d.id == code).collect()
}

/// `(line, start, end)` of a diagnostic's span.
#[allow(dead_code)]
pub fn span_of(d: &Diagnostic) -> (usize, usize, usize) {
    let s = d
        .span
        .unwrap_or_else(|| panic!("diagnostic without span: {d}"));
    (s.line, s.start, s.end)
}

/// Assert a document produces no diagnostics.
#[allow(dead_code)]
#[track_caller]
pub fn assert_clean(src: &str) {
    let result = check(src);
    assert!(
        result.issues.is_empty(),
        "expected no diagnostics for {src:?}, got {:#?}",
        result.issues
    );
    assert!(result.ok);
}
