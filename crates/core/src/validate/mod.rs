//! Document validation: builds the symbol table once, runs the per-line
//! usage and reference passes, then appends duplicate and block findings.

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
///
/// ```ignore
/// ctx!("name" => name, "kind" => kind)
/// ```
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        std::collections::BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

mod blocks;
mod context;
mod diagnostics_util;
mod duplicates;
mod references;
mod usage;

pub use crate::grammar::diag::Diagnostic;
use crate::grammar::dialect::Grammar;
use crate::grammar::diag::Severity;
use crate::grammar::lexer::{code_part, string_spans};
use crate::symbols::SymbolTable;
use context::{LineCtx, ValidationContext};
use serde::Serialize;

/// Result of validating one document snapshot.
///
/// `issues` is the complete diagnostic set for the snapshot; it replaces any
/// earlier set for the same document.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    /// `true` if no errors were found.
    pub ok: bool,
    /// All diagnostics, in report order.
    pub issues: Vec<Diagnostic>,
    /// The symbol table the checks were run against.
    #[serde(skip)]
    pub symbols: SymbolTable,
}

/// Split document text into lines (`\n`, with an optional trailing `\r`).
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Validate full document text.
pub fn validate(text: &str, grammar: &Grammar) -> ValidationResult {
    validate_lines(&split_lines(text), grammar)
}

/// Validate a document given as lines.
///
/// Report order: usage then undefined-reference findings per line in line
/// order, then duplicate definitions in line order, then block balance.
pub fn validate_lines<S: AsRef<str>>(lines: &[S], grammar: &Grammar) -> ValidationResult {
    let symbols = SymbolTable::build(lines, grammar);
    let vctx = ValidationContext {
        grammar,
        symbols: &symbols,
    };

    let mut issues = Vec::new();
    for (index, raw) in lines.iter().enumerate() {
        let code = code_part(raw.as_ref());
        if code.trim().is_empty() {
            continue;
        }
        let spans = string_spans(code);
        let line = LineCtx {
            index,
            code,
            spans: &spans,
        };
        usage::validate_usage(&vctx, &line, &mut issues);
        references::validate_references(&vctx, &line, &mut issues);
    }
    let line_issues = issues.len();

    duplicates::validate_duplicates(&symbols, &mut issues);
    blocks::validate_blocks(symbols.final_state, &mut issues);

    tracing::debug!(
        lines = lines.len(),
        line_issues,
        total = issues.len(),
        "validated document"
    );

    let ok = !issues.iter().any(|d| matches!(d.severity, Severity::Error));
    ValidationResult {
        ok,
        issues,
        symbols,
    }
}
