//! Diagnostics for z80lint.
//!
//! Provides [`Diagnostic`], [`Severity`], [`Span`], and [`LineIndex`] types
//! used to report findings from the assembly analysis engine. Diagnostic codes
//! are defined in the [`codes`] module.

#![warn(missing_docs)]

/// Diagnostic ID constants generated from `registry/diagnostics.json`.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Source tag attached to every diagnostic produced by the engine.
pub const SOURCE: &str = "z80lint";

// ── LineIndex ────────────────────────────────────────────────────────────

/// Maps `(line, column)` positions to absolute character offsets.
///
/// Lines and columns are **0-indexed** and columns count characters, the same
/// unit [`Span`] uses. Renderers that address the whole document by offset
/// (such as terminal reporters) use this to place a diagnostic.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Character offset of the start of each line.
    /// `line_starts[0]` is always 0.
    line_starts: Vec<usize>,
    /// Length of each line in characters, excluding the `\n`.
    line_lens: Vec<usize>,
}

impl LineIndex {
    /// Build a `LineIndex` from source text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0usize];
        let mut line_lens = Vec::new();
        let mut offset = 0usize;
        let mut current = 0usize;
        for ch in text.chars() {
            offset += 1;
            if ch == '\n' {
                line_lens.push(current);
                line_starts.push(offset);
                current = 0;
            } else {
                current += 1;
            }
        }
        line_lens.push(current);
        Self {
            line_starts,
            line_lens,
        }
    }

    /// Convert a 0-indexed `(line, column)` pair to a character offset.
    ///
    /// Lines past the end clamp to the last line and columns clamp to the
    /// line length, so the result is always a valid offset into the text.
    pub fn offset(&self, line: usize, col: usize) -> usize {
        let line = line.min(self.line_starts.len() - 1);
        self.line_starts[line] + col.min(self.line_lens[line])
    }

    /// Character offset of the start of the given 0-indexed line.
    ///
    /// Returns `None` if `line` is out of bounds.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Total number of lines (at least 1, even for empty input).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Severity {
    /// Hard error: the input is invalid.
    Error,
    /// Warning: the input may assemble to something unexpected.
    Warn,
    /// Informational note.
    Info,
}

/// Location of a diagnostic: one line, a half-open column range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Span {
    /// Zero-based line number.
    pub line: usize,
    /// Column of the first character (0-based, in characters).
    pub start: usize,
    /// Column one past the last character.
    pub end: usize,
}

impl Span {
    /// Create a span covering columns `[start, end)` of `line`.
    ///
    /// Panics if `end < start`.
    pub fn new(line: usize, start: usize, end: usize) -> Self {
        assert!(end >= start, "Span end ({end}) < start ({start})");
        Self { line, start, end }
    }

    /// Number of characters covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span covers no characters.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A diagnostic message produced by the analysis engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Unique diagnostic code (e.g., `"ASM1001"`).
    pub id: Cow<'static, str>,
    /// Severity level.
    pub severity: Severity,
    /// Human-readable diagnostic message.
    pub message: String,
    /// Location in the document this diagnostic relates to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// Tag identifying the producer of the diagnostic.
    pub source: Cow<'static, str>,
    /// Machine-readable context for tooling. Keys and values are free-form strings.
    ///
    /// Uses `BTreeMap` for deterministic key ordering in serialized output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl Diagnostic {
    /// Create a diagnostic with the given fields and the engine's [`SOURCE`] tag.
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        severity: Severity,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            span,
            source: Cow::Borrowed(SOURCE),
            context: None,
        }
    }

    /// Shorthand for an `Error` diagnostic.
    pub fn error(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Error, message, span)
    }

    /// Attach machine-readable context metadata (builder pattern).
    ///
    /// Keys are short descriptors like `"name"`, `"mnemonic"`, `"kind"`.
    pub fn with_context(mut self, ctx: BTreeMap<String, String>) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Returns the human-readable explanation for this diagnostic's code, if available.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.id)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.id, self.message)
    }
}

/// Returns the human-readable explanation for a diagnostic code, if known.
pub fn explain(id: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_explain.rs"))
}

/// Returns the default severity declared for a diagnostic code.
pub fn severity_for_code(id: &str) -> Option<Severity> {
    include!(concat!(env!("OUT_DIR"), "/generated_severity.rs"))
}

/// Returns the message template for a diagnostic code and variant
/// (e.g. `("ASM2001", "single")`), with `{key}` placeholders.
pub fn message_template_for(id: &str, variant: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_templates.rs"))
}
