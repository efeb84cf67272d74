use crate::grammar::dialect::Grammar;
use crate::grammar::lexer::StringSpan;
use crate::symbols::SymbolTable;

/// Shared immutable context threaded through validation passes.
#[derive(Clone, Copy)]
pub(super) struct ValidationContext<'a> {
    pub(super) grammar: &'a Grammar,
    pub(super) symbols: &'a SymbolTable,
}

/// Per-line view used by the line passes.
#[derive(Clone, Copy)]
pub(super) struct LineCtx<'a> {
    pub(super) index: usize,
    /// Code part of the line (comment removed).
    pub(super) code: &'a str,
    pub(super) spans: &'a [StringSpan],
}
