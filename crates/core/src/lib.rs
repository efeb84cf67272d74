//! z80lint core library.
//!
//! Static analysis for Z80 assembly source: symbol-table construction,
//! duplicate and undefined-symbol detection, block-balance checks, and
//! validation of every instruction and directive against a declarative usage
//! grammar. The main entry points are [`Grammar::builtin`] to obtain a
//! compiled dialect grammar and [`validate`] to check a document.
//!
//! ```
//! use z80lint_core::{DialectId, Grammar, validate};
//!
//! let grammar = Grammar::builtin(DialectId::Z80).unwrap();
//! let result = validate("LOOP: LD A, (HL)\n      JP LOOP\n", grammar);
//! assert!(result.ok);
//! ```

#![warn(missing_docs)]

/// Grammar: line classification, rule compilation, dialects.
pub mod grammar;
/// Symbol table builder.
pub mod symbols;
/// Document validation passes.
pub mod validate;

// ── Convenience re-exports ──────────────────────────────────────────────────

// Grammar
pub use grammar::compile::{CompiledRule, RuleError, compile_rule};
pub use grammar::dialect::{DialectId, Grammar, MnemonicRules, OperandPolicy};
pub use grammar::placeholder::{Inner, Placeholder};

// Symbols
pub use symbols::{DefinitionSite, ScanState, SymbolKind, SymbolRecord, SymbolTable};

// Diagnostics (re-exported from the diagnostics crate)
pub use grammar::diag::{Diagnostic, LineIndex, Severity, Span, codes};

// Validator
pub use validate::{ValidationResult, split_lines, validate, validate_lines};

// Tables
pub use grammar::tables::{RuleTables, TableError};

// Serialization helpers
pub use grammar::dump::to_pretty_json;
