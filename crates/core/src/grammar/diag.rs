pub use z80lint_diagnostics::{Diagnostic, LineIndex, SOURCE, Severity, Span, codes};
