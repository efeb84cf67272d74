/// Usage-rule compiler.
pub mod compile;
/// Re-exports from the diagnostics crate.
pub mod diag;
/// Dialect selection and the compiled grammar.
pub mod dialect;
/// JSON serialization helpers.
pub mod dump;
/// Line classification: comments, strings, identifier tokens.
pub mod lexer;
/// Typed operand slots.
pub mod placeholder;
/// Re-exports of rule table types used by the compiler and validator.
pub mod tables;
