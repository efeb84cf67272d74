//! Typed operand slots of a compiled usage rule.

use regex::Regex;
use std::collections::BTreeSet;

/// One typed slot in a usage rule that a single operand must satisfy.
///
/// Token sets and literals are stored upper-cased; matching folds the operand
/// to upper case before comparing.
#[derive(Debug, Clone)]
pub enum Placeholder {
    /// Membership in a fixed legend set (registers, condition codes, bit numbers).
    RegisterSet {
        /// Legend key the set came from.
        key: String,
        /// Allowed spellings.
        tokens: BTreeSet<String>,
    },
    /// Membership in an inline option list such as `%[0 1 2]`.
    Options(BTreeSet<String>),
    /// Exact token, compared case-insensitively.
    Literal(String),
    /// Accepts any operand text (open numeric/label/string categories).
    Any {
        /// Legend key, or the template text for a degraded composite unit.
        key: String,
        /// Whether the legend entry is the free-form `any` category.
        free_form: bool,
    },
    /// Composite template such as `(IX+%s)`: the literal structure must match
    /// exactly and the captured text must satisfy `inner`.
    Pattern {
        /// The template text as written in the rule.
        template: String,
        /// Anchored, case-insensitive matcher with one capture group.
        matcher: Regex,
        /// Constraint on the captured text.
        inner: Inner,
    },
}

/// Constraint on the text captured by a [`Placeholder::Pattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inner {
    /// Captured text must be one of these spellings.
    Tokens(BTreeSet<String>),
    /// Captured text must equal this token (undeclared key).
    Literal(String),
    /// Captured text is an open category; anything is accepted.
    Open,
}

impl Inner {
    fn accepts(&self, captured: &str) -> bool {
        match self {
            Inner::Tokens(tokens) => tokens.contains(&captured.to_ascii_uppercase()),
            Inner::Literal(lit) => captured.eq_ignore_ascii_case(lit),
            Inner::Open => true,
        }
    }
}

impl Placeholder {
    /// Whether `operand` (already trimmed) satisfies this slot.
    pub fn accepts(&self, operand: &str) -> bool {
        match self {
            Placeholder::RegisterSet { tokens, .. } | Placeholder::Options(tokens) => {
                tokens.contains(&operand.to_ascii_uppercase())
            }
            Placeholder::Literal(lit) => operand.eq_ignore_ascii_case(lit),
            Placeholder::Any { .. } => true,
            Placeholder::Pattern { matcher, inner, .. } => matcher
                .captures(operand)
                .and_then(|caps| caps.get(1))
                .is_some_and(|m| inner.accepts(m.as_str())),
        }
    }

    /// Short kind name used in listings.
    pub fn kind(&self) -> &'static str {
        match self {
            Placeholder::RegisterSet { .. } => "register-set",
            Placeholder::Options(_) => "options",
            Placeholder::Literal(_) => "literal",
            Placeholder::Any { .. } => "any",
            Placeholder::Pattern { .. } => "pattern",
        }
    }

    /// Whether this slot swallows the whole operand text.
    pub fn is_free_form(&self) -> bool {
        matches!(self, Placeholder::Any { free_form: true, .. })
    }
}

impl std::fmt::Display for Placeholder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn join(tokens: &BTreeSet<String>) -> String {
            tokens.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
        }
        match self {
            Placeholder::RegisterSet { key, tokens } => write!(f, "%{key} {{{}}}", join(tokens)),
            Placeholder::Options(tokens) => write!(f, "[{}]", join(tokens)),
            Placeholder::Literal(lit) => write!(f, "{lit}"),
            Placeholder::Any { key, .. } => write!(f, "%{key} (any)"),
            Placeholder::Pattern {
                template, inner, ..
            } => match inner {
                Inner::Tokens(tokens) => write!(f, "{template} {{{}}}", join(tokens)),
                Inner::Literal(lit) => write!(f, "{template} [{lit}]"),
                Inner::Open => write!(f, "{template}"),
            },
        }
    }
}
