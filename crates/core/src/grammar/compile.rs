//! Usage-rule compiler: turns a textual rule such as `"LD %r, (IX+%s)"` into
//! a head word plus an ordered list of [`Placeholder`]s.

use super::dialect::OperandPolicy;
use super::placeholder::{Inner, Placeholder};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use z80lint_rule_tables::LegendEntry;

/// A usage rule that could not be compiled.
#[derive(Debug, Clone, Error)]
pub enum RuleError {
    /// The rule string has no head word.
    #[error("usage rule is empty")]
    Empty,

    /// A composite unit produced an invalid matcher.
    #[error("cannot build matcher for '{unit}' in rule '{rule}': {source}")]
    Template {
        /// The full usage string.
        rule: String,
        /// The offending unit.
        unit: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
}

/// One usage rule, compiled.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// The usage string as written in the table.
    pub text: String,
    /// First word of the rule, upper-cased (e.g. `LD`, `DS.B`).
    pub head: String,
    /// Operand slots in positional order.
    pub placeholders: Vec<Placeholder>,
}

impl CompiledRule {
    /// Whether any slot is free-form, so the rule may see the whole operand text
    /// as one operand.
    pub fn is_free_form(&self) -> bool {
        self.placeholders.iter().any(Placeholder::is_free_form)
    }
}

/// Compile one usage string against a legend under the given operand policy.
///
/// Pure: the same inputs always yield the same rule, so callers compile each
/// table once and share the result.
pub fn compile_rule(
    text: &str,
    legend: &BTreeMap<String, LegendEntry>,
    policy: OperandPolicy,
) -> Result<CompiledRule, RuleError> {
    let units = split_units(text);
    let Some((head, rest)) = units.split_first() else {
        return Err(RuleError::Empty);
    };
    let mut placeholders = Vec::with_capacity(rest.len());
    for unit in rest {
        let unit = unit.trim_end_matches(',');
        if unit.chars().all(|c| matches!(c, ',' | '(' | ')')) {
            continue;
        }
        placeholders.push(compile_unit(text, unit, legend, policy)?);
    }
    Ok(CompiledRule {
        text: text.to_string(),
        head: head.to_ascii_uppercase(),
        placeholders,
    })
}

fn compile_unit(
    rule: &str,
    unit: &str,
    legend: &BTreeMap<String, LegendEntry>,
    policy: OperandPolicy,
) -> Result<Placeholder, RuleError> {
    if let Some(list) = unit.strip_prefix("%[").and_then(|u| u.strip_suffix(']')) {
        return Ok(Placeholder::Options(upper_set(list.split_whitespace())));
    }
    let Some(pct) = unit.find('%') else {
        return Ok(Placeholder::Literal(unit.to_ascii_uppercase()));
    };
    let key = placeholder_key(&unit[pct + 1..]);
    if key.is_empty() {
        return Ok(Placeholder::Literal(unit.to_ascii_uppercase()));
    }
    let entry = legend.get(key);

    // Standalone `%key`.
    if pct == 0 && key.len() + 1 == unit.len() {
        return Ok(match entry {
            Some(LegendEntry::Tokens(tokens)) => Placeholder::RegisterSet {
                key: key.to_string(),
                tokens: upper_set(tokens.iter().map(String::as_str)),
            },
            Some(e @ LegendEntry::Categories(_)) => Placeholder::Any {
                key: key.to_string(),
                free_form: e.is_free_form(),
            },
            None => Placeholder::Literal(key.to_ascii_uppercase()),
        });
    }

    if !policy.composite_patterns {
        return Ok(Placeholder::Any {
            key: unit.to_string(),
            free_form: false,
        });
    }

    let prefix = &unit[..pct];
    let suffix = &unit[pct + 1 + key.len()..];
    let matcher = Regex::new(&format!(
        "(?i)^{}(.+){}$",
        regex::escape(prefix),
        regex::escape(suffix)
    ))
    .map_err(|source| RuleError::Template {
        rule: rule.to_string(),
        unit: unit.to_string(),
        source,
    })?;
    let inner = match entry {
        Some(LegendEntry::Tokens(tokens)) => Inner::Tokens(upper_set(tokens.iter().map(String::as_str))),
        Some(LegendEntry::Categories(_)) => Inner::Open,
        None => Inner::Literal(key.to_ascii_uppercase()),
    };
    Ok(Placeholder::Pattern {
        template: unit.to_string(),
        matcher,
        inner,
    })
}

/// Split a rule on whitespace, keeping a `%[...]` option list as one unit.
fn split_units(text: &str) -> Vec<&str> {
    let b = text.as_bytes();
    let mut units = Vec::new();
    let mut i = 0usize;
    while i < b.len() {
        if b[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        while i < b.len() && !b[i].is_ascii_whitespace() {
            if b[i] == b'%' && b.get(i + 1) == Some(&b'[') {
                i = text[i..].find(']').map_or(b.len(), |close| i + close + 1);
            } else {
                i += 1;
            }
        }
        units.push(&text[start..i]);
    }
    units
}

fn placeholder_key(s: &str) -> &str {
    let end = s
        .bytes()
        .position(|c| !(c.is_ascii_alphanumeric() || c == b'_'))
        .unwrap_or(s.len());
    &s[..end]
}

fn upper_set<'a>(items: impl Iterator<Item = &'a str>) -> BTreeSet<String> {
    items.map(str::to_ascii_uppercase).collect()
}
