//! Declarative usage grammars for assembly dialects.
//!
//! A grammar is plain data: a placeholder legend, a table of instruction
//! mnemonics, a table of assembler directives, and the keywords that introduce
//! declaration-only symbols. Each mnemonic lists its legal operand forms as
//! usage strings such as `"LD %r, %nn"`. The tables are deserialized from
//! JSON (see `data/`) and consumed by the analysis engine, which compiles the
//! usage strings into typed placeholders.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Current format version for the rule table JSON schema.
pub const TABLE_FORMAT_VERSION: &str = "1.0.0";

/// Embedded grammar sources, keyed by table name.
const EMBEDDED: &[(&str, &str)] = &[("z80", include_str!("../data/z80.json"))];

/// Errors that can occur when loading a rule table.
#[derive(Debug, Error)]
pub enum TableError {
    /// JSON deserialization failed.
    #[error("invalid rule table JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// No embedded table has the requested name.
    #[error("unknown rule table '{name}' (available: {available})")]
    UnknownTable {
        /// The requested table name.
        name: String,
        /// Comma-separated list of embedded table names.
        available: String,
    },
}

/// Semantic class of an operand that has no closed set of spellings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// A quoted string literal.
    AnyString,
    /// A variable name.
    AnyVariable,
    /// A label name.
    AnyLabel,
    /// An 8-bit numeric expression.
    #[serde(rename = "any8BitNumber")]
    Any8BitNumber,
    /// A 16-bit numeric expression.
    #[serde(rename = "any16BitNumber")]
    Any16BitNumber,
    /// A signed 16-bit displacement.
    #[serde(rename = "anySigned16BitNumber")]
    AnySigned16BitNumber,
    /// Free-form operand text. Rules using it take the whole operand list as one operand.
    Any,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::AnyString => write!(f, "string"),
            Category::AnyVariable => write!(f, "variable"),
            Category::AnyLabel => write!(f, "label"),
            Category::Any8BitNumber => write!(f, "8-bit number"),
            Category::Any16BitNumber => write!(f, "16-bit number"),
            Category::AnySigned16BitNumber => write!(f, "signed 16-bit number"),
            Category::Any => write!(f, "any"),
        }
    }
}

/// One entry of the placeholder legend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum LegendEntry {
    /// A fixed set of literal spellings (registers, condition codes, bit numbers).
    Tokens(Vec<String>),
    /// One or more open categories with no fixed member set.
    Categories(Vec<Category>),
}

impl LegendEntry {
    /// The literal tokens of this entry, empty for category entries.
    pub fn tokens(&self) -> &[String] {
        match self {
            LegendEntry::Tokens(tokens) => tokens,
            LegendEntry::Categories(_) => &[],
        }
    }

    /// Whether this entry includes the free-form [`Category::Any`].
    pub fn is_free_form(&self) -> bool {
        matches!(self, LegendEntry::Categories(c) if c.contains(&Category::Any))
    }
}

/// A placeholder key referenced by a rule but absent from the legend.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UndeclaredPlaceholder {
    /// Mnemonic owning the rule.
    pub mnemonic: String,
    /// The full usage string.
    pub rule: String,
    /// The placeholder key without its `%` sigil.
    pub key: String,
}

/// A complete usage grammar for one assembly dialect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleTables {
    /// Version of the table JSON schema.
    #[serde(default = "default_format_version")]
    pub schema_version: String,
    /// Table name (e.g. `"z80"`).
    pub name: String,
    /// Placeholder key → allowed values or category.
    pub legend: BTreeMap<String, LegendEntry>,
    /// Instruction mnemonic → usage strings, in declared order.
    pub instructions: BTreeMap<String, Vec<String>>,
    /// Directive mnemonic → usage strings, in declared order.
    pub directives: BTreeMap<String, Vec<String>>,
    /// Keywords whose first operand names a declaration-only symbol.
    #[serde(default)]
    pub declaration_keywords: Vec<String>,
}

fn default_format_version() -> String {
    TABLE_FORMAT_VERSION.to_string()
}

impl RuleTables {
    /// Parse a rule table from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, TableError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load one of the tables compiled into this crate.
    pub fn embedded(name: &str) -> Result<Self, TableError> {
        let source = EMBEDDED
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, json)| *json)
            .ok_or_else(|| TableError::UnknownTable {
                name: name.to_string(),
                available: Self::embedded_names().join(", "),
            })?;
        Self::from_json_str(source)
    }

    /// Names of all embedded tables.
    pub fn embedded_names() -> Vec<&'static str> {
        EMBEDDED.iter().map(|(n, _)| *n).collect()
    }

    /// Usage strings for a case-folded mnemonic: instructions first, then directives.
    pub fn rules_for(&self, mnemonic: &str) -> Option<&[String]> {
        self.instructions
            .get(mnemonic)
            .or_else(|| self.directives.get(mnemonic))
            .map(Vec::as_slice)
    }

    /// Every mnemonic key of both tables.
    pub fn mnemonics(&self) -> impl Iterator<Item = &str> {
        self.instructions
            .keys()
            .chain(self.directives.keys())
            .map(String::as_str)
    }

    /// Every literal token declared anywhere in the legend.
    pub fn legend_tokens(&self) -> impl Iterator<Item = &str> {
        self.legend
            .values()
            .flat_map(|entry| entry.tokens().iter().map(String::as_str))
    }

    /// Placeholder keys referenced by rules but missing from the legend.
    ///
    /// The engine degrades such keys to literal tokens; this check lets table
    /// authors find typos such as `$r` for `%r`.
    pub fn undeclared_placeholders(&self) -> Vec<UndeclaredPlaceholder> {
        let mut out = Vec::new();
        let tables = [&self.instructions, &self.directives];
        for (mnemonic, rules) in tables.into_iter().flatten() {
            for rule in rules {
                let mut seen = BTreeSet::new();
                for key in placeholder_keys(rule) {
                    if !self.legend.contains_key(key) && seen.insert(key) {
                        out.push(UndeclaredPlaceholder {
                            mnemonic: mnemonic.clone(),
                            rule: rule.clone(),
                            key: key.to_string(),
                        });
                    }
                }
            }
        }
        out
    }
}

/// Keys of every `%key` reference in a usage string, skipping `%[...]` option lists.
fn placeholder_keys(rule: &str) -> impl Iterator<Item = &str> {
    let bytes = rule.as_bytes();
    let mut keys = Vec::new();
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        if bytes.get(i + 1) == Some(&b'[') {
            i = match rule[i..].find(']') {
                Some(close) => i + close + 1,
                None => bytes.len(),
            };
            continue;
        }
        let start = i + 1;
        let mut end = start;
        while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
            end += 1;
        }
        if end > start {
            keys.push(&rule[start..end]);
        }
        i = end.max(i + 1);
    }
    keys.into_iter()
}
