//! Dialect selection and the compiled, shareable [`Grammar`].

use super::compile::{CompiledRule, RuleError, compile_rule};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use std::sync::OnceLock;
use z80lint_rule_tables::{RuleTables, TableError};

/// How operand text is split and how composite units are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperandPolicy {
    /// Rules containing a free-form `%any` slot see the whole operand text as
    /// one operand instead of the comma-split list.
    pub any_takes_whole_operand: bool,
    /// Units such as `(IX+%s)` are matched structurally. When off, such a unit
    /// accepts any operand.
    pub composite_patterns: bool,
}

/// A supported assembly flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DialectId {
    /// Z80 with z88dk-style directives and structural operand patterns.
    Z80,
    /// Same tables, with the older comma-only splitting and no composite patterns.
    Z80Legacy,
}

impl DialectId {
    /// Every dialect, in display order.
    pub const ALL: [DialectId; 2] = [DialectId::Z80, DialectId::Z80Legacy];

    /// Command-line name of the dialect.
    pub fn name(self) -> &'static str {
        match self {
            DialectId::Z80 => "z80",
            DialectId::Z80Legacy => "z80-legacy",
        }
    }

    /// Parse a dialect from its command-line name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(name))
    }

    /// Name of the embedded rule table this dialect uses.
    pub fn table_name(self) -> &'static str {
        "z80"
    }

    /// Operand policy of this dialect.
    pub fn policy(self) -> OperandPolicy {
        match self {
            DialectId::Z80 => OperandPolicy {
                any_takes_whole_operand: true,
                composite_patterns: true,
            },
            DialectId::Z80Legacy => OperandPolicy {
                any_takes_whole_operand: false,
                composite_patterns: false,
            },
        }
    }
}

impl std::fmt::Display for DialectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DialectId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            let names: Vec<_> = Self::ALL.iter().map(|d| d.name()).collect();
            format!("unknown dialect '{s}' (expected one of: {})", names.join(", "))
        })
    }
}

/// Compiled rules of one mnemonic, in declared order.
#[derive(Debug, Clone)]
pub struct MnemonicRules {
    /// Upper-cased table key.
    pub mnemonic: String,
    /// One entry per usage string; failed compilations are kept so callers can
    /// skip them and report why.
    pub rules: Vec<Result<CompiledRule, RuleError>>,
}

/// A rule table compiled under an operand policy.
///
/// Immutable once built; share it by reference across any number of
/// concurrent validations.
#[derive(Debug)]
pub struct Grammar {
    tables: RuleTables,
    policy: OperandPolicy,
    rules: BTreeMap<String, MnemonicRules>,
    known_mnemonics: BTreeSet<String>,
    known_keywords: BTreeSet<String>,
    declaration_keywords: Vec<String>,
}

impl Grammar {
    /// Compile every rule of `tables` once.
    pub fn new(tables: RuleTables, policy: OperandPolicy) -> Self {
        let mut rules = BTreeMap::new();
        let mut known_mnemonics = BTreeSet::new();
        let mut failed = 0usize;
        // Directives first so an instruction with the same key wins.
        for (key, texts) in tables.directives.iter().chain(&tables.instructions) {
            let mnemonic = key.to_ascii_uppercase();
            let compiled: Vec<_> = texts
                .iter()
                .map(|text| {
                    let rule = compile_rule(text, &tables.legend, policy);
                    match &rule {
                        Ok(r) if !r.head.starts_with('%') => {
                            known_mnemonics.insert(r.head.clone());
                        }
                        Ok(_) => {}
                        Err(e) => {
                            failed += 1;
                            tracing::warn!(mnemonic = %mnemonic, rule = %text, error = %e, "rule failed to compile");
                        }
                    }
                    rule
                })
                .collect();
            known_mnemonics.insert(mnemonic.clone());
            rules.insert(
                mnemonic.clone(),
                MnemonicRules {
                    mnemonic,
                    rules: compiled,
                },
            );
        }
        let known_keywords = tables
            .legend_tokens()
            .map(str::to_ascii_uppercase)
            .collect();
        let declaration_keywords = tables
            .declaration_keywords
            .iter()
            .map(|k| k.to_ascii_uppercase())
            .collect();
        tracing::debug!(
            table = %tables.name,
            mnemonics = rules.len(),
            failed,
            "compiled grammar"
        );
        Self {
            tables,
            policy,
            rules,
            known_mnemonics,
            known_keywords,
            declaration_keywords,
        }
    }

    /// Process-wide grammar for a built-in dialect, compiled on first use.
    pub fn builtin(id: DialectId) -> Result<&'static Grammar, TableError> {
        static Z80: OnceLock<Grammar> = OnceLock::new();
        static Z80_LEGACY: OnceLock<Grammar> = OnceLock::new();
        let cell = match id {
            DialectId::Z80 => &Z80,
            DialectId::Z80Legacy => &Z80_LEGACY,
        };
        if let Some(grammar) = cell.get() {
            return Ok(grammar);
        }
        let grammar = Grammar::new(RuleTables::embedded(id.table_name())?, id.policy());
        Ok(cell.get_or_init(|| grammar))
    }

    /// Rules for a written mnemonic.
    ///
    /// Tries the full upper-cased token first, then the part before a width
    /// suffix (`DS.B` falls back to `DS`).
    pub fn lookup(&self, mnemonic: &str) -> Option<&MnemonicRules> {
        let upper = mnemonic.to_ascii_uppercase();
        self.rules.get(&upper).or_else(|| {
            let (base, _) = upper.split_once('.')?;
            self.rules.get(base)
        })
    }

    /// Whether a token (any case) names a mnemonic of this grammar.
    pub fn is_known_mnemonic(&self, token: &str) -> bool {
        self.known_mnemonics.contains(&token.to_ascii_uppercase())
    }

    /// Whether a token (any case) is a register, condition, or other legend literal.
    pub fn is_known_keyword(&self, token: &str) -> bool {
        self.known_keywords.contains(&token.to_ascii_uppercase())
    }

    /// Whether a keyword (any case) introduces a declaration-only symbol.
    pub fn is_declaration_keyword(&self, keyword: &str) -> bool {
        self.declaration_keywords
            .iter()
            .any(|k| k.eq_ignore_ascii_case(keyword))
    }

    /// Declaration keywords, upper-cased.
    pub fn declaration_keywords(&self) -> &[String] {
        &self.declaration_keywords
    }

    /// The operand policy rules were compiled under.
    pub fn policy(&self) -> OperandPolicy {
        self.policy
    }

    /// The source tables.
    pub fn tables(&self) -> &RuleTables {
        &self.tables
    }

    /// Every compiled mnemonic, in key order.
    pub fn mnemonics(&self) -> impl Iterator<Item = &MnemonicRules> {
        self.rules.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_names_round_trip() {
        for id in DialectId::ALL {
            assert_eq!(id.name().parse::<DialectId>().unwrap(), id);
        }
        assert_eq!(DialectId::from_name("Z80-LEGACY"), Some(DialectId::Z80Legacy));
        let err = "6502".parse::<DialectId>().unwrap_err();
        assert!(err.contains("z80-legacy"), "{err}");
    }

    #[test]
    fn builtin_is_shared() {
        let a = Grammar::builtin(DialectId::Z80).unwrap();
        let b = Grammar::builtin(DialectId::Z80).unwrap();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.policy(), DialectId::Z80.policy());
    }

    #[test]
    fn lookup_folds_case_and_strips_width_suffix() {
        let g = Grammar::builtin(DialectId::Z80).unwrap();
        assert_eq!(g.lookup("ld").unwrap().mnemonic, "LD");
        assert_eq!(g.lookup("ds.b").unwrap().mnemonic, "DS");
        assert!(g.lookup("COUNT").is_none());
    }

    #[test]
    fn rule_heads_are_known_mnemonics() {
        let g = Grammar::builtin(DialectId::Z80).unwrap();
        assert!(g.is_known_mnemonic("ds.w"));
        assert!(g.is_known_mnemonic("Halt"));
        assert!(!g.is_known_mnemonic("%var"));
    }

    #[test]
    fn legend_tokens_are_known_keywords() {
        let g = Grammar::builtin(DialectId::Z80).unwrap();
        for token in ["a", "HL", "nz", "IX", "r"] {
            assert!(g.is_known_keyword(token), "{token}");
        }
        assert!(!g.is_known_keyword("LOOP"));
    }

    #[test]
    fn declaration_keywords_include_public() {
        let g = Grammar::builtin(DialectId::Z80).unwrap();
        assert!(g.is_declaration_keyword("public"));
        assert!(g.is_declaration_keyword("EXTERN"));
        assert!(!g.is_declaration_keyword("LD"));
    }

    #[test]
    fn embedded_rules_all_compile() {
        for id in DialectId::ALL {
            let g = Grammar::builtin(id).unwrap();
            for m in g.mnemonics() {
                for rule in &m.rules {
                    assert!(rule.is_ok(), "{}: {:?}", m.mnemonic, rule);
                }
            }
        }
    }
}
