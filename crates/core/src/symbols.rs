//! Symbol table construction: one forward pass that records label and
//! variable definitions, declaration-only names, and block nesting depth.

use crate::grammar::dialect::Grammar;
use crate::grammar::lexer::{
    char_col, code_part, ident_end, is_inside_string, is_word_char, leading_ident,
    leading_keyword, skip_ws, string_spans,
};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Running nesting counters, updated line by line in document order.
///
/// Both counters must be zero at the end of a well-formed document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanState {
    /// Net `{` minus `}` seen so far. Negative when a block closes before it opens.
    pub brace_depth: i64,
    /// Open `MACRO` bodies. `ENDM` never takes it below zero.
    pub macro_depth: u32,
}

impl ScanState {
    /// Fold one line's code part into the counters.
    ///
    /// Every `{` and `}` of the code part counts, string literals included.
    pub fn observe(&mut self, code: &str) {
        for c in code.bytes() {
            match c {
                b'{' => self.brace_depth += 1,
                b'}' => self.brace_depth -= 1,
                _ => {}
            }
        }
        if leading_keyword(code, "MACRO") {
            self.macro_depth += 1;
        }
        if leading_keyword(code, "ENDM") {
            self.macro_depth = self.macro_depth.saturating_sub(1);
        }
    }

    /// Whether both counters are back at zero.
    pub fn is_balanced(&self) -> bool {
        self.brace_depth == 0 && self.macro_depth == 0
    }
}

/// What a tracked definition introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    /// `name:`
    Label,
    /// `name EQU`, `name =`, `name DS.x`, or a member line of a scoped block.
    Variable,
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolKind::Label => f.write_str("label"),
            SymbolKind::Variable => f.write_str("variable"),
        }
    }
}

/// Where one definition occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DefinitionSite {
    /// Zero-based line.
    pub line: usize,
    /// Character column of the first character of the name.
    pub column: usize,
}

/// A label or variable and every place it is defined, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolRecord {
    /// Exact-case name.
    pub name: String,
    /// Label or variable.
    pub kind: SymbolKind,
    /// Definition sites; more than one is a duplicate definition.
    pub definitions: Vec<DefinitionSite>,
}

/// Every name a document defines.
///
/// Labels and variables keep their first-definition order. Declaration-only
/// names (`EXTERN foo`, `MACRO bar`, ...) join the identifier universe but are
/// never checked for duplicates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SymbolTable {
    /// Labels in order of first definition.
    pub labels: Vec<SymbolRecord>,
    /// Variables in order of first definition.
    pub variables: Vec<SymbolRecord>,
    /// Declaration-only names.
    pub declarations: BTreeSet<String>,
    /// Counters after the last line.
    pub final_state: ScanState,
    #[serde(skip)]
    label_index: HashMap<String, usize>,
    #[serde(skip)]
    variable_index: HashMap<String, usize>,
    #[serde(skip)]
    universe: HashSet<String>,
}

impl SymbolTable {
    /// Scan raw source lines once and collect all definitions.
    pub fn build<S: AsRef<str>>(lines: &[S], grammar: &Grammar) -> Self {
        let mut table = Self::default();
        let mut state = ScanState::default();
        for (line_no, raw) in lines.iter().enumerate() {
            let code = code_part(raw.as_ref());
            let spans = string_spans(code);
            state.observe(code);

            if let Some((start, end)) = label_name(code)
                && !is_inside_string(&spans, start, end - start)
            {
                table.record(SymbolKind::Label, &code[start..end], line_no, char_col(code, start));
            }

            if let Some((start, end)) = variable_name(code, state.brace_depth > 0)
                && !is_inside_string(&spans, start, end - start)
            {
                table.record(SymbolKind::Variable, &code[start..end], line_no, char_col(code, start));
            }

            if let Some((start, end)) = declared_name(code, grammar)
                && !is_inside_string(&spans, start, end - start)
            {
                let name = &code[start..end];
                table.declarations.insert(name.to_string());
                table.universe.insert(name.to_string());
            }
        }
        table.final_state = state;
        tracing::debug!(
            labels = table.labels.len(),
            variables = table.variables.len(),
            declarations = table.declarations.len(),
            brace_depth = state.brace_depth,
            macro_depth = state.macro_depth,
            "built symbol table"
        );
        table
    }

    fn record(&mut self, kind: SymbolKind, name: &str, line: usize, column: usize) {
        let (records, index) = match kind {
            SymbolKind::Label => (&mut self.labels, &mut self.label_index),
            SymbolKind::Variable => (&mut self.variables, &mut self.variable_index),
        };
        let site = DefinitionSite { line, column };
        match index.get(name) {
            Some(&i) => records[i].definitions.push(site),
            None => {
                index.insert(name.to_string(), records.len());
                records.push(SymbolRecord {
                    name: name.to_string(),
                    kind,
                    definitions: vec![site],
                });
            }
        }
        self.universe.insert(name.to_string());
    }

    /// Whether `name` (exact case) is defined or declared anywhere.
    pub fn contains(&self, name: &str) -> bool {
        self.universe.contains(name)
    }

    /// The label record for `name`, if any.
    pub fn label(&self, name: &str) -> Option<&SymbolRecord> {
        self.label_index.get(name).map(|&i| &self.labels[i])
    }

    /// The variable record for `name`, if any.
    pub fn variable(&self, name: &str) -> Option<&SymbolRecord> {
        self.variable_index.get(name).map(|&i| &self.variables[i])
    }

    /// Every definition after the first of a name, sorted by position.
    pub fn redefinitions(&self) -> Vec<(&SymbolRecord, DefinitionSite)> {
        let mut out: Vec<_> = self
            .labels
            .iter()
            .chain(&self.variables)
            .flat_map(|r| r.definitions.iter().skip(1).map(move |site| (r, *site)))
            .collect();
        out.sort_by_key(|(_, site)| *site);
        out
    }
}

/// `name:` at line start.
fn label_name(code: &str) -> Option<(usize, usize)> {
    let (start, end) = leading_ident(code)?;
    let colon = skip_ws(code, end);
    (code.as_bytes().get(colon) == Some(&b':')).then_some((start, end))
}

/// `name EQU`, `name = `, `name DS.B|W|L|D`, or, inside a scoped block, a
/// line holding nothing but `name`.
fn variable_name(code: &str, in_block: bool) -> Option<(usize, usize)> {
    let (start, end) = leading_ident(code)?;
    let after = skip_ws(code, end);
    let has_gap = after > end;
    let rest = &code[after..];
    let is_equ = has_gap && starts_with_word(rest, "EQU");
    let is_assign = rest.starts_with('=');
    let is_storage = has_gap && is_storage_width(rest);
    let is_member = in_block && rest.is_empty();
    (is_equ || is_assign || is_storage || is_member).then_some((start, end))
}

fn starts_with_word(s: &str, word: &str) -> bool {
    s.get(..word.len())
        .is_some_and(|w| w.eq_ignore_ascii_case(word))
        && s.as_bytes().get(word.len()).is_none_or(|&c| !is_word_char(c))
}

fn is_storage_width(s: &str) -> bool {
    s.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("DS."))
        && s
            .as_bytes()
            .get(3)
            .is_some_and(|c| matches!(c.to_ascii_uppercase(), b'B' | b'W' | b'L' | b'D'))
}

/// The name following a declaration keyword (`EXTERN foo`, `MACRO bar`).
fn declared_name(code: &str, grammar: &Grammar) -> Option<(usize, usize)> {
    let (kw_start, kw_end) = leading_ident(code)?;
    if !grammar.is_declaration_keyword(&code[kw_start..kw_end]) {
        return None;
    }
    let start = skip_ws(code, kw_end);
    if start == kw_end {
        return None;
    }
    let end = ident_end(code, start)?;
    let trimmed = code[start..end].trim_end_matches('.');
    (!trimmed.is_empty()).then_some((start, start + trimmed.len()))
}
