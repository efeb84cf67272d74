mod render;

use std::fs;
use std::io;
use std::ops::Deref;
use std::process;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::Level;
use z80lint_core::{
    DialectId, Grammar, Placeholder, SymbolRecord, SymbolTable, split_lines, to_pretty_json,
    validate,
};
use z80lint_diagnostics::{self as diag, Diagnostic, Severity};
use z80lint_rule_tables::{RuleTables, UndeclaredPlaceholder};

use crate::render::{Format, print_summary, render_diagnostics_pretty};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "z80lint",
    version,
    about = "z80lint: find undefined symbols, duplicate definitions, and invalid instruction usage in Z80 assembly"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Most verbose log level written to stderr.
    #[arg(long, global = true, default_value_t = Level::WARN)]
    log_level: Level,

    #[command(subcommand)]
    cmd: Cmd,
}

/// Grammar selection shared by every command that analyses source.
#[derive(Args, Debug, Clone)]
struct GrammarArgs {
    /// Assembly dialect: selects the built-in rule table and operand policy.
    #[arg(long, default_value_t = DialectId::Z80)]
    dialect: DialectId,

    /// Path to a rule table JSON file to use instead of the built-in table.
    /// The dialect's operand policy still applies.
    #[arg(long)]
    tables: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Lint an assembly file: symbols, instruction usage, and block balance.
    Lint {
        file: String,
        #[command(flatten)]
        grammar: GrammarArgs,
    },

    /// Print the symbol table of an assembly file.
    Symbols {
        file: String,
        #[command(flatten)]
        grammar: GrammarArgs,
    },

    /// Explain a diagnostic ID (e.g. ASM1002).
    Explain { id: String },

    /// Show the usage variants of a mnemonic and how they compile.
    Rules {
        mnemonic: String,
        #[command(flatten)]
        grammar: GrammarArgs,
    },

    /// Self-check a rule table for placeholder keys missing from its legend.
    Tables {
        #[command(flatten)]
        grammar: GrammarArgs,
    },
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(io::stderr)
        .init();
    let format = Format::resolve_or_detect(cli.output.as_deref());

    match cli.cmd {
        Cmd::Lint { file, grammar } => cmd_lint(&file, &grammar, format)?,
        Cmd::Symbols { file, grammar } => cmd_symbols(&file, &grammar, format)?,
        Cmd::Explain { id } => cmd_explain(&id, format)?,
        Cmd::Rules { mnemonic, grammar } => cmd_rules(&mnemonic, &grammar, format)?,
        Cmd::Tables { grammar } => cmd_tables(&grammar, format)?,
    }

    Ok(())
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_lint(file: &str, args: &GrammarArgs, format: Format) -> Result<()> {
    let input = read_source(file)?;
    let grammar = load_grammar(args)?;
    let vr = validate(&input, &grammar);
    tracing::info!(file, issues = vr.issues.len(), "lint finished");

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "ok": vr.ok,
                "issues": vr.issues,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            render_diagnostics_pretty(&input, file, &vr.issues);
            print_summary(&vr.issues);
            if vr.ok {
                eprintln!("lint ok");
            }
        }
    }

    exit_on_errors(&vr.issues);
    Ok(())
}

fn cmd_symbols(file: &str, args: &GrammarArgs, format: Format) -> Result<()> {
    let input = read_source(file)?;
    let grammar = load_grammar(args)?;
    let table = SymbolTable::build(&split_lines(&input), &grammar);

    match format {
        Format::Json => println!("{}", to_pretty_json(&table)?),
        Format::Pretty => {
            print_records("labels", &table.labels);
            print_records("variables", &table.variables);
            if !table.declarations.is_empty() {
                let names: Vec<&str> = table.declarations.iter().map(String::as_str).collect();
                println!("declarations: {}", names.join(", "));
            }
            println!(
                "end of file: brace depth {}, macro depth {}",
                table.final_state.brace_depth, table.final_state.macro_depth
            );
        }
    }
    Ok(())
}

fn print_records(title: &str, records: &[SymbolRecord]) {
    if records.is_empty() {
        return;
    }
    println!("{title}:");
    let width = records.iter().map(|r| r.name.len()).max().unwrap_or(0);
    for r in records {
        let sites: Vec<String> = r
            .definitions
            .iter()
            .map(|s| format!("{}:{}", s.line + 1, s.column + 1))
            .collect();
        let marker = if sites.len() > 1 { "  (duplicate)" } else { "" };
        println!("  {:<width$}  {}{marker}", r.name, sites.join(", "));
    }
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let text = diag::explain(id);
            let out = serde_json::json!({
                "id": id,
                "explanation": text,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            // Explanation is the expected output, so it goes to stdout.
            if let Some(text) = diag::explain(id) {
                use ariadne::Fmt;
                println!("{}: {}", id.fg(ariadne::Color::Cyan), text);
            } else {
                println!("{}: (no explanation available)", id);
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct RuleView {
    rule: Option<String>,
    placeholders: Vec<PlaceholderView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct PlaceholderView {
    kind: &'static str,
    detail: String,
}

impl PlaceholderView {
    fn new(p: &Placeholder) -> Self {
        Self {
            kind: p.kind(),
            detail: p.to_string(),
        }
    }
}

fn cmd_rules(mnemonic: &str, args: &GrammarArgs, format: Format) -> Result<()> {
    let grammar = load_grammar(args)?;
    let entry = grammar.lookup(mnemonic).with_context(|| {
        format!(
            "'{mnemonic}' is not an instruction or directive of the {} grammar",
            grammar.tables().name
        )
    })?;
    let views: Vec<RuleView> = entry
        .rules
        .iter()
        .map(|r| match r {
            Ok(rule) => RuleView {
                rule: Some(rule.text.clone()),
                placeholders: rule.placeholders.iter().map(PlaceholderView::new).collect(),
                error: None,
            },
            Err(e) => RuleView {
                rule: None,
                placeholders: Vec::new(),
                error: Some(e.to_string()),
            },
        })
        .collect();

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "mnemonic": entry.mnemonic,
                "dialect": args.dialect.name(),
                "variants": views,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            println!("{} ({} variant(s), {})", entry.mnemonic, views.len(), args.dialect);
            for view in &views {
                match (&view.rule, &view.error) {
                    (Some(rule), _) => {
                        println!("  {rule}");
                        for p in &view.placeholders {
                            println!("      {:<13} {}", p.kind, p.detail);
                        }
                    }
                    (None, Some(error)) => println!("  <invalid rule>: {error}"),
                    (None, None) => {}
                }
            }
        }
    }
    Ok(())
}

fn cmd_tables(args: &GrammarArgs, format: Format) -> Result<()> {
    let grammar = load_grammar(args)?;
    let tables = grammar.tables();
    let undeclared: Vec<UndeclaredPlaceholder> = tables.undeclared_placeholders();
    let rule_errors: Vec<String> = grammar
        .mnemonics()
        .flat_map(|m| {
            m.rules
                .iter()
                .filter_map(move |r| r.as_ref().err().map(|e| format!("{}: {e}", m.mnemonic)))
        })
        .collect();
    let mnemonics = grammar.mnemonics().count();
    let ok = undeclared.is_empty() && rule_errors.is_empty();

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "ok": ok,
                "name": tables.name,
                "schemaVersion": tables.schema_version,
                "dialect": args.dialect.name(),
                "mnemonics": mnemonics,
                "declarationKeywords": grammar.declaration_keywords(),
                "undeclared": undeclared,
                "ruleErrors": rule_errors,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            println!(
                "{} (schema {}): {mnemonics} mnemonics, {} legend keys",
                tables.name,
                tables.schema_version,
                tables.legend.len()
            );
            println!("  declaration keywords: {}", grammar.declaration_keywords().join(", "));
            for u in &undeclared {
                println!("  undeclared placeholder %{} in {}: {}", u.key, u.mnemonic, u.rule);
            }
            for e in &rule_errors {
                println!("  rule error: {e}");
            }
            if ok {
                println!("tables ok");
            }
        }
    }

    if !ok {
        process::exit(1);
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn exit_on_errors(diagnostics: &[Diagnostic]) {
    if diagnostics
        .iter()
        .any(|d| matches!(d.severity, Severity::Error))
    {
        process::exit(1);
    }
}

fn read_source(file: &str) -> Result<String> {
    fs::read_to_string(file).with_context(|| format!("failed to read {file}"))
}

/// Built-in grammars are shared statics; a `--tables` file compiles its own.
enum LoadedGrammar {
    Builtin(&'static Grammar),
    Custom(Box<Grammar>),
}

impl Deref for LoadedGrammar {
    type Target = Grammar;

    fn deref(&self) -> &Grammar {
        match self {
            LoadedGrammar::Builtin(g) => g,
            LoadedGrammar::Custom(g) => g,
        }
    }
}

fn load_grammar(args: &GrammarArgs) -> Result<LoadedGrammar> {
    match &args.tables {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read rule tables {path}"))?;
            let tables = RuleTables::from_json_str(&json)
                .with_context(|| format!("failed to load rule tables {path}"))?;
            tracing::debug!(path = %path, table = %tables.name, "loaded custom rule tables");
            Ok(LoadedGrammar::Custom(Box::new(Grammar::new(
                tables,
                args.dialect.policy(),
            ))))
        }
        None => Ok(LoadedGrammar::Builtin(
            Grammar::builtin(args.dialect).context("failed to load built-in rule tables")?,
        )),
    }
}
