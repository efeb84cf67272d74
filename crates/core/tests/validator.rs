//! Validator tests: symbol resolution (ASM1xxx), instruction usage (ASM2xxx),
//! block balance (ASM3xxx), and report ordering.
//!
//! Grammar compilation and dialect tests live in `grammar.rs`.

mod common;

use common::{assert_clean, check, codes_of, span_of, with_code};
use z80lint_core::{Severity, codes, validate, validate_lines};

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[test]
fn label_defined_once_and_referenced_is_clean() {
    assert_clean("LOOP: LD A, (HL)\n      JP LOOP");
}

#[test]
fn repeated_equ_reports_second_definition() {
    let result = check("COUNT EQU 5\nCOUNT EQU 6");
    assert_eq!(codes_of(&result), [codes::DUPLICATE_DEFINITION]);
    let d = &result.issues[0];
    assert_eq!(span_of(d), (1, 0, 5));
    assert_eq!(d.message, "Duplicate definition: variable 'COUNT'");
    assert_eq!(d.severity, Severity::Error);
    let ctx = d.context.as_ref().unwrap();
    assert_eq!(ctx["first_line"], "0");
    assert_eq!(ctx["kind"], "variable");
    assert!(!result.ok);
}

#[test]
fn undefined_jump_target_is_reported_at_its_name() {
    let result = check("JP NOWHERE");
    assert_eq!(codes_of(&result), [codes::UNDEFINED_SYMBOL]);
    assert_eq!(span_of(&result.issues[0]), (0, 3, 10));
    assert_eq!(
        result.issues[0].message,
        "Reference to an undefined symbol: 'NOWHERE'"
    );
}

#[test]
fn add_hl_with_8bit_register_is_invalid_usage() {
    let result = check("ADD HL, A");
    assert_eq!(codes_of(&result), [codes::INVALID_USAGE]);
    let d = &result.issues[0];
    assert_eq!(span_of(d), (0, 4, 9));
    assert!(
        d.message
            .starts_with("Invalid usage of ADD. Allowed variant(s): ADD A, %r | "),
        "{}",
        d.message
    );
    assert!(d.message.contains("ADD HL, %ss"), "{}", d.message);
    assert_eq!(d.context.as_ref().unwrap()["mnemonic"], "ADD");
}

#[test]
fn unterminated_macro_is_reported_once() {
    let result = check("MACRO foo\n  NOP");
    assert_eq!(codes_of(&result), [codes::UNTERMINATED_MACRO]);
    assert_eq!(span_of(&result.issues[0]), (0, 0, 1));
    assert_eq!(result.issues[0].message, "MACRO block not closed (need ENDM)");

    let noisy = check("MACRO foo\nJP NOWHERE\nX EQU 1\nX EQU 2\nMACRO bar");
    assert_eq!(with_code(&noisy, codes::UNTERMINATED_MACRO).len(), 1);
}

#[test]
fn closed_macro_is_clean() {
    assert_clean("MACRO foo\n  NOP\nENDM\n  foo");
}

// ─── Symbol properties ───────────────────────────────────────────────────────

#[test]
fn name_defined_k_times_yields_k_minus_one_duplicates() {
    let result = check("start:\nstart:\n  start:\nstart: NOP");
    let dups = with_code(&result, codes::DUPLICATE_DEFINITION);
    let spans: Vec<_> = dups.iter().map(|d| span_of(d)).collect();
    assert_eq!(spans, [(1, 0, 5), (2, 2, 7), (3, 0, 5)]);
    assert!(dups.iter().all(|d| d.message == "Duplicate definition: label 'start'"));
}

#[test]
fn duplicate_span_follows_indentation() {
    let result = check("  value = 1\n\tvalue = 2");
    assert_eq!(span_of(&result.issues[0]), (1, 1, 6));
}

#[test]
fn label_and_variable_of_same_name_are_not_duplicates() {
    let result = check("size:\nsize EQU 4");
    assert!(with_code(&result, codes::DUPLICATE_DEFINITION).is_empty());
}

#[test]
fn single_definition_many_references_is_clean() {
    assert_clean("start:\n  JP start\n  CALL start\n  JR start\n  DJNZ start");
}

#[test]
fn forward_references_resolve() {
    assert_clean("  JP later\nlater: HALT");
}

#[test]
fn symbol_match_is_case_sensitive() {
    let result = check("Loop: NOP\n JP LOOP");
    assert_eq!(codes_of(&result), [codes::UNDEFINED_SYMBOL]);
    assert_eq!(span_of(&result.issues[0]), (1, 4, 8));
}

#[test]
fn mnemonics_and_registers_match_any_case() {
    assert_clean("ld a, b\n Ld Hl, 5\n jp nz, 0");
}

#[test]
fn declarations_satisfy_references() {
    assert_clean("EXTERN printf\nPUBLIC main\nmain: CALL printf\n  SECTION code_user");
}

#[test]
fn block_members_are_variables() {
    assert_clean("DEFVARS 0 {\n  field_a ds.b 1\n  field_b\n}\n  LD A, (field_b)");
}

#[test]
fn hex_and_numeric_literals_are_not_symbols() {
    assert_clean("LD A, $FF\nLD B, 0FFh\nLD C, 10\nLD HL, $\nRST 38h");
}

// ─── Strings and comments ────────────────────────────────────────────────────

#[test]
fn identifiers_inside_strings_are_ignored() {
    let bare = check("JP NOWHERE");
    assert_eq!(bare.issues.len(), 1);
    assert_clean("DEFM \"JP NOWHERE\"");
    assert_clean("DB 'NOWHERE', `ELSEWHERE`");
}

#[test]
fn definitions_inside_strings_are_ignored() {
    let result = check("DB \"X EQU 1\"\n JP X");
    assert!(result.symbols.variable("X").is_none());
    assert_eq!(codes_of(&result), [codes::UNDEFINED_SYMBOL]);
}

#[test]
fn comments_are_ignored() {
    assert_clean("; JP NOWHERE\n# ADD HL, A\nNOP ; trailing NOWHERE\nHALT # also NOWHERE");
    assert_eq!(check("JP NOWHERE ; note").issues.len(), 1);
}

#[test]
fn columns_count_characters() {
    let result = check("DB \"é\", nowhere");
    assert_eq!(codes_of(&result), [codes::UNDEFINED_SYMBOL]);
    assert_eq!(span_of(&result.issues[0]), (0, 8, 15));
}

// ─── Instruction usage ───────────────────────────────────────────────────────

#[test]
fn option_lists_limit_values() {
    assert_clean("IM 2");
    let result = check("IM 3");
    assert_eq!(codes_of(&result), [codes::INVALID_USAGE]);
    assert_eq!(
        result.issues[0].message,
        "Invalid usage of IM: Invalid operand '3' for pattern: IM %[0 1 2]"
    );
    assert_eq!(span_of(&result.issues[0]), (0, 3, 4));
}

#[test]
fn operand_on_bare_mnemonic_is_rejected() {
    let result = check("NOP A");
    assert_eq!(codes_of(&result), [codes::INVALID_USAGE]);
    assert_eq!(result.issues[0].message, "Invalid usage of NOP: Expected no operands (NOP)");
    assert_eq!(span_of(&result.issues[0]), (0, 4, 5));
}

#[test]
fn missing_operands_span_the_mnemonic() {
    let result = check("  LD");
    assert_eq!(codes_of(&result), [codes::INVALID_USAGE]);
    assert_eq!(span_of(&result.issues[0]), (0, 2, 4));
}

#[test]
fn usage_span_runs_to_end_of_code_part() {
    let result = check("NOP  1   ; comment");
    assert_eq!(span_of(&result.issues[0]), (0, 5, 9));
    let result = check("NOP 1\t");
    assert_eq!(span_of(&result.issues[0]), (0, 4, 6));
}

#[test]
fn arity_mismatch_is_reported() {
    let result = check("INCLUDE \"a.asm\", \"b.asm\"");
    assert_eq!(codes_of(&result), [codes::INVALID_USAGE]);
    assert_eq!(
        result.issues[0].message,
        "Invalid usage of INCLUDE: Expected 1 operand(s), got 2 (INCLUDE %str)"
    );
}

#[test]
fn indexed_and_indirect_forms() {
    assert_clean("LD A, (IX+5)\nBIT 3, (IY+2)\nJP (IY)\nEX AF, AF'\nLD (HL), B");
    let result = check("BIT 8, A");
    assert_eq!(codes_of(&result), [codes::INVALID_USAGE]);
    let result = check("LD (BC), B");
    assert_eq!(codes_of(&result), [codes::INVALID_USAGE]);
}

#[test]
fn label_is_stripped_before_mnemonic() {
    assert_clean("start: HALT");
    let result = check("start: HALT 1");
    assert_eq!(codes_of(&result), [codes::INVALID_USAGE]);
    assert_eq!(span_of(&result.issues[0]), (0, 12, 13));
}

#[test]
fn storage_width_suffix_selects_rule() {
    assert_clean("buf DS.B 10\n DS.W 4\n ds.l 1");
    let result = check("  DS 4");
    assert_eq!(codes_of(&result), [codes::INVALID_USAGE]);
    assert!(result.issues[0].message.contains("DS.B %any | DS.W %any"));
}

#[test]
fn free_form_operands_keep_commas() {
    assert_clean("DEFB 1, 2, 3\nDB 'a', \"b,c\"\nDEFW 100h, 200h");
}

#[test]
fn unknown_leading_words_are_not_usage_checked() {
    let result = check("FOO A, B");
    assert_eq!(codes_of(&result), [codes::UNDEFINED_SYMBOL]);
}

// ─── Blocks ──────────────────────────────────────────────────────────────────

#[test]
fn open_brace_block_is_unbalanced() {
    let result = check("DEFVARS 0 {\n  x");
    assert_eq!(codes_of(&result), [codes::UNBALANCED_BLOCK]);
    assert_eq!(
        result.issues[0].message,
        "Scoped block has unbalanced braces (net depth 1)"
    );
    assert_eq!(span_of(&result.issues[0]), (0, 0, 1));
}

#[test]
fn extra_closing_brace_is_unbalanced() {
    let result = check("}");
    assert_eq!(codes_of(&result), [codes::UNBALANCED_BLOCK]);
    assert!(result.issues[0].message.contains("-1"));
}

#[test]
fn brace_inside_string_literal_counts_toward_depth() {
    let result = check("DEFB \"{\"");
    assert_eq!(codes_of(&result), [codes::UNBALANCED_BLOCK]);
    assert_eq!(
        result.issues[0].message,
        "Scoped block has unbalanced braces (net depth 1)"
    );
}

// ─── Whole-document properties ───────────────────────────────────────────────

#[test]
fn report_order_is_lines_then_duplicates_then_blocks() {
    let result = check("X EQU 1\nX EQU 2\nJP nowhere\nNOP 1\nMACRO m\n{");
    assert_eq!(
        codes_of(&result),
        [
            codes::UNDEFINED_SYMBOL,
            codes::INVALID_USAGE,
            codes::DUPLICATE_DEFINITION,
            codes::UNBALANCED_BLOCK,
            codes::UNTERMINATED_MACRO,
        ]
    );
}

#[test]
fn usage_precedes_references_on_same_line() {
    let result = check("ADD nowhere, A");
    assert_eq!(
        codes_of(&result),
        [codes::INVALID_USAGE, codes::UNDEFINED_SYMBOL]
    );
}

#[test]
fn validation_is_deterministic() {
    let src = "X EQU 1\nX EQU 2\nstart: JP nowhere\nADD HL, A\nMACRO m\n";
    let a = check(src);
    let b = check(src);
    assert_eq!(a.issues, b.issues);
}

#[test]
fn crlf_and_lines_api_agree() {
    let text = "start:\r\n  JP start\r\n  JP gone\r\n";
    let from_text = check(text);
    let from_lines = validate_lines(&["start:", "  JP start", "  JP gone", ""], *common::Z80);
    assert_eq!(from_text.issues, from_lines.issues);
    assert_eq!(span_of(&from_text.issues[0]), (2, 5, 9));
}

#[test]
fn empty_document_is_clean() {
    assert_clean("");
    assert_clean("\n\n   \n");
}

#[test]
fn result_carries_symbol_table() {
    let result = validate("start: NOP\nval = 1", *common::Z80);
    assert_eq!(result.symbols.label("start").unwrap().definitions.len(), 1);
    assert!(result.symbols.variable("val").is_some());
    assert!(result.symbols.final_state.is_balanced());
}
