use super::context::{LineCtx, ValidationContext};
use super::diagnostics_util::{Diagnostic, diagnostic_with_default_severity, render_diagnostic_message};
use crate::grammar::compile::CompiledRule;
use crate::grammar::diag::{Span, codes};
use crate::grammar::dialect::OperandPolicy;
use crate::grammar::lexer::{char_col, is_ident_char, is_inside_string, label_end, skip_ws};

/// Check the instruction or directive on one line against its usage rules.
///
/// Lines whose leading word is not a known mnemonic are skipped.
pub(super) fn validate_usage(
    vctx: &ValidationContext<'_>,
    line: &LineCtx<'_>,
    issues: &mut Vec<Diagnostic>,
) {
    let code = line.code;
    let m_start = skip_ws(code, label_end(code).unwrap_or(0));
    let Some(m_end) = mnemonic_end(code, m_start) else {
        return;
    };
    let written = &code[m_start..m_end];
    let Some(entry) = vctx.grammar.lookup(written) else {
        return;
    };
    let written_upper = written.to_ascii_uppercase();
    let operand_text = code[m_end..].trim();
    let policy = vctx.grammar.policy();

    let mut reasons = Vec::with_capacity(entry.rules.len());
    for rule in &entry.rules {
        let rule = match rule {
            Ok(rule) => rule,
            Err(e) => {
                tracing::trace!(line = line.index, error = %e, "skipping rule that failed to compile");
                reasons.push(e.to_string());
                continue;
            }
        };
        match check_rule(rule, &written_upper, operand_text, line, m_end, policy) {
            Ok(()) => {
                tracing::trace!(line = line.index, rule = %rule.text, "usage accepted");
                return;
            }
            Err(reason) => reasons.push(reason),
        }
    }

    let span = if operand_text.is_empty() {
        Span::new(line.index, char_col(code, m_start), char_col(code, m_end))
    } else {
        let start = skip_ws(code, m_end);
        Span::new(line.index, char_col(code, start), char_col(code, code.len()))
    };
    let variants = entry
        .rules
        .iter()
        .map(|r| match r {
            Ok(rule) => rule.text.as_str(),
            Err(_) => "<invalid rule>",
        })
        .collect::<Vec<_>>()
        .join(" | ");
    let reason = reasons.first().cloned().unwrap_or_default();
    let variant = if entry.rules.len() == 1 { "single" } else { "multiple" };
    let message = render_diagnostic_message(
        codes::INVALID_USAGE,
        variant,
        &[
            ("mnemonic", entry.mnemonic.clone()),
            ("reason", reason.clone()),
            ("variants", variants.clone()),
        ],
        format!("Invalid usage. Allowed variant(s): {variants}"),
    );
    issues.push(
        diagnostic_with_default_severity(codes::INVALID_USAGE, message, Some(span)).with_context(ctx!(
            "mnemonic" => entry.mnemonic.as_str(),
            "reason" => reason,
            "variants" => variants,
        )),
    );
}

/// Try one rule; `Err` carries the reason it did not match.
fn check_rule(
    rule: &CompiledRule,
    written_upper: &str,
    operand_text: &str,
    line: &LineCtx<'_>,
    operands_at: usize,
    policy: OperandPolicy,
) -> Result<(), String> {
    if (rule.head.contains('.') || written_upper.contains('.')) && rule.head != written_upper {
        return Err(format!("Expected mnemonic {} ({})", rule.head, rule.text));
    }

    if rule.placeholders.is_empty() {
        return if operand_text.is_empty() {
            Ok(())
        } else {
            Err(format!("Expected no operands ({})", rule.text))
        };
    }

    let operands = if policy.any_takes_whole_operand && rule.is_free_form() {
        if operand_text.is_empty() {
            Vec::new()
        } else {
            vec![operand_text]
        }
    } else {
        split_operands(line, operands_at)
    };

    if operands.len() != rule.placeholders.len() {
        return Err(format!(
            "Expected {} operand(s), got {} ({})",
            rule.placeholders.len(),
            operands.len(),
            rule.text
        ));
    }

    for (placeholder, operand) in rule.placeholders.iter().zip(&operands) {
        if !placeholder.accepts(operand) {
            return Err(format!("Invalid operand '{operand}' for pattern: {}", rule.text));
        }
    }
    Ok(())
}

/// End of the mnemonic starting at `i`: a letter, then letters, digits or
/// `_`, then an optional `.suffix` of letters. `None` when no mnemonic starts
/// at `i` or the word runs on into other identifier characters.
fn mnemonic_end(code: &str, i: usize) -> Option<usize> {
    let b = code.as_bytes();
    if !b.get(i)?.is_ascii_alphabetic() {
        return None;
    }
    let mut end = i + 1;
    while end < b.len() && (b[end].is_ascii_alphanumeric() || b[end] == b'_') {
        end += 1;
    }
    if b.get(end) == Some(&b'.') && b.get(end + 1).is_some_and(u8::is_ascii_alphabetic) {
        end += 1;
        while end < b.len() && b[end].is_ascii_alphabetic() {
            end += 1;
        }
    }
    match b.get(end) {
        Some(&c) if is_ident_char(c) => None,
        _ => Some(end),
    }
}

/// Comma-separated operands after `from`, trimmed, empties dropped. Commas
/// inside string literals do not split.
fn split_operands<'a>(line: &LineCtx<'a>, from: usize) -> Vec<&'a str> {
    let code = line.code;
    let mut out = Vec::new();
    let mut piece_start = from;
    for (i, c) in code.bytes().enumerate().skip(from) {
        if c == b',' && !is_inside_string(line.spans, i, 1) {
            out.push(&code[piece_start..i]);
            piece_start = i + 1;
        }
    }
    out.push(&code[piece_start..]);
    out.into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
