use super::context::{LineCtx, ValidationContext};
use super::diagnostics_util::{Diagnostic, diagnostic_with_default_severity, render_diagnostic_message};
use crate::grammar::diag::{Span, codes};
use crate::grammar::lexer::{char_col, identifiers, is_inside_string};

/// Report identifier tokens on one line that name nothing.
///
/// Mnemonics and legend keywords match case-insensitively; document symbols
/// match exactly. A definition anywhere in the document satisfies a reference
/// anywhere else.
pub(super) fn validate_references(
    vctx: &ValidationContext<'_>,
    line: &LineCtx<'_>,
    issues: &mut Vec<Diagnostic>,
) {
    for ident in identifiers(line.code) {
        if is_inside_string(line.spans, ident.start, ident.end - ident.start)
            || vctx.grammar.is_known_mnemonic(ident.text)
            || vctx.grammar.is_known_keyword(ident.text)
            || vctx.symbols.contains(ident.text)
        {
            continue;
        }
        let span = Span::new(
            line.index,
            char_col(line.code, ident.start),
            char_col(line.code, ident.end),
        );
        let message = render_diagnostic_message(
            codes::UNDEFINED_SYMBOL,
            "default",
            &[("name", ident.text.to_string())],
            format!("Reference to an undefined symbol: '{}'", ident.text),
        );
        issues.push(
            diagnostic_with_default_severity(codes::UNDEFINED_SYMBOL, message, Some(span))
                .with_context(ctx!("name" => ident.text)),
        );
    }
}
