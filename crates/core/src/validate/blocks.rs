use super::diagnostics_util::{Diagnostic, diagnostic_with_default_severity, render_diagnostic_message};
use crate::grammar::diag::{Span, codes};
use crate::symbols::ScanState;

/// Block findings have no single source line; they are pinned to the first
/// character of the document.
fn document_start() -> Span {
    Span::new(0, 0, 1)
}

/// At most one diagnostic per counter left non-zero at end of document.
pub(super) fn validate_blocks(state: ScanState, issues: &mut Vec<Diagnostic>) {
    if state.brace_depth != 0 {
        let depth = state.brace_depth.to_string();
        let message = render_diagnostic_message(
            codes::UNBALANCED_BLOCK,
            "default",
            &[("depth", depth.clone())],
            format!("Scoped block has unbalanced braces (net depth {depth})"),
        );
        issues.push(
            diagnostic_with_default_severity(codes::UNBALANCED_BLOCK, message, Some(document_start()))
                .with_context(ctx!("depth" => depth)),
        );
    }
    if state.macro_depth != 0 {
        let depth = state.macro_depth.to_string();
        let message = render_diagnostic_message(
            codes::UNTERMINATED_MACRO,
            "default",
            &[("depth", depth.clone())],
            "MACRO block not closed (need ENDM)".to_string(),
        );
        issues.push(
            diagnostic_with_default_severity(codes::UNTERMINATED_MACRO, message, Some(document_start()))
                .with_context(ctx!("depth" => depth)),
        );
    }
}
