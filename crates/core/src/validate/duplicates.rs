use super::diagnostics_util::{Diagnostic, diagnostic_with_default_severity, render_diagnostic_message};
use crate::grammar::diag::{Span, codes};
use crate::symbols::SymbolTable;

/// One diagnostic per definition after the first, spanning the repeated name.
pub(super) fn validate_duplicates(symbols: &SymbolTable, issues: &mut Vec<Diagnostic>) {
    for (record, site) in symbols.redefinitions() {
        let kind = record.kind.to_string();
        let span = Span::new(
            site.line,
            site.column,
            site.column + record.name.chars().count(),
        );
        let message = render_diagnostic_message(
            codes::DUPLICATE_DEFINITION,
            "default",
            &[("kind", kind.clone()), ("name", record.name.clone())],
            format!("Duplicate definition: {kind} '{}'", record.name),
        );
        let first_line = record
            .definitions
            .first()
            .map_or(site.line, |first| first.line);
        issues.push(
            diagnostic_with_default_severity(codes::DUPLICATE_DEFINITION, message, Some(span))
                .with_context(ctx!(
                    "kind" => kind,
                    "name" => record.name.as_str(),
                    "first_line" => first_line.to_string(),
                )),
        );
    }
}
