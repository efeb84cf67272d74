use crate::grammar::diag::{Severity, Span};
use std::collections::HashMap;
use z80lint_diagnostics::{message_template_for, severity_for_code};

pub(super) use crate::grammar::diag::Diagnostic;

pub(super) fn diagnostic_with_default_severity(
    id: &'static str,
    message: impl Into<String>,
    span: Option<Span>,
) -> Diagnostic {
    Diagnostic::new(
        id,
        severity_for_code(id).unwrap_or(Severity::Error),
        message.into(),
        span,
    )
}

/// Fill a code's message template, or use `fallback` when the code has no
/// template for `variant`. Unknown `{keys}` are left as written.
pub(super) fn render_diagnostic_message(
    id: &'static str,
    variant: &str,
    substitutions: &[(&str, String)],
    fallback: String,
) -> String {
    let Some(template) = message_template_for(id, variant) else {
        return fallback;
    };
    let substitution_map: HashMap<&str, &str> = substitutions
        .iter()
        .map(|(key, value)| (*key, value.as_str()))
        .collect();
    let mut rendered = String::with_capacity(template.len() + 16);
    let mut scan_from = 0usize;
    while let Some(open_rel) = template[scan_from..].find('{') {
        let open = scan_from + open_rel;
        rendered.push_str(&template[scan_from..open]);
        let after_open = open + 1;
        if let Some(close_rel) = template[after_open..].find('}') {
            let close = after_open + close_rel;
            let key = &template[after_open..close];
            if let Some(value) = substitution_map.get(key) {
                rendered.push_str(value);
            } else {
                rendered.push_str(&template[open..=close]);
            }
            scan_from = close + 1;
        } else {
            rendered.push_str(&template[open..]);
            return rendered;
        }
    }
    rendered.push_str(&template[scan_from..]);
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::diag::codes;

    #[test]
    fn renders_known_keys_and_keeps_unknown() {
        let msg = render_diagnostic_message(
            codes::DUPLICATE_DEFINITION,
            "default",
            &[("kind", "label".into())],
            "fallback".into(),
        );
        assert_eq!(msg, "Duplicate definition: label '{name}'");
    }

    #[test]
    fn missing_variant_uses_fallback() {
        let msg =
            render_diagnostic_message(codes::UNDEFINED_SYMBOL, "nope", &[], "fallback".into());
        assert_eq!(msg, "fallback");
    }

    #[test]
    fn severity_comes_from_code_table() {
        let d = diagnostic_with_default_severity(codes::INVALID_USAGE, "x", None);
        assert_eq!(d.severity, Severity::Error);
    }
}
