use serde::Serialize;

/// Serialize any engine output (symbol tables, validation results) to
/// pretty-printed JSON.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}
