//! Line classification: comment stripping, quoted-string spans, and
//! identifier-shaped token scanning.
//!
//! Every later pass routes candidate matches through [`is_inside_string`] so
//! text inside string literals is never treated as a symbol.
//!
//! All offsets in this module are byte offsets into the code string. Callers
//! convert to character columns with [`char_col`] when building diagnostics.
//! The scanners only compare ASCII bytes; UTF-8 continuation bytes (0x80–0xBF)
//! never match any of them, so slicing at the reported offsets is always on a
//! character boundary.

/// Comment markers; the earliest one on a line starts the comment.
const COMMENT_MARKERS: [char; 2] = [';', '#'];

/// Quote characters that open a string literal.
const QUOTES: [u8; 3] = [b'"', b'\'', b'`'];

/// Byte range of one quoted string literal, including its quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringSpan {
    /// Offset of the opening quote.
    pub start: usize,
    /// Offset one past the closing quote.
    pub end: usize,
}

/// An identifier-shaped token found in a code string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'a> {
    /// The token text, borrowed from the code string.
    pub text: &'a str,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

/// Return the code part of a line: everything before the first `;` or `#`.
///
/// A line without a comment marker is returned unchanged. Markers inside
/// string literals still start a comment.
pub fn code_part(line: &str) -> &str {
    match line.find(COMMENT_MARKERS) {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Locate every single-, double-, and back-quoted string literal in `code`.
///
/// A backslash escapes the following character. A quote with no matching
/// closing quote does not open a literal; scanning resumes at the next
/// character.
pub fn string_spans(code: &str) -> Vec<StringSpan> {
    let b = code.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0usize;
    while i < b.len() {
        let q = b[i];
        if !QUOTES.contains(&q) {
            i += 1;
            continue;
        }
        match closing_quote(b, i + 1, q) {
            Some(close) => {
                spans.push(StringSpan {
                    start: i,
                    end: close + 1,
                });
                i = close + 1;
            }
            None => i += 1,
        }
    }
    spans
}

fn closing_quote(b: &[u8], mut j: usize, q: u8) -> Option<usize> {
    while j < b.len() {
        match b[j] {
            b'\\' if j + 1 < b.len() => j += 2,
            b'\\' => return None,
            c if c == q => return Some(j),
            _ => j += 1,
        }
    }
    None
}

/// Whether the candidate `[start, start + len)` lies fully inside one of `spans`.
pub fn is_inside_string(spans: &[StringSpan], start: usize, len: usize) -> bool {
    spans
        .iter()
        .any(|s| start >= s.start && start + len <= s.end)
}

/// First character of an identifier.
#[inline]
pub fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'.'
}

/// Continuation character of an identifier.
#[inline]
pub fn is_ident_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'.'
}

/// Word character in the regular-expression sense (`\w`).
#[inline]
pub(crate) fn is_word_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// Every maximal identifier-shaped token in `code`, in order.
///
/// Runs of identifier characters that start with a digit are numbers and are
/// skipped, as are hex-digit runs written directly after `$` (`$FF`).
pub fn identifiers(code: &str) -> Vec<Ident<'_>> {
    let b = code.as_bytes();
    let mut out = Vec::new();
    let mut i = 0usize;
    while i < b.len() {
        if !is_ident_char(b[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < b.len() && is_ident_char(b[i]) {
            i += 1;
        }
        let text = &code[start..i];
        if b[start].is_ascii_digit() {
            continue;
        }
        if start > 0 && b[start - 1] == b'$' && text.bytes().all(|c| c.is_ascii_hexdigit()) {
            continue;
        }
        out.push(Ident {
            text,
            start,
            end: i,
        });
    }
    out
}

/// Offset of the first non-whitespace byte at or after `i`.
pub(crate) fn skip_ws(code: &str, mut i: usize) -> usize {
    let b = code.as_bytes();
    while i < b.len() && b[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// End offset of the identifier starting exactly at `i`, if one starts there.
pub(crate) fn ident_end(code: &str, i: usize) -> Option<usize> {
    let b = code.as_bytes();
    if i >= b.len() || !is_ident_start(b[i]) {
        return None;
    }
    let mut end = i + 1;
    while end < b.len() && is_ident_char(b[end]) {
        end += 1;
    }
    Some(end)
}

/// The identifier at the start of the line (after leading whitespace).
pub(crate) fn leading_ident(code: &str) -> Option<(usize, usize)> {
    let start = skip_ws(code, 0);
    ident_end(code, start).map(|end| (start, end))
}

/// Whether the line starts (after whitespace) with `keyword`, case-insensitively,
/// followed by a word boundary.
pub fn leading_keyword(code: &str, keyword: &str) -> bool {
    let start = skip_ws(code, 0);
    let end = start + keyword.len();
    code.get(start..end)
        .is_some_and(|word| word.eq_ignore_ascii_case(keyword))
        && code.as_bytes().get(end).is_none_or(|&c| !is_word_char(c))
}

/// If the line starts with a label (`name:`), the offset just past the colon.
pub(crate) fn label_end(code: &str) -> Option<usize> {
    let (_, end) = leading_ident(code)?;
    let colon = skip_ws(code, end);
    (code.as_bytes().get(colon) == Some(&b':')).then_some(colon + 1)
}

/// Convert a byte offset in `s` to a character column.
pub fn char_col(s: &str, byte: usize) -> usize {
    s.get(..byte).map_or(byte, |prefix| prefix.chars().count())
}
