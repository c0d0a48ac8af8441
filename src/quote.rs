//! String quoting and identifier rules.
//!
//! TOON leaves strings unquoted whenever that is unambiguous, which is where
//! most of its token savings come from. This module owns the single predicate
//! deciding when quotes are required, the escape emission, and the
//! identifier/numeric shape classifiers shared between the encoder, the key
//! folder, and the decoder.
//!
//! A string is quoted iff leaving it bare would change how it reads back:
//! it is empty, spells a literal (`null`, `true`, `false`), has the shape of
//! a number, carries leading/trailing whitespace, mimics a structural token
//! (list marker, array header, `{`), or contains a character the line
//! grammar claims (the active delimiter, `:`, `"`, `\`, or a control
//! character).

use crate::spec::{FALSE_LITERAL, NULL_LITERAL, TRUE_LITERAL};

/// Returns `true` if `s` must be quoted when emitted with the given active
/// delimiter.
///
/// This is the exact inverse of the decoder's token classification: an
/// unquoted emission of `s` reads back as the identical string iff this
/// returns `false`.
///
/// # Examples
///
/// ```rust
/// use toon_codec::quote::needs_quoting;
///
/// assert!(!needs_quoting("Alice", ','));
/// assert!(needs_quoting("", ','));
/// assert!(needs_quoting("42", ','));
/// assert!(needs_quoting("- hi", ','));
/// assert!(needs_quoting("a,b", ','));
/// assert!(!needs_quoting("a,b", '|'));
/// ```
#[must_use]
pub fn needs_quoting(s: &str, delimiter: char) -> bool {
    if s.is_empty() {
        return true;
    }
    if s == NULL_LITERAL || s == TRUE_LITERAL || s == FALSE_LITERAL {
        return true;
    }
    if is_numeric_shape(s) {
        return true;
    }
    let first = s.as_bytes()[0];
    let last = s.as_bytes()[s.len() - 1];
    if first.is_ascii_whitespace() || last.is_ascii_whitespace() {
        return true;
    }
    if s.starts_with(crate::spec::LIST_MARKER) {
        return true;
    }
    if looks_structural(s) {
        return true;
    }
    s.chars().any(|ch| {
        ch == delimiter || ch == ':' || ch == '"' || ch == '\\' || ch.is_ascii_control()
    })
}

/// Appends `s` to `out`, quoting and escaping only if required.
pub fn write_string(out: &mut String, s: &str, delimiter: char, ensure_ascii: bool) {
    if needs_quoting(s, delimiter) || (ensure_ascii && !s.is_ascii()) {
        write_quoted(out, s, ensure_ascii);
    } else {
        out.push_str(s);
    }
}

/// Appends `s` to `out` in quoted form with escapes applied.
///
/// Escapes are `\\`, `\"`, `\n`, `\r`, `\t`; with `ensure_ascii`, non-ASCII
/// code points become `\uXXXX` (UTF-16 surrogate pairs above the BMP). All
/// other characters pass through unchanged.
pub fn write_quoted(out: &mut String, s: &str, ensure_ascii: bool) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ if ensure_ascii && !ch.is_ascii() => {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04x}", unit));
                }
            }
            _ => out.push(ch),
        }
    }
    out.push('"');
}

/// Appends an object key to `out`, quoting it unless it has unquoted-key
/// shape.
pub fn write_key(out: &mut String, key: &str, ensure_ascii: bool) {
    if is_unquoted_key(key) {
        out.push_str(key);
    } else {
        write_quoted(out, key, ensure_ascii);
    }
}

/// Appends a tabular column name to `out`. Unlike values, field names are
/// quoted against every permitted delimiter, not just the active one: an
/// unquoted field token must never contain a character the header grammar
/// could treat as a separator.
pub fn write_field_name(out: &mut String, s: &str, ensure_ascii: bool) {
    if crate::spec::DELIMITERS.iter().any(|&d| needs_quoting(s, d))
        || (ensure_ascii && !s.is_ascii())
    {
        write_quoted(out, s, ensure_ascii);
    } else {
        out.push_str(s);
    }
}

/// Tests the safe-identifier rule: `[A-Za-z_][A-Za-z0-9_]*`.
///
/// Safe identifiers are the only keys the folder will join into dotted
/// paths.
#[must_use]
pub fn is_safe_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Tests whether a key can be emitted without quotes: a safe identifier or a
/// dot-joined chain of safe identifiers (the shape key folding produces).
#[must_use]
pub fn is_unquoted_key(s: &str) -> bool {
    !s.is_empty() && s.split('.').all(is_safe_identifier)
}

/// Tests whether `s` is a dotted path of two or more safe identifiers,
/// the shape the path expander unfolds.
#[must_use]
pub fn is_dotted_path(s: &str) -> bool {
    s.contains('.') && is_unquoted_key(s)
}

/// Integer literal shape: optional leading `-`, then one or more digits.
#[must_use]
pub fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Finite decimal shape: optional leading `-`, digits, one `.`, digits.
/// No exponent form.
#[must_use]
pub fn is_decimal_literal(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    let Some((int_part, frac_part)) = body.split_once('.') else {
        return false;
    };
    !int_part.is_empty()
        && !frac_part.is_empty()
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.bytes().all(|b| b.is_ascii_digit())
}

/// Tests whether `s` would decode as a number if left unquoted.
#[must_use]
pub fn is_numeric_shape(s: &str) -> bool {
    is_integer_literal(s) || is_decimal_literal(s)
}

/// Tests whether `s` mimics a structural token: `[<digits>...]` anywhere in
/// its prefix, or a leading `{`.
fn looks_structural(s: &str) -> bool {
    if s.starts_with('{') {
        return true;
    }
    let Some(rest) = s.strip_prefix('[') else {
        return false;
    };
    let digits = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    digits > 0 && rest[digits..].contains(']')
}
