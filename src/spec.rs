//! TOON format constants.
//!
//! This module carries the spec-level constants shared by the encoder and
//! decoder, together with a condensed summary of the wire grammar.
//!
//! # Grammar summary
//!
//! A TOON document is a sequence of lines. Indentation is spaces only; the
//! indent width (default 2) divides a line's leading-space count to give its
//! depth, and depth alone determines nesting.
//!
//! ```text
//! name: Alice              object line (key: primitive)
//! meta:                    object line opening a nested block
//!   created: 2025          child at depth + 1
//! tags[3]: a,b,c           inline array (primitive-only)
//! users[2]{id,name}:       tabular array header
//!   1,Alice                row at depth + 1
//!   2,Bob
//! items[2]:                list array header
//!   - id: 1                list item (object, first field on hyphen line)
//!     kind: widget         sibling field at item depth + 1
//!   - 42                   list item (primitive)
//! ```
//!
//! Three delimiters are permitted within rows and inline arrays: comma
//! (default), tab, and pipe. A non-default delimiter is recorded inside the
//! array's brackets (`[2\t]`, `[2|]`) so the document stays self-describing.
//!
//! Strings are unquoted whenever that is unambiguous; see [`crate::quote`]
//! for the exact rules. Escapes inside quoted strings are `\\`, `\"`, `\n`,
//! `\r`, `\t`, plus `\uXXXX` for code points escaped under `ensure_ascii`.

/// TOON format version implemented by this crate. Informational.
pub const VERSION: &str = "1.5";

/// Spaces per indentation level unless overridden in the options.
pub const DEFAULT_INDENT: usize = 2;

/// The permitted field delimiters. Exactly one is active per array.
pub const DELIMITERS: [char; 3] = [',', '\t', '|'];

/// Literal spelled for the null value.
pub const NULL_LITERAL: &str = "null";

/// Literal spelled for boolean true.
pub const TRUE_LITERAL: &str = "true";

/// Literal spelled for boolean false.
pub const FALSE_LITERAL: &str = "false";

/// Prefix marking a list-form array item. A bare `-` denotes an empty item.
pub const LIST_MARKER: &str = "- ";
