//! Configuration options for TOON encoding and decoding.
//!
//! This module provides the option structs consumed by the two halves of the
//! codec:
//!
//! - [`EncodeOptions`]: indentation, delimiter, key folding, key sorting,
//!   ASCII escaping
//! - [`DecodeOptions`]: indentation, strict/lenient mode, path expansion
//! - [`Limits`]: resource caps shared by both directions
//!
//! ## Examples
//!
//! ```rust
//! use toon_codec::{encode_with_options, toon, Delimiter, EncodeOptions};
//!
//! let data = toon!({"x": 1, "y": 2});
//!
//! // Use pipe delimiter and fold single-key chains
//! let options = EncodeOptions::new()
//!     .with_delimiter(Delimiter::Pipe)
//!     .with_key_folding(toon_codec::KeyFolding::Safe);
//! let text = encode_with_options(&data, &options).unwrap();
//! ```

/// Delimiter choice for TOON arrays and tables.
///
/// TOON supports three delimiters to optimize for different contexts:
///
/// - **Comma**: default, most compact
/// - **Tab**: best for TSV-like output
/// - **Pipe**: readable for markdown-style tables
///
/// A non-default delimiter is recorded inside the array's brackets on
/// emission (`[3\t]`, `[3|]`) so the decoder can recover it per array.
///
/// # Examples
///
/// ```rust
/// use toon_codec::Delimiter;
///
/// assert_eq!(Delimiter::Comma.as_char(), ',');
/// assert_eq!(Delimiter::Tab.as_char(), '\t');
/// assert_eq!(Delimiter::Pipe.as_char(), '|');
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
    Pipe,
}

impl Delimiter {
    /// Returns the delimiter character.
    #[must_use]
    pub const fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
            Delimiter::Pipe => '|',
        }
    }

    /// Returns the string representation of this delimiter.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Delimiter::Comma => ",",
            Delimiter::Tab => "\t",
            Delimiter::Pipe => "|",
        }
    }

    /// Maps a delimiter character back to its variant.
    #[must_use]
    pub const fn from_char(ch: char) -> Option<Self> {
        match ch {
            ',' => Some(Delimiter::Comma),
            '\t' => Some(Delimiter::Tab),
            '|' => Some(Delimiter::Pipe),
            _ => None,
        }
    }
}

/// Key folding mode for the encoder.
///
/// In `Safe` mode, an object with exactly one entry whose key is a plain
/// identifier and whose value is a non-empty object collapses into a dotted
/// key (`a.b.c: 42`). `Off` leaves every key as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KeyFolding {
    #[default]
    Off,
    Safe,
}

/// Path expansion mode for the decoder, the inverse of key folding.
///
/// In `Safe` mode, decoded keys shaped like `a.b.c` (each segment a plain
/// identifier) expand into nested objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PathExpansion {
    #[default]
    Off,
    Safe,
}

/// Resource caps bounding memory use on both encode and decode.
///
/// Exceeding any cap is a hard error in every mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Maximum container nesting depth.
    pub max_nesting_depth: usize,
    /// Maximum declared or actual array length.
    pub max_array_length: usize,
    /// Maximum length of a single string, in bytes.
    pub max_string_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_nesting_depth: 100,
            max_array_length: 1_000_000,
            max_string_length: 1_000_000,
        }
    }
}

/// Configuration options for TOON encoding.
///
/// # Examples
///
/// ```rust
/// use toon_codec::{Delimiter, EncodeOptions, KeyFolding};
///
/// let options = EncodeOptions::new()
///     .with_indent(4)
///     .with_delimiter(Delimiter::Tab)
///     .with_key_folding(KeyFolding::Safe)
///     .with_sort_keys(true);
/// ```
#[derive(Clone, Debug)]
pub struct EncodeOptions {
    /// Spaces per indentation level. Must be at least 1.
    pub indent: usize,
    /// Active delimiter for inline arrays and tabular rows.
    pub delimiter: Delimiter,
    /// Whether single-key object chains collapse into dotted keys.
    pub key_folding: KeyFolding,
    /// Maximum number of segments in a folded key. `None` means unlimited.
    pub flatten_depth: Option<usize>,
    /// Sort each object's keys with a stable sort before emission.
    pub sort_keys: bool,
    /// Escape non-ASCII characters as `\uXXXX` inside quoted strings.
    pub ensure_ascii: bool,
    /// Resource caps.
    pub limits: Limits,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            indent: crate::spec::DEFAULT_INDENT,
            delimiter: Delimiter::default(),
            key_folding: KeyFolding::default(),
            flatten_depth: None,
            sort_keys: false,
            ensure_ascii: false,
            limits: Limits::default(),
        }
    }
}

impl EncodeOptions {
    /// Creates default options (2-space indent, comma delimiter, no folding).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indentation width (spaces per level). Must be at least 1.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the delimiter for arrays and tables.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the key folding mode.
    #[must_use]
    pub fn with_key_folding(mut self, mode: KeyFolding) -> Self {
        self.key_folding = mode;
        self
    }

    /// Caps folded keys at `depth` segments.
    #[must_use]
    pub fn with_flatten_depth(mut self, depth: usize) -> Self {
        self.flatten_depth = Some(depth);
        self
    }

    /// Enables or disables per-object key sorting.
    #[must_use]
    pub fn with_sort_keys(mut self, sort: bool) -> Self {
        self.sort_keys = sort;
        self
    }

    /// Enables or disables `\uXXXX` escaping of non-ASCII characters.
    #[must_use]
    pub fn with_ensure_ascii(mut self, ensure: bool) -> Self {
        self.ensure_ascii = ensure;
        self
    }

    /// Replaces the resource caps.
    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}

/// Configuration options for TOON decoding.
///
/// # Examples
///
/// ```rust
/// use toon_codec::{decode_with_options, DecodeOptions};
///
/// // Lenient mode recovers from count mismatches and records warnings
/// let options = DecodeOptions::new().with_strict(false);
/// let value = decode_with_options("xs[3]: 1,2", &options).unwrap();
/// assert_eq!(value.as_object().unwrap().get("xs").unwrap().as_array().unwrap().len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct DecodeOptions {
    /// Spaces per indentation level. Must be at least 1.
    pub indent: usize,
    /// Strict mode turns every validation deviation into a fatal error.
    pub strict: bool,
    /// Whether dotted keys expand into nested objects after decoding.
    pub expand_paths: PathExpansion,
    /// Resource caps.
    pub limits: Limits,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            indent: crate::spec::DEFAULT_INDENT,
            strict: true,
            expand_paths: PathExpansion::default(),
            limits: Limits::default(),
        }
    }
}

impl DecodeOptions {
    /// Creates default options (2-space indent, strict, no expansion).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indentation width (spaces per level). Must be at least 1.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Switches between strict and lenient validation.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets the path expansion mode.
    #[must_use]
    pub fn with_expand_paths(mut self, mode: PathExpansion) -> Self {
        self.expand_paths = mode;
        self
    }

    /// Replaces the resource caps.
    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}
