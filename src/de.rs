//! TOON decoding.
//!
//! This module parses TOON text back into [`Value`] trees. Parsing is a
//! fixed pipeline:
//!
//! 1. the **scanner** splits the input into lines, strips `\r`, computes
//!    each line's depth from its leading spaces, and rejects tabs and
//!    off-grid indents;
//! 2. a **cursor** walks the scanned lines with one-line lookahead;
//! 3. the **parser** descends recursively, driven purely by line depth:
//!    depth transitions open and close structures, never text patterns;
//! 4. in strict mode every declared count and each header's delimiter
//!    consistency are validated inline; in lenient mode those deviations
//!    become [`Warning`]s and parsing recovers.
//!
//! The depth discipline matters most for list items: a field belongs to the
//! current list-item object iff it sits exactly one depth below the hyphen
//! line. Matching on `"- "` alone cannot make that distinction.
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use toon_codec::{decode, Value};
//!
//! let value = decode("x: 1\ny: 2").unwrap();
//! let obj = value.as_object().unwrap();
//! assert_eq!(obj.get("x").and_then(Value::as_i64), Some(1));
//! ```
//!
//! The [`Decoder`] type exposes the warnings collected by a lenient pass:
//!
//! ```rust
//! use toon_codec::{DecodeOptions, Decoder};
//!
//! let mut decoder = Decoder::new("xs[3]: 1,2", DecodeOptions::new().with_strict(false));
//! let value = decoder.decode().unwrap();
//! assert_eq!(decoder.warnings().len(), 1);
//! ```

use crate::error::Warning;
use crate::quote::{is_decimal_literal, is_integer_literal};
use crate::spec::{DELIMITERS, FALSE_LITERAL, LIST_MARKER, NULL_LITERAL, TRUE_LITERAL};
use crate::{DecodeOptions, Delimiter, Error, Map, Number, PathExpansion, Result, Value};
use serde::de::{self, IntoDeserializer};
use serde::forward_to_deserialize_any;

/// The TOON decoder.
///
/// Wraps one decode pass over a borrowed input string and retains the
/// warnings a lenient pass collected. For strict one-shot decoding prefer
/// [`crate::decode`].
pub struct Decoder<'de> {
    input: &'de str,
    options: DecodeOptions,
    warnings: Vec<Warning>,
    blank_lines: Vec<usize>,
}

impl<'de> Decoder<'de> {
    /// Creates a decoder over `input` with the given options.
    pub fn new(input: &'de str, options: DecodeOptions) -> Self {
        Decoder {
            input,
            options,
            warnings: Vec::new(),
            blank_lines: Vec::new(),
        }
    }

    /// Creates a decoder with default (strict) options.
    pub fn from_str(input: &'de str) -> Self {
        Self::new(input, DecodeOptions::default())
    }

    /// Runs the decode pass.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed syntax or indentation in any mode, and
    /// on any validation deviation in strict mode.
    pub fn decode(&mut self) -> Result<Value> {
        if self.options.indent == 0 {
            return Err(Error::custom("indent width must be at least 1"));
        }
        let scanned = scan_lines(self.input, self.options.indent)?;
        self.blank_lines = scanned.blank_lines;

        let mut parser = Parser {
            cursor: Cursor::new(scanned.lines),
            options: &self.options,
            warnings: Vec::new(),
            nesting: 0,
        };
        let outcome = parser.decode_document();
        self.warnings = parser.warnings;
        let value = outcome?;

        if self.options.expand_paths == PathExpansion::Safe {
            let mut warnings = std::mem::take(&mut self.warnings);
            let expanded = crate::fold::expand_paths(value, self.options.strict, &mut warnings);
            self.warnings = warnings;
            return expanded;
        }
        Ok(value)
    }

    /// Warnings collected by the last decode pass (lenient mode only).
    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Consumes the decoder, returning the collected warnings.
    #[must_use]
    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    /// 1-based numbers of the blank lines the scanner skipped. Diagnostic.
    #[must_use]
    pub fn blank_lines(&self) -> &[usize] {
        &self.blank_lines
    }
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// One non-blank input line with its depth precomputed.
#[derive(Debug, Clone, PartialEq)]
struct ParsedLine {
    /// Count of leading spaces.
    indent_spaces: usize,
    /// Line text after the indent, with trailing whitespace removed.
    content: String,
    /// `indent_spaces / indent_width`.
    depth: usize,
    /// 1-based source line number.
    number: usize,
}

struct ScannedDocument {
    lines: Vec<ParsedLine>,
    blank_lines: Vec<usize>,
}

/// Splits `input` into depth-tagged lines.
///
/// Blank and whitespace-only lines are excluded from the parsed stream but
/// recorded on the side. Tabs in the indent region and indents that are not
/// a multiple of `indent` are fatal in every mode.
fn scan_lines(input: &str, indent: usize) -> Result<ScannedDocument> {
    let mut lines = Vec::new();
    let mut blank_lines = Vec::new();

    for (i, raw) in input.split('\n').enumerate() {
        let number = i + 1;
        let raw = raw.strip_suffix('\r').unwrap_or(raw);

        if raw.trim().is_empty() {
            blank_lines.push(number);
            continue;
        }

        let mut indent_spaces = 0;
        for ch in raw.chars() {
            match ch {
                ' ' => indent_spaces += 1,
                '\t' => {
                    return Err(Error::indentation(
                        number,
                        "tab character in indentation; TOON indents with spaces only",
                    ))
                }
                _ => break,
            }
        }
        if indent_spaces % indent != 0 {
            return Err(Error::indentation(
                number,
                format!(
                    "indent of {} spaces is not a multiple of {}",
                    indent_spaces, indent
                ),
            ));
        }

        lines.push(ParsedLine {
            indent_spaces,
            // Only ASCII spaces are insignificant; anything else at the end
            // of a line belongs to an unquoted token
            content: raw[indent_spaces..].trim_end_matches(' ').to_string(),
            depth: indent_spaces / indent,
            number,
        });
    }

    Ok(ScannedDocument { lines, blank_lines })
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Forward-only iterator over scanned lines with one-line lookahead.
struct Cursor {
    lines: Vec<ParsedLine>,
    pos: usize,
}

impl Cursor {
    fn new(lines: Vec<ParsedLine>) -> Self {
        Cursor { lines, pos: 0 }
    }

    fn peek(&self) -> Option<&ParsedLine> {
        self.lines.get(self.pos)
    }

    /// The next line, but only if it sits exactly at `depth`.
    fn peek_at_depth(&self, depth: usize) -> Option<&ParsedLine> {
        self.peek().filter(|line| line.depth == depth)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn next(&mut self) -> Option<ParsedLine> {
        let line = self.lines.get(self.pos).cloned();
        if line.is_some() {
            self.pos += 1;
        }
        line
    }

    fn at_end(&self) -> bool {
        self.pos >= self.lines.len()
    }

    fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn len(&self) -> usize {
        self.lines.len()
    }

    /// Line number of the final input line, for end-of-input diagnostics.
    fn last_line_number(&self) -> usize {
        self.lines.last().map_or(1, |line| line.number)
    }
}

// ---------------------------------------------------------------------------
// Header parsing
// ---------------------------------------------------------------------------

/// Parsed form of an array header line such as `key[3]:`, `[2|]: a|b`, or
/// `users[2]{id,name}:`.
#[derive(Debug, Clone, PartialEq)]
struct ArrayHeader {
    /// Absent for root arrays.
    key: Option<String>,
    /// Declared element count.
    len: usize,
    /// Active delimiter for this array (bracket override or the default).
    delimiter: Delimiter,
    /// Tabular column names, when the `{...}` group is present.
    fields: Option<Vec<String>>,
    /// Text after the colon, when non-empty (inline primitive array).
    inline: Option<String>,
}

/// Tests whether a line's content is a list item: `- ` prefix or a bare `-`.
fn is_list_item(content: &str) -> bool {
    content == "-" || content.starts_with(LIST_MARKER)
}

/// Tests whether `s` contains a `:` outside of double quotes.
fn has_unquoted_colon(s: &str) -> bool {
    let mut in_quotes = false;
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if in_quotes => {
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => return true,
            _ => {}
        }
    }
    false
}

/// Finds the byte position of the closing `"` starting the scan at `start`,
/// skipping backslash escapes. Both `"` and `\` are ASCII, so byte scanning
/// is UTF-8 safe here.
fn find_closing_quote(s: &str, start: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Finds the byte position of the first unquoted occurrence of the ASCII
/// character `target`.
fn find_unquoted(s: &str, target: u8) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut in_quotes = false;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if in_quotes => i += 2,
            b'"' => {
                in_quotes = !in_quotes;
                i += 1;
            }
            b if b == target && !in_quotes => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Splits `s` on `delimiter`, respecting double-quoted regions (with `\`
/// escaping the next character inside quotes). Tokens keep their quotes;
/// classification happens later.
fn parse_delimited(s: &str, delimiter: char) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = s.chars();

    while let Some(ch) = chars.next() {
        if in_quotes {
            current.push(ch);
            match ch {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                }
                '"' => in_quotes = false,
                _ => {}
            }
        } else if ch == '"' {
            in_quotes = true;
            current.push(ch);
        } else if ch == delimiter {
            tokens.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    tokens.push(current);
    tokens
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct Parser<'a> {
    cursor: Cursor,
    options: &'a DecodeOptions,
    warnings: Vec<Warning>,
    nesting: usize,
}

impl<'a> Parser<'a> {
    fn enter(&mut self) -> Result<()> {
        self.nesting += 1;
        if self.nesting > self.options.limits.max_nesting_depth {
            return Err(Error::limit(
                "nesting depth",
                self.nesting,
                self.options.limits.max_nesting_depth,
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting -= 1;
    }

    fn warn(&mut self, line: usize, message: impl Into<String>) {
        self.warnings.push(Warning::new(line, message));
    }

    /// Classifies the first line and decodes the whole document: a keyless
    /// array header opens a root array, a single line without an unquoted
    /// colon is a bare primitive, anything else is an object.
    fn decode_document(&mut self) -> Result<Value> {
        if self.cursor.is_empty() {
            return Ok(Value::Object(Map::new()));
        }

        let first = match self.cursor.peek() {
            Some(line) => line.clone(),
            None => return Ok(Value::Object(Map::new())),
        };

        if let Some(header) = self.parse_array_header(&first.content, first.number)? {
            if header.key.is_none() {
                if first.depth != 0 {
                    if self.options.strict {
                        return Err(Error::indentation(
                            first.number,
                            "root array header must start at column zero",
                        ));
                    }
                    self.warn(first.number, "root array header is indented");
                }
                self.cursor.advance();
                let value = self.decode_array(&header, first.depth, first.number)?;
                self.ensure_consumed()?;
                return Ok(value);
            }
        }

        if self.cursor.len() == 1 && !has_unquoted_colon(&first.content) {
            self.cursor.advance();
            return self.parse_primitive(&first.content, first.number);
        }

        let value = self.decode_object(0)?;
        self.ensure_consumed()?;
        Ok(value)
    }

    /// Trailing lines after a completed root value are a syntax error.
    fn ensure_consumed(&mut self) -> Result<()> {
        match self.cursor.peek() {
            Some(line) => Err(Error::syntax(
                line.number,
                line.indent_spaces + 1,
                "unexpected content after the document root",
            )),
            None => Ok(()),
        }
    }

    /// Decodes an object block. The first line fixes the field depth (it
    /// may sit deeper than `base_depth`; the first field then sets the
    /// actual depth). Consumption stops at any other depth or at a list
    /// marker.
    fn decode_object(&mut self, base_depth: usize) -> Result<Value> {
        self.enter()?;
        let mut map = Map::new();

        let field_depth = match self.cursor.peek() {
            Some(line) if line.depth >= base_depth => line.depth,
            _ => {
                self.leave();
                return Ok(Value::Object(map));
            }
        };

        while let Some(line) = self.cursor.peek_at_depth(field_depth) {
            if is_list_item(&line.content) {
                break;
            }
            let line = line.clone();
            self.cursor.advance();
            let (key, value) = self.decode_key_value(&line.content, field_depth, line.number)?;
            self.insert_field(&mut map, key, value, line.number)?;
        }

        self.leave();
        Ok(Value::Object(map))
    }

    /// Inserts a decoded field, enforcing key uniqueness. In lenient mode a
    /// duplicate warns and the later value wins.
    fn insert_field(&mut self, map: &mut Map, key: String, value: Value, line: usize) -> Result<()> {
        if map.contains_key(&key) {
            if self.options.strict {
                return Err(Error::duplicate_key(line, key));
            }
            self.warn(line, format!("duplicate key {:?}; keeping the later value", key));
        }
        map.insert(key, value);
        Ok(())
    }

    /// Decodes one `key: value` line (or `key[N]...` array field) whose
    /// line sits at `base_depth`.
    fn decode_key_value(
        &mut self,
        content: &str,
        base_depth: usize,
        line: usize,
    ) -> Result<(String, Value)> {
        if let Some(header) = self.parse_array_header(content, line)? {
            return match header.key.clone() {
                Some(key) => {
                    let value = self.decode_array(&header, base_depth, line)?;
                    Ok((key, value))
                }
                None => Err(Error::syntax(
                    line,
                    1,
                    "array header without a key inside an object",
                )),
            };
        }

        let (key, after_colon, _was_quoted) = self.parse_key(content, line)?;
        let rest = content[after_colon..].trim_start_matches(' ');

        let value = if rest.is_empty() {
            if self.cursor.peek().is_some_and(|next| next.depth > base_depth) {
                self.decode_object(base_depth + 1)?
            } else {
                Value::Object(Map::new())
            }
        } else {
            self.parse_primitive(rest, line)?
        };

        Ok((key, value))
    }

    /// Decodes an array whose header sits on the line at `header_depth`.
    fn decode_array(
        &mut self,
        header: &ArrayHeader,
        header_depth: usize,
        header_line: usize,
    ) -> Result<Value> {
        self.enter()?;
        if header.len > self.options.limits.max_array_length {
            return Err(Error::limit(
                "array length",
                header.len,
                self.options.limits.max_array_length,
            ));
        }

        let value = if let Some(fields) = &header.fields {
            self.decode_tabular_rows(header, fields, header_depth, header_line)?
        } else if let Some(suffix) = &header.inline {
            self.decode_inline(header, suffix, header_line)?
        } else {
            self.decode_list_items(header, header_depth, header_line)?
        };

        self.leave();
        Ok(value)
    }

    /// Reads tabular rows at `header_depth + 1`. A line with a list marker
    /// or an unquoted colon is never a row (row cells quote both), so such
    /// lines end the table.
    fn decode_tabular_rows(
        &mut self,
        header: &ArrayHeader,
        fields: &[String],
        header_depth: usize,
        header_line: usize,
    ) -> Result<Value> {
        let row_depth = header_depth + 1;
        let mut rows = Vec::new();

        while let Some(line) = self.cursor.peek_at_depth(row_depth) {
            if is_list_item(&line.content) || has_unquoted_colon(&line.content) {
                break;
            }
            let line = line.clone();
            self.cursor.advance();
            let row = self.decode_row(&line.content, fields, header.delimiter, line.number)?;
            rows.push(row);
        }

        if rows.len() < header.len && self.cursor.at_end() {
            self.unexpected_end_or_warn(header.len, rows.len(), "tabular row")?;
        } else {
            self.check_array_length(header.len, rows.len(), header_line)?;
        }
        Ok(Value::Array(rows))
    }

    /// Splits one row line into cells and zips them with the column names.
    fn decode_row(
        &mut self,
        content: &str,
        fields: &[String],
        delimiter: Delimiter,
        line: usize,
    ) -> Result<Value> {
        let mut tokens = parse_delimited(content, delimiter.as_char());
        if tokens.len() != fields.len() {
            if let Some((found, retokenized)) =
                detect_delimiter(content, delimiter, fields.len())
            {
                if self.options.strict {
                    return Err(Error::delimiter_mismatch(
                        line,
                        format!(
                            "row is separated by {:?}, header declares {:?}",
                            found.as_char(),
                            delimiter.as_char()
                        ),
                    ));
                }
                self.warn(
                    line,
                    format!(
                        "row matches the field count with {:?} delimiter; using it",
                        found.as_char()
                    ),
                );
                tokens = retokenized;
            }
        }
        if tokens.len() != fields.len() {
            if self.options.strict {
                return Err(Error::field_mismatch(line, fields.len(), tokens.len()));
            }
            self.warn(
                line,
                format!(
                    "row has {} fields, header declares {}; padding with null",
                    tokens.len(),
                    fields.len()
                ),
            );
        }

        let mut obj = Map::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            let cell = match tokens.get(i) {
                Some(token) => self.parse_primitive(token, line)?,
                None => Value::Null,
            };
            obj.insert(field.clone(), cell);
        }
        Ok(Value::Object(obj))
    }

    /// Decodes an inline primitive array from the header's suffix text.
    fn decode_inline(
        &mut self,
        header: &ArrayHeader,
        suffix: &str,
        header_line: usize,
    ) -> Result<Value> {
        let mut tokens = parse_delimited(suffix, header.delimiter.as_char());
        if tokens.len() != header.len {
            if let Some((found, retokenized)) =
                detect_delimiter(suffix, header.delimiter, header.len)
            {
                if self.options.strict {
                    return Err(Error::delimiter_mismatch(
                        header_line,
                        format!(
                            "inline values are separated by {:?}, header declares {:?}",
                            found.as_char(),
                            header.delimiter.as_char()
                        ),
                    ));
                }
                self.warn(
                    header_line,
                    format!(
                        "inline values match the declared length with {:?} delimiter; using it",
                        found.as_char()
                    ),
                );
                tokens = retokenized;
            }
        }
        self.check_array_length(header.len, tokens.len(), header_line)?;

        let mut values = Vec::with_capacity(tokens.len());
        for token in &tokens {
            values.push(self.parse_primitive(token, header_line)?);
        }
        Ok(Value::Array(values))
    }

    /// Reads list items at `header_depth + 1` until a non-marker line or a
    /// depth transition ends the list.
    fn decode_list_items(
        &mut self,
        header: &ArrayHeader,
        header_depth: usize,
        header_line: usize,
    ) -> Result<Value> {
        let item_depth = header_depth + 1;
        let mut items = Vec::new();

        while let Some(line) = self.cursor.peek_at_depth(item_depth) {
            if !is_list_item(&line.content) {
                break;
            }
            items.push(self.decode_list_item(item_depth)?);
        }

        if items.len() < header.len && self.cursor.at_end() {
            self.unexpected_end_or_warn(header.len, items.len(), "list item")?;
        } else {
            self.check_array_length(header.len, items.len(), header_line)?;
        }
        Ok(Value::Array(items))
    }

    /// Decodes one list item. The item line's suffix (after `- `) is either
    /// a nested array header, the first field of an object, or a primitive.
    fn decode_list_item(&mut self, item_depth: usize) -> Result<Value> {
        let line = match self.cursor.next() {
            Some(line) => line,
            None => {
                return Err(Error::unexpected_end(
                    self.cursor.last_line_number(),
                    "a list item",
                ))
            }
        };

        if line.content == "-" {
            return Ok(Value::Object(Map::new()));
        }
        let suffix = match line.content.strip_prefix(LIST_MARKER) {
            Some(suffix) if !suffix.is_empty() => suffix,
            _ => return Ok(Value::Object(Map::new())),
        };

        if let Some(header) = self.parse_array_header(suffix, line.number)? {
            if header.key.is_none() {
                // Anonymous nested array: the item itself
                return self.decode_array(&header, item_depth, line.number);
            }
            // Keyed array header: first field of a list-item object
            return self.decode_object_from_list_item(suffix, item_depth, line.number);
        }

        if has_unquoted_colon(suffix) {
            return self.decode_object_from_list_item(suffix, item_depth, line.number);
        }

        self.parse_primitive(suffix, line.number)
    }

    /// Decodes a list-item object whose first field sits on the hyphen
    /// line. The first field uses `item_depth` as its base depth; sibling
    /// fields must sit exactly at `item_depth + 1`; anything else (the
    /// next item's marker, an outdent, a deeper stray) ends the item.
    fn decode_object_from_list_item(
        &mut self,
        first_field: &str,
        item_depth: usize,
        line: usize,
    ) -> Result<Value> {
        self.enter()?;
        let mut map = Map::new();

        let (key, value) = self.decode_key_value(first_field, item_depth, line)?;
        self.insert_field(&mut map, key, value, line)?;

        let follow_depth = item_depth + 1;
        while let Some(next) = self.cursor.peek_at_depth(follow_depth) {
            if is_list_item(&next.content) {
                break;
            }
            let next = next.clone();
            self.cursor.advance();
            let (key, value) = self.decode_key_value(&next.content, follow_depth, next.number)?;
            self.insert_field(&mut map, key, value, next.number)?;
        }

        self.leave();
        Ok(Value::Object(map))
    }

    /// Declared-vs-actual count enforcement: strict errors, lenient warns.
    fn check_array_length(&mut self, declared: usize, actual: usize, line: usize) -> Result<()> {
        if declared == actual {
            return Ok(());
        }
        if self.options.strict {
            return Err(Error::length_mismatch(line, declared, actual));
        }
        self.warn(
            line,
            format!("array declares {} elements, found {}", declared, actual),
        );
        Ok(())
    }

    /// Truncation handling: the input ended before the declared count was
    /// reached.
    fn unexpected_end_or_warn(&mut self, declared: usize, actual: usize, what: &str) -> Result<()> {
        if self.options.strict {
            return Err(Error::unexpected_end(
                self.cursor.last_line_number(),
                format!("{} more {}(s)", declared - actual, what),
            ));
        }
        self.warn(
            self.cursor.last_line_number(),
            format!("input ended with {} of {} declared {}s", actual, declared, what),
        );
        Ok(())
    }

    // -- token-level parsing ------------------------------------------------

    /// Recognizes an array header in `content`. Returns `Ok(None)` when the
    /// content does not have header shape at all; malformed field groups and
    /// out-of-range lengths are errors.
    fn parse_array_header(&mut self, content: &str, line: usize) -> Result<Option<ArrayHeader>> {
        let (key, rest) = if let Some(quoted) = content.strip_prefix('"') {
            let Some(end) = find_closing_quote(quoted, 0) else {
                return Ok(None);
            };
            let after = &quoted[end + 1..];
            if !after.starts_with('[') {
                return Ok(None);
            }
            (Some(self.unescape(&quoted[..end], line)?), after)
        } else {
            match content.find('[') {
                Some(pos) if pos == 0 => (None, content),
                Some(pos) => {
                    let prefix = &content[..pos];
                    if !crate::quote::is_unquoted_key(prefix) {
                        return Ok(None);
                    }
                    (Some(prefix.to_string()), &content[pos..])
                }
                None => return Ok(None),
            }
        };

        // rest starts with '['
        let body = &rest[1..];
        let digits = body.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return Ok(None);
        }
        let len: usize = body[..digits]
            .parse()
            .map_err(|_| Error::syntax(line, 1, "array length out of range"))?;

        let mut after = &body[digits..];
        let mut delimiter = Delimiter::Comma;
        if let Some(ch) = after.chars().next() {
            if let Some(over) = Delimiter::from_char(ch) {
                if over != Delimiter::Comma {
                    delimiter = over;
                    after = &after[ch.len_utf8()..];
                }
            }
        }
        let Some(after) = after.strip_prefix(']') else {
            return Ok(None);
        };

        if let Some(fields_body) = after.strip_prefix('{') {
            let Some(close) = find_unquoted(fields_body, b'}') else {
                return Err(Error::syntax(line, 1, "unterminated field list in array header"));
            };
            let fields_str = &fields_body[..close];
            let Some(suffix) = fields_body[close + 1..].strip_prefix(':') else {
                return Err(Error::syntax(line, 1, "expected ':' after tabular header"));
            };
            if !suffix.trim().is_empty() {
                return Err(Error::syntax(line, 1, "unexpected content after tabular header"));
            }
            if fields_str.is_empty() {
                return Err(Error::syntax(line, 1, "empty field list in tabular header"));
            }
            let mut tokens = parse_delimited(fields_str, delimiter.as_char());
            if tokens.len() == 1 {
                // Unquoted field tokens never contain a delimiter, so a
                // field list the declared delimiter cannot split while
                // another permitted one can is an inconsistent header
                if let Some((found, retokenized)) =
                    detect_field_list_delimiter(fields_str, delimiter)
                {
                    if self.options.strict {
                        return Err(Error::delimiter_mismatch(
                            line,
                            format!(
                                "field list is separated by {:?}, header declares {:?}",
                                found.as_char(),
                                delimiter.as_char()
                            ),
                        ));
                    }
                    self.warn(
                        line,
                        format!(
                            "field list is separated by {:?}; using it for this array",
                            found.as_char()
                        ),
                    );
                    delimiter = found;
                    tokens = retokenized;
                }
            }
            let mut fields = Vec::new();
            for token in tokens {
                fields.push(self.parse_field_name(token.trim_matches(' '), line)?);
            }
            return Ok(Some(ArrayHeader {
                key,
                len,
                delimiter,
                fields: Some(fields),
                inline: None,
            }));
        }

        let Some(suffix) = after.strip_prefix(':') else {
            return Ok(None);
        };
        let suffix = suffix.trim_start_matches(' ');
        Ok(Some(ArrayHeader {
            key,
            len,
            delimiter,
            fields: None,
            inline: if suffix.is_empty() {
                None
            } else {
                Some(suffix.to_string())
            },
        }))
    }

    /// Unquotes a tabular column name; bare tokens pass through as-is.
    fn parse_field_name(&mut self, token: &str, line: usize) -> Result<String> {
        if let Some(rest) = token.strip_prefix('"') {
            match find_closing_quote(rest, 0) {
                Some(end) if end == rest.len() - 1 => return self.unescape(&rest[..end], line),
                _ => return Err(Error::syntax(line, 1, "malformed quoted field name")),
            }
        }
        Ok(token.to_string())
    }

    /// Parses a key at the start of `content`. Returns the key, the byte
    /// position just past the colon, and whether the key was quoted.
    fn parse_key(&mut self, content: &str, line: usize) -> Result<(String, usize, bool)> {
        if let Some(rest) = content.strip_prefix('"') {
            let end = find_closing_quote(rest, 0)
                .ok_or_else(|| Error::syntax(line, 1, "unterminated quoted key"))?;
            let key = self.unescape(&rest[..end], line)?;
            let after = &rest[end + 1..];
            if !after.starts_with(':') {
                return Err(Error::syntax(line, end + 2, "expected ':' after key"));
            }
            return Ok((key, end + 3, true));
        }

        match content.find(':') {
            Some(0) => Err(Error::syntax(line, 1, "missing key before ':'")),
            Some(pos) => Ok((content[..pos].to_string(), pos + 1, false)),
            None => Err(Error::syntax(
                line,
                content.len().max(1),
                "expected ':' after key",
            )),
        }
    }

    /// Classifies one token: empty string, quoted string, `null`, booleans,
    /// integer, plain decimal, or a bare string. `-0` and `-0.0` decode to
    /// numeric zero.
    fn parse_primitive(&mut self, token: &str, line: usize) -> Result<Value> {
        let token = token.trim_matches(' ');
        if token.is_empty() {
            return Ok(Value::String(String::new()));
        }

        if let Some(rest) = token.strip_prefix('"') {
            let end = find_closing_quote(rest, 0)
                .ok_or_else(|| Error::syntax(line, 1, "unterminated string"))?;
            if end != rest.len() - 1 {
                return Err(Error::syntax(
                    line,
                    end + 2,
                    "unexpected characters after closing quote",
                ));
            }
            let text = self.unescape(&rest[..end], line)?;
            self.check_string_length(text.len(), line)?;
            return Ok(Value::String(text));
        }

        match token {
            NULL_LITERAL => return Ok(Value::Null),
            TRUE_LITERAL => return Ok(Value::Bool(true)),
            FALSE_LITERAL => return Ok(Value::Bool(false)),
            _ => {}
        }

        if is_integer_literal(token) {
            return Ok(match token.parse::<i64>() {
                Ok(i) => Value::Number(Number::Integer(i)),
                // Digit runs beyond i64 fall back to a float
                Err(_) => {
                    let f = token
                        .parse::<f64>()
                        .map_err(|_| Error::syntax(line, 1, "invalid number"))?;
                    Value::Number(Number::Float(f))
                }
            });
        }
        if is_decimal_literal(token) {
            let f = token
                .parse::<f64>()
                .map_err(|_| Error::syntax(line, 1, "invalid number"))?;
            let f = if f == 0.0 { 0.0 } else { f };
            return Ok(Value::Number(Number::Float(f)));
        }

        self.check_string_length(token.len(), line)?;
        Ok(Value::String(token.to_string()))
    }

    fn check_string_length(&self, len: usize, _line: usize) -> Result<()> {
        if len > self.options.limits.max_string_length {
            return Err(Error::limit(
                "string length",
                len,
                self.options.limits.max_string_length,
            ));
        }
        Ok(())
    }

    /// Resolves escape sequences in quoted text. Legal escapes are `\\`,
    /// `\"`, `\n`, `\r`, `\t`, and `\uXXXX` (with surrogate pairs). Any
    /// other `\X` is a strict-mode error and a lenient-mode literal
    /// passthrough.
    fn unescape(&mut self, s: &str, line: usize) -> Result<String> {
        let mut out = String::with_capacity(s.len());
        let mut chars = s.chars();
        while let Some(ch) = chars.next() {
            if ch != '\\' {
                out.push(ch);
                continue;
            }
            match chars.next() {
                Some('\\') => out.push('\\'),
                Some('"') => out.push('"'),
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some('u') => {
                    let unit = read_hex4(&mut chars)
                        .ok_or_else(|| Error::syntax(line, 1, "invalid \\u escape"))?;
                    if (0xD800..=0xDBFF).contains(&unit) {
                        // High surrogate: require the low half
                        let low = match (chars.next(), chars.next()) {
                            (Some('\\'), Some('u')) => read_hex4(&mut chars),
                            _ => None,
                        };
                        match low {
                            Some(low) if (0xDC00..=0xDFFF).contains(&low) => {
                                let code =
                                    0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                                match char::from_u32(code) {
                                    Some(c) => out.push(c),
                                    None => {
                                        return Err(Error::syntax(
                                            line,
                                            1,
                                            "invalid unicode escape",
                                        ))
                                    }
                                }
                            }
                            _ => {
                                if self.options.strict {
                                    return Err(Error::syntax(
                                        line,
                                        1,
                                        "unpaired surrogate in \\u escape",
                                    ));
                                }
                                self.warn(line, "unpaired surrogate in \\u escape");
                                out.push('\u{FFFD}');
                            }
                        }
                    } else if (0xDC00..=0xDFFF).contains(&unit) {
                        if self.options.strict {
                            return Err(Error::syntax(
                                line,
                                1,
                                "unpaired surrogate in \\u escape",
                            ));
                        }
                        self.warn(line, "unpaired surrogate in \\u escape");
                        out.push('\u{FFFD}');
                    } else {
                        match char::from_u32(unit) {
                            Some(c) => out.push(c),
                            None => return Err(Error::syntax(line, 1, "invalid unicode escape")),
                        }
                    }
                }
                Some(other) => {
                    if self.options.strict {
                        return Err(Error::syntax(
                            line,
                            1,
                            format!("invalid escape sequence \\{}", other),
                        ));
                    }
                    self.warn(line, format!("invalid escape sequence \\{}", other));
                    out.push('\\');
                    out.push(other);
                }
                None => {
                    if self.options.strict {
                        return Err(Error::syntax(line, 1, "trailing backslash in string"));
                    }
                    self.warn(line, "trailing backslash in string");
                    out.push('\\');
                }
            }
        }
        Ok(out)
    }
}

/// Reads exactly four hex digits as a UTF-16 code unit.
fn read_hex4(chars: &mut std::str::Chars<'_>) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..4 {
        let digit = chars.next()?.to_digit(16)?;
        value = value * 16 + digit;
    }
    Some(value)
}

/// Finds another permitted delimiter that splits `content` into exactly
/// `want` tokens. Strict mode turns a hit into a `DelimiterMismatch`;
/// lenient mode adopts it with a warning.
fn detect_delimiter(
    content: &str,
    active: Delimiter,
    want: usize,
) -> Option<(Delimiter, Vec<String>)> {
    for ch in DELIMITERS {
        if ch == active.as_char() {
            continue;
        }
        let tokens = parse_delimited(content, ch);
        if tokens.len() == want {
            let delimiter = Delimiter::from_char(ch)?;
            return Some((delimiter, tokens));
        }
    }
    None
}

/// Finds a permitted delimiter that actually splits a header's field list
/// when the declared one leaves it as a single token.
fn detect_field_list_delimiter(
    fields_str: &str,
    active: Delimiter,
) -> Option<(Delimiter, Vec<String>)> {
    for ch in DELIMITERS {
        if ch == active.as_char() {
            continue;
        }
        let tokens = parse_delimited(fields_str, ch);
        if tokens.len() > 1 {
            let delimiter = Delimiter::from_char(ch)?;
            return Some((delimiter, tokens));
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Serde bridge: Value -> T
// ---------------------------------------------------------------------------

/// A serde deserializer reading out of an owned [`Value`]; backs
/// [`crate::from_value`] and, composed with the parser, [`crate::from_str`].
pub(crate) struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    pub(crate) fn new(value: Value) -> Self {
        ValueDeserializer { value }
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Number(Number::Integer(i)) => visitor.visit_i64(i),
            Value::Number(Number::Float(f)) => visitor.visit_f64(f),
            Value::String(s) => visitor.visit_string(s),
            Value::Array(arr) => visitor.visit_seq(SeqDeserializer::new(arr)),
            Value::Object(obj) => visitor.visit_map(MapDeserializer::new(obj)),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(s) => visitor.visit_enum(s.into_deserializer()),
            Value::Object(obj) if obj.len() == 1 => {
                let mut entries = obj.into_iter();
                match entries.next() {
                    Some((variant, value)) => {
                        visitor.visit_enum(EnumDeserializer::new(variant, value))
                    }
                    None => Err(Error::custom("expected enum variant")),
                }
            }
            other => Err(Error::custom(format!(
                "expected enum variant, found {:?}",
                other
            ))),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, Value>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(map: Map) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(ValueDeserializer::new(Value::String(key)))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<Value>,
}

impl EnumDeserializer {
    fn new(variant: String, value: Value) -> Self {
        EnumDeserializer {
            variant,
            value: Some(value),
        }
    }
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(ValueDeserializer::new(Value::String(self.variant)))?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Some(Value::Null) | None => Ok(()),
            _ => Err(Error::custom("expected unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("expected newtype variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Array(arr)) => visitor.visit_seq(SeqDeserializer::new(arr)),
            _ => Err(Error::custom("expected tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Object(obj)) => visitor.visit_map(MapDeserializer::new(obj)),
            _ => Err(Error::custom("expected struct variant")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict_parser(options: &DecodeOptions) -> Parser<'_> {
        Parser {
            cursor: Cursor::new(Vec::new()),
            options,
            warnings: Vec::new(),
            nesting: 0,
        }
    }

    #[test]
    fn scanner_computes_depths() {
        let doc = scan_lines("a: 1\n  b: 2\n\n    c: 3\n", 2).unwrap();
        let depths: Vec<usize> = doc.lines.iter().map(|l| l.depth).collect();
        assert_eq!(depths, vec![0, 1, 2]);
        let numbers: Vec<usize> = doc.lines.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![1, 2, 4]);
        assert_eq!(doc.blank_lines, vec![3, 5]);
    }

    #[test]
    fn scanner_rejects_tabs_and_odd_indents() {
        assert!(matches!(
            scan_lines("a:\n\tb: 1", 2),
            Err(Error::Indentation { line: 2, .. })
        ));
        assert!(matches!(
            scan_lines("a:\n   b: 1", 2),
            Err(Error::Indentation { line: 2, .. })
        ));
    }

    #[test]
    fn scanner_strips_carriage_returns() {
        let doc = scan_lines("a: 1\r\n  b: 2\r\n", 2).unwrap();
        assert_eq!(doc.lines[0].content, "a: 1");
        assert_eq!(doc.lines[1].content, "b: 2");
    }

    #[test]
    fn header_shapes() {
        let options = DecodeOptions::default();
        let mut parser = strict_parser(&options);

        let header = parser.parse_array_header("tags[3]: a,b,c", 1).unwrap().unwrap();
        assert_eq!(header.key.as_deref(), Some("tags"));
        assert_eq!(header.len, 3);
        assert_eq!(header.delimiter, Delimiter::Comma);
        assert_eq!(header.inline.as_deref(), Some("a,b,c"));

        let header = parser.parse_array_header("[2]:", 1).unwrap().unwrap();
        assert_eq!(header.key, None);
        assert_eq!(header.inline, None);

        let header = parser
            .parse_array_header("users[2]{id,name}:", 1)
            .unwrap()
            .unwrap();
        assert_eq!(header.fields.as_deref(), Some(&["id".to_string(), "name".to_string()][..]));

        let header = parser.parse_array_header("xs[2|]: a|b", 1).unwrap().unwrap();
        assert_eq!(header.delimiter, Delimiter::Pipe);

        let header = parser.parse_array_header("xs[2\t]:", 1).unwrap().unwrap();
        assert_eq!(header.delimiter, Delimiter::Tab);
    }

    #[test]
    fn header_field_list_delimiter_consistency() {
        let strict = DecodeOptions::default();
        let mut parser = strict_parser(&strict);
        assert!(matches!(
            parser.parse_array_header("xs[2|]{a,b}:", 1),
            Err(Error::DelimiterMismatch { line: 1, .. })
        ));

        let lenient = DecodeOptions::new().with_strict(false);
        let mut parser = strict_parser(&lenient);
        let header = parser.parse_array_header("xs[2|]{a,b}:", 1).unwrap().unwrap();
        assert_eq!(header.delimiter, Delimiter::Comma);
        assert_eq!(
            header.fields.as_deref(),
            Some(&["a".to_string(), "b".to_string()][..])
        );
        assert_eq!(parser.warnings.len(), 1);

        // A quoted field legitimately containing another delimiter is fine
        let strict = DecodeOptions::default();
        let mut parser = strict_parser(&strict);
        let header = parser
            .parse_array_header("xs[2|]{\"a,b\"}:", 1)
            .unwrap()
            .unwrap();
        assert_eq!(header.fields.as_deref(), Some(&["a,b".to_string()][..]));
    }

    #[test]
    fn header_rejects_and_ignores() {
        let options = DecodeOptions::default();
        let mut parser = strict_parser(&options);

        // Not headers at all
        assert_eq!(parser.parse_array_header("name: Alice", 1).unwrap(), None);
        assert_eq!(parser.parse_array_header("[abc]", 1).unwrap(), None);
        assert_eq!(parser.parse_array_header("[12", 1).unwrap(), None);
        assert_eq!(parser.parse_array_header("x[3]", 1).unwrap(), None);

        // Header-shaped but malformed
        assert!(parser.parse_array_header("xs[2]{a,b", 1).is_err());
        assert!(parser.parse_array_header("xs[2]{a,b}x", 1).is_err());
    }

    #[test]
    fn primitive_classification() {
        let options = DecodeOptions::default();
        let mut parser = strict_parser(&options);

        assert_eq!(parser.parse_primitive("null", 1).unwrap(), Value::Null);
        assert_eq!(parser.parse_primitive("true", 1).unwrap(), Value::Bool(true));
        assert_eq!(
            parser.parse_primitive("-42", 1).unwrap(),
            Value::Number(Number::Integer(-42))
        );
        assert_eq!(
            parser.parse_primitive("3.5", 1).unwrap(),
            Value::Number(Number::Float(3.5))
        );
        assert_eq!(
            parser.parse_primitive("-0", 1).unwrap(),
            Value::Number(Number::Integer(0))
        );
        assert_eq!(
            parser.parse_primitive("-0.0", 1).unwrap(),
            Value::Number(Number::Float(0.0))
        );
        assert_eq!(
            parser.parse_primitive("hello world", 1).unwrap(),
            Value::String("hello world".to_string())
        );
        assert_eq!(
            parser.parse_primitive("\"42\"", 1).unwrap(),
            Value::String("42".to_string())
        );
        assert_eq!(
            parser.parse_primitive("1e6", 1).unwrap(),
            Value::String("1e6".to_string())
        );
        assert_eq!(parser.parse_primitive("", 1).unwrap(), Value::String(String::new()));
    }

    #[test]
    fn illegal_escapes_are_strict_errors() {
        let strict = DecodeOptions::default();
        let mut parser = strict_parser(&strict);
        assert!(parser.parse_primitive("\"a\\qb\"", 1).is_err());

        let lenient = DecodeOptions::new().with_strict(false);
        let mut parser = strict_parser(&lenient);
        assert_eq!(
            parser.parse_primitive("\"a\\qb\"", 1).unwrap(),
            Value::String("a\\qb".to_string())
        );
        assert_eq!(parser.warnings.len(), 1);
    }

    #[test]
    fn unicode_escapes() {
        let options = DecodeOptions::default();
        let mut parser = strict_parser(&options);
        assert_eq!(
            parser.parse_primitive("\"caf\\u00e9\"", 1).unwrap(),
            Value::String("café".to_string())
        );
        assert_eq!(
            parser.parse_primitive("\"\\ud83c\\udf89\"", 1).unwrap(),
            Value::String("🎉".to_string())
        );
        assert!(parser.parse_primitive("\"\\ud83c\"", 1).is_err());
    }

    #[test]
    fn delimited_splitting_respects_quotes() {
        assert_eq!(parse_delimited("a,b,c", ','), vec!["a", "b", "c"]);
        assert_eq!(
            parse_delimited("\"a,b\",c", ','),
            vec!["\"a,b\"", "c"]
        );
        assert_eq!(
            parse_delimited("\"a\\\",b\",c", ','),
            vec!["\"a\\\",b\"", "c"]
        );
        assert_eq!(parse_delimited("", ','), vec![""]);
    }

    #[test]
    fn unquoted_colon_detection() {
        assert!(has_unquoted_colon("a: b"));
        assert!(!has_unquoted_colon("\"a:b\""));
        assert!(has_unquoted_colon("\"a:b\": c"));
        assert!(!has_unquoted_colon("plain"));
    }
}
