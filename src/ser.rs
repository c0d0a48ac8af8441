//! TOON encoding.
//!
//! This module converts [`Value`] trees into TOON text. Encoding is a fixed
//! pipeline: optional key folding and key sorting transform the tree, then a
//! single descent dispatches each subtree to the most compact form it
//! qualifies for.
//!
//! ## Array formats
//!
//! Arrays pick one of three layouts:
//!
//! - **Tabular** (`key[N]{f1,f2}:` + rows): every element is an object with
//!   the same keys and primitive-only values
//! - **Inline** (`key[N]: a,b,c`): every element is a primitive
//! - **List** (`key[N]:` + `- ` items): anything else
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use toon_codec::{encode, toon};
//!
//! let value = toon!({
//!     "users": [
//!         {"id": 1, "name": "Alice"},
//!         {"id": 2, "name": "Bob"}
//!     ]
//! });
//!
//! let text = encode(&value).unwrap();
//! assert_eq!(text, "users[2]{id,name}:\n  1,Alice\n  2,Bob");
//! ```

use crate::quote::{write_field_name, write_key, write_string};
use crate::spec::{LIST_MARKER, NULL_LITERAL};
use crate::{Delimiter, EncodeOptions, Error, KeyFolding, Map, Number, Result, Value};
use serde::{ser, Serialize};

/// Encodes `value` as TOON text with the given options.
pub(crate) fn to_toon_string(value: &Value, options: &EncodeOptions) -> Result<String> {
    if options.indent == 0 {
        return Err(Error::custom("indent width must be at least 1"));
    }

    let transformed;
    let value = if options.sort_keys || options.key_folding == KeyFolding::Safe {
        let mut owned = value.clone();
        if options.sort_keys {
            owned = sort_keys_deep(owned);
        }
        if options.key_folding == KeyFolding::Safe {
            owned = crate::fold::fold_keys(owned, options.flatten_depth);
        }
        transformed = owned;
        &transformed
    } else {
        value
    };

    let mut encoder = Encoder::new(options);
    encoder.encode_root(value)?;
    Ok(encoder.out)
}

/// Sorts every object's entries by key, recursively. Stable, applied once
/// per object.
fn sort_keys_deep(value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            map.sort_keys();
            Value::Object(map.into_iter().map(|(k, v)| (k, sort_keys_deep(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys_deep).collect()),
        other => other,
    }
}

/// Result of checking whether an array qualifies for the tabular layout.
#[derive(Debug, PartialEq)]
pub(crate) struct TabularAnalysis {
    pub tabular: bool,
    /// Column names, in the first element's key order. Empty when the array
    /// is empty or not tabular.
    pub fields: Vec<String>,
    /// Informational: 100.0 for a populated table, 0.0 otherwise.
    pub score: f64,
}

/// Decides whether `items` can be emitted as a table: every element is an
/// object, all elements share one key set (order taken from the first), and
/// every value is a primitive. An empty array trivially qualifies and emits
/// as a bare `[0]:` header.
pub(crate) fn analyze_tabular(items: &[Value]) -> TabularAnalysis {
    const NOT_TABULAR: TabularAnalysis = TabularAnalysis {
        tabular: false,
        fields: Vec::new(),
        score: 0.0,
    };

    if items.is_empty() {
        return TabularAnalysis {
            tabular: true,
            fields: Vec::new(),
            score: 0.0,
        };
    }

    let Value::Object(first) = &items[0] else {
        return NOT_TABULAR;
    };
    if first.is_empty() {
        return NOT_TABULAR;
    }
    let fields: Vec<String> = first.keys().cloned().collect();

    for item in items {
        let Value::Object(obj) = item else {
            return NOT_TABULAR;
        };
        if obj.len() != fields.len() {
            return NOT_TABULAR;
        }
        for field in &fields {
            match obj.get(field) {
                Some(value) if value.is_primitive() => {}
                _ => return NOT_TABULAR,
            }
        }
    }

    TabularAnalysis {
        tabular: true,
        fields,
        score: 100.0,
    }
}

struct Encoder<'a> {
    out: String,
    options: &'a EncodeOptions,
    /// Logical container nesting, bounded by the configured limit.
    nesting: usize,
}

impl<'a> Encoder<'a> {
    fn new(options: &'a EncodeOptions) -> Self {
        Encoder {
            out: String::with_capacity(256),
            options,
            nesting: 0,
        }
    }

    fn encode_root(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Object(map) => self.emit_object_fields(map, 0),
            Value::Array(items) => self.emit_array(items, 0),
            primitive => self.emit_primitive(primitive),
        }
    }

    /// Starts a fresh output line at the given line depth.
    fn start_line(&mut self, depth: usize) {
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        for _ in 0..depth * self.options.indent {
            self.out.push(' ');
        }
    }

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

    /// Emits one object's fields, each on its own line at `depth`.
    fn emit_object_fields(&mut self, map: &Map, depth: usize) -> Result<()> {
        self.enter()?;
        for (key, value) in map {
            self.start_line(depth);
            write_key(&mut self.out, key, self.options.ensure_ascii);
            self.emit_field_value(value, depth)?;
        }
        self.leave();
        Ok(())
    }

    /// Emits the `: value` part of a field whose key is already written.
    /// The field's line sits at `depth`.
    fn emit_field_value(&mut self, value: &Value, depth: usize) -> Result<()> {
        match value {
            Value::Array(items) => self.emit_array(items, depth),
            Value::Object(map) if map.is_empty() => {
                self.out.push(':');
                Ok(())
            }
            Value::Object(map) => {
                self.out.push(':');
                self.emit_object_fields(map, depth + 1)
            }
            primitive => {
                self.out.push_str(": ");
                self.emit_primitive(primitive)
            }
        }
    }

    /// Emits an array header (continuing the current line) and its body.
    /// The header's line sits at `depth`; rows and items go to `depth + 1`.
    fn emit_array(&mut self, items: &[Value], depth: usize) -> Result<()> {
        self.enter()?;
        if items.len() > self.options.limits.max_array_length {
            return Err(Error::limit(
                "array length",
                items.len(),
                self.options.limits.max_array_length,
            ));
        }

        let analysis = analyze_tabular(items);
        if analysis.tabular {
            self.emit_header(items.len(), Some(&analysis.fields));
            for item in items {
                self.start_line(depth + 1);
                if let Value::Object(obj) = item {
                    for (i, field) in analysis.fields.iter().enumerate() {
                        if i > 0 {
                            self.out.push(self.options.delimiter.as_char());
                        }
                        if let Some(cell) = obj.get(field) {
                            self.emit_primitive(cell)?;
                        }
                    }
                }
            }
        } else if items.iter().all(Value::is_primitive) {
            self.emit_header(items.len(), None);
            self.out.push(' ');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    self.out.push(self.options.delimiter.as_char());
                }
                self.emit_primitive(item)?;
            }
        } else {
            self.emit_header(items.len(), None);
            for item in items {
                self.emit_list_item(item, depth + 1)?;
            }
        }
        self.leave();
        Ok(())
    }

    /// Emits the `[N]`/`[N<delim>]` bracket group, the optional `{fields}`
    /// group, and the trailing colon.
    fn emit_header(&mut self, len: usize, fields: Option<&[String]>) {
        self.out.push('[');
        self.out.push_str(&len.to_string());
        if self.options.delimiter != Delimiter::Comma {
            self.out.push(self.options.delimiter.as_char());
        }
        self.out.push(']');
        if let Some(fields) = fields.filter(|f| !f.is_empty()) {
            self.out.push('{');
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    self.out.push(self.options.delimiter.as_char());
                }
                write_field_name(&mut self.out, field, self.options.ensure_ascii);
            }
            self.out.push('}');
        }
        self.out.push(':');
    }

    /// Emits one list item at `item_depth`.
    ///
    /// An object item puts its first field on the hyphen line, its remaining
    /// fields at `item_depth + 1`, and any field's nested container children
    /// at `item_depth + 2`. An empty object item is a bare `-`.
    fn emit_list_item(&mut self, item: &Value, item_depth: usize) -> Result<()> {
        self.start_line(item_depth);
        match item {
            Value::Object(map) if map.is_empty() => {
                self.out.push('-');
                Ok(())
            }
            Value::Object(map) => {
                self.enter()?;
                self.out.push_str(LIST_MARKER);
                for (i, (key, value)) in map.iter().enumerate() {
                    // The first field shares the hyphen line; siblings sit
                    // one depth below it.
                    let line_depth = if i == 0 { item_depth } else { item_depth + 1 };
                    if i > 0 {
                        self.start_line(line_depth);
                    }
                    write_key(&mut self.out, key, self.options.ensure_ascii);
                    self.emit_list_item_field(value, line_depth, item_depth + 2)?;
                }
                self.leave();
                Ok(())
            }
            Value::Array(items) => {
                self.out.push_str(LIST_MARKER);
                self.emit_array(items, item_depth)
            }
            primitive => {
                self.out.push_str(LIST_MARKER);
                self.emit_primitive(primitive)
            }
        }
    }

    /// Emits the `: value` part of a list-item object field whose key is
    /// already written on the line at `line_depth`. Array rows continue at
    /// `line_depth + 1`; nested object children always start at
    /// `child_depth` (one past the sibling-field depth), which keeps them
    /// distinguishable from the item's remaining fields.
    fn emit_list_item_field(
        &mut self,
        value: &Value,
        line_depth: usize,
        child_depth: usize,
    ) -> Result<()> {
        match value {
            Value::Array(items) => self.emit_array(items, line_depth),
            Value::Object(map) if map.is_empty() => {
                self.out.push(':');
                Ok(())
            }
            Value::Object(map) => {
                self.out.push(':');
                self.emit_object_fields(map, child_depth)
            }
            primitive => {
                self.out.push_str(": ");
                self.emit_primitive(primitive)
            }
        }
    }

    /// Emits a primitive in its textual form: lowercase booleans, canonical
    /// decimal integers, normalized floats, and minimally-quoted strings.
    fn emit_primitive(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.out.push_str(NULL_LITERAL),
            Value::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => self.emit_number(n),
            Value::String(s) => {
                if s.len() > self.options.limits.max_string_length {
                    return Err(Error::limit(
                        "string length",
                        s.len(),
                        self.options.limits.max_string_length,
                    ));
                }
                write_string(
                    &mut self.out,
                    s,
                    self.options.delimiter.as_char(),
                    self.options.ensure_ascii,
                );
            }
            Value::Array(_) | Value::Object(_) => {
                // Containers are routed through emit_array/emit_object_fields
                return Err(Error::custom("container in primitive position"));
            }
        }
        Ok(())
    }

    /// Normalizations: `-0.0` emits as `0`, non-finite floats emit as
    /// `null`, integer-valued floats emit without a decimal point, never
    /// scientific notation.
    fn emit_number(&mut self, n: &Number) {
        match n {
            Number::Integer(i) => self.out.push_str(&i.to_string()),
            Number::Float(f) => {
                if !f.is_finite() {
                    self.out.push_str(NULL_LITERAL);
                } else if *f == 0.0 {
                    self.out.push('0');
                } else {
                    self.out.push_str(&f.to_string());
                }
            }
        }
    }
}

/// A serde serializer producing [`Value`] trees; backs [`crate::to_value`].
pub struct ValueSerializer;

pub struct SerializeVec {
    vec: Vec<Value>,
}

pub struct SerializeTupleVariantAsValue {
    name: &'static str,
    vec: Vec<Value>,
}

pub struct SerializeMapAsValue {
    map: Map,
    current_key: Option<String>,
}

pub struct SerializeStructVariantAsValue {
    name: &'static str,
    map: Map,
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeTupleVariantAsValue;
    type SerializeMap = SerializeMapAsValue;
    type SerializeStruct = SerializeMapAsValue;
    type SerializeStructVariant = SerializeStructVariantAsValue;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Number(Number::Integer(v)))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        if v <= i64::MAX as u64 {
            Ok(Value::Number(Number::Integer(v as i64)))
        } else {
            Ok(Value::Number(Number::Float(v as f64)))
        }
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::Number(Number::Float(v as f64)))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Number(Number::Float(v)))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        let vec = v
            .iter()
            .map(|&b| Value::Number(Number::Integer(b as i64)))
            .collect();
        Ok(Value::Array(vec))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        let mut map = Map::with_capacity(1);
        map.insert(variant.to_string(), value.serialize(ValueSerializer)?);
        Ok(Value::Object(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec {
            vec: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariantAsValue> {
        Ok(SerializeTupleVariantAsValue {
            name: variant,
            vec: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMapAsValue> {
        Ok(SerializeMapAsValue {
            map: Map::new(),
            current_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<SerializeMapAsValue> {
        self.serialize_map(None)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeStructVariantAsValue> {
        Ok(SerializeStructVariantAsValue {
            name: variant,
            map: Map::new(),
        })
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Array(self.vec))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Array(self.vec))
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Array(self.vec))
    }
}

impl ser::SerializeTupleVariant for SerializeTupleVariantAsValue {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let mut map = Map::with_capacity(1);
        map.insert(self.name.to_string(), Value::Array(self.vec));
        Ok(Value::Object(map))
    }
}

impl ser::SerializeMap for SerializeMapAsValue {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match key.serialize(ValueSerializer)? {
            Value::String(s) => {
                self.current_key = Some(s);
                Ok(())
            }
            _ => Err(Error::unsupported_type("map keys must be strings")),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.map.insert(key, value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Object(self.map))
    }
}

impl ser::SerializeStruct for SerializeMapAsValue {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map
            .insert(key.to_string(), value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Object(self.map))
    }
}

impl ser::SerializeStructVariant for SerializeStructVariantAsValue {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map
            .insert(key.to_string(), value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let mut map = Map::with_capacity(1);
        map.insert(self.name.to_string(), Value::Object(self.map));
        Ok(Value::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toon;

    #[test]
    fn analyzer_accepts_uniform_objects() {
        let items = vec![
            toon!({"id": 1, "name": "Alice"}),
            toon!({"id": 2, "name": "Bob"}),
        ];
        let analysis = analyze_tabular(&items);
        assert!(analysis.tabular);
        assert_eq!(analysis.fields, vec!["id", "name"]);
        assert_eq!(analysis.score, 100.0);
    }

    #[test]
    fn analyzer_rejects_nested_and_mismatched() {
        // nested value
        let items = vec![toon!({"id": 1, "meta": {"a": 1}})];
        assert!(!analyze_tabular(&items).tabular);

        // differing key sets
        let items = vec![toon!({"id": 1}), toon!({"name": "Bob"})];
        assert!(!analyze_tabular(&items).tabular);

        // non-object element
        let items = vec![toon!({"id": 1}), toon!(7)];
        assert!(!analyze_tabular(&items).tabular);
    }

    #[test]
    fn analyzer_empty_sequence() {
        let analysis = analyze_tabular(&[]);
        assert!(analysis.tabular);
        assert!(analysis.fields.is_empty());
        assert_eq!(analysis.score, 0.0);
    }

    #[test]
    fn number_normalization() {
        assert_eq!(crate::encode(&Value::from(-0.0)).unwrap(), "0");
        assert_eq!(crate::encode(&Value::from(f64::NAN)).unwrap(), "null");
        assert_eq!(crate::encode(&Value::from(f64::INFINITY)).unwrap(), "null");
        assert_eq!(crate::encode(&Value::from(2.0)).unwrap(), "2");
        assert_eq!(crate::encode(&Value::from(2.5)).unwrap(), "2.5");
    }
}
