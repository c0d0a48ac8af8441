//! # toon_codec
//!
//! A bidirectional codec between in-memory structured values and TOON
//! (Token-Oriented Object Notation) text.
//!
//! ## What is TOON?
//!
//! TOON is a compact, human-readable data format designed for efficient
//! communication with Large Language Models (LLMs). On uniformly-shaped
//! tabular data it uses 30-60% fewer tokens than equivalent JSON while
//! staying readable and structured.
//!
//! ## Key Features
//!
//! - **Token-Efficient**: indentation instead of braces, tables instead of
//!   repeated keys, quotes only where they disambiguate
//! - **Tabular Arrays**: homogeneous object arrays serialize as compact
//!   tables with a single header row
//! - **Strict or Lenient Decoding**: strict mode turns every validation
//!   deviation into an error; lenient mode recovers and reports warnings
//! - **Key Folding**: optional `a.b.c: 42` dotted-key compression with a
//!   matching decode-time path expansion
//! - **Serde Compatible**: works with existing Rust types via
//!   `#[derive(Serialize, Deserialize)]`
//! - **No Unsafe Code**: written entirely in safe Rust
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! toon_codec = "0.1"
//! ```
//!
//! ### Encoding and Decoding Values
//!
//! ```rust
//! use toon_codec::{decode, encode, toon};
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
//!
//! let back = decode(&text).unwrap();
//! assert_eq!(back, value);
//! ```
//!
//! ### Working with Rust Types
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use toon_codec::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     active: bool,
//! }
//!
//! let user = User {
//!     id: 123,
//!     name: "Alice".to_string(),
//!     active: true,
//! };
//!
//! let text = to_string(&user).unwrap();
//! assert_eq!(text, "id: 123\nname: Alice\nactive: true");
//!
//! let back: User = from_str(&text).unwrap();
//! assert_eq!(user, back);
//! ```
//!
//! ### Lenient Decoding
//!
//! ```rust
//! use toon_codec::{DecodeOptions, Decoder};
//!
//! let mut decoder = Decoder::new("xs[3]: 1,2", DecodeOptions::new().with_strict(false));
//! let value = decoder.decode().unwrap();
//! assert_eq!(value.as_object().unwrap().get("xs").unwrap().as_array().unwrap().len(), 2);
//! assert_eq!(decoder.warnings().len(), 1);
//! ```
//!
//! ## Performance Characteristics
//!
//! - **Encoding**: O(n) in the number of fields/elements, one descent
//! - **Decoding**: one scanner pass plus one cursor-driven descent, no
//!   backtracking
//! - **Memory**: bounded by configurable nesting/array/string limits
//!
//! ## Examples
//!
//! See the `demos/` directory for focused, runnable examples:
//!
//! - **`simple.rs`** - encoding and decoding basics
//! - **`tabular_arrays.rs`** - the tabular format on repeated structures
//! - **`custom_options.rs`** - delimiters, key folding, sorted keys
//!
//! Run any of them with: `cargo run --example <name>`

pub mod de;
pub mod error;
mod fold;
pub mod macros;
pub mod map;
pub mod options;
pub mod quote;
pub mod ser;
pub mod spec;
pub mod value;

pub use de::Decoder;
pub use error::{Error, Result, Warning};
pub use map::Map;
pub use options::{DecodeOptions, Delimiter, EncodeOptions, KeyFolding, Limits, PathExpansion};
pub use ser::ValueSerializer;
pub use value::{Number, Value};

use serde::{de::DeserializeOwned, Serialize};
use std::io;

/// Encodes a [`Value`] tree as TOON text with default options.
///
/// # Examples
///
/// ```rust
/// use toon_codec::{encode, toon};
///
/// let value = toon!({"name": "Alice", "age": 30});
/// assert_eq!(encode(&value).unwrap(), "name: Alice\nage: 30");
/// ```
///
/// # Errors
///
/// Returns an error if a configured resource limit is exceeded.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode(value: &Value) -> Result<String> {
    encode_with_options(value, &EncodeOptions::default())
}

/// Encodes a [`Value`] tree as TOON text with custom options.
///
/// # Examples
///
/// ```rust
/// use toon_codec::{encode_with_options, toon, Delimiter, EncodeOptions};
///
/// let value = toon!({"tags": ["a", "b"]});
/// let options = EncodeOptions::new().with_delimiter(Delimiter::Pipe);
/// assert_eq!(encode_with_options(&value, &options).unwrap(), "tags[2|]: a|b");
/// ```
///
/// # Errors
///
/// Returns an error if a configured resource limit is exceeded or the
/// options are invalid.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode_with_options(value: &Value, options: &EncodeOptions) -> Result<String> {
    ser::to_toon_string(value, options)
}

/// Decodes TOON text into a [`Value`] tree with default (strict) options.
///
/// # Examples
///
/// ```rust
/// use toon_codec::{decode, Value};
///
/// let value = decode("name: Alice\nage: 30").unwrap();
/// let obj = value.as_object().unwrap();
/// assert_eq!(obj.get("age").and_then(Value::as_i64), Some(30));
/// ```
///
/// # Errors
///
/// Returns an error on malformed syntax or indentation, and on any
/// validation deviation (strict mode is the default). Errors carry 1-based
/// line numbers.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode(text: &str) -> Result<Value> {
    decode_with_options(text, &DecodeOptions::default())
}

/// Decodes TOON text into a [`Value`] tree with custom options.
///
/// To inspect the warnings a lenient pass collects, use [`Decoder`]
/// directly.
///
/// # Errors
///
/// Returns an error on malformed syntax or indentation in any mode, and on
/// validation deviations in strict mode.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_with_options(text: &str, options: &DecodeOptions) -> Result<Value> {
    let mut decoder = Decoder::new(text, options.clone());
    decoder.decode()
}

/// Converts any `T: Serialize` into a [`Value`] tree.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use toon_codec::{to_value, Value};
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value: Value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert!(value.is_object());
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be represented (e.g. a map with
/// non-string keys).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer)
}

/// Converts a [`Value`] tree into any `T: Deserialize`.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use toon_codec::{from_value, toon};
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_value(toon!({"x": 1, "y": 2})).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the value's shape does not match `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(de::ValueDeserializer::new(value))
}

/// Serializes any `T: Serialize` to a TOON string.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use toon_codec::to_string;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let toon = to_string(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(toon, "x: 1\ny: 2");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, &EncodeOptions::default())
}

/// Serializes any `T: Serialize` to a TOON string with custom options.
///
/// # Examples
///
/// ```rust
/// use toon_codec::{to_string_with_options, Delimiter, EncodeOptions};
///
/// let options = EncodeOptions::new().with_delimiter(Delimiter::Tab);
/// let toon = to_string_with_options(&vec![1, 2, 3], &options).unwrap();
/// assert_eq!(toon, "[3\t]: 1\t2\t3");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: &EncodeOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let value = to_value(value)?;
    encode_with_options(&value, options)
}

/// Deserializes an instance of type `T` from a string of TOON text.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use toon_codec::from_str;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("x: 1\ny: 2").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the input is not valid TOON or cannot be
/// deserialized to `T`. Parse errors include line information.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value(decode(s)?)
}

/// Serializes any `T: Serialize` to a writer in TOON format.
///
/// # Errors
///
/// Returns an error if serialization fails or writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, &EncodeOptions::default())
}

/// Serializes any `T: Serialize` to a writer in TOON format with custom
/// options.
///
/// # Errors
///
/// Returns an error if serialization fails or writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(mut writer: W, value: &T, options: &EncodeOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let text = to_string_with_options(value, options)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(e.to_string()))?;
    Ok(())
}

/// Deserializes an instance of type `T` from an I/O stream of TOON.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use std::io::Cursor;
/// use toon_codec::from_reader;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_reader(Cursor::new(b"x: 1\ny: 2")).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if reading fails, the input is not valid TOON, or the
/// data cannot be deserialized to `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| Error::io(e.to_string()))?;
    from_str(&text)
}

/// Deserializes an instance of type `T` from bytes of TOON text.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, not valid TOON, or
/// cannot be deserialized to `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s)
}
