//! # serde_rsn
//!
//! A Serde-compatible library for RSN (Rust Serialized Notation).
//!
//! ## What is RSN?
//!
//! RSN is a text data format whose syntax mirrors Rust literals: lists
//! `[1, 2]`, tuples `(1, "a")`, maps `{key: value}`, named tuples
//! `Point(1, 2)`, named maps `Point { x: 1, y: 2 }`, bare names `None`,
//! attributes `#[name(args)]`, and line or block comments.
//!
//! ## Key Features
//!
//! - **Layered**: a tokenizer, a pull-style event parser, a [`Value`] tree and a
//!   [`Writer`] can each be used on their own
//! - **Serde Compatible**: Works with existing Rust types via `#[derive(Serialize, Deserialize)]`
//! - **Located Errors**: every error carries the byte range it refers to
//! - **Bounded Nesting**: containers are tracked on an explicit stack with a configurable depth limit
//! - **Zero-copy**: strings without escapes are borrowed from the input
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! serde_rsn = "0.1"
//! serde = { version = "1.0", features = ["derive"] }
//! ```
//!
//! ### Basic Serialization and Deserialization
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_rsn::{to_string, from_str};
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
//! let rsn = to_string(&user).unwrap();
//! assert_eq!(rsn, r#"User{id:123,name:"Alice",active:true}"#);
//!
//! let user_back: User = from_str(&rsn).unwrap();
//! assert_eq!(user, user_back);
//! ```
//!
//! ### Enums and Options
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_rsn::{to_string, from_str};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! enum Shape {
//!     Circle(f64),
//!     Rect { w: u32, h: u32 },
//! }
//!
//! let shapes = vec![Some(Shape::Circle(1.5)), None, Some(Shape::Rect { w: 2, h: 3 })];
//! let rsn = to_string(&shapes).unwrap();
//! assert_eq!(rsn, "[Some(Circle(1.5)),None,Some(Rect{w:2,h:3})]");
//!
//! let back: Vec<Option<Shape>> = from_str(&rsn).unwrap();
//! assert_eq!(back, shapes);
//! ```
//!
//! ### Dynamic Values
//!
//! ```rust
//! use serde_rsn::{parse, Value};
//!
//! let value = parse("Config { name: \"demo\", sizes: [1, 2] }").unwrap();
//! let config = value.as_named().unwrap();
//! assert_eq!(config.name, "Config");
//!
//! let fields = config.contents.as_map().unwrap();
//! assert_eq!(fields.get_by_name("name").and_then(Value::as_str), Some("demo"));
//! ```
//!
//! ### Events
//!
//! ```rust
//! use serde_rsn::parser::{EventKind, Parser};
//! use serde_rsn::ParseConfig;
//!
//! let starts = Parser::new("[[1], [2, [3]]]", ParseConfig::default())
//!     .filter(|event| matches!(event, Ok(e) if e.kind == EventKind::StartList))
//!     .count();
//! assert_eq!(starts, 4);
//! ```
//!
//! ## Error Layers
//!
//! - [`TokenizerError`]: a malformed literal or unexpected character
//! - [`ParseError`]: a structural fault such as unbalanced nesting
//! - [`Error`]: a (de)serialization fault such as a type mismatch
//!
//! Each layer wraps the one below it explicitly and keeps its location.
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Proper error propagation with `Result` types
//! - Nesting depth is bounded by [`ParseConfig::max_depth`], so hostile input
//!   cannot exhaust the stack

pub mod de;
pub mod emit;
pub mod error;
pub mod integer;
pub mod map;
pub mod options;
pub mod parser;
pub mod ser;
pub mod tokenizer;
pub mod value;
pub mod writer;

pub use de::{Deserializer, EventSource, ValueEvents};
pub use emit::{Emitter, ValueBuilder};
pub use error::{Error, ErrorKind, ParseError, Result, TokenizerError};
pub use integer::Integer;
pub use map::{List, Map};
pub use options::{KeywordEscape, OutputMode, ParseConfig, WriteConfig};
pub use parser::{Event, EventKind, Parser};
pub use ser::Serializer;
pub use value::{Annotated, Named, OwnedValue, StructContents, Value};
pub use writer::Writer;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io;
use tracing::debug;

/// Serialize any `T: Serialize` to a compact RSN string.
///
/// # Examples
///
/// ```rust
/// use serde_rsn::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let point = Point { x: 1, y: 2 };
/// assert_eq!(to_string(&point).unwrap(), "Point{x:1,y:2}");
/// ```
///
/// # Errors
///
/// Returns an error if the value's `Serialize` implementation fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_config(value, &WriteConfig::default())
}

/// Serialize any `T: Serialize` to a pretty-printed RSN string.
///
/// Every list element and map entry goes on its own line, indented by two
/// spaces per level, with a trailing comma.
///
/// # Examples
///
/// ```rust
/// use serde_rsn::to_string_pretty;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let point = Point { x: 1, y: 2 };
/// assert_eq!(to_string_pretty(&point).unwrap(), "Point {\n  x: 1,\n  y: 2,\n}");
/// ```
///
/// # Errors
///
/// Returns an error if the value's `Serialize` implementation fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_pretty<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_config(value, &WriteConfig::pretty())
}

/// Serialize any `T: Serialize` to an RSN string with a custom layout.
///
/// # Examples
///
/// ```rust
/// use serde_rsn::{to_string_with_config, WriteConfig};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let config = WriteConfig::new().with_anonymous_structs(true);
/// assert_eq!(to_string_with_config(&Point { x: 1, y: 2 }, &config).unwrap(), "{x:1,y:2}");
///
/// let config = WriteConfig::new().with_implicit_map_at_root(true);
/// assert_eq!(to_string_with_config(&Point { x: 1, y: 2 }, &config).unwrap(), "x:1\ny:2");
/// ```
///
/// # Errors
///
/// Returns an error if the value's `Serialize` implementation fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_config<T>(value: &T, config: &WriteConfig) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let mut serializer = Serializer::with_config(String::new(), config);
    value.serialize(&mut serializer)?;
    serializer.into_inner().finish()
}

/// Convert any `T: Serialize` to a [`Value`].
///
/// Struct and variant names are kept, so the value writes back as the same
/// text [`to_string`] produces.
///
/// # Examples
///
/// ```rust
/// use serde_rsn::{to_value, Value};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value: Value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(value.as_named().map(|named| &*named.name), Some("Point"));
/// ```
///
/// # Errors
///
/// Returns an error if the value's `Serialize` implementation fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<OwnedValue>
where
    T: ?Sized + Serialize,
{
    let mut serializer = Serializer::new(ValueBuilder::new());
    value.serialize(&mut serializer)?;
    serializer.into_inner().finish()
}

/// Serialize any `T: Serialize` to a writer as compact RSN.
///
/// # Examples
///
/// ```rust
/// use serde_rsn::to_writer;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &(1, "two")).unwrap();
/// assert_eq!(buffer, br#"(1,"two")"#);
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_config(writer, value, &WriteConfig::default())
}

/// Serialize any `T: Serialize` to a writer with a custom layout.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_config<W, T>(mut writer: W, value: &T, config: &WriteConfig) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let rsn = to_string_with_config(value, config)?;
    writer
        .write_all(rsn.as_bytes())
        .map_err(|e| Error::io(&e))?;
    Ok(())
}

/// Deserialize an instance of type `T` from a string of RSN text.
///
/// Anything but comments after the value is rejected.
///
/// # Examples
///
/// ```rust
/// use serde_rsn::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("Point { x: 1, y: 2 } // origin-ish").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the input is not valid RSN or cannot be deserialized
/// to type `T`. The error's location points into `s`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<'a, T>(s: &'a str) -> Result<T>
where
    T: Deserialize<'a>,
{
    from_str_with_config(s, &ParseConfig::default())
}

/// Deserialize an instance of type `T` from RSN text with custom parse settings.
///
/// # Examples
///
/// ```rust
/// use serde_rsn::{from_str_with_config, ErrorKind, ParseConfig};
/// use std::collections::HashMap;
///
/// let config = ParseConfig::strict();
/// let result = from_str_with_config::<HashMap<String, u8>>("{a: 1, a: 2}", &config);
/// assert!(matches!(result.unwrap_err().kind, ErrorKind::DuplicateKeyRejected(_)));
///
/// let config = ParseConfig::new().with_implicit_map_at_root(true);
/// let map: HashMap<String, u8> = from_str_with_config("a: 1\nb: 2", &config).unwrap();
/// assert_eq!(map["b"], 2);
/// ```
///
/// # Errors
///
/// Returns an error if the input is not valid RSN under `config` or cannot be
/// deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_config<'a, T>(s: &'a str, config: &ParseConfig) -> Result<T>
where
    T: Deserialize<'a>,
{
    debug!(len = s.len(), "deserializing RSN text");
    let mut deserializer = Deserializer::from_str_with_config(s, config);
    let value = T::deserialize(&mut deserializer).map_err(|err| deserializer.locate(err))?;
    deserializer.end()?;
    Ok(value)
}

/// Deserialize an instance of type `T` from an I/O stream of RSN.
///
/// # Examples
///
/// ```rust
/// use serde_rsn::from_reader;
/// use std::io::Cursor;
///
/// let cursor = Cursor::new(b"[1, 2, 3]");
/// let numbers: Vec<u8> = from_reader(cursor).unwrap();
/// assert_eq!(numbers, vec![1, 2, 3]);
/// ```
///
/// # Errors
///
/// Returns an error if reading from the reader fails, the input is not valid
/// RSN, or the data cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e))?;
    from_str(&string)
}

/// Deserialize an instance of type `T` from bytes of RSN text.
///
/// # Examples
///
/// ```rust
/// use serde_rsn::from_slice;
///
/// let pair: (u8, char) = from_slice(b"(7, 'x')").unwrap();
/// assert_eq!(pair, (7, 'x'));
/// ```
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, not valid RSN, or
/// cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<'a, T>(v: &'a [u8]) -> Result<T>
where
    T: Deserialize<'a>,
{
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e).at(e.valid_up_to()..v.len()))?;
    from_str(s)
}

/// Deserialize an instance of type `T` from a [`Value`].
///
/// # Examples
///
/// ```rust
/// use serde_rsn::{from_value, parse};
///
/// let value = parse("[Some(1), None]").unwrap();
/// let items: Vec<Option<u8>> = from_value(&value).unwrap();
/// assert_eq!(items, vec![Some(1), None]);
/// ```
///
/// # Errors
///
/// Returns an error if the value does not have the shape `T` expects.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<'de, T>(value: &'de Value<'_>) -> Result<T>
where
    T: Deserialize<'de>,
{
    let mut deserializer = Deserializer::from_value(value);
    let value = T::deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(value)
}

/// Parse RSN text into a [`Value`] that borrows from `s`.
///
/// # Examples
///
/// ```rust
/// use serde_rsn::{parse, Value};
///
/// let value = parse("{a: 1, b: [2, 3]}").unwrap();
/// let map = value.as_map().unwrap();
/// assert_eq!(map.get(&Value::identifier("a")), Some(&Value::from(1_u64)));
/// ```
///
/// # Errors
///
/// Returns the first tokenizer or parse error, wrapped in [`ErrorKind::Parse`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse(s: &str) -> Result<Value<'_>> {
    debug!(len = s.len(), "parsing RSN value");
    Value::parse(s, &ParseConfig::default()).map_err(Error::from_parse)
}
