//! Dynamic value representation for RSN data.
//!
//! This module provides the [`Value`] enum, a tree that can hold any RSN
//! document. It's useful for working with RSN data when the structure isn't
//! known at compile time, or when names, tuples and attributes must survive
//! that a typed deserialization would discard.
//!
//! ## Core Types
//!
//! - [`Value`]: Any RSN value, borrowing text from the source where possible
//! - [`OwnedValue`]: A `Value<'static>` that owns all of its text
//! - [`Named`]: A named tuple, named map, or bare name such as `Point { x: 1 }`
//! - [`Annotated`]: A value preceded by one or more `#[attribute]`s
//!
//! ## Usage Patterns
//!
//! ### Parsing
//!
//! ```rust
//! use serde_rsn::{ParseConfig, Value};
//!
//! let value = Value::parse("Point { x: 1, y: -2 }", &ParseConfig::default()).unwrap();
//! let point = value.as_named().unwrap();
//! assert_eq!(point.name, "Point");
//! assert_eq!(point.contents.as_map().unwrap().len(), 2);
//! ```
//!
//! ### Writing
//!
//! `Display` writes compact RSN; the alternate form (`{:#}`) writes pretty RSN.
//!
//! ```rust
//! use serde_rsn::Value;
//!
//! let value: Value = "[1, 2]".parse().unwrap();
//! assert_eq!(value.to_string(), "[1,2]");
//! assert_eq!(format!("{value:#}"), "[\n  1,\n  2,\n]");
//! ```
//!
//! ### Converting from Rust Types
//!
//! ```rust
//! use serde_rsn::{to_value, Value};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Point { x: i32, y: i32 }
//!
//! let value: Value = to_value(&Point { x: 10, y: 20 }).unwrap();
//! assert_eq!(value.to_string(), "Point{x:10,y:20}");
//! ```
//!
//! ## Round trips
//!
//! Writing a value and parsing the output yields an equal value, with two
//! normalizations: an empty [`Value::Tuple`] is written as `()` and reads back
//! as [`Value::Unit`], and a [`Named`] value with [`StructContents::Unit`] is
//! written as a bare name and reads back as [`Value::Identifier`].

use crate::error::{Expected, Found, ParseError, ParseErrorKind};
use crate::parser::{Attribute, EventKind, NamedKind, Parser, Primitive};
use crate::{Integer, List, Map, ParseConfig, WriteConfig, Writer};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::mem;
use std::str::FromStr;
use thiserror::Error;
use tracing::trace;

/// Any RSN value.
///
/// Text is borrowed from the parsed source when no unescaping was needed.
/// Use [`Value::into_owned`] to detach a value from its source.
///
/// # Examples
///
/// ```rust
/// use serde_rsn::{Integer, Value};
///
/// let value: Value = r#"{name: "rsn", tags: [a, b]}"#.parse().unwrap();
/// let map = value.as_map().unwrap();
/// assert_eq!(map.get_by_name("name").and_then(Value::as_str), Some("rsn"));
///
/// let tags = map.get_by_name("tags").and_then(Value::as_list).unwrap();
/// assert_eq!(tags[0], Value::identifier("a"));
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value<'a> {
    #[default]
    Unit,
    Bool(bool),
    Integer(Integer),
    Float(f64),
    Char(char),
    String(Cow<'a, str>),
    Bytes(Cow<'a, [u8]>),
    Identifier(Cow<'a, str>),
    List(List<'a>),
    Tuple(List<'a>),
    Map(Map<'a>),
    Named(Named<'a>),
    Annotated(Annotated<'a>),
}

/// A [`Value`] that owns all of its text.
pub type OwnedValue = Value<'static>;

/// A named value: `Name`, `Name(..)` or `Name { .. }`.
#[derive(Clone, Debug, PartialEq)]
pub struct Named<'a> {
    pub name: Cow<'a, str>,
    pub contents: StructContents<'a>,
}

impl<'a> Named<'a> {
    pub fn new(name: impl Into<Cow<'a, str>>, contents: StructContents<'a>) -> Self {
        Named {
            name: name.into(),
            contents,
        }
    }

    #[must_use]
    pub fn into_owned(self) -> Named<'static> {
        Named {
            name: Cow::Owned(self.name.into_owned()),
            contents: self.contents.into_owned(),
        }
    }
}

/// The body of a [`Named`] value.
#[derive(Clone, Debug, PartialEq)]
pub enum StructContents<'a> {
    Unit,
    Tuple(List<'a>),
    Map(Map<'a>),
}

impl<'a> StructContents<'a> {
    #[must_use]
    pub const fn as_list(&self) -> Option<&List<'a>> {
        match self {
            StructContents::Tuple(list) => Some(list),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_map(&self) -> Option<&Map<'a>> {
        match self {
            StructContents::Map(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_owned(self) -> StructContents<'static> {
        match self {
            StructContents::Unit => StructContents::Unit,
            StructContents::Tuple(list) => StructContents::Tuple(list.into_owned()),
            StructContents::Map(map) => StructContents::Map(map.into_owned()),
        }
    }
}

/// A value with the attributes written before it.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotated<'a> {
    pub attributes: Vec<Attribute<'a>>,
    pub value: Box<Value<'a>>,
}

impl<'a> Value<'a> {
    /// Creates a bare identifier such as a unit variant name.
    pub fn identifier(name: impl Into<Cow<'a, str>>) -> Self {
        Value::Identifier(name.into())
    }

    /// Wraps `value` in [`Value::Annotated`] unless `attributes` is empty.
    #[must_use]
    pub fn annotate(attributes: Vec<Attribute<'a>>, value: Value<'a>) -> Self {
        if attributes.is_empty() {
            value
        } else {
            Value::Annotated(Annotated {
                attributes,
                value: Box::new(value),
            })
        }
    }

    /// Parses a complete document.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`] in the source.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_rsn::{ParseConfig, Value};
    ///
    /// let value = Value::parse("(1, 'x', b\"raw\")", &ParseConfig::default()).unwrap();
    /// assert_eq!(value.as_tuple().map(|tuple| tuple.len()), Some(3));
    ///
    /// assert!(Value::parse("[1, 2", &ParseConfig::default()).is_err());
    /// ```
    pub fn parse(source: &'a str, config: &ParseConfig) -> Result<Self, ParseError> {
        let mut parser = Parser::new(source, config.clone());
        Self::build(&mut parser)
    }

    /// Pulls one complete value from `parser`.
    ///
    /// Comments are skipped. Unless the parser allows trailing data, the rest
    /// of the input must be empty.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`] the parser yields.
    pub fn build(parser: &mut Parser<'a>) -> Result<Self, ParseError> {
        let mut tree = TreeBuilder::new();
        while !tree.is_complete() {
            let Some(event) = parser.next() else { break };
            let event = event?;
            let location = event.location.clone();
            tree.event(event.kind)
                .map_err(|err| ParseError::new(err.parse_kind(), location))?;
        }
        for event in parser.by_ref() {
            let event = event?;
            if !matches!(event.kind, EventKind::Comment(_)) {
                return Err(ParseError::new(ParseErrorKind::TrailingData, event.location));
            }
        }
        let end = parser.source().len();
        tree.finish()
            .map_err(|err| ParseError::new(err.parse_kind(), end..end))
    }

    /// Builds a value from any serializable type.
    ///
    /// # Errors
    ///
    /// Fails if `value`'s `Serialize` implementation reports an error.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> crate::Result<OwnedValue> {
        crate::to_value(value)
    }

    /// Deserializes a typed value from this tree.
    ///
    /// # Errors
    ///
    /// Fails if the tree does not match the shape `T` expects.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_rsn::Value;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize, Debug, PartialEq)]
    /// struct Point { x: i32, y: i32 }
    ///
    /// let value: Value = "Point { x: 1, y: 2 }".parse().unwrap();
    /// let point: Point = value.to_deserialize().unwrap();
    /// assert_eq!(point, Point { x: 1, y: 2 });
    /// ```
    pub fn to_deserialize<'de, T: Deserialize<'de>>(&'de self) -> crate::Result<T> {
        crate::from_value(self)
    }

    /// Writes the value as RSN text with the given layout.
    ///
    /// # Errors
    ///
    /// Writing into a `String` does not fail; the `Result` mirrors
    /// [`crate::writer::to_string`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_rsn::{Value, WriteConfig};
    ///
    /// let value: Value = "{a: [1]}".parse().unwrap();
    /// let text = value.to_string_with_config(&WriteConfig::pretty()).unwrap();
    /// assert_eq!(text, "{\n  a: [\n    1,\n  ],\n}");
    /// ```
    pub fn to_string_with_config(&self, config: &WriteConfig) -> crate::Result<String> {
        crate::writer::to_string(self, config)
    }

    /// Copies any borrowed text so the value no longer borrows its source.
    #[must_use]
    pub fn into_owned(self) -> OwnedValue {
        match self {
            Value::Unit => Value::Unit,
            Value::Bool(value) => Value::Bool(value),
            Value::Integer(value) => Value::Integer(value),
            Value::Float(value) => Value::Float(value),
            Value::Char(value) => Value::Char(value),
            Value::String(value) => Value::String(Cow::Owned(value.into_owned())),
            Value::Bytes(value) => Value::Bytes(Cow::Owned(value.into_owned())),
            Value::Identifier(value) => Value::Identifier(Cow::Owned(value.into_owned())),
            Value::List(list) => Value::List(list.into_owned()),
            Value::Tuple(list) => Value::Tuple(list.into_owned()),
            Value::Map(map) => Value::Map(map.into_owned()),
            Value::Named(named) => Value::Named(named.into_owned()),
            Value::Annotated(annotated) => Value::Annotated(Annotated {
                attributes: annotated
                    .attributes
                    .into_iter()
                    .map(Attribute::into_owned)
                    .collect(),
                value: Box::new(annotated.value.into_owned()),
            }),
        }
    }

    /// The value with any attributes stripped.
    #[must_use]
    pub fn unannotated(&self) -> &Value<'a> {
        let mut value = self;
        while let Value::Annotated(annotated) = value {
            value = &annotated.value;
        }
        value
    }

    /// The attributes written directly before this value.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute<'a>] {
        match self {
            Value::Annotated(annotated) => &annotated.attributes,
            _ => &[],
        }
    }

    #[must_use]
    pub fn is_unit(&self) -> bool {
        matches!(self.unannotated(), Value::Unit)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.unannotated() {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<&Integer> {
        match self.unannotated() {
            Value::Integer(value) => Some(value),
            _ => None,
        }
    }

    /// Returns floats as-is and integers converted to `f64`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self.unannotated() {
            Value::Float(value) => Some(*value),
            Value::Integer(value) => Some(value.to_f64()),
            _ => None,
        }
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_f32(&self) -> Option<f32> {
        self.as_f64().map(|value| value as f32)
    }

    #[must_use]
    pub fn as_char(&self) -> Option<char> {
        match self.unannotated() {
            Value::Char(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the text of a string or identifier.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self.unannotated() {
            Value::String(value) | Value::Identifier(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the contents of a byte string, or the UTF-8 bytes of a string.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self.unannotated() {
            Value::Bytes(value) => Some(value),
            Value::String(value) => Some(value.as_bytes()),
            _ => None,
        }
    }

    /// Returns the text of an identifier or string, the two forms a field
    /// name may take.
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        self.as_str()
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&List<'a>> {
        match self.unannotated() {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_tuple(&self) -> Option<&List<'a>> {
        match self.unannotated() {
            Value::Tuple(list) => Some(list),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&Map<'a>> {
        match self.unannotated() {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_named(&self) -> Option<&Named<'a>> {
        match self.unannotated() {
            Value::Named(named) => Some(named),
            _ => None,
        }
    }
}

macro_rules! impl_integer_accessors {
    ($($as_fn:ident => $ty:ident,)+) => {
        impl Value<'_> {
            $(
                #[doc = concat!(
                    "Returns the value as `", stringify!($ty),
                    "` if it is an integer, or a float with no fractional part, that fits."
                )]
                #[must_use]
                pub fn $as_fn(&self) -> Option<$ty> {
                    match self.unannotated() {
                        Value::Integer(value) => value.$as_fn(),
                        Value::Float(value) => integral(*value).and_then(|value| value.$as_fn()),
                        _ => None,
                    }
                }
            )+
        }
    };
}

impl_integer_accessors! {
    as_u8 => u8,
    as_u16 => u16,
    as_u32 => u32,
    as_u64 => u64,
    as_u128 => u128,
    as_usize => usize,
    as_i8 => i8,
    as_i16 => i16,
    as_i32 => i32,
    as_i64 => i64,
    as_i128 => i128,
    as_isize => isize,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn integral(value: f64) -> Option<Integer> {
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    if value >= 0.0 && value < u128::MAX as f64 {
        Some(Integer::U128(value as u128))
    } else if value < 0.0 && value >= i128::MIN as f64 {
        Some(Integer::I128(value as i128))
    } else {
        None
    }
}

impl<'a> From<Primitive<'a>> for Value<'a> {
    fn from(primitive: Primitive<'a>) -> Self {
        match primitive {
            Primitive::Unit => Value::Unit,
            Primitive::Bool(value) => Value::Bool(value),
            Primitive::Integer(value) => Value::Integer(value),
            Primitive::Float(value) => Value::Float(value),
            Primitive::Char(value) => Value::Char(value),
            Primitive::String(value) => Value::String(value),
            Primitive::Bytes(value) => Value::Bytes(value),
            Primitive::Identifier(value) => Value::Identifier(value),
        }
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Value<'_> {
                fn from(value: $ty) -> Self {
                    Value::Integer(Integer::from(value))
                }
            }
        )+
    };
}

impl_from_integer!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

impl From<Integer> for Value<'_> {
    fn from(value: Integer) -> Self {
        Value::Integer(value)
    }
}

impl From<bool> for Value<'_> {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f32> for Value<'_> {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value<'_> {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<char> for Value<'_> {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(value: &'a str) -> Self {
        Value::String(Cow::Borrowed(value))
    }
}

impl From<String> for Value<'_> {
    fn from(value: String) -> Self {
        Value::String(Cow::Owned(value))
    }
}

impl<'a> From<Vec<Value<'a>>> for Value<'a> {
    fn from(values: Vec<Value<'a>>) -> Self {
        Value::List(List::from(values))
    }
}

impl<'a> From<Map<'a>> for Value<'a> {
    fn from(map: Map<'a>) -> Self {
        Value::Map(map)
    }
}

impl<'a> From<Named<'a>> for Value<'a> {
    fn from(named: Named<'a>) -> Self {
        Value::Named(named)
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = if f.alternate() {
            WriteConfig::pretty()
        } else {
            WriteConfig::default()
        };
        Writer::new(f, &config)
            .write_value(self)
            .map_err(|_| fmt::Error)
    }
}

impl FromStr for Value<'static> {
    type Err = ParseError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Value::parse(source, &ParseConfig::default()).map(Value::into_owned)
    }
}

/// Serializes the tree for use with other serde formats.
///
/// Identifiers become strings, and named values become single-entry maps
/// from the name to the contents. Attributes are dropped. Use
/// [`Display`](fmt::Display) or a [`Writer`] to produce RSN text.
impl Serialize for Value<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::{Error, SerializeMap, SerializeTuple};

        match self {
            Value::Unit => serializer.serialize_unit(),
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Integer(integer) => match integer {
                Integer::U8(v) => serializer.serialize_u8(*v),
                Integer::U16(v) => serializer.serialize_u16(*v),
                Integer::U32(v) => serializer.serialize_u32(*v),
                Integer::U64(v) => serializer.serialize_u64(*v),
                Integer::U128(v) => serializer.serialize_u128(*v),
                Integer::Usize(v) => serializer.serialize_u64(*v as u64),
                Integer::I8(v) => serializer.serialize_i8(*v),
                Integer::I16(v) => serializer.serialize_i16(*v),
                Integer::I32(v) => serializer.serialize_i32(*v),
                Integer::I64(v) => serializer.serialize_i64(*v),
                Integer::I128(v) => serializer.serialize_i128(*v),
                Integer::Isize(v) => serializer.serialize_i64(*v as i64),
                Integer::Big(v) => Err(S::Error::custom(format!(
                    "integer {v} does not fit in 128 bits"
                ))),
            },
            Value::Float(value) => serializer.serialize_f64(*value),
            Value::Char(value) => serializer.serialize_char(*value),
            Value::String(value) | Value::Identifier(value) => serializer.serialize_str(value),
            Value::Bytes(value) => serializer.serialize_bytes(value),
            Value::List(list) => list.serialize(serializer),
            Value::Tuple(list) => {
                let mut tuple = serializer.serialize_tuple(list.len())?;
                for element in list {
                    tuple.serialize_element(element)?;
                }
                tuple.end()
            }
            Value::Map(map) => map.serialize(serializer),
            Value::Named(named) => match &named.contents {
                StructContents::Unit => serializer.serialize_str(&named.name),
                StructContents::Tuple(list) => {
                    let mut out = serializer.serialize_map(Some(1))?;
                    out.serialize_entry(&*named.name, list)?;
                    out.end()
                }
                StructContents::Map(map) => {
                    let mut out = serializer.serialize_map(Some(1))?;
                    out.serialize_entry(&*named.name, map)?;
                    out.end()
                }
            },
            Value::Annotated(annotated) => annotated.value.serialize(serializer),
        }
    }
}

impl Serialize for List<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self)
    }
}

impl Serialize for Map<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.iter().map(|(key, value)| (key, value)))
    }
}

impl<'de> Deserialize<'de> for Value<'de> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        macro_rules! visit_integer {
            ($($method:ident($ty:ty);)+) => {
                $(
                    fn $method<E>(self, value: $ty) -> Result<Self::Value, E> {
                        Ok(Value::Integer(Integer::from(value)))
                    }
                )+
            };
        }

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value<'de>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid RSN value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(Value::Bool(value))
            }

            visit_integer! {
                visit_i8(i8);
                visit_i16(i16);
                visit_i32(i32);
                visit_i64(i64);
                visit_i128(i128);
                visit_u8(u8);
                visit_u16(u16);
                visit_u32(u32);
                visit_u64(u64);
                visit_u128(u128);
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(Value::Float(value))
            }

            fn visit_char<E>(self, value: char) -> Result<Self::Value, E> {
                Ok(Value::Char(value))
            }

            fn visit_borrowed_str<E>(self, value: &'de str) -> Result<Self::Value, E> {
                Ok(Value::String(Cow::Borrowed(value)))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Value::String(Cow::Owned(value.to_owned())))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(Value::String(Cow::Owned(value)))
            }

            fn visit_borrowed_bytes<E>(self, value: &'de [u8]) -> Result<Self::Value, E> {
                Ok(Value::Bytes(Cow::Borrowed(value)))
            }

            fn visit_bytes<E>(self, value: &[u8]) -> Result<Self::Value, E> {
                Ok(Value::Bytes(Cow::Owned(value.to_vec())))
            }

            fn visit_byte_buf<E>(self, value: Vec<u8>) -> Result<Self::Value, E> {
                Ok(Value::Bytes(Cow::Owned(value)))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Unit)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(Value::identifier("None"))
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                let inner = Value::deserialize(deserializer)?;
                Ok(Value::Named(Named::new(
                    "Some",
                    StructContents::Tuple(List::from(vec![inner])),
                )))
            }

            fn visit_newtype_struct<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Value::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut list = List::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(element) = seq.next_element()? {
                    list.push(element);
                }
                Ok(Value::List(list))
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut map = Map::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry()? {
                    map.push(key, value);
                }
                Ok(Value::Map(map))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

/// A container being filled by a [`TreeBuilder`].
#[derive(Debug)]
pub(crate) enum Container<'a> {
    List,
    Tuple,
    Map,
    Named { name: Cow<'a, str>, kind: NamedKind },
}

#[derive(Debug)]
struct Partial<'a> {
    container: Container<'a>,
    attributes: Vec<Attribute<'a>>,
    items: Vec<Value<'a>>,
}

/// Misuse of a [`TreeBuilder`]: values that do not form exactly one tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub(crate) enum BuildError {
    #[error("no value was emitted")]
    Empty,
    #[error("{0} container(s) left open")]
    Unclosed(usize),
    #[error("container closed while none is open")]
    NotOpen,
    #[error("map key without a value")]
    MissingValue,
    #[error("more than one root value")]
    SecondRoot,
}

impl BuildError {
    /// The parse error describing the same malformation in source text.
    fn parse_kind(self) -> ParseErrorKind {
        match self {
            BuildError::Empty => ParseErrorKind::EmptyInputWhereValueExpected,
            BuildError::Unclosed(_) | BuildError::NotOpen => ParseErrorKind::UnbalancedNesting {
                expected: None,
                found: None,
                opened_at: None,
            },
            BuildError::MissingValue => ParseErrorKind::UnexpectedToken {
                expected: &[Expected::Value],
                found: Found::EndOfInput,
            },
            BuildError::SecondRoot => ParseErrorKind::TrailingData,
        }
    }
}

/// Assembles a [`Value`] from a depth-first walk with an explicit stack.
#[derive(Debug, Default)]
pub(crate) struct TreeBuilder<'a> {
    stack: Vec<Partial<'a>>,
    attributes: Vec<Attribute<'a>>,
    root: Option<Value<'a>>,
}

impl<'a> TreeBuilder<'a> {
    pub(crate) fn new() -> Self {
        TreeBuilder {
            stack: Vec::new(),
            attributes: Vec::new(),
            root: None,
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.root.is_some()
    }

    pub(crate) fn finish(self) -> Result<Value<'a>, BuildError> {
        if !self.stack.is_empty() {
            return Err(BuildError::Unclosed(self.stack.len()));
        }
        self.root.ok_or(BuildError::Empty)
    }

    pub(crate) fn event(&mut self, kind: EventKind<'a>) -> Result<(), BuildError> {
        match kind {
            EventKind::Primitive(primitive) => self.value(Value::from(primitive)),
            EventKind::StartList => self.begin(Container::List),
            EventKind::StartTuple => self.begin(Container::Tuple),
            EventKind::StartMap => self.begin(Container::Map),
            EventKind::StartNamed { name, kind } => self.begin(Container::Named {
                name: Cow::Borrowed(name.name),
                kind,
            }),
            EventKind::EndList | EventKind::EndTuple | EventKind::EndMap | EventKind::EndNamed => {
                self.end()
            }
            EventKind::Attribute(attribute) => {
                self.attribute(attribute);
                Ok(())
            }
            EventKind::MapKey | EventKind::MapValue | EventKind::Comment(_) => Ok(()),
        }
    }

    pub(crate) fn attribute(&mut self, attribute: Attribute<'a>) {
        self.attributes.push(attribute);
    }

    pub(crate) fn value(&mut self, value: Value<'a>) -> Result<(), BuildError> {
        let value = Value::annotate(mem::take(&mut self.attributes), value);
        match self.stack.last_mut() {
            Some(partial) => partial.items.push(value),
            None if self.root.is_none() => self.root = Some(value),
            None => return Err(BuildError::SecondRoot),
        }
        Ok(())
    }

    pub(crate) fn begin(&mut self, container: Container<'a>) -> Result<(), BuildError> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err(BuildError::SecondRoot);
        }
        trace!(depth = self.stack.len() + 1, ?container, "building container");
        self.stack.push(Partial {
            container,
            attributes: mem::take(&mut self.attributes),
            items: Vec::new(),
        });
        Ok(())
    }

    pub(crate) fn end(&mut self) -> Result<(), BuildError> {
        let partial = self.stack.pop().ok_or(BuildError::NotOpen)?;
        let value = match partial.container {
            Container::List => Value::List(List::from(partial.items)),
            Container::Tuple if partial.items.is_empty() => Value::Unit,
            Container::Tuple => Value::Tuple(List::from(partial.items)),
            Container::Map => Value::Map(pair_up(partial.items)?),
            Container::Named { name, kind } => {
                let contents = match kind {
                    NamedKind::Tuple => StructContents::Tuple(List::from(partial.items)),
                    NamedKind::Map => StructContents::Map(pair_up(partial.items)?),
                };
                Value::Named(Named { name, contents })
            }
        };
        self.attributes = partial.attributes;
        self.value(value)
    }
}

fn pair_up(items: Vec<Value<'_>>) -> Result<Map<'_>, BuildError> {
    if items.len() % 2 != 0 {
        return Err(BuildError::MissingValue);
    }
    let mut map = Map::with_capacity(items.len() / 2);
    let mut items = items.into_iter();
    while let (Some(key), Some(value)) = (items.next(), items.next()) {
        map.push(key, value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Value<'_> {
        Value::parse(source, &ParseConfig::default()).unwrap()
    }

    #[test]
    fn test_parse_named_map() {
        let value = parse("Point { x: 1, y: 2 }");
        let named = value.as_named().unwrap();
        assert_eq!(named.name, "Point");
        let map = named.contents.as_map().unwrap();
        assert_eq!(map.get_by_name("x"), Some(&Value::from(1_u64)));
        assert_eq!(map.get_by_name("y"), Some(&Value::from(2_u64)));
    }

    #[test]
    fn test_parse_borrows_unescaped_text() {
        let value = parse(r#"["plain", "esc\n"]"#);
        let list = value.as_list().unwrap();
        assert!(matches!(&list[0], Value::String(Cow::Borrowed("plain"))));
        assert!(matches!(&list[1], Value::String(Cow::Owned(text)) if text == "esc\n"));
    }

    #[test]
    fn test_duplicate_keys_preserved() {
        let value = parse("{a: 1, a: 2}");
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get_by_name("a"), Some(&Value::from(2_u64)));
    }

    #[test]
    fn test_attributes_are_kept() {
        let value = parse("#[deprecated] #[since(2)] Old(1)");
        assert_eq!(value.attributes().len(), 2);
        assert_eq!(value.attributes()[1].args, vec![Primitive::Integer(Integer::U64(2))]);
        assert_eq!(value.as_named().map(|named| &*named.name), Some("Old"));
    }

    #[test]
    fn test_display_compact_and_pretty() {
        let value = parse("Config { name: \"x\", sizes: [1, 2], flag: true }");
        assert_eq!(value.to_string(), r#"Config{name:"x",sizes:[1,2],flag:true}"#);
        assert_eq!(
            format!("{value:#}"),
            "Config {\n  name: \"x\",\n  sizes: [\n    1,\n    2,\n  ],\n  flag: true,\n}"
        );
    }

    #[test]
    fn test_round_trip_through_text() {
        let source = "{ids: [1u8, -2, 3.5, 'c', b\"\\x00\"], unit: (), t: (1, ()), \
                      e: Variant(Some(None)), #[a] k: r#true}";
        let value = parse(source);
        let written = value.to_string();
        assert_eq!(parse(&written), value);
    }

    #[test]
    fn test_from_str_owns_text() {
        let value: OwnedValue = {
            let source = String::from("[\"temporary\"]");
            source.parse().unwrap()
        };
        assert_eq!(value.as_list().unwrap()[0].as_str(), Some("temporary"));
    }

    #[test]
    fn test_trailing_data_rejected() {
        let err = Value::parse("1 2", &ParseConfig::default()).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TrailingData);
        let value = Value::parse(
            "1 // done",
            &ParseConfig::default().with_include_comments(true),
        )
        .unwrap();
        assert_eq!(value, Value::from(1_u64));
    }

    #[test]
    fn test_accessors_look_through_annotations() {
        let value = parse("#[note] 42");
        assert_eq!(value.as_u64(), Some(42));
        assert_eq!(value.as_f64(), Some(42.0));
        assert!(value.as_str().is_none());
        assert_eq!(parse("r#true").as_name(), Some("true"));
        assert_eq!(parse("Red").as_str(), Some("Red"));
        assert_eq!(parse("\"ab\"").as_bytes(), Some(&b"ab"[..]));
    }

    #[test]
    fn test_integer_accessors_narrow() {
        assert_eq!(parse("200").as_u8(), Some(200));
        assert_eq!(parse("300").as_u8(), None);
        assert_eq!(parse("-3").as_i8(), Some(-3));
        assert_eq!(parse("-3").as_u32(), None);
        assert_eq!(parse("4.0").as_u16(), Some(4));
        assert_eq!(parse("4.5").as_u16(), None);
        assert_eq!(parse("NaN").as_i64(), None);
        assert_eq!(parse("\"4\"").as_i64(), None);
        assert_eq!(parse("1.5").as_f32(), Some(1.5));
    }

    #[test]
    fn test_serialize_for_other_formats() {
        let value = parse("{name: Point(1, 2), tag: Red, data: [true]}");
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"name":{"Point":[1,2]},"tag":"Red","data":[true]}"#);
    }

    #[test]
    fn test_deserialize_from_other_formats() {
        let value: Value = serde_json::from_str(r#"{"a": [1, null, "x"]}"#).unwrap();
        let list = value.as_map().unwrap().get_by_name("a").and_then(Value::as_list).unwrap();
        assert_eq!(list[0], Value::from(1_u64));
        assert_eq!(list[1], Value::Unit);
        assert_eq!(list[2].as_str(), Some("x"));
    }

    #[test]
    fn test_tree_builder_rejects_malformed_walks() {
        let mut tree = TreeBuilder::new();
        assert_eq!(tree.end(), Err(BuildError::NotOpen));
        tree.begin(Container::Map).unwrap();
        tree.value(Value::Unit).unwrap();
        assert_eq!(tree.end(), Err(BuildError::MissingValue));
        assert_eq!(TreeBuilder::new().finish(), Err(BuildError::Empty));
    }
}
