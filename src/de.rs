//! RSN deserialization.
//!
//! This module provides the [`Deserializer`], which pulls [`Event`]s from an
//! [`EventSource`] and feeds them to serde visitors. Two sources exist: the
//! text [`Parser`] and [`ValueEvents`], which walks an in-memory [`Value`].
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use serde_rsn::from_str;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Data { x: i32, y: i32 }
//!
//! let data: Data = from_str("Data { x: 1, y: 2 }").unwrap();
//! assert_eq!(data, Data { x: 1, y: 2 });
//!
//! // The struct name is optional
//! let data: Data = from_str("{ x: 1, y: 2 }").unwrap();
//! assert_eq!(data, Data { x: 1, y: 2 });
//! ```
//!
//! ## Options
//!
//! `Option<T>` accepts `None`, `Some(value)`, or a bare `value`:
//!
//! ```rust
//! use serde_rsn::from_str;
//!
//! let values: Vec<Option<u8>> = from_str("[None, Some(1), 2]").unwrap();
//! assert_eq!(values, vec![None, Some(1), Some(2)]);
//! ```

use crate::error::{ErrorKind, ParseError, ParseErrorKind};
use crate::parser::{Attribute, Event, EventKind, Name, NamedKind, Parser, Primitive};
use crate::value::StructContents;
use crate::{Error, Integer, ParseConfig, Result, Value};
use indexmap::IndexSet;
use serde::de::value::{BorrowedStrDeserializer, SeqDeserializer as EmptySeq};
use serde::de::{self, DeserializeSeed, IntoDeserializer, Visitor};
use std::borrow::Cow;
use std::fmt;
use std::ops::Range;
use std::slice;

/// A stream of events the [`Deserializer`] can consume.
pub trait EventSource<'de> {
    /// Whether event locations are byte ranges in a source text.
    const LOCATED: bool = true;

    /// Returns the next event, or `None` once the stream is exhausted.
    fn next_event(&mut self) -> Option<Result<Event<'de>>>;
}

impl<'de> EventSource<'de> for Parser<'de> {
    fn next_event(&mut self) -> Option<Result<Event<'de>>> {
        Iterator::next(self).map(|event| event.map_err(Error::from_parse))
    }
}

enum Pending<'a> {
    Value(&'a Value<'a>),
    Attribute(&'a Attribute<'a>),
    Items(slice::Iter<'a, Value<'a>>, EventKind<'static>),
    Entries(slice::Iter<'a, (Value<'a>, Value<'a>)>, EventKind<'static>),
    MapValue(&'a Value<'a>),
}

/// Replays a [`Value`] tree as the events a parser would produce for its
/// text form.
///
/// The walk uses an explicit stack. Event locations are empty ranges.
pub struct ValueEvents<'a> {
    stack: Vec<Pending<'a>>,
}

impl<'a> ValueEvents<'a> {
    pub fn new(value: &'a Value<'a>) -> Self {
        ValueEvents {
            stack: vec![Pending::Value(value)],
        }
    }

    /// Returns the event that opens `value`, queueing whatever it contains.
    fn open(&mut self, value: &'a Value<'a>) -> Option<EventKind<'a>> {
        let primitive = match value {
            Value::Unit => Primitive::Unit,
            Value::Bool(value) => Primitive::Bool(*value),
            Value::Integer(value) => Primitive::Integer(value.clone()),
            Value::Float(value) => Primitive::Float(*value),
            Value::Char(value) => Primitive::Char(*value),
            Value::String(value) => Primitive::String(Cow::Borrowed(&**value)),
            Value::Bytes(value) => Primitive::Bytes(Cow::Borrowed(&**value)),
            Value::Identifier(value) => Primitive::Identifier(Cow::Borrowed(&**value)),
            Value::Tuple(list) if list.is_empty() => Primitive::Unit,
            Value::List(list) => {
                self.stack.push(Pending::Items(list.iter(), EventKind::EndList));
                return Some(EventKind::StartList);
            }
            Value::Tuple(list) => {
                self.stack.push(Pending::Items(list.iter(), EventKind::EndTuple));
                return Some(EventKind::StartTuple);
            }
            Value::Map(map) => {
                self.stack.push(Pending::Entries(map.iter(), EventKind::EndMap));
                return Some(EventKind::StartMap);
            }
            Value::Named(named) => {
                let (contents, kind) = match &named.contents {
                    StructContents::Unit => {
                        let name = Primitive::Identifier(Cow::Borrowed(&*named.name));
                        return Some(EventKind::Primitive(name));
                    }
                    StructContents::Tuple(list) => {
                        (Pending::Items(list.iter(), EventKind::EndNamed), NamedKind::Tuple)
                    }
                    StructContents::Map(map) => {
                        (Pending::Entries(map.iter(), EventKind::EndNamed), NamedKind::Map)
                    }
                };
                self.stack.push(contents);
                return Some(EventKind::StartNamed {
                    name: Name {
                        name: &*named.name,
                        location: 0..0,
                    },
                    kind,
                });
            }
            Value::Annotated(annotated) => {
                self.stack.push(Pending::Value(&*annotated.value));
                for attribute in annotated.attributes.iter().rev() {
                    self.stack.push(Pending::Attribute(attribute));
                }
                return None;
            }
        };
        Some(EventKind::Primitive(primitive))
    }
}

impl<'a> EventSource<'a> for ValueEvents<'a> {
    const LOCATED: bool = false;

    fn next_event(&mut self) -> Option<Result<Event<'a>>> {
        loop {
            let kind = match self.stack.pop()? {
                Pending::Value(value) => match self.open(value) {
                    Some(kind) => kind,
                    None => continue,
                },
                Pending::Attribute(attribute) => EventKind::Attribute(attribute.borrowed()),
                Pending::Items(mut items, end) => match items.next() {
                    Some(item) => {
                        self.stack.push(Pending::Items(items, end));
                        self.stack.push(Pending::Value(item));
                        continue;
                    }
                    None => end,
                },
                Pending::Entries(mut entries, end) => match entries.next() {
                    Some((key, value)) => {
                        self.stack.push(Pending::Entries(entries, end));
                        self.stack.push(Pending::MapValue(value));
                        self.stack.push(Pending::Value(key));
                        EventKind::MapKey
                    }
                    None => end,
                },
                Pending::MapValue(value) => {
                    self.stack.push(Pending::Value(value));
                    EventKind::MapValue
                }
            };
            return Some(Ok(Event::new(kind, 0..0)));
        }
    }
}

/// The end event a sequence or map access waits for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Closer {
    List,
    Tuple,
    Map,
    Named,
}

impl Closer {
    fn matches(self, kind: &EventKind<'_>) -> bool {
        matches!(
            (self, kind),
            (Closer::List, EventKind::EndList)
                | (Closer::Tuple, EventKind::EndTuple)
                | (Closer::Map, EventKind::EndMap)
                | (Closer::Named, EventKind::EndNamed)
        )
    }

    fn expected(self) -> &'static str {
        match self {
            Closer::List => "end of list",
            Closer::Tuple => "end of tuple",
            Closer::Map => "end of map",
            Closer::Named => "end of named value",
        }
    }
}

/// Describes an event for error messages.
struct Describe<'a, 'de>(&'a EventKind<'de>);

impl fmt::Display for Describe<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            EventKind::Primitive(primitive) => match primitive {
                Primitive::Unit => f.write_str("unit"),
                Primitive::Bool(value) => write!(f, "bool `{value}`"),
                Primitive::Integer(value) => write!(f, "integer `{value}`"),
                Primitive::Float(value) => write!(f, "float `{value}`"),
                Primitive::Char(value) => write!(f, "char {value:?}"),
                Primitive::String(value) => write!(f, "string {value:?}"),
                Primitive::Bytes(_) => f.write_str("byte string"),
                Primitive::Identifier(value) => write!(f, "identifier `{value}`"),
            },
            EventKind::StartList => f.write_str("list"),
            EventKind::StartTuple => f.write_str("tuple"),
            EventKind::StartMap => f.write_str("map"),
            EventKind::StartNamed {
                name,
                kind: NamedKind::Tuple,
            } => write!(f, "named tuple `{}`", name.name),
            EventKind::StartNamed {
                name,
                kind: NamedKind::Map,
            } => write!(f, "named map `{}`", name.name),
            EventKind::EndList | EventKind::EndTuple | EventKind::EndMap | EventKind::EndNamed => {
                f.write_str("end of container")
            }
            EventKind::MapKey => f.write_str("map key"),
            EventKind::MapValue => f.write_str("map value"),
            EventKind::Attribute(attribute) => write!(f, "attribute `{}`", attribute.name),
            EventKind::Comment(_) => f.write_str("comment"),
        }
    }
}

/// Visits `()` as a sequence with no elements, the form an empty tuple is
/// written in.
fn visit_empty_seq<'de, V: Visitor<'de>>(visitor: V) -> Result<V::Value> {
    let mut access = EmptySeq::<_, Error>::new(std::iter::empty::<()>());
    let value = visitor.visit_seq(&mut access)?;
    access.end()?;
    Ok(value)
}

/// The text a map key is compared by when duplicate keys are rejected.
///
/// Identifiers and strings with the same text are the same key. Compound
/// keys are not tracked.
fn key_text(kind: &EventKind<'_>) -> Option<String> {
    match kind {
        EventKind::Primitive(Primitive::Identifier(text) | Primitive::String(text)) => {
            Some(text.to_string())
        }
        EventKind::Primitive(Primitive::Integer(value)) => Some(value.to_string()),
        EventKind::Primitive(Primitive::Bool(value)) => Some(value.to_string()),
        EventKind::Primitive(Primitive::Char(value)) => Some(format!("{value:?}")),
        _ => None,
    }
}

/// The RSN deserializer.
///
/// Reads Rust values implementing `Deserialize` from an [`EventSource`].
/// Created via [`Deserializer::from_str`] for text or
/// [`Deserializer::from_value`] for a [`Value`] tree. Comments and
/// attributes in the stream are skipped.
pub struct Deserializer<'de, S = Parser<'de>> {
    events: S,
    peeked: Option<Event<'de>>,
    last_location: Option<Range<usize>>,
    allow_duplicate_keys: bool,
}

impl<'de> Deserializer<'de> {
    /// Creates a deserializer over RSN text with the default [`ParseConfig`].
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(source: &'de str) -> Self {
        Self::from_str_with_config(source, &ParseConfig::default())
    }

    pub fn from_str_with_config(source: &'de str, config: &ParseConfig) -> Self {
        Deserializer::new(Parser::new(source, config.clone()))
            .with_allow_duplicate_keys(config.allow_duplicate_keys)
    }
}

impl<'de> Deserializer<'de, ValueEvents<'de>> {
    /// Creates a deserializer that reads from a value tree.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_rsn::{Deserializer, Value};
    /// use serde::Deserialize;
    ///
    /// let value: Value = "[(1, \"a\"), (2, \"b\")]".parse().unwrap();
    /// let mut deserializer = Deserializer::from_value(&value);
    /// let pairs = Vec::<(u8, &str)>::deserialize(&mut deserializer).unwrap();
    /// assert_eq!(pairs, vec![(1, "a"), (2, "b")]);
    /// ```
    pub fn from_value(value: &'de Value<'de>) -> Self {
        Deserializer::new(ValueEvents::new(value))
    }
}

impl<'de, S: EventSource<'de>> Deserializer<'de, S> {
    pub fn new(events: S) -> Self {
        Deserializer {
            events,
            peeked: None,
            last_location: None,
            allow_duplicate_keys: true,
        }
    }

    /// When `false`, maps and structs that repeat a key fail with
    /// [`ErrorKind::DuplicateKeyRejected`].
    #[must_use]
    pub fn with_allow_duplicate_keys(mut self, allow: bool) -> Self {
        self.allow_duplicate_keys = allow;
        self
    }

    /// The location of the last consumed event, if the source has locations.
    #[must_use]
    pub fn location(&self) -> Option<Range<usize>> {
        self.last_location.clone()
    }

    /// Checks that nothing but comments follows the deserialized value.
    ///
    /// # Errors
    ///
    /// Returns [`ParseErrorKind::TrailingData`] if another value follows.
    pub fn end(&mut self) -> Result<()> {
        if let Some(event) = self.peeked.take() {
            return Err(trailing(event.location));
        }
        while let Some(event) = self.events.next_event() {
            let event = event?;
            if !matches!(event.kind, EventKind::Comment(_)) {
                return Err(trailing(event.location));
            }
        }
        Ok(())
    }

    /// Attaches the location of the last consumed event unless `err` has one.
    pub(crate) fn locate(&self, err: Error) -> Error {
        match &self.last_location {
            Some(location) => err.at(location.clone()),
            None => err,
        }
    }

    fn pull(&mut self) -> Result<Event<'de>> {
        loop {
            match self.events.next_event() {
                Some(Ok(event)) => {
                    if matches!(event.kind, EventKind::Comment(_) | EventKind::Attribute(_)) {
                        continue;
                    }
                    return Ok(event);
                }
                Some(Err(err)) => return Err(err),
                None => {
                    let err = Error::new(ErrorKind::Parse(
                        ParseErrorKind::EmptyInputWhereValueExpected,
                    ));
                    return Err(self.locate(err));
                }
            }
        }
    }

    fn next(&mut self) -> Result<Event<'de>> {
        let event = match self.peeked.take() {
            Some(event) => event,
            None => self.pull()?,
        };
        if S::LOCATED {
            self.last_location = Some(event.location.clone());
        }
        Ok(event)
    }

    fn peek(&mut self) -> Result<&Event<'de>> {
        let event = match self.peeked.take() {
            Some(event) => event,
            None => self.pull()?,
        };
        Ok(self.peeked.insert(event))
    }

    fn mismatch(&self, expected: impl fmt::Display, found: &EventKind<'_>) -> Error {
        self.locate(Error::type_mismatch(expected, Describe(found)))
    }

    fn expect_end(&mut self, closer: Closer) -> Result<()> {
        let event = self.next()?;
        if closer.matches(&event.kind) {
            Ok(())
        } else {
            Err(self.mismatch(closer.expected(), &event.kind))
        }
    }

    fn visit_seq_until<V: Visitor<'de>>(&mut self, closer: Closer, visitor: V) -> Result<V::Value> {
        let mut access = SeqDeserializer {
            de: self,
            closer,
            finished: false,
        };
        let value = visitor.visit_seq(&mut access)?;
        access.finish()?;
        Ok(value)
    }

    fn visit_map_until<V: Visitor<'de>>(&mut self, closer: Closer, visitor: V) -> Result<V::Value> {
        let seen = (!self.allow_duplicate_keys).then(IndexSet::new);
        let mut access = MapDeserializer {
            de: self,
            closer,
            finished: false,
            seen,
        };
        let value = visitor.visit_map(&mut access)?;
        access.finish()?;
        Ok(value)
    }

    fn visit_named<V: Visitor<'de>>(&mut self, kind: NamedKind, visitor: V) -> Result<V::Value> {
        match kind {
            NamedKind::Tuple => self.visit_seq_until(Closer::Named, visitor),
            NamedKind::Map => self.visit_map_until(Closer::Named, visitor),
        }
    }

    /// Checks the name of a named value against the type being deserialized.
    fn check_name(&self, name: &Name<'_>, expected: &str, kind: &EventKind<'_>) -> Result<()> {
        if name.name == expected {
            Ok(())
        } else {
            Err(self.mismatch(format_args!("`{expected}`"), kind))
        }
    }

    fn visit_primitive<V: Visitor<'de>>(
        &mut self,
        primitive: Primitive<'de>,
        visitor: V,
    ) -> Result<V::Value> {
        match primitive {
            Primitive::Unit => visitor.visit_unit(),
            Primitive::Bool(value) => visitor.visit_bool(value),
            Primitive::Integer(value) => match value {
                Integer::U8(value) => visitor.visit_u8(value),
                Integer::U16(value) => visitor.visit_u16(value),
                Integer::U32(value) => visitor.visit_u32(value),
                Integer::U64(value) => visitor.visit_u64(value),
                Integer::U128(value) => visitor.visit_u128(value),
                Integer::Usize(value) => visitor.visit_u64(value as u64),
                Integer::I8(value) => visitor.visit_i8(value),
                Integer::I16(value) => visitor.visit_i16(value),
                Integer::I32(value) => visitor.visit_i32(value),
                Integer::I64(value) => visitor.visit_i64(value),
                Integer::I128(value) => visitor.visit_i128(value),
                Integer::Isize(value) => visitor.visit_i64(value as i64),
                Integer::Big(value) => Err(self.mismatch(
                    "an integer that fits in 128 bits",
                    &EventKind::Primitive(Primitive::Integer(Integer::Big(value))),
                )),
            },
            Primitive::Float(value) => visitor.visit_f64(value),
            Primitive::Char(value) => visitor.visit_char(value),
            Primitive::String(Cow::Borrowed(value)) => visitor.visit_borrowed_str(value),
            Primitive::String(Cow::Owned(value)) => visitor.visit_string(value),
            Primitive::Bytes(Cow::Borrowed(value)) => visitor.visit_borrowed_bytes(value),
            Primitive::Bytes(Cow::Owned(value)) => visitor.visit_byte_buf(value),
            Primitive::Identifier(name) if name == "None" => visitor.visit_none(),
            Primitive::Identifier(Cow::Borrowed(name)) => visitor.visit_borrowed_str(name),
            Primitive::Identifier(Cow::Owned(name)) => visitor.visit_string(name),
        }
    }
}

fn trailing(location: Range<usize>) -> Error {
    Error::from_parse(ParseError::new(ParseErrorKind::TrailingData, location))
}

macro_rules! deserialize_integer {
    ($($method:ident => $visit:ident, $as_fn:ident, $ty:literal;)+) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: Visitor<'de>,
            {
                let event = self.next()?;
                match &event.kind {
                    EventKind::Primitive(Primitive::Integer(value)) => match value.$as_fn() {
                        Some(value) => visitor.$visit(value),
                        None => Err(self.mismatch($ty, &event.kind)),
                    },
                    kind => Err(self.mismatch($ty, kind)),
                }
            }
        )+
    };
}

impl<'de, S: EventSource<'de>> de::Deserializer<'de> for &mut Deserializer<'de, S> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let event = self.next()?;
        match event.kind {
            EventKind::Primitive(primitive) => self.visit_primitive(primitive, visitor),
            EventKind::StartList => self.visit_seq_until(Closer::List, visitor),
            EventKind::StartTuple => self.visit_seq_until(Closer::Tuple, visitor),
            EventKind::StartMap => self.visit_map_until(Closer::Map, visitor),
            EventKind::StartNamed {
                name,
                kind: NamedKind::Tuple,
            } if name.name == "Some" => {
                let value = visitor.visit_some(&mut *self)?;
                self.expect_end(Closer::Named)?;
                Ok(value)
            }
            EventKind::StartNamed { kind, .. } => self.visit_named(kind, visitor),
            kind => Err(self.mismatch("a value", &kind)),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let event = self.next()?;
        match event.kind {
            EventKind::Primitive(Primitive::Bool(value)) => visitor.visit_bool(value),
            kind => Err(self.mismatch("bool", &kind)),
        }
    }

    deserialize_integer! {
        deserialize_i8 => visit_i8, as_i8, "i8";
        deserialize_i16 => visit_i16, as_i16, "i16";
        deserialize_i32 => visit_i32, as_i32, "i32";
        deserialize_i64 => visit_i64, as_i64, "i64";
        deserialize_i128 => visit_i128, as_i128, "i128";
        deserialize_u8 => visit_u8, as_u8, "u8";
        deserialize_u16 => visit_u16, as_u16, "u16";
        deserialize_u32 => visit_u32, as_u32, "u32";
        deserialize_u64 => visit_u64, as_u64, "u64";
        deserialize_u128 => visit_u128, as_u128, "u128";
    }

    #[allow(clippy::cast_possible_truncation)]
    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let event = self.next()?;
        match &event.kind {
            EventKind::Primitive(Primitive::Float(value)) => visitor.visit_f32(*value as f32),
            EventKind::Primitive(Primitive::Integer(value)) => {
                visitor.visit_f32(value.to_f64() as f32)
            }
            kind => Err(self.mismatch("f32", kind)),
        }
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let event = self.next()?;
        match &event.kind {
            EventKind::Primitive(Primitive::Float(value)) => visitor.visit_f64(*value),
            EventKind::Primitive(Primitive::Integer(value)) => visitor.visit_f64(value.to_f64()),
            kind => Err(self.mismatch("f64", kind)),
        }
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let event = self.next()?;
        match &event.kind {
            EventKind::Primitive(Primitive::Char(value)) => visitor.visit_char(*value),
            EventKind::Primitive(Primitive::String(text)) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(value), None) => visitor.visit_char(value),
                    _ => Err(self.mismatch("char", &event.kind)),
                }
            }
            kind => Err(self.mismatch("char", kind)),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let event = self.next()?;
        match event.kind {
            EventKind::Primitive(Primitive::String(text) | Primitive::Identifier(text)) => {
                match text {
                    Cow::Borrowed(text) => visitor.visit_borrowed_str(text),
                    Cow::Owned(text) => visitor.visit_string(text),
                }
            }
            kind => Err(self.mismatch("string", &kind)),
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let event = self.next()?;
        match event.kind {
            EventKind::Primitive(Primitive::Bytes(Cow::Borrowed(bytes))) => {
                visitor.visit_borrowed_bytes(bytes)
            }
            EventKind::Primitive(Primitive::Bytes(Cow::Owned(bytes))) => {
                visitor.visit_byte_buf(bytes)
            }
            EventKind::Primitive(Primitive::String(Cow::Borrowed(text))) => {
                visitor.visit_borrowed_bytes(text.as_bytes())
            }
            EventKind::Primitive(Primitive::String(Cow::Owned(text))) => {
                visitor.visit_byte_buf(text.into_bytes())
            }
            kind => Err(self.mismatch("byte string", &kind)),
        }
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let (none, wrapped) = match &self.peek()?.kind {
            EventKind::Primitive(Primitive::Identifier(name)) => (name == "None", false),
            EventKind::StartNamed {
                name,
                kind: NamedKind::Tuple,
            } => (false, name.name == "Some"),
            _ => (false, false),
        };
        if none {
            self.next()?;
            visitor.visit_none()
        } else if wrapped {
            self.next()?;
            let value = visitor.visit_some(&mut *self)?;
            self.expect_end(Closer::Named)?;
            Ok(value)
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let event = self.next()?;
        match event.kind {
            EventKind::Primitive(Primitive::Unit) => visitor.visit_unit(),
            kind => Err(self.mismatch("unit", &kind)),
        }
    }

    fn deserialize_unit_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let event = self.next()?;
        match &event.kind {
            EventKind::Primitive(Primitive::Unit) => visitor.visit_unit(),
            EventKind::Primitive(Primitive::Identifier(found)) if found == name => {
                visitor.visit_unit()
            }
            kind => Err(self.mismatch(format_args!("`{name}`"), kind)),
        }
    }

    fn deserialize_newtype_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let wrapped = matches!(
            &self.peek()?.kind,
            EventKind::StartNamed { name: found, kind: NamedKind::Tuple } if found.name == name
        );
        if wrapped {
            self.next()?;
            let value = visitor.visit_newtype_struct(&mut *self)?;
            self.expect_end(Closer::Named)?;
            Ok(value)
        } else {
            visitor.visit_newtype_struct(self)
        }
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let event = self.next()?;
        match event.kind {
            EventKind::StartList => self.visit_seq_until(Closer::List, visitor),
            EventKind::StartTuple => self.visit_seq_until(Closer::Tuple, visitor),
            EventKind::Primitive(Primitive::Unit) => visit_empty_seq(visitor),
            kind => Err(self.mismatch("list", &kind)),
        }
    }

    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let event = self.next()?;
        match event.kind {
            EventKind::StartTuple => self.visit_seq_until(Closer::Tuple, visitor),
            EventKind::StartList => self.visit_seq_until(Closer::List, visitor),
            EventKind::StartNamed {
                kind: NamedKind::Tuple,
                ..
            } => self.visit_seq_until(Closer::Named, visitor),
            EventKind::Primitive(Primitive::Unit) if len == 0 => visit_empty_seq(visitor),
            kind => Err(self.mismatch("tuple", &kind)),
        }
    }

    fn deserialize_tuple_struct<V>(
        self,
        name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let event = self.next()?;
        match &event.kind {
            EventKind::StartNamed {
                name: found,
                kind: NamedKind::Tuple,
            } => {
                self.check_name(found, name, &event.kind)?;
                self.visit_seq_until(Closer::Named, visitor)
            }
            EventKind::StartTuple => self.visit_seq_until(Closer::Tuple, visitor),
            EventKind::StartList => self.visit_seq_until(Closer::List, visitor),
            kind => Err(self.mismatch(format_args!("tuple struct `{name}`"), kind)),
        }
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let event = self.next()?;
        match event.kind {
            EventKind::StartMap => self.visit_map_until(Closer::Map, visitor),
            EventKind::StartNamed {
                kind: NamedKind::Map,
                ..
            } => self.visit_map_until(Closer::Named, visitor),
            kind => Err(self.mismatch("map", &kind)),
        }
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let event = self.next()?;
        match &event.kind {
            EventKind::StartNamed { name: found, kind } => {
                self.check_name(found, name, &event.kind)?;
                self.visit_named(*kind, visitor)
            }
            EventKind::StartMap => self.visit_map_until(Closer::Map, visitor),
            kind => Err(self.mismatch(format_args!("struct `{name}`"), kind)),
        }
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let event = self.next()?;
        match event.kind {
            EventKind::Primitive(Primitive::Identifier(variant) | Primitive::String(variant)) => {
                visitor.visit_enum(IntoDeserializer::<'de, Error>::into_deserializer(variant))
            }
            EventKind::StartNamed { name, kind } => visitor.visit_enum(EnumDeserializer {
                de: self,
                name: name.name,
                kind,
            }),
            kind => Err(self.mismatch(format_args!("enum `{name}`"), &kind)),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let mut depth = 0_usize;
        loop {
            let event = self.next()?;
            match event.kind {
                EventKind::StartList
                | EventKind::StartTuple
                | EventKind::StartMap
                | EventKind::StartNamed { .. } => depth += 1,
                EventKind::EndList | EventKind::EndTuple | EventKind::EndMap | EventKind::EndNamed => {
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
            if depth == 0 {
                return visitor.visit_unit();
            }
        }
    }
}

struct SeqDeserializer<'a, 'de, S> {
    de: &'a mut Deserializer<'de, S>,
    closer: Closer,
    finished: bool,
}

impl<'de, S: EventSource<'de>> SeqDeserializer<'_, 'de, S> {
    /// Consumes the closer if the visitor stopped before reaching it.
    fn finish(self) -> Result<()> {
        if self.finished {
            Ok(())
        } else {
            self.de.expect_end(self.closer)
        }
    }
}

impl<'de, S: EventSource<'de>> de::SeqAccess<'de> for SeqDeserializer<'_, 'de, S> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: DeserializeSeed<'de>,
    {
        if self.finished {
            return Ok(None);
        }
        let closer = self.closer;
        if closer.matches(&self.de.peek()?.kind) {
            self.de.next()?;
            self.finished = true;
            return Ok(None);
        }
        seed.deserialize(&mut *self.de).map(Some)
    }
}

struct MapDeserializer<'a, 'de, S> {
    de: &'a mut Deserializer<'de, S>,
    closer: Closer,
    finished: bool,
    /// Keys read so far; `None` when duplicate keys are allowed.
    seen: Option<IndexSet<String>>,
}

impl<'de, S: EventSource<'de>> MapDeserializer<'_, 'de, S> {
    fn finish(self) -> Result<()> {
        if self.finished {
            Ok(())
        } else {
            self.de.expect_end(self.closer)
        }
    }
}

impl<'de, S: EventSource<'de>> de::MapAccess<'de> for MapDeserializer<'_, 'de, S> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        if self.finished {
            return Ok(None);
        }
        let event = self.de.next()?;
        if self.closer.matches(&event.kind) {
            self.finished = true;
            return Ok(None);
        }
        if event.kind != EventKind::MapKey {
            return Err(self.de.mismatch("map key", &event.kind));
        }
        if let Some(seen) = &mut self.seen {
            let key = self.de.peek()?;
            if let Some(text) = key_text(&key.kind) {
                let location = key.location.clone();
                if !seen.insert(text.clone()) {
                    let err = Error::new(ErrorKind::DuplicateKeyRejected(text));
                    return Err(if S::LOCATED { err.at(location) } else { err });
                }
            }
        }
        seed.deserialize(&mut *self.de).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        let event = self.de.next()?;
        if event.kind != EventKind::MapValue {
            return Err(self.de.mismatch("map value", &event.kind));
        }
        seed.deserialize(&mut *self.de)
    }
}

struct EnumDeserializer<'a, 'de, S> {
    de: &'a mut Deserializer<'de, S>,
    name: &'de str,
    kind: NamedKind,
}

impl<'de, S: EventSource<'de>> de::EnumAccess<'de> for EnumDeserializer<'_, 'de, S> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: DeserializeSeed<'de>,
    {
        let variant = seed
            .deserialize(BorrowedStrDeserializer::<Error>::new(self.name))
            .map_err(|err| self.de.locate(err))?;
        Ok((variant, self))
    }
}

impl<'de, S: EventSource<'de>> de::VariantAccess<'de> for EnumDeserializer<'_, 'de, S> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        self.de.expect_end(Closer::Named)
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: DeserializeSeed<'de>,
    {
        if self.kind != NamedKind::Tuple {
            return Err(self.de.locate(Error::type_mismatch(
                format_args!("newtype variant `{}`", self.name),
                format_args!("named map `{}`", self.name),
            )));
        }
        let value = seed.deserialize(&mut *self.de)?;
        self.de.expect_end(Closer::Named)?;
        Ok(value)
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.de.visit_named(self.kind, visitor)
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.de.visit_named(self.kind, visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::{BTreeMap, HashMap};

    fn from_str<'a, T: Deserialize<'a>>(source: &'a str) -> Result<T> {
        let mut de = Deserializer::from_str(source);
        let value = T::deserialize(&mut de).map_err(|err| de.locate(err))?;
        de.end()?;
        Ok(value)
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    enum Shape {
        Empty,
        Circle(f64),
        Rect(u32, u32),
        Poly { sides: u8 },
    }

    #[test]
    fn test_primitives() {
        assert!(from_str::<bool>("true").unwrap());
        assert_eq!(from_str::<i8>("-5").unwrap(), -5);
        assert_eq!(from_str::<u128>("340282366920938463463374607431768211455").unwrap(), u128::MAX);
        assert_eq!(from_str::<f64>("2").unwrap(), 2.0);
        assert!(from_str::<f64>("NaN").unwrap().is_nan());
        assert_eq!(from_str::<char>("'\\n'").unwrap(), '\n');
        assert_eq!(from_str::<String>(r#""a\tb""#).unwrap(), "a\tb");
        assert_eq!(from_str::<&str>(r#""borrowed""#).unwrap(), "borrowed");
        from_str::<()>("()").unwrap();
    }

    #[test]
    fn test_integer_narrowing_fails_with_location() {
        let err = from_str::<Vec<u8>>("[1, 300]").unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::TypeMismatch {
                expected: "u8".to_string(),
                found: "integer `300`".to_string(),
            }
        );
        assert_eq!(err.location, Some(4..7));
    }

    #[test]
    fn test_structs() {
        assert_eq!(from_str::<Point>("Point { x: 1, y: -2 }").unwrap(), Point { x: 1, y: -2 });
        assert_eq!(from_str::<Point>("{y: 2, x: 1,}").unwrap(), Point { x: 1, y: 2 });

        let err = from_str::<Point>("Other { x: 1, y: 2 }").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
        assert_eq!(err.offset(), Some(0));

        let err = from_str::<Point>("Point { x: 1 }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingField("y".to_string()));
        assert_eq!(err.offset(), Some(13));
    }

    #[test]
    fn test_newtype_and_tuple_structs() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Meters(f64);

        #[derive(Deserialize, Debug, PartialEq)]
        struct Pair(u8, String);

        assert_eq!(from_str::<Meters>("Meters(1.5)").unwrap(), Meters(1.5));
        assert_eq!(from_str::<Meters>("1.5").unwrap(), Meters(1.5));
        assert_eq!(from_str::<Pair>("Pair(1, \"a\")").unwrap(), Pair(1, "a".to_string()));
        assert_eq!(from_str::<Pair>("(1, \"a\")").unwrap(), Pair(1, "a".to_string()));
    }

    #[test]
    fn test_enums() {
        let shapes: Vec<Shape> =
            from_str("[Empty, Circle(1.0), Rect(2, 3), Poly { sides: 5 }]").unwrap();
        assert_eq!(
            shapes,
            vec![
                Shape::Empty,
                Shape::Circle(1.0),
                Shape::Rect(2, 3),
                Shape::Poly { sides: 5 }
            ]
        );

        let err = from_str::<Shape>("Hexagon").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnknownVariant { .. }));
    }

    #[test]
    fn test_options() {
        let values: Vec<Option<Option<u8>>> = from_str("[None, Some(None), Some(Some(1)), 2]").unwrap();
        assert_eq!(values, vec![None, Some(None), Some(Some(1)), Some(Some(2))]);
    }

    #[test]
    fn test_collections() {
        let map: BTreeMap<u8, Vec<bool>> = from_str("{1: [true], 2: []}").unwrap();
        assert_eq!(map[&1], vec![true]);
        assert!(map[&2].is_empty());

        let map: HashMap<String, i64> = from_str("{a: 1, \"b c\": -2}").unwrap();
        assert_eq!(map["b c"], -2);

        let tuple: (u8, char, (bool,)) = from_str("(1, 'x', (true,))").unwrap();
        assert_eq!(tuple, (1, 'x', (true,)));
    }

    #[test]
    fn test_too_many_tuple_elements() {
        let err = from_str::<(u8, u8)>("(1, 2, 3)").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
        assert_eq!(err.offset(), Some(7));
    }

    #[test]
    fn test_comments_and_attributes_are_skipped() {
        let source = "// header\n#[doc(\"point\")] Point { /* x */ x: 1, y: 2 } // done";
        let config = ParseConfig::default().with_include_comments(true);
        let mut de = Deserializer::from_str_with_config(source, &config);
        let point = Point::deserialize(&mut de).unwrap();
        de.end().unwrap();
        assert_eq!(point, Point { x: 1, y: 2 });
    }

    #[test]
    fn test_duplicate_keys() {
        let lenient: HashMap<String, u8> = from_str("{a: 1, a: 2}").unwrap();
        assert_eq!(lenient["a"], 2);

        let mut de = Deserializer::from_str_with_config("{a: 1, \"a\": 2}", &ParseConfig::strict());
        let err = HashMap::<String, u8>::deserialize(&mut de).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateKeyRejected("a".to_string()));
        assert_eq!(err.offset(), Some(7));
    }

    #[test]
    fn test_trailing_data() {
        let err = from_str::<u8>("1 2").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse(ParseErrorKind::TrailingData));
        assert_eq!(err.offset(), Some(2));

        let config = ParseConfig::default().with_allow_trailing_data(true);
        let mut de = Deserializer::from_str_with_config("1 2", &config);
        assert_eq!(u8::deserialize(&mut de).unwrap(), 1);
        de.end().unwrap();
    }

    #[test]
    fn test_parse_errors_are_wrapped() {
        let err = from_str::<Vec<u8>>("[1, 2").unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::Parse(ParseErrorKind::UnbalancedNesting { .. })
        ));
        assert_eq!(err.offset(), Some(5));
    }

    #[test]
    fn test_ignored_fields() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Only {
            keep: u8,
        }

        let only: Only = from_str("{skip: Deep { a: [1, (2, 3)] }, keep: 4}").unwrap();
        assert_eq!(only, Only { keep: 4 });
    }

    #[test]
    fn test_value_events_match_parser() {
        let source = "[#[a] Point { x: 1, y: 2 }, (1, \"s\"), {k: None}, Unit, ()]";
        let value = Value::parse(source, &ParseConfig::default()).unwrap();
        let mut events = ValueEvents::new(&value);
        let from_tree: Vec<EventKind<'_>> = std::iter::from_fn(|| events.next_event())
            .map(|event| event.unwrap().kind)
            .collect();
        let from_text: Vec<EventKind<'_>> = Parser::new(source, ParseConfig::default())
            .map(|event| event.unwrap().kind)
            .collect();
        assert_eq!(from_tree.len(), from_text.len());
        for (tree, text) in from_tree.iter().zip(&from_text) {
            match (tree, text) {
                (
                    EventKind::StartNamed { name: a, kind: ka },
                    EventKind::StartNamed { name: b, kind: kb },
                ) => {
                    assert_eq!(a.name, b.name);
                    assert_eq!(ka, kb);
                }
                _ => assert_eq!(tree, text),
            }
        }
    }

    #[test]
    fn test_from_value() {
        let value = Value::parse("Poly { sides: 3 }", &ParseConfig::default()).unwrap();
        let mut de = Deserializer::from_value(&value);
        assert_eq!(Shape::deserialize(&mut de).unwrap(), Shape::Poly { sides: 3 });
        assert_eq!(de.location(), None);
    }
}
