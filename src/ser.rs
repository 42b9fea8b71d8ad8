//! RSN serialization.
//!
//! This module provides the [`Serializer`], which walks any `Serialize` type
//! and drives an [`Emitter`]. With a [`Writer`] the result is RSN text; with
//! a [`ValueBuilder`](crate::emit::ValueBuilder) it is a [`Value`](crate::Value).
//!
//! ## Data model mapping
//!
//! | Rust                       | RSN                      |
//! |----------------------------|--------------------------|
//! | `()`                       | `()`                     |
//! | `None` / `Some(x)`         | `None` / `Some(x)`       |
//! | unit struct, unit variant  | `Name`                   |
//! | newtype struct or variant  | `Name(x)`                |
//! | tuple                      | `(a, b)`                 |
//! | tuple struct or variant    | `Name(a, b)`             |
//! | sequence                   | `[a, b]`                 |
//! | map                        | `{k: v}`                 |
//! | struct or struct variant   | `Name{field: v}`         |
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use serde_rsn::{to_string, to_string_pretty};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Data { x: i32, y: i32 }
//!
//! let data = Data { x: 1, y: 2 };
//!
//! assert_eq!(to_string(&data).unwrap(), "Data{x:1,y:2}");
//! assert_eq!(to_string_pretty(&data).unwrap(), "Data {\n  x: 1,\n  y: 2,\n}");
//! ```
//!
//! ## Direct Serializer Usage
//!
//! For advanced use cases, you can use the serializer directly:
//!
//! ```rust
//! use serde_rsn::{Serializer, WriteConfig};
//! use serde::Serialize;
//!
//! let mut serializer = Serializer::with_config(String::new(), &WriteConfig::new());
//!
//! let data = vec![(1, 'a'), (2, 'b')];
//! data.serialize(&mut serializer).unwrap();
//!
//! let rsn = serializer.into_inner().finish().unwrap();
//! assert_eq!(rsn, "[(1,'a'),(2,'b')]");
//! ```

use crate::emit::Emitter;
use crate::parser::{NamedKind, Primitive};
use crate::{Error, Integer, Result, WriteConfig, Writer};
use serde::{ser, Serialize};
use std::borrow::Cow;
use std::fmt;

/// The RSN serializer.
///
/// Converts Rust values implementing `Serialize` into calls on an
/// [`Emitter`]. Created via [`Serializer::new`] around any emitter, or
/// [`Serializer::with_config`] for text output.
pub struct Serializer<E> {
    emitter: E,
    anonymous_structs: bool,
}

impl<E: Emitter> Serializer<E> {
    pub fn new(emitter: E) -> Self {
        Serializer {
            emitter,
            anonymous_structs: false,
        }
    }

    /// Serialize structs as `{field: value}` without their name.
    #[must_use]
    pub fn with_anonymous_structs(mut self, anonymous: bool) -> Self {
        self.anonymous_structs = anonymous;
        self
    }

    pub fn into_inner(self) -> E {
        self.emitter
    }

    fn integer(&mut self, value: Integer) -> Result<()> {
        self.emitter.primitive(Primitive::Integer(value))
    }

    fn identifier(&mut self, name: &str) -> Result<()> {
        self.emitter
            .primitive(Primitive::Identifier(Cow::Borrowed(name)))
    }
}

impl<W: fmt::Write> Serializer<Writer<W>> {
    /// Creates a serializer that writes RSN text into `output`.
    pub fn with_config(output: W, config: &WriteConfig) -> Self {
        Serializer::new(Writer::new(output, config))
            .with_anonymous_structs(config.anonymous_structs)
    }
}

impl<'a, E: Emitter> ser::Serializer for &'a mut Serializer<E> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = SeqSerializer<'a, E>;
    type SerializeTuple = SeqSerializer<'a, E>;
    type SerializeTupleStruct = SeqSerializer<'a, E>;
    type SerializeTupleVariant = SeqSerializer<'a, E>;
    type SerializeMap = MapSerializer<'a, E>;
    type SerializeStruct = StructSerializer<'a, E>;
    type SerializeStructVariant = StructSerializer<'a, E>;

    fn serialize_bool(self, v: bool) -> Result<Self::Ok> {
        self.emitter.primitive(Primitive::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Self::Ok> {
        self.integer(Integer::I8(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Self::Ok> {
        self.integer(Integer::I16(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Self::Ok> {
        self.integer(Integer::I32(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Self::Ok> {
        self.integer(Integer::I64(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Self::Ok> {
        self.integer(Integer::I128(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Self::Ok> {
        self.integer(Integer::U8(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Self::Ok> {
        self.integer(Integer::U16(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Self::Ok> {
        self.integer(Integer::U32(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Self::Ok> {
        self.integer(Integer::U64(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Self::Ok> {
        self.integer(Integer::U128(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Self::Ok> {
        // Widen through the shortest decimal form so 0.1f32 is written as 0.1.
        let widened = v.to_string().parse().unwrap_or(f64::from(v));
        self.serialize_f64(widened)
    }

    fn serialize_f64(self, v: f64) -> Result<Self::Ok> {
        self.emitter.primitive(Primitive::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok> {
        self.emitter.primitive(Primitive::Char(v))
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        self.emitter.primitive(Primitive::String(Cow::Borrowed(v)))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok> {
        self.emitter.primitive(Primitive::Bytes(Cow::Borrowed(v)))
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        self.identifier("None")
    }

    fn serialize_some<T>(self, value: &T) -> Result<Self::Ok>
    where
        T: ?Sized + Serialize,
    {
        self.emitter.begin_named("Some", NamedKind::Tuple)?;
        value.serialize(&mut *self)?;
        self.emitter.end_nested()
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        self.emitter.primitive(Primitive::Unit)
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Self::Ok> {
        self.identifier(name)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok> {
        self.identifier(variant)
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<Self::Ok>
    where
        T: ?Sized + Serialize,
    {
        self.emitter.begin_named(name, NamedKind::Tuple)?;
        value.serialize(&mut *self)?;
        self.emitter.end_nested()
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok>
    where
        T: ?Sized + Serialize,
    {
        self.emitter.begin_named(variant, NamedKind::Tuple)?;
        value.serialize(&mut *self)?;
        self.emitter.end_nested()
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        self.emitter.begin_list()?;
        Ok(SeqSerializer { ser: self })
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        self.emitter.begin_tuple()?;
        Ok(SeqSerializer { ser: self })
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.emitter.begin_named(name, NamedKind::Tuple)?;
        Ok(SeqSerializer { ser: self })
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        self.emitter.begin_named(variant, NamedKind::Tuple)?;
        Ok(SeqSerializer { ser: self })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        self.emitter.begin_map()?;
        Ok(MapSerializer { ser: self })
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        if self.anonymous_structs {
            self.emitter.begin_map()?;
        } else {
            self.emitter.begin_named(name, NamedKind::Map)?;
        }
        Ok(StructSerializer { ser: self })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        self.emitter.begin_named(variant, NamedKind::Map)?;
        Ok(StructSerializer { ser: self })
    }
}

/// Serializes the elements of sequences, tuples, tuple structs and tuple
/// variants.
pub struct SeqSerializer<'a, E> {
    ser: &'a mut Serializer<E>,
}

impl<E: Emitter> SeqSerializer<'_, E> {
    fn element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut *self.ser)
    }

    fn finish(self) -> Result<()> {
        self.ser.emitter.end_nested()
    }
}

impl<E: Emitter> ser::SerializeSeq for SeqSerializer<'_, E> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<E: Emitter> ser::SerializeTuple for SeqSerializer<'_, E> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<E: Emitter> ser::SerializeTupleStruct for SeqSerializer<'_, E> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<E: Emitter> ser::SerializeTupleVariant for SeqSerializer<'_, E> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

/// Serializes map entries. Keys may be any serializable value.
pub struct MapSerializer<'a, E> {
    ser: &'a mut Serializer<E>,
}

impl<E: Emitter> ser::SerializeMap for MapSerializer<'_, E> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        key.serialize(&mut *self.ser)
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(&mut *self.ser)
    }

    fn end(self) -> Result<()> {
        self.ser.emitter.end_nested()
    }
}

/// Serializes struct fields as `field: value` entries with identifier keys.
pub struct StructSerializer<'a, E> {
    ser: &'a mut Serializer<E>,
}

impl<E: Emitter> StructSerializer<'_, E> {
    fn field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.ser.identifier(key)?;
        value.serialize(&mut *self.ser)
    }
}

impl<E: Emitter> ser::SerializeStruct for StructSerializer<'_, E> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<()> {
        self.ser.emitter.end_nested()
    }
}

impl<E: Emitter> ser::SerializeStructVariant for StructSerializer<'_, E> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<()> {
        self.ser.emitter.end_nested()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::BTreeMap;

    fn compact<T: Serialize>(value: &T) -> String {
        let mut serializer = Serializer::with_config(String::new(), &WriteConfig::new());
        value.serialize(&mut serializer).unwrap();
        serializer.into_inner().finish().unwrap()
    }

    #[derive(Serialize)]
    struct Unit;

    #[derive(Serialize)]
    struct Meters(f64);

    #[derive(Serialize)]
    struct Pair(i32, &'static str);

    #[derive(Serialize)]
    enum Shape {
        Empty,
        Circle(f64),
        Rect(u32, u32),
        Poly { sides: u8 },
    }

    #[test]
    fn test_primitives() {
        assert_eq!(compact(&true), "true");
        assert_eq!(compact(&-12_i16), "-12");
        assert_eq!(compact(&u128::MAX), "340282366920938463463374607431768211455");
        assert_eq!(compact(&1.5_f64), "1.5");
        assert_eq!(compact(&0.1_f32), "0.1");
        assert_eq!(compact(&'x'), "'x'");
        assert_eq!(compact(&"hi \"there\""), r#""hi \"there\"""#);
        assert_eq!(compact(&()), "()");
    }

    #[test]
    fn test_options() {
        assert_eq!(compact(&None::<u8>), "None");
        assert_eq!(compact(&Some(3)), "Some(3)");
        assert_eq!(compact(&Some(Some(()))), "Some(Some(()))");
    }

    #[test]
    fn test_structs() {
        assert_eq!(compact(&Unit), "Unit");
        assert_eq!(compact(&Meters(2.5)), "Meters(2.5)");
        assert_eq!(compact(&Pair(1, "a")), r#"Pair(1,"a")"#);
    }

    #[test]
    fn test_enums() {
        assert_eq!(compact(&Shape::Empty), "Empty");
        assert_eq!(compact(&Shape::Circle(1.0)), "Circle(1.0)");
        assert_eq!(compact(&Shape::Rect(2, 3)), "Rect(2,3)");
        assert_eq!(compact(&Shape::Poly { sides: 5 }), "Poly{sides:5}");
    }

    #[test]
    fn test_collections() {
        assert_eq!(compact(&vec![1, 2, 3]), "[1,2,3]");
        assert_eq!(compact(&(1, "two", 3.0)), r#"(1,"two",3.0)"#);

        let mut map = BTreeMap::new();
        map.insert(1, "one");
        map.insert(2, "two");
        assert_eq!(compact(&map), r#"{1:"one",2:"two"}"#);
    }

    #[test]
    fn test_anonymous_structs() {
        #[derive(Serialize)]
        struct Point {
            x: i32,
            y: i32,
        }

        let config = WriteConfig::new().with_anonymous_structs(true);
        let mut serializer = Serializer::with_config(String::new(), &config);
        vec![Point { x: 1, y: 2 }].serialize(&mut serializer).unwrap();
        assert_eq!(serializer.into_inner().finish().unwrap(), "[{x:1,y:2}]");
    }

    #[test]
    fn test_keyword_field_names() {
        #[derive(Serialize)]
        struct Flags {
            r#true: bool,
        }

        assert_eq!(compact(&Flags { r#true: false }), "Flags{r#true:false}");
    }
}
