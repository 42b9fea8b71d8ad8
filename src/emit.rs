//! The sink side of the data model.
//!
//! An [`Emitter`] receives a value as a sequence of calls mirroring the
//! parser's events. The [`Serializer`](crate::Serializer) drives any emitter,
//! so the same serde walk can produce text through a
//! [`Writer`](crate::Writer) or a tree through [`ValueBuilder`].

use crate::parser::{Attribute, NamedKind, Primitive};
use crate::value::{Container, StructContents, TreeBuilder, Value};
use crate::{Error, List, Map, Result};
use std::borrow::Cow;

/// Receives one value at a time.
///
/// Inside a map, values alternate between keys and values. Containers opened
/// with a `begin_*` method are closed by a matching [`end_nested`](Emitter::end_nested).
pub trait Emitter {
    fn primitive(&mut self, value: Primitive<'_>) -> Result<()>;

    /// Annotates the next value.
    fn attribute(&mut self, attribute: &Attribute<'_>) -> Result<()>;

    fn begin_list(&mut self) -> Result<()>;

    fn begin_tuple(&mut self) -> Result<()>;

    fn begin_map(&mut self) -> Result<()>;

    fn begin_named(&mut self, name: &str, kind: NamedKind) -> Result<()>;

    fn end_nested(&mut self) -> Result<()>;
}

impl<E: Emitter + ?Sized> Emitter for &mut E {
    fn primitive(&mut self, value: Primitive<'_>) -> Result<()> {
        (**self).primitive(value)
    }

    fn attribute(&mut self, attribute: &Attribute<'_>) -> Result<()> {
        (**self).attribute(attribute)
    }

    fn begin_list(&mut self) -> Result<()> {
        (**self).begin_list()
    }

    fn begin_tuple(&mut self) -> Result<()> {
        (**self).begin_tuple()
    }

    fn begin_map(&mut self) -> Result<()> {
        (**self).begin_map()
    }

    fn begin_named(&mut self, name: &str, kind: NamedKind) -> Result<()> {
        (**self).begin_named(name, kind)
    }

    fn end_nested(&mut self) -> Result<()> {
        (**self).end_nested()
    }
}

/// Walks a [`Value`] and replays it into an emitter.
pub fn emit_value<E: Emitter + ?Sized>(value: &Value<'_>, emitter: &mut E) -> Result<()> {
    match value {
        Value::Unit => emitter.primitive(Primitive::Unit),
        Value::Bool(value) => emitter.primitive(Primitive::Bool(*value)),
        Value::Integer(value) => emitter.primitive(Primitive::Integer(value.clone())),
        Value::Float(value) => emitter.primitive(Primitive::Float(*value)),
        Value::Char(value) => emitter.primitive(Primitive::Char(*value)),
        Value::String(value) => emitter.primitive(Primitive::String(Cow::Borrowed(&**value))),
        Value::Bytes(value) => emitter.primitive(Primitive::Bytes(Cow::Borrowed(&**value))),
        Value::Identifier(value) => {
            emitter.primitive(Primitive::Identifier(Cow::Borrowed(&**value)))
        }
        Value::List(list) => {
            emitter.begin_list()?;
            emit_items(list, emitter)
        }
        Value::Tuple(list) if list.is_empty() => emitter.primitive(Primitive::Unit),
        Value::Tuple(list) => {
            emitter.begin_tuple()?;
            emit_items(list, emitter)
        }
        Value::Map(map) => {
            emitter.begin_map()?;
            emit_entries(map, emitter)
        }
        Value::Named(named) => match &named.contents {
            StructContents::Unit => {
                emitter.primitive(Primitive::Identifier(Cow::Borrowed(&*named.name)))
            }
            StructContents::Tuple(list) => {
                emitter.begin_named(&named.name, NamedKind::Tuple)?;
                emit_items(list, emitter)
            }
            StructContents::Map(map) => {
                emitter.begin_named(&named.name, NamedKind::Map)?;
                emit_entries(map, emitter)
            }
        },
        Value::Annotated(annotated) => {
            for attribute in &annotated.attributes {
                emitter.attribute(attribute)?;
            }
            emit_value(&annotated.value, emitter)
        }
    }
}

fn emit_items<E: Emitter + ?Sized>(list: &List<'_>, emitter: &mut E) -> Result<()> {
    for item in list {
        emit_value(item, emitter)?;
    }
    emitter.end_nested()
}

fn emit_entries<E: Emitter + ?Sized>(map: &Map<'_>, emitter: &mut E) -> Result<()> {
    for (key, value) in map {
        emit_value(key, emitter)?;
        emit_value(value, emitter)?;
    }
    emitter.end_nested()
}

/// Assembles emitted values into an owned [`Value`] tree.
///
/// # Examples
///
/// ```rust
/// use serde_rsn::emit::{Emitter, ValueBuilder};
/// use serde_rsn::parser::Primitive;
/// use serde_rsn::Integer;
///
/// let mut builder = ValueBuilder::new();
/// builder.begin_list().unwrap();
/// builder.primitive(Primitive::Integer(Integer::from(1_u8))).unwrap();
/// builder.primitive(Primitive::Bool(true)).unwrap();
/// builder.end_nested().unwrap();
///
/// let value = builder.finish().unwrap();
/// assert_eq!(value.to_string(), "[1,true]");
/// ```
#[derive(Debug, Default)]
pub struct ValueBuilder {
    tree: TreeBuilder<'static>,
}

impl ValueBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once a complete root value has been assembled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.tree.is_complete()
    }

    /// Returns the assembled value.
    ///
    /// # Errors
    ///
    /// Fails if no value was emitted or a container is still open.
    pub fn finish(self) -> Result<Value<'static>> {
        self.tree.finish().map_err(Error::custom)
    }
}

impl Emitter for ValueBuilder {
    fn primitive(&mut self, value: Primitive<'_>) -> Result<()> {
        self.tree
            .value(Value::from(value.into_owned()))
            .map_err(Error::custom)
    }

    fn attribute(&mut self, attribute: &Attribute<'_>) -> Result<()> {
        self.tree.attribute(attribute.clone().into_owned());
        Ok(())
    }

    fn begin_list(&mut self) -> Result<()> {
        self.tree.begin(Container::List).map_err(Error::custom)
    }

    fn begin_tuple(&mut self) -> Result<()> {
        self.tree.begin(Container::Tuple).map_err(Error::custom)
    }

    fn begin_map(&mut self) -> Result<()> {
        self.tree.begin(Container::Map).map_err(Error::custom)
    }

    fn begin_named(&mut self, name: &str, kind: NamedKind) -> Result<()> {
        self.tree
            .begin(Container::Named {
                name: Cow::Owned(name.to_owned()),
                kind,
            })
            .map_err(Error::custom)
    }

    fn end_nested(&mut self) -> Result<()> {
        self.tree.end().map_err(Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Integer;

    #[test]
    fn test_builds_nested_tree() {
        let mut builder = ValueBuilder::new();
        builder.begin_named("Point", NamedKind::Map).unwrap();
        builder
            .primitive(Primitive::Identifier(Cow::Borrowed("x")))
            .unwrap();
        builder
            .primitive(Primitive::Integer(Integer::from(1_i32)))
            .unwrap();
        builder
            .primitive(Primitive::Identifier(Cow::Borrowed("tags")))
            .unwrap();
        builder.begin_list().unwrap();
        builder.end_nested().unwrap();
        builder.end_nested().unwrap();
        assert!(builder.is_complete());

        let value = builder.finish().unwrap();
        let named = value.as_named().unwrap();
        assert_eq!(named.name, "Point");
        let map = named.contents.as_map().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get_by_name("x"), Some(&Value::Integer(Integer::I32(1))));
    }

    #[test]
    fn test_attributes_wrap_following_value() {
        let mut builder = ValueBuilder::new();
        builder.begin_list().unwrap();
        builder.attribute(&Attribute::new("deprecated")).unwrap();
        builder.begin_tuple().unwrap();
        builder.primitive(Primitive::Bool(true)).unwrap();
        builder.end_nested().unwrap();
        builder.primitive(Primitive::Bool(false)).unwrap();
        builder.end_nested().unwrap();

        let value = builder.finish().unwrap();
        let list = value.as_list().unwrap();
        match &list[0] {
            Value::Annotated(annotated) => {
                assert_eq!(annotated.attributes[0].name, "deprecated");
                assert!(matches!(*annotated.value, Value::Tuple(_)));
            }
            other => panic!("expected annotated value, got {other:?}"),
        }
        assert_eq!(list[1], Value::Bool(false));
    }

    #[test]
    fn test_empty_tuple_is_unit() {
        let mut builder = ValueBuilder::new();
        builder.begin_tuple().unwrap();
        builder.end_nested().unwrap();
        assert_eq!(builder.finish().unwrap(), Value::Unit);
    }

    #[test]
    fn test_malformed_sequences_fail() {
        assert!(ValueBuilder::new().finish().is_err());
        assert!(ValueBuilder::new().end_nested().is_err());

        let mut builder = ValueBuilder::new();
        builder.begin_map().unwrap();
        builder.primitive(Primitive::Unit).unwrap();
        assert!(builder.end_nested().is_err());

        let mut builder = ValueBuilder::new();
        builder.primitive(Primitive::Unit).unwrap();
        assert!(builder.primitive(Primitive::Unit).is_err());
    }

    #[test]
    fn test_emit_value_replays_tree() {
        let value: Value<'static> = "Foo { a: [1, 2], b: #[x] () }".parse().unwrap();
        let mut builder = ValueBuilder::new();
        emit_value(&value, &mut builder).unwrap();
        assert_eq!(builder.finish().unwrap(), value);
    }
}
