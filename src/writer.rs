//! RSN text output.
//!
//! [`Writer`] is an [`Emitter`] that renders values as RSN text into any
//! [`fmt::Write`] sink. It backs the serializer, [`Value`]'s `Display`
//! implementation, and [`reformat`].
//!
//! Compact output contains no whitespace except where an implicit root map
//! separates its entries with newlines. Pretty output puts every list element
//! and map entry on its own line, indented per nesting level, and ends
//! non-empty containers with a trailing comma.
//!
//! ## Examples
//!
//! ```rust
//! use serde_rsn::{ParseConfig, WriteConfig};
//! use serde_rsn::writer::reformat;
//!
//! let pretty = reformat("[1,2]", &ParseConfig::default(), &WriteConfig::pretty()).unwrap();
//! assert_eq!(pretty, "[\n  1,\n  2,\n]");
//!
//! let compact = reformat(pretty.as_str(), &ParseConfig::default(), &WriteConfig::new()).unwrap();
//! assert_eq!(compact, "[1,2]");
//! ```

use crate::emit::{emit_value, Emitter};
use crate::options::{KeywordEscape, OutputMode};
use crate::error::ParseError;
use crate::parser::{Attribute, Event, EventKind, NamedKind, Parser, Primitive};
use crate::{Error, Integer, ParseConfig, Result, Value, WriteConfig};
use std::fmt::{self, Write};
use std::mem;
use unicode_xid::UnicodeXID;

const __: u8 = 0;
const XX: u8 = b'x';

/// Escape codes for ASCII. `0` writes the character as-is, `x` writes a
/// `\xNN` escape, anything else is written after a backslash.
static ESCAPE: [u8; 128] = [
    //   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
    b'0', XX, XX, XX, XX, XX, XX, XX, XX, b't', b'n', XX, XX, b'r', XX, XX, // 0
    XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, // 1
    __, __, b'"', __, __, __, __, __, __, __, __, __, __, __, __, __, // 2
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 3
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 4
    __, __, __, __, __, __, __, __, __, __, __, __, b'\\', __, __, __, // 5
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 6
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, XX, // 7
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MapPosition {
    Empty,
    AfterKey,
    AfterEntry,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Frame {
    Sequence { closer: char, empty: bool },
    /// `closer` is `None` for a root map written without braces.
    Map { closer: Option<char>, position: MapPosition },
}

/// Writes RSN text into a [`fmt::Write`] sink.
///
/// # Examples
///
/// ```rust
/// use serde_rsn::{Value, WriteConfig, Writer};
///
/// let value: Value = "Point(1, 2)".parse().unwrap();
///
/// let mut writer = Writer::new(String::new(), &WriteConfig::new());
/// writer.write_value(&value).unwrap();
/// assert_eq!(writer.finish().unwrap(), "Point(1,2)");
/// ```
#[derive(Debug)]
pub struct Writer<W> {
    output: W,
    config: WriteConfig,
    nested: Vec<Frame>,
    attribute_pending: bool,
}

impl<W: Write> Writer<W> {
    pub fn new(output: W, config: &WriteConfig) -> Self {
        Writer {
            output,
            config: config.clone(),
            nested: Vec::new(),
            attribute_pending: false,
        }
    }

    #[must_use]
    pub fn config(&self) -> &WriteConfig {
        &self.config
    }

    /// Returns the sink without checking that every container was closed.
    pub fn into_inner(self) -> W {
        self.output
    }

    /// Returns the sink.
    ///
    /// # Errors
    ///
    /// Fails if a container is still open.
    pub fn finish(self) -> Result<W> {
        if !self.nested.is_empty() {
            return Err(Error::custom(format!(
                "{} container(s) left open",
                self.nested.len()
            )));
        }
        Ok(self.output)
    }

    /// Writes a complete value.
    ///
    /// # Errors
    ///
    /// Fails only if the sink fails.
    pub fn write_value(&mut self, value: &Value<'_>) -> Result<()> {
        emit_value(value, self)
    }

    /// Writes one parser event. Map markers and comments produce no output.
    ///
    /// # Errors
    ///
    /// Fails if the sink fails or the event closes a container that is not open.
    pub fn write_event(&mut self, event: &EventKind<'_>) -> Result<()> {
        match event {
            EventKind::Primitive(primitive) => self.primitive(primitive.borrowed()),
            EventKind::StartList => self.begin_list(),
            EventKind::StartTuple => self.begin_tuple(),
            EventKind::StartMap => self.begin_map(),
            EventKind::StartNamed { name, kind } => self.begin_named(name.name, *kind),
            EventKind::EndList | EventKind::EndTuple | EventKind::EndMap | EventKind::EndNamed => {
                self.end_nested()
            }
            EventKind::Attribute(attribute) => self.attribute(attribute),
            EventKind::MapKey | EventKind::MapValue | EventKind::Comment(_) => Ok(()),
        }
    }

    fn indent_width(&self) -> usize {
        match self.config.mode {
            OutputMode::Pretty { indent_width } => indent_width,
            OutputMode::Compact => 0,
        }
    }

    fn indent_level(&self) -> usize {
        self.nested
            .iter()
            .filter(|frame| !matches!(frame, Frame::Map { closer: None, .. }))
            .count()
    }

    fn newline(&mut self, level: usize) -> fmt::Result {
        self.output.write_str(&self.config.newline)?;
        if let Some(indentation) = &self.config.indentation {
            for _ in 0..level {
                self.output.write_str(indentation)?;
            }
            return Ok(());
        }
        for _ in 0..level * self.indent_width() {
            self.output.write_char(' ')?;
        }
        Ok(())
    }

    /// Writes whatever separates the previous item from the next value.
    fn prepare(&mut self) -> fmt::Result {
        if mem::take(&mut self.attribute_pending) {
            return Ok(());
        }
        let pretty = self.config.is_pretty();
        let level = self.indent_level();
        let Some(frame) = self.nested.last_mut() else {
            return Ok(());
        };
        match frame {
            Frame::Sequence { empty, .. } => {
                if !mem::replace(empty, false) {
                    self.output.write_char(',')?;
                }
                if pretty {
                    self.newline(level)?;
                }
            }
            Frame::Map { closer, position } => match *position {
                MapPosition::AfterKey => {
                    *position = MapPosition::AfterEntry;
                    self.output
                        .write_str(if pretty { ": " } else { ":" })?;
                }
                MapPosition::Empty | MapPosition::AfterEntry => {
                    let first = *position == MapPosition::Empty;
                    *position = MapPosition::AfterKey;
                    if closer.is_none() {
                        if !first {
                            self.output.write_str(&self.config.newline)?;
                        }
                    } else {
                        if !first {
                            self.output.write_char(',')?;
                        }
                        if pretty {
                            self.newline(level)?;
                        }
                    }
                }
            },
        }
        Ok(())
    }

    fn in_key_position(&self) -> bool {
        matches!(
            self.nested.last(),
            Some(Frame::Map {
                position: MapPosition::AfterKey,
                ..
            })
        )
    }

    fn implicit_root(&self) -> bool {
        self.config.implicit_map_at_root && self.nested.is_empty() && !self.attribute_pending
    }

    fn open(&mut self, opener: &str, frame: Frame) -> fmt::Result {
        self.output.write_str(opener)?;
        self.nested.push(frame);
        Ok(())
    }

    fn close(&mut self, frame: Frame) -> fmt::Result {
        let pretty = self.config.is_pretty();
        let level = self.indent_level();
        let (closer, has_items) = match frame {
            Frame::Sequence { closer, empty } => (Some(closer), !empty),
            Frame::Map { closer, position } => (closer, position != MapPosition::Empty),
        };
        let Some(closer) = closer else {
            // An implicit root map with no entries would otherwise write nothing.
            return if has_items { Ok(()) } else { self.output.write_str("{}") };
        };
        if pretty && has_items {
            self.output.write_char(',')?;
            self.newline(level)?;
        }
        self.output.write_char(closer)
    }

    fn write_primitive(&mut self, primitive: &Primitive<'_>) -> fmt::Result {
        match primitive {
            Primitive::Unit => self.output.write_str("()"),
            Primitive::Bool(value) => self.output.write_str(if *value { "true" } else { "false" }),
            Primitive::Integer(value) => self.write_integer(value),
            Primitive::Float(value) => write_float(&mut self.output, *value),
            Primitive::Char(value) => {
                self.output.write_char('\'')?;
                escape_text(&mut self.output, value.encode_utf8(&mut [0; 4]), '\'')?;
                self.output.write_char('\'')
            }
            Primitive::String(value) => write_string(&mut self.output, value),
            Primitive::Bytes(value) => write_bytes(&mut self.output, value),
            Primitive::Identifier(name) => self.write_identifier(name),
        }
    }

    fn write_integer(&mut self, value: &Integer) -> fmt::Result {
        write!(self.output, "{value}")?;
        match value.suffix() {
            Some(suffix) if self.config.integer_suffixes && !value.is_default_width() => {
                self.output.write_str(suffix)
            }
            _ => Ok(()),
        }
    }

    fn write_identifier(&mut self, name: &str) -> fmt::Result {
        if !is_identifier(name) {
            return write_string(&mut self.output, name);
        }
        if is_keyword(name) {
            if self.config.keyword_escape == KeywordEscape::Quoted && self.in_key_position() {
                return write_string(&mut self.output, name);
            }
            self.output.write_str("r#")?;
        }
        self.output.write_str(name)
    }

    fn write_name(&mut self, name: &str) -> fmt::Result {
        if is_keyword(name) {
            self.output.write_str("r#")?;
        }
        self.output.write_str(name)
    }

    fn write_attribute(&mut self, attribute: &Attribute<'_>) -> fmt::Result {
        self.output.write_str("#[")?;
        self.write_name(&attribute.name)?;
        if !attribute.args.is_empty() {
            self.output.write_char('(')?;
            for (index, arg) in attribute.args.iter().enumerate() {
                if index > 0 {
                    self.output
                        .write_str(if self.config.is_pretty() { ", " } else { "," })?;
                }
                self.write_primitive(arg)?;
            }
            self.output.write_char(')')?;
        }
        self.output.write_char(']')?;
        if self.config.is_pretty() {
            self.output.write_char(' ')?;
        }
        Ok(())
    }
}

fn sink_error(_: fmt::Error) -> Error {
    Error::custom("failed to write to the output")
}

impl<W: Write> Emitter for Writer<W> {
    fn primitive(&mut self, value: Primitive<'_>) -> Result<()> {
        self.prepare().map_err(sink_error)?;
        self.write_primitive(&value).map_err(sink_error)
    }

    fn attribute(&mut self, attribute: &Attribute<'_>) -> Result<()> {
        check_name(&attribute.name)?;
        if attribute.args.contains(&Primitive::Unit) {
            return Err(Error::custom(format!(
                "attribute `{}` cannot take `()` as an argument",
                attribute.name
            )));
        }
        self.prepare().map_err(sink_error)?;
        self.write_attribute(attribute).map_err(sink_error)?;
        self.attribute_pending = true;
        Ok(())
    }

    fn begin_list(&mut self) -> Result<()> {
        self.prepare().map_err(sink_error)?;
        self.open(
            "[",
            Frame::Sequence {
                closer: ']',
                empty: true,
            },
        )
        .map_err(sink_error)
    }

    fn begin_tuple(&mut self) -> Result<()> {
        self.prepare().map_err(sink_error)?;
        self.open(
            "(",
            Frame::Sequence {
                closer: ')',
                empty: true,
            },
        )
        .map_err(sink_error)
    }

    fn begin_map(&mut self) -> Result<()> {
        let closer = if self.implicit_root() { None } else { Some('}') };
        self.prepare().map_err(sink_error)?;
        self.open(
            if closer.is_some() { "{" } else { "" },
            Frame::Map {
                closer,
                position: MapPosition::Empty,
            },
        )
        .map_err(sink_error)
    }

    fn begin_named(&mut self, name: &str, kind: NamedKind) -> Result<()> {
        if kind == NamedKind::Map && self.implicit_root() {
            return self.begin_map();
        }
        check_name(name)?;
        self.prepare().map_err(sink_error)?;
        self.write_name(name).map_err(sink_error)?;
        let frame = match kind {
            NamedKind::Tuple => Frame::Sequence {
                closer: ')',
                empty: true,
            },
            NamedKind::Map => Frame::Map {
                closer: Some('}'),
                position: MapPosition::Empty,
            },
        };
        let opener = match kind {
            NamedKind::Tuple => "(",
            NamedKind::Map if self.config.is_pretty() => " {",
            NamedKind::Map => "{",
        };
        self.open(opener, frame).map_err(sink_error)
    }

    fn end_nested(&mut self) -> Result<()> {
        let frame = self
            .nested
            .pop()
            .ok_or_else(|| Error::custom("container closed while none is open"))?;
        self.close(frame).map_err(sink_error)
    }
}

/// Names of named values and attributes have no quoted form.
fn check_name(name: &str) -> Result<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(Error::custom(format!("`{name}` is not a valid identifier")))
    }
}

fn is_keyword(name: &str) -> bool {
    matches!(name, "true" | "false" | "inf" | "NaN")
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_xid_start() => {
            chars.all(UnicodeXID::is_xid_continue)
        }
        _ => false,
    }
}

fn write_float<W: Write>(output: &mut W, value: f64) -> fmt::Result {
    if value.is_nan() {
        output.write_str("NaN")
    } else if value.is_infinite() {
        output.write_str(if value > 0.0 { "inf" } else { "-inf" })
    } else {
        write!(output, "{value:?}")
    }
}

fn write_string<W: Write>(output: &mut W, text: &str) -> fmt::Result {
    output.write_char('"')?;
    escape_text(output, text, '"')?;
    output.write_char('"')
}

/// Writes `text` with ASCII escapes applied; `quote` is always escaped.
fn escape_text<W: Write>(output: &mut W, text: &str, quote: char) -> fmt::Result {
    let mut start = 0;
    for (index, ch) in text.char_indices() {
        let code = if ch == quote {
            ch as u8
        } else if ch.is_ascii() {
            ESCAPE[ch as usize]
        } else {
            __
        };
        if code == __ {
            continue;
        }
        output.write_str(&text[start..index])?;
        start = index + ch.len_utf8();
        if code == XX {
            write!(output, "\\x{:02x}", ch as u8)?;
        } else {
            output.write_char('\\')?;
            output.write_char(char::from(code))?;
        }
    }
    output.write_str(&text[start..])
}

fn write_bytes<W: Write>(output: &mut W, bytes: &[u8]) -> fmt::Result {
    output.write_str("b\"")?;
    for &byte in bytes {
        match ESCAPE.get(usize::from(byte)).copied() {
            Some(__) => output.write_char(char::from(byte))?,
            Some(XX) | None => write!(output, "\\x{byte:02x}")?,
            Some(code) => {
                output.write_char('\\')?;
                output.write_char(char::from(code))?;
            }
        }
    }
    output.write_char('"')
}

/// Writes `value` into a new `String`.
///
/// # Errors
///
/// Fails only if the value cannot be written, which a `String` sink never causes.
pub fn to_string(value: &Value<'_>, config: &WriteConfig) -> Result<String> {
    let mut writer = Writer::new(String::new(), config);
    writer.write_value(value)?;
    writer.finish()
}

/// Writes every event from `events`, stopping at the first parse error.
///
/// # Errors
///
/// Returns the first parse error, tagged with its location, or any error
/// from [`Writer::write_event`].
///
/// # Examples
///
/// ```rust
/// use serde_rsn::parser::Parser;
/// use serde_rsn::writer::write_events;
/// use serde_rsn::{ParseConfig, WriteConfig, Writer};
///
/// let mut writer = Writer::new(String::new(), &WriteConfig::new());
/// write_events(&mut writer, Parser::new("( 1 , [ ] )", ParseConfig::default())).unwrap();
/// assert_eq!(writer.finish().unwrap(), "(1,[])");
/// ```
pub fn write_events<'s, W, I>(writer: &mut Writer<W>, events: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = std::result::Result<Event<'s>, ParseError>>,
{
    for event in events {
        let event = event.map_err(Error::from_parse)?;
        writer
            .write_event(&event.kind)
            .map_err(|err| err.at(event.location))?;
    }
    Ok(())
}

/// Parses `source` and writes it back with `write_config`'s layout.
///
/// Comments are not preserved.
///
/// # Errors
///
/// Returns the first parse error in `source`.
pub fn reformat(source: &str, parse_config: &ParseConfig, write_config: &WriteConfig) -> Result<String> {
    let mut writer = Writer::new(String::with_capacity(source.len()), write_config);
    write_events(&mut writer, Parser::new(source, parse_config.clone()))?;
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    fn compact(source: &str) -> String {
        reformat(source, &ParseConfig::default(), &WriteConfig::new()).unwrap()
    }

    fn pretty(source: &str) -> String {
        reformat(source, &ParseConfig::default(), &WriteConfig::pretty()).unwrap()
    }

    fn write(primitive: Primitive<'_>, config: &WriteConfig) -> String {
        let mut writer = Writer::new(String::new(), config);
        writer.primitive(primitive).unwrap();
        writer.finish().unwrap()
    }

    #[test]
    fn test_pretty_list() {
        assert_eq!(pretty("[1, 2]"), "[\n  1,\n  2,\n]");
        assert_eq!(pretty("[]"), "[]");
        assert_eq!(pretty("{}"), "{}");
    }

    #[test]
    fn test_compact_containers() {
        assert_eq!(compact("{ a : 1 , b : [ 2 , 3 , ] }"), "{a:1,b:[2,3]}");
        assert_eq!(compact("Data { x: 1, y: 2 }"), "Data{x:1,y:2}");
        assert_eq!(compact("Pair ( 1 , (2, 3) )"), "Pair(1,(2,3))");
        assert_eq!(compact("( )"), "()");
    }

    #[test]
    fn test_pretty_nested() {
        assert_eq!(
            pretty("Data { x: 1, inner: (1, []) }"),
            "Data {\n  x: 1,\n  inner: (\n    1,\n    [],\n  ),\n}"
        );
        assert_eq!(
            reformat("[1]", &ParseConfig::default(), &WriteConfig::new().with_indent(4)).unwrap(),
            "[\n    1,\n]"
        );
    }

    #[test]
    fn test_string_escapes() {
        let config = WriteConfig::new();
        assert_eq!(
            write(Primitive::String(Cow::Borrowed("a\"b\\c\n\t\r\0\u{1}\u{7f}é")), &config),
            r#""a\"b\\c\n\t\r\0\x01\x7fé""#
        );
        assert_eq!(write(Primitive::Char('\''), &config), r"'\''");
        assert_eq!(write(Primitive::Char('"'), &config), r#"'\"'"#);
        assert_eq!(write(Primitive::Char('é'), &config), "'é'");
        assert_eq!(
            write(Primitive::Bytes(Cow::Borrowed(&b"a\"\x00\xff"[..])), &config),
            r#"b"a\"\0\xff""#
        );
    }

    #[test]
    fn test_numbers() {
        let config = WriteConfig::new();
        assert_eq!(write(Primitive::Float(1.0), &config), "1.0");
        assert_eq!(write(Primitive::Float(-0.5), &config), "-0.5");
        assert_eq!(write(Primitive::Float(f64::NAN), &config), "NaN");
        assert_eq!(write(Primitive::Float(f64::NEG_INFINITY), &config), "-inf");
        assert_eq!(write(Primitive::Integer(Integer::U8(5)), &config), "5");

        let suffixed = WriteConfig::new().with_integer_suffixes(true);
        assert_eq!(write(Primitive::Integer(Integer::U8(5)), &suffixed), "5u8");
        assert_eq!(write(Primitive::Integer(Integer::I16(-5)), &suffixed), "-5i16");
        assert_eq!(write(Primitive::Integer(Integer::I64(-5)), &suffixed), "-5");
    }

    #[test]
    fn test_keywords_and_invalid_identifiers() {
        assert_eq!(compact("{r#true: r#NaN}"), "{r#true:r#NaN}");

        let quoted = WriteConfig::new().with_keyword_escape(KeywordEscape::Quoted);
        let output = reformat("{r#true: r#inf}", &ParseConfig::default(), &quoted).unwrap();
        assert_eq!(output, "{\"true\":r#inf}");

        let mut writer = Writer::new(String::new(), &WriteConfig::new());
        writer.begin_map().unwrap();
        writer
            .primitive(Primitive::Identifier(Cow::Borrowed("not an ident")))
            .unwrap();
        writer.primitive(Primitive::Unit).unwrap();
        writer.end_nested().unwrap();
        assert_eq!(writer.finish().unwrap(), "{\"not an ident\":()}");
    }

    #[test]
    fn test_attributes() {
        assert_eq!(compact("#[a] [#[b(1, \"x\")] 2]"), "#[a][#[b(1,\"x\")]2]");
        assert_eq!(pretty("[#[b] 2]"), "[\n  #[b] 2,\n]");
        assert_eq!(compact("{#[k] a: 1}"), "{#[k]a:1}");
    }

    #[test]
    fn test_implicit_root_map() {
        let config = WriteConfig::new().with_implicit_map_at_root(true);
        let output = reformat("{a: 1, b: [2]}", &ParseConfig::default(), &config).unwrap();
        assert_eq!(output, "a:1\nb:[2]");

        let config = WriteConfig::pretty().with_implicit_map_at_root(true);
        let output = reformat("Data {a: 1, b: [2]}", &ParseConfig::default(), &config).unwrap();
        assert_eq!(output, "a: 1\nb: [\n  2,\n]");

        let parse = ParseConfig::default().with_implicit_map_at_root(true);
        assert_eq!(
            reformat(&output, &parse, &WriteConfig::new()).unwrap(),
            "{a:1,b:[2]}"
        );
    }

    #[test]
    fn test_empty_implicit_root_map() {
        let config = WriteConfig::new().with_implicit_map_at_root(true);
        let output = reformat("Data {}", &ParseConfig::default(), &config).unwrap();
        assert_eq!(output, "{}");

        let parse = ParseConfig::default().with_implicit_map_at_root(true);
        assert_eq!(Value::parse(&output, &parse).unwrap(), Value::Map(crate::Map::new()));
    }

    #[test]
    fn test_custom_indentation_and_newline() {
        let config = WriteConfig::new().with_indentation("\t").with_newline("\r\n");
        assert!(config.is_pretty());
        let output = reformat("[1, [2]]", &ParseConfig::default(), &config).unwrap();
        assert_eq!(output, "[\r\n\t1,\r\n\t[\r\n\t\t2,\r\n\t],\r\n]");
        assert_eq!(
            reformat(&output, &ParseConfig::default(), &WriteConfig::new()).unwrap(),
            "[1,[2]]"
        );

        let config = WriteConfig::new()
            .with_implicit_map_at_root(true)
            .with_newline("\r\n");
        let output = reformat("{a: 1, b: 2}", &ParseConfig::default(), &config).unwrap();
        assert_eq!(output, "a:1\r\nb:2");
    }

    #[test]
    fn test_names_must_be_identifiers() {
        use crate::value::{Named, StructContents};

        for name in ["two words", "", "1st"] {
            let value = Value::Named(Named::new(name, StructContents::Tuple(crate::List::new())));
            assert!(to_string(&value, &WriteConfig::new()).is_err(), "{name:?}");
        }
        let value = Value::Named(Named::new("true", StructContents::Map(crate::Map::new())));
        assert_eq!(to_string(&value, &WriteConfig::new()).unwrap(), "r#true{}");

        let mut writer = Writer::new(String::new(), &WriteConfig::new());
        assert!(writer.attribute(&Attribute::new("not ok")).is_err());
        assert!(writer
            .attribute(&Attribute::new("since").with_arg(Primitive::Unit))
            .is_err());
        assert_eq!(writer.into_inner(), "");
    }

    #[test]
    fn test_unbalanced_emitter_calls() {
        let mut writer = Writer::new(String::new(), &WriteConfig::new());
        assert!(writer.end_nested().is_err());
        writer.begin_list().unwrap();
        assert!(writer.finish().is_err());
    }

    #[test]
    fn test_value_to_string() {
        let value: Value = "Point { x: 1 }".parse().unwrap();
        assert_eq!(to_string(&value, &WriteConfig::new()).unwrap(), "Point{x:1}");
        assert_eq!(
            to_string(&value, &WriteConfig::pretty().with_indent(4)).unwrap(),
            "Point {\n    x: 1,\n}"
        );
    }

    #[test]
    fn test_reformat_reports_parse_errors() {
        let err = reformat("[1, 2", &ParseConfig::default(), &WriteConfig::new()).unwrap_err();
        assert_eq!(err.offset(), Some(5));
    }
}
