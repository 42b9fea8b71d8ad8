//! Pull-style event parser.
//!
//! [`Parser`] wraps a [`Tokenizer`] and yields [`Event`]s describing a
//! depth-first walk of the document: containers open and close, primitives
//! appear in between, and map entries are framed by [`EventKind::MapKey`] and
//! [`EventKind::MapValue`] markers. Nesting is tracked on an explicit stack so
//! deeply nested input fails with [`ParseErrorKind::DepthLimitExceeded`]
//! instead of exhausting the call stack.
//!
//! ## Examples
//!
//! ```rust
//! use serde_rsn::parser::{EventKind, NamedKind, Parser, Primitive};
//! use serde_rsn::{Integer, ParseConfig};
//!
//! let kinds: Vec<_> = Parser::new("Point(1, 2)", ParseConfig::default())
//!     .map(|event| event.unwrap().kind)
//!     .collect();
//! assert!(matches!(
//!     &kinds[0],
//!     EventKind::StartNamed { name, kind: NamedKind::Tuple } if name.name == "Point"
//! ));
//! assert_eq!(kinds[1], EventKind::Primitive(Primitive::Integer(Integer::U64(1))));
//! assert_eq!(kinds[2], EventKind::Primitive(Primitive::Integer(Integer::U64(2))));
//! assert_eq!(kinds[3], EventKind::EndNamed);
//! ```

use crate::error::{Expected, Found, ParseError, ParseErrorKind, Separator};
use crate::tokenizer::{Balanced, Token, TokenKind, Tokenizer};
use crate::{Integer, ParseConfig};
use std::borrow::Cow;
use std::collections::VecDeque;
use std::ops::Range;
use tracing::{debug, trace};

/// One step of the parser's traversal.
#[derive(Clone, Debug, PartialEq)]
pub struct Event<'s> {
    pub kind: EventKind<'s>,
    pub location: Range<usize>,
}

impl<'s> Event<'s> {
    pub fn new(kind: EventKind<'s>, location: Range<usize>) -> Self {
        Event { kind, location }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EventKind<'s> {
    Primitive(Primitive<'s>),
    StartList,
    EndList,
    /// An anonymous tuple such as `(1, 2)`. `()` is [`Primitive::Unit`].
    StartTuple,
    EndTuple,
    StartMap,
    EndMap,
    StartNamed {
        name: Name<'s>,
        kind: NamedKind,
    },
    EndNamed,
    /// Precedes every map key.
    MapKey,
    /// Precedes every map value; located on the `:`.
    MapValue,
    /// Annotates the value that follows.
    Attribute(Attribute<'s>),
    /// Only produced when [`ParseConfig::include_comments`] is set.
    Comment(&'s str),
}

/// The identifier of a named tuple or named map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Name<'s> {
    pub name: &'s str,
    pub location: Range<usize>,
}

/// Whether a named value holds positional or keyed contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NamedKind {
    Tuple,
    Map,
}

/// A scalar value.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive<'s> {
    Unit,
    Bool(bool),
    Integer(Integer),
    Float(f64),
    Char(char),
    String(Cow<'s, str>),
    Bytes(Cow<'s, [u8]>),
    /// A bare name, such as a unit variant.
    Identifier(Cow<'s, str>),
}

impl Primitive<'_> {
    /// Copies any borrowed text so the primitive no longer borrows the source.
    #[must_use]
    pub fn into_owned(self) -> Primitive<'static> {
        match self {
            Primitive::Unit => Primitive::Unit,
            Primitive::Bool(value) => Primitive::Bool(value),
            Primitive::Integer(value) => Primitive::Integer(value),
            Primitive::Float(value) => Primitive::Float(value),
            Primitive::Char(value) => Primitive::Char(value),
            Primitive::String(value) => Primitive::String(Cow::Owned(value.into_owned())),
            Primitive::Bytes(value) => Primitive::Bytes(Cow::Owned(value.into_owned())),
            Primitive::Identifier(value) => Primitive::Identifier(Cow::Owned(value.into_owned())),
        }
    }

    /// Reborrows the primitive for a shorter lifetime without copying.
    #[must_use]
    pub fn borrowed(&self) -> Primitive<'_> {
        match self {
            Primitive::Unit => Primitive::Unit,
            Primitive::Bool(value) => Primitive::Bool(*value),
            Primitive::Integer(value) => Primitive::Integer(value.clone()),
            Primitive::Float(value) => Primitive::Float(*value),
            Primitive::Char(value) => Primitive::Char(*value),
            Primitive::String(value) => Primitive::String(Cow::Borrowed(&**value)),
            Primitive::Bytes(value) => Primitive::Bytes(Cow::Borrowed(&**value)),
            Primitive::Identifier(value) => Primitive::Identifier(Cow::Borrowed(&**value)),
        }
    }
}

/// An annotation such as `#[deprecated]` or `#[since(1, "beta")]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute<'s> {
    pub name: Cow<'s, str>,
    pub args: Vec<Primitive<'s>>,
}

impl<'s> Attribute<'s> {
    pub fn new(name: impl Into<Cow<'s, str>>) -> Self {
        Attribute {
            name: name.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_arg(mut self, arg: Primitive<'s>) -> Self {
        self.args.push(arg);
        self
    }

    #[must_use]
    pub fn into_owned(self) -> Attribute<'static> {
        Attribute {
            name: Cow::Owned(self.name.into_owned()),
            args: self.args.into_iter().map(Primitive::into_owned).collect(),
        }
    }

    #[must_use]
    pub fn borrowed(&self) -> Attribute<'_> {
        Attribute {
            name: Cow::Borrowed(&*self.name),
            args: self.args.iter().map(Primitive::borrowed).collect(),
        }
    }
}

/// Progress through a comma-separated sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ListState {
    /// No element seen yet.
    Empty,
    /// An element was read; a comma or the closer comes next.
    AfterValue,
    /// A comma was read; an element or the closer comes next.
    AfterComma,
}

/// Progress through the entries of a map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MapState {
    Empty,
    ReadingKey,
    ExpectingColon,
    ReadingValue,
    AfterValue,
    AfterComma,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NamedState {
    Tuple(ListState),
    Map(MapState),
}

/// One open container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NestedState {
    List(ListState),
    Tuple(ListState),
    Map(MapState),
    Named(NamedState),
    /// A root map written without braces.
    ImplicitMap(MapState),
}

impl NestedState {
    const fn closer(self) -> Option<Balanced> {
        match self {
            NestedState::List(_) => Some(Balanced::Bracket),
            NestedState::Tuple(_) | NestedState::Named(NamedState::Tuple(_)) => {
                Some(Balanced::Paren)
            }
            NestedState::Map(_) | NestedState::Named(NamedState::Map(_)) => Some(Balanced::Brace),
            NestedState::ImplicitMap(_) => None,
        }
    }

    const fn end_event(self) -> EventKind<'static> {
        match self {
            NestedState::List(_) => EventKind::EndList,
            NestedState::Tuple(_) => EventKind::EndTuple,
            NestedState::Map(_) | NestedState::ImplicitMap(_) => EventKind::EndMap,
            NestedState::Named(_) => EventKind::EndNamed,
        }
    }

    const fn with_list(self, state: ListState) -> Self {
        match self {
            NestedState::List(_) => NestedState::List(state),
            NestedState::Tuple(_) => NestedState::Tuple(state),
            NestedState::Named(NamedState::Tuple(_)) => NestedState::Named(NamedState::Tuple(state)),
            other => other,
        }
    }

    const fn with_map(self, state: MapState) -> Self {
        match self {
            NestedState::Map(_) => NestedState::Map(state),
            NestedState::Named(NamedState::Map(_)) => NestedState::Named(NamedState::Map(state)),
            NestedState::ImplicitMap(_) => NestedState::ImplicitMap(state),
            other => other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RootState {
    AtStart,
    /// The root value has begun; once the stack empties only trailing data remains.
    Started,
}

enum Step<'s> {
    Emit(Event<'s>),
    Again,
    Done,
}

type Result<T> = std::result::Result<T, ParseError>;

/// Produces [`Event`]s from RSN source text.
///
/// Once the root value is complete the parser yields `None`, or a single
/// [`ParseErrorKind::TrailingData`] error if more tokens follow and
/// [`ParseConfig::allow_trailing_data`] is not set. Callers that want to
/// ignore trailing data can also stop pulling once [`Parser::is_finished`]
/// returns `true`. After any error the parser yields `None`.
#[derive(Debug)]
pub struct Parser<'s> {
    tokens: Tokenizer<'s>,
    config: ParseConfig,
    nested: Vec<NestedState>,
    root: RootState,
    /// A token taken from the stream that the next state transition consumes.
    pending: Option<Token<'s>>,
    /// One token of lookahead; `Some(Ok(None))` means end of input was seen.
    /// A peeked error is only reported when the token is consumed.
    peeked: Option<Result<Option<Token<'s>>>>,
    comments: VecDeque<Token<'s>>,
    attributes_pending: bool,
    failed: bool,
}

impl<'s> Parser<'s> {
    #[must_use]
    pub fn new(source: &'s str, config: ParseConfig) -> Self {
        Parser {
            tokens: Tokenizer::new(source, config.include_comments),
            config,
            nested: Vec::new(),
            root: RootState::AtStart,
            pending: None,
            peeked: None,
            comments: VecDeque::new(),
            attributes_pending: false,
            failed: false,
        }
    }

    #[must_use]
    pub const fn source(&self) -> &'s str {
        self.tokens.source()
    }

    #[must_use]
    pub const fn config(&self) -> &ParseConfig {
        &self.config
    }

    /// The number of currently open containers.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.nested.len()
    }

    /// Returns `true` once the root value has been fully emitted.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.root == RootState::Started && self.nested.is_empty()
    }

    fn end_of_input(&self) -> Range<usize> {
        let end = self.source().len();
        end..end
    }

    fn read_token(&mut self) -> Result<Option<Token<'s>>> {
        loop {
            match self.tokens.next() {
                None => return Ok(None),
                Some(Err(err)) => return Err(ParseError::from_tokenizer(err)),
                Some(Ok(token)) => match token.kind {
                    TokenKind::Whitespace(_) => {}
                    TokenKind::Comment(_) => self.comments.push_back(token),
                    _ => return Ok(Some(token)),
                },
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Token<'s>>> {
        if let Some(token) = self.pending.take() {
            return Ok(Some(token));
        }
        if let Some(peeked) = self.peeked.take() {
            return peeked;
        }
        self.read_token()
    }

    /// Looks at the next token. An error reads as `None` here and is
    /// returned by [`Parser::next_token`].
    fn peek_kind(&mut self) -> Option<&TokenKind<'s>> {
        if self.peeked.is_none() {
            self.peeked = Some(self.read_token());
        }
        match self.peeked.as_ref() {
            Some(Ok(Some(token))) => Some(&token.kind),
            _ => None,
        }
    }

    fn peek_opener(&mut self) -> Option<Balanced> {
        match self.peek_kind() {
            Some(TokenKind::Open(balanced)) => Some(*balanced),
            _ => None,
        }
    }

    fn next_comment(&mut self) -> Result<Option<Event<'s>>> {
        if !self.config.include_comments {
            return Ok(None);
        }
        if self.comments.is_empty() && self.pending.is_none() {
            self.peek_kind();
        }
        Ok(self.comments.pop_front().map(|token| match token.kind {
            TokenKind::Comment(text) => Event::new(EventKind::Comment(text), token.location),
            _ => Event::new(EventKind::Comment(""), token.location),
        }))
    }

    fn set_top(&mut self, state: NestedState) {
        if let Some(top) = self.nested.last_mut() {
            *top = state;
        }
    }

    fn push(&mut self, state: NestedState, location: &Range<usize>) -> Result<()> {
        if self.nested.len() >= self.config.max_depth {
            return Err(ParseError::new(
                ParseErrorKind::DepthLimitExceeded {
                    limit: self.config.max_depth,
                },
                location.clone(),
            ));
        }
        self.nested.push(state);
        trace!(depth = self.nested.len(), ?state, "entered container");
        Ok(())
    }

    fn unbalanced_at_end(&self) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnbalancedNesting {
                expected: self.nested.last().and_then(|state| state.closer()),
                found: None,
                opened_at: self.tokens.unclosed().map(|(_, offset)| offset),
            },
            self.end_of_input(),
        )
    }

    fn unexpected(expected: &'static [Expected], token: &Token<'_>) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnexpectedToken {
                expected,
                found: found(&token.kind),
            },
            token.location.clone(),
        )
    }

    fn misplaced(token: &Token<'_>) -> Option<ParseError> {
        let separator = match token.kind {
            TokenKind::Comma => Separator::Comma,
            TokenKind::Colon => Separator::Colon,
            _ => return None,
        };
        Some(ParseError::new(
            ParseErrorKind::MisplacedSeparator(separator),
            token.location.clone(),
        ))
    }

    fn close(&mut self, found: Balanced, location: Range<usize>) -> Result<Step<'s>> {
        let Some(&state) = self.nested.last() else {
            return Err(ParseError::new(
                ParseErrorKind::UnbalancedNesting {
                    expected: None,
                    found: Some(found),
                    opened_at: None,
                },
                location,
            ));
        };
        if state.closer() != Some(found) {
            return Err(ParseError::new(
                ParseErrorKind::UnbalancedNesting {
                    expected: state.closer(),
                    found: Some(found),
                    opened_at: self.tokens.unclosed().map(|(_, offset)| offset),
                },
                location,
            ));
        }
        if self.attributes_pending {
            return Err(ParseError::new(
                ParseErrorKind::UnexpectedToken {
                    expected: &[Expected::Value],
                    found: Found::Close(found),
                },
                location,
            ));
        }
        self.nested.pop();
        trace!(depth = self.nested.len(), "left container");
        Ok(Step::Emit(Event::new(state.end_event(), location)))
    }

    fn advance(&mut self) -> Result<Option<Event<'s>>> {
        loop {
            if let Some(comment) = self.next_comment()? {
                return Ok(Some(comment));
            }
            let step = match self.nested.last().copied() {
                None => self.advance_root()?,
                Some(state @ (NestedState::List(list) | NestedState::Tuple(list))) => {
                    self.advance_sequence(state, list)?
                }
                Some(state @ NestedState::Named(NamedState::Tuple(list))) => {
                    self.advance_sequence(state, list)?
                }
                Some(
                    state @ (NestedState::Map(map)
                    | NestedState::Named(NamedState::Map(map))
                    | NestedState::ImplicitMap(map)),
                ) => self.advance_map(state, map)?,
            };
            match step {
                Step::Emit(event) => return Ok(Some(event)),
                Step::Again => {}
                Step::Done => return Ok(None),
            }
        }
    }

    fn advance_root(&mut self) -> Result<Step<'s>> {
        if self.root == RootState::Started {
            if self.config.allow_trailing_data {
                return Ok(Step::Done);
            }
            return match self.next_token()? {
                None => Ok(Step::Done),
                Some(token) => Err(ParseError::new(
                    ParseErrorKind::TrailingData,
                    token.location,
                )),
            };
        }

        let Some(token) = self.next_token()? else {
            return Err(ParseError::new(
                ParseErrorKind::EmptyInputWhereValueExpected,
                self.end_of_input(),
            ));
        };
        match token.kind {
            TokenKind::Hash => self.attribute(token),
            TokenKind::Close(balanced) => self.close(balanced, token.location),
            TokenKind::Comma | TokenKind::Colon => Err(Self::misplaced(&token)
                .unwrap_or_else(|| Self::unexpected(&[Expected::Value], &token))),
            TokenKind::Open(_) => {
                self.root = RootState::Started;
                self.begin_value(token)
            }
            _ => {
                if self.config.allow_implicit_map_at_root
                    && !self.attributes_pending
                    && matches!(self.peek_kind(), Some(TokenKind::Colon))
                {
                    self.root = RootState::Started;
                    let start = token.location.start;
                    self.push(NestedState::ImplicitMap(MapState::Empty), &token.location)?;
                    self.pending = Some(token);
                    return Ok(Step::Emit(Event::new(EventKind::StartMap, start..start)));
                }
                self.root = RootState::Started;
                self.begin_value(token)
            }
        }
    }

    fn advance_sequence(&mut self, state: NestedState, list: ListState) -> Result<Step<'s>> {
        let closer = state.closer().unwrap_or(Balanced::Paren);
        let Some(token) = self.next_token()? else {
            return Err(self.unbalanced_at_end());
        };
        match (list, &token.kind) {
            (_, TokenKind::Close(balanced)) => self.close(*balanced, token.location),
            (ListState::AfterValue, TokenKind::Comma) => {
                self.set_top(state.with_list(ListState::AfterComma));
                Ok(Step::Again)
            }
            (ListState::AfterValue, _) => Err(Self::unexpected(comma_or_close(closer), &token)),
            (_, TokenKind::Hash) => self.attribute(token),
            (_, TokenKind::Comma | TokenKind::Colon) => Err(Self::misplaced(&token)
                .unwrap_or_else(|| Self::unexpected(&[Expected::Value], &token))),
            (_, _) => {
                self.set_top(state.with_list(ListState::AfterValue));
                self.begin_value(token)
            }
        }
    }

    fn advance_map(&mut self, state: NestedState, map: MapState) -> Result<Step<'s>> {
        let implicit = matches!(state, NestedState::ImplicitMap(_));
        let token = self.next_token()?;
        match map {
            MapState::Empty | MapState::AfterComma => match token {
                None if implicit => self.end_implicit_map(),
                None => Err(self.unbalanced_at_end()),
                Some(token) => self.map_entry_start(state, token),
            },
            MapState::ReadingKey | MapState::ReadingValue => {
                let Some(token) = token else {
                    return Err(self.unbalanced_at_end());
                };
                match token.kind {
                    TokenKind::Hash => self.attribute(token),
                    TokenKind::Comma | TokenKind::Colon => Err(Self::misplaced(&token)
                        .unwrap_or_else(|| Self::unexpected(&[Expected::Value], &token))),
                    TokenKind::Close(_) => Err(Self::unexpected(&[Expected::Value], &token)),
                    _ => {
                        let next = if map == MapState::ReadingKey {
                            MapState::ExpectingColon
                        } else {
                            MapState::AfterValue
                        };
                        self.set_top(state.with_map(next));
                        self.begin_value(token)
                    }
                }
            }
            MapState::ExpectingColon => match token {
                Some(Token {
                    kind: TokenKind::Colon,
                    location,
                }) => {
                    self.set_top(state.with_map(MapState::ReadingValue));
                    Ok(Step::Emit(Event::new(EventKind::MapValue, location)))
                }
                Some(token) => Err(Self::unexpected(&[Expected::Colon], &token)),
                None if implicit => Err(ParseError::new(
                    ParseErrorKind::UnexpectedToken {
                        expected: &[Expected::Colon],
                        found: Found::EndOfInput,
                    },
                    self.end_of_input(),
                )),
                None => Err(self.unbalanced_at_end()),
            },
            MapState::AfterValue => match token {
                Some(Token {
                    kind: TokenKind::Comma,
                    ..
                }) => {
                    self.set_top(state.with_map(MapState::AfterComma));
                    Ok(Step::Again)
                }
                Some(Token {
                    kind: TokenKind::Close(balanced),
                    location,
                }) => self.close(balanced, location),
                // Entries of an implicit map may be separated by whitespace alone.
                Some(token) if implicit => self.map_entry_start(state, token),
                Some(token) => Err(Self::unexpected(
                    comma_or_close(state.closer().unwrap_or(Balanced::Brace)),
                    &token,
                )),
                None if implicit => self.end_implicit_map(),
                None => Err(self.unbalanced_at_end()),
            },
        }
    }

    fn map_entry_start(&mut self, state: NestedState, token: Token<'s>) -> Result<Step<'s>> {
        match token.kind {
            TokenKind::Close(balanced) => self.close(balanced, token.location),
            TokenKind::Comma | TokenKind::Colon => Err(Self::misplaced(&token)
                .unwrap_or_else(|| Self::unexpected(&[Expected::Value], &token))),
            _ => {
                let start = token.location.start;
                self.set_top(state.with_map(MapState::ReadingKey));
                self.pending = Some(token);
                Ok(Step::Emit(Event::new(EventKind::MapKey, start..start)))
            }
        }
    }

    fn end_implicit_map(&mut self) -> Result<Step<'s>> {
        self.nested.pop();
        Ok(Step::Emit(Event::new(EventKind::EndMap, self.end_of_input())))
    }

    fn begin_value(&mut self, token: Token<'s>) -> Result<Step<'s>> {
        self.attributes_pending = false;
        let location = token.location;
        let primitive = match token.kind {
            TokenKind::Identifier(name) => match self.peek_opener() {
                Some(Balanced::Paren) => {
                    return self.begin_named(name, location, NamedKind::Tuple)
                }
                Some(Balanced::Brace) => return self.begin_named(name, location, NamedKind::Map),
                Some(Balanced::Bracket) => {
                    return Err(ParseError::new(
                        ParseErrorKind::UnexpectedToken {
                            expected: &[Expected::NamedContents],
                            found: Found::Open(Balanced::Bracket),
                        },
                        location,
                    ))
                }
                _ => Primitive::Identifier(Cow::Borrowed(name)),
            },
            TokenKind::Open(Balanced::Paren) => {
                if matches!(self.peek_kind(), Some(TokenKind::Close(Balanced::Paren))) {
                    let end = self
                        .next_token()?
                        .map_or(location.end, |close| close.location.end);
                    return Ok(Step::Emit(Event::new(
                        EventKind::Primitive(Primitive::Unit),
                        location.start..end,
                    )));
                }
                self.push(NestedState::Tuple(ListState::Empty), &location)?;
                return Ok(Step::Emit(Event::new(EventKind::StartTuple, location)));
            }
            TokenKind::Open(Balanced::Bracket) => {
                self.push(NestedState::List(ListState::Empty), &location)?;
                return Ok(Step::Emit(Event::new(EventKind::StartList, location)));
            }
            TokenKind::Open(Balanced::Brace) => {
                self.push(NestedState::Map(MapState::Empty), &location)?;
                return Ok(Step::Emit(Event::new(EventKind::StartMap, location)));
            }
            TokenKind::String(value) => Primitive::String(value),
            TokenKind::Bytes(value) => Primitive::Bytes(value),
            TokenKind::Char(value) => Primitive::Char(value),
            TokenKind::Integer(value) => Primitive::Integer(value),
            TokenKind::Float(value) => Primitive::Float(value),
            TokenKind::Bool(value) => Primitive::Bool(value),
            kind => {
                return Err(ParseError::new(
                    ParseErrorKind::UnexpectedToken {
                        expected: &[Expected::Value],
                        found: found(&kind),
                    },
                    location,
                ))
            }
        };
        Ok(Step::Emit(Event::new(
            EventKind::Primitive(primitive),
            location,
        )))
    }

    fn begin_named(
        &mut self,
        name: &'s str,
        location: Range<usize>,
        kind: NamedKind,
    ) -> Result<Step<'s>> {
        let end = self
            .next_token()?
            .map_or(location.end, |open| open.location.end);
        let state = match kind {
            NamedKind::Tuple => NamedState::Tuple(ListState::Empty),
            NamedKind::Map => NamedState::Map(MapState::Empty),
        };
        self.push(NestedState::Named(state), &location)?;
        Ok(Step::Emit(Event::new(
            EventKind::StartNamed {
                name: Name {
                    name,
                    location: location.clone(),
                },
                kind,
            },
            location.start..end,
        )))
    }

    /// Parses `#[name]` or `#[name(arg, ...)]` after its `#` was read.
    fn attribute(&mut self, hash: Token<'s>) -> Result<Step<'s>> {
        let start = hash.location.start;
        let eof = |parser: &Self, expected: &'static [Expected]| {
            ParseError::new(
                ParseErrorKind::UnexpectedToken {
                    expected,
                    found: Found::EndOfInput,
                },
                parser.end_of_input(),
            )
        };

        match self.next_token()? {
            Some(Token {
                kind: TokenKind::Open(Balanced::Bracket),
                ..
            }) => {}
            Some(token) => return Err(Self::unexpected(&[Expected::AttributeOpen], &token)),
            None => return Err(eof(self, &[Expected::AttributeOpen])),
        }
        let name = match self.next_token()? {
            Some(Token {
                kind: TokenKind::Identifier(name),
                ..
            }) => name,
            Some(token) => return Err(Self::unexpected(&[Expected::AttributeName], &token)),
            None => return Err(eof(self, &[Expected::AttributeName])),
        };

        let mut args = Vec::new();
        let mut token = self.next_token()?;
        if matches!(
            token,
            Some(Token {
                kind: TokenKind::Open(Balanced::Paren),
                ..
            })
        ) {
            loop {
                let Some(arg) = self.next_token()? else {
                    return Err(eof(self, &[Expected::Value]));
                };
                if matches!(arg.kind, TokenKind::Close(Balanced::Paren)) {
                    break;
                }
                let found_kind = found(&arg.kind);
                let Some(primitive) = attribute_arg(arg.kind) else {
                    return Err(ParseError::new(
                        ParseErrorKind::UnexpectedToken {
                            expected: &[Expected::Value],
                            found: found_kind,
                        },
                        arg.location,
                    ));
                };
                args.push(primitive);
                match self.next_token()? {
                    Some(Token {
                        kind: TokenKind::Comma,
                        ..
                    }) => {}
                    Some(Token {
                        kind: TokenKind::Close(Balanced::Paren),
                        ..
                    }) => break,
                    Some(other) => {
                        return Err(Self::unexpected(comma_or_close(Balanced::Paren), &other))
                    }
                    None => return Err(eof(self, comma_or_close(Balanced::Paren))),
                }
            }
            token = self.next_token()?;
        }

        let end = match token {
            Some(Token {
                kind: TokenKind::Close(Balanced::Bracket),
                location,
            }) => location.end,
            Some(token) => return Err(Self::unexpected(&[Expected::AttributeClose], &token)),
            None => return Err(eof(self, &[Expected::AttributeClose])),
        };
        self.attributes_pending = true;
        trace!(name, args = args.len(), "attribute");
        Ok(Step::Emit(Event::new(
            EventKind::Attribute(Attribute {
                name: Cow::Borrowed(name),
                args,
            }),
            start..end,
        )))
    }
}

fn attribute_arg(kind: TokenKind<'_>) -> Option<Primitive<'_>> {
    Some(match kind {
        TokenKind::Identifier(name) => Primitive::Identifier(Cow::Borrowed(name)),
        TokenKind::String(value) => Primitive::String(value),
        TokenKind::Bytes(value) => Primitive::Bytes(value),
        TokenKind::Char(value) => Primitive::Char(value),
        TokenKind::Integer(value) => Primitive::Integer(value),
        TokenKind::Float(value) => Primitive::Float(value),
        TokenKind::Bool(value) => Primitive::Bool(value),
        _ => return None,
    })
}

fn comma_or_close(closer: Balanced) -> &'static [Expected] {
    match closer {
        Balanced::Paren => &[Expected::Comma, Expected::Close(Balanced::Paren)],
        Balanced::Bracket => &[Expected::Comma, Expected::Close(Balanced::Bracket)],
        Balanced::Brace => &[Expected::Comma, Expected::Close(Balanced::Brace)],
    }
}

fn found(kind: &TokenKind<'_>) -> Found {
    match kind {
        TokenKind::Identifier(_) => Found::Identifier,
        TokenKind::String(_) => Found::String,
        TokenKind::Bytes(_) => Found::Bytes,
        TokenKind::Char(_) => Found::Char,
        TokenKind::Integer(_) => Found::Integer,
        TokenKind::Float(_) => Found::Float,
        TokenKind::Bool(_) => Found::Bool,
        TokenKind::Open(balanced) => Found::Open(*balanced),
        TokenKind::Close(balanced) => Found::Close(*balanced),
        TokenKind::Colon => Found::Colon,
        TokenKind::Comma => Found::Comma,
        TokenKind::Hash | TokenKind::Whitespace(_) | TokenKind::Comment(_) => Found::Hash,
    }
}

impl<'s> Iterator for Parser<'s> {
    type Item = Result<Event<'s>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.advance() {
            Ok(event) => event.map(Ok),
            Err(err) => {
                self.failed = true;
                debug!(%err, "parse failed");
                Some(Err(err))
            }
        }
    }
}
