//! Error types for RSN tokenizing, parsing, serialization and deserialization.
//!
//! Errors are layered the same way the crate is:
//!
//! - [`TokenizerError`]: lexical faults (bad escapes, unterminated literals, malformed numbers)
//! - [`ParseError`]: structural faults (unexpected tokens, unbalanced nesting), wrapping tokenizer errors
//! - [`Error`]: (de)serialization faults (type mismatches, missing fields), wrapping parse errors
//!
//! Each layer carries the byte range of the failure in the source text. Moving
//! up a layer is always explicit ([`ParseError::from_tokenizer`],
//! [`Error::from_parse`]) and never loses that range.
//!
//! ## Examples
//!
//! ```rust
//! use serde_rsn::{from_str, Error, ErrorKind};
//!
//! let result: Result<Vec<u32>, Error> = from_str("[1, 2");
//! let err = result.unwrap_err();
//! assert!(matches!(err.kind, ErrorKind::Parse(_)));
//! assert_eq!(err.offset(), Some(5));
//! ```

use crate::tokenizer::Balanced;
use std::fmt;
use std::ops::Range;
use thiserror::Error;

/// A lexical error produced by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at byte {}", .location.start)]
pub struct TokenizerError {
    pub kind: TokenizerErrorKind,
    pub location: Range<usize>,
}

impl TokenizerError {
    pub fn new(kind: TokenizerErrorKind, location: Range<usize>) -> Self {
        TokenizerError { kind, location }
    }
}

/// The kinds of lexical errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenizerErrorKind {
    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("invalid escape sequence")]
    InvalidEscapeSequence,

    #[error("invalid numeric literal: {0}")]
    InvalidNumericLiteral(NumericError),

    #[error("unexpected character {0:?}")]
    UnexpectedCharacter(char),

    #[error("unterminated block comment")]
    UnterminatedComment,
}

/// Why a numeric literal was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NumericError {
    #[error("expected a digit")]
    ExpectedDigit,

    #[error("value does not fit in `{0}`")]
    Overflow(&'static str),

    #[error("unknown suffix")]
    UnknownSuffix,

    #[error("malformed float")]
    MalformedFloat,
}

/// A structural error produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at byte {}", .location.start)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub location: Range<usize>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, location: Range<usize>) -> Self {
        ParseError { kind, location }
    }

    /// Wraps a tokenizer error, keeping its location.
    ///
    /// ```rust
    /// use serde_rsn::error::{ParseError, ParseErrorKind, TokenizerError, TokenizerErrorKind};
    ///
    /// let lexical = TokenizerError::new(TokenizerErrorKind::UnterminatedString, 3..8);
    /// let err = ParseError::from_tokenizer(lexical);
    /// assert_eq!(err.kind, ParseErrorKind::Tokenizer(TokenizerErrorKind::UnterminatedString));
    /// assert_eq!(err.location, 3..8);
    /// ```
    pub fn from_tokenizer(err: TokenizerError) -> Self {
        ParseError {
            kind: ParseErrorKind::Tokenizer(err.kind),
            location: err.location,
        }
    }
}

/// The kinds of structural errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("{0}")]
    Tokenizer(TokenizerErrorKind),

    #[error("expected {}, found {found}", ExpectedList(.expected))]
    UnexpectedToken {
        expected: &'static [Expected],
        found: Found,
    },

    #[error("{}", unbalanced_message(.expected, .found, .opened_at))]
    UnbalancedNesting {
        /// The closer the innermost open container needs, if any is open.
        expected: Option<Balanced>,
        /// The closer that was found, or `None` at end of input.
        found: Option<Balanced>,
        /// Byte offset of the innermost unclosed opener.
        opened_at: Option<usize>,
    },

    #[error("misplaced `{0}`")]
    MisplacedSeparator(Separator),

    #[error("expected a value, found end of input")]
    EmptyInputWhereValueExpected,

    #[error("unexpected data after the end of the value")]
    TrailingData,

    #[error("nesting exceeds the depth limit of {limit}")]
    DepthLimitExceeded { limit: usize },
}

/// Something the parser would have accepted at an error location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Value,
    Comma,
    Colon,
    Close(Balanced),
    AttributeName,
    AttributeOpen,
    AttributeClose,
    NamedContents,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Value => f.write_str("a value"),
            Expected::Comma => f.write_str("`,`"),
            Expected::Colon => f.write_str("`:`"),
            Expected::Close(balanced) => write!(f, "`{}`", balanced.close_char()),
            Expected::AttributeName => f.write_str("an attribute name"),
            Expected::AttributeOpen => f.write_str("`[`"),
            Expected::AttributeClose => f.write_str("`]`"),
            Expected::NamedContents => f.write_str("`(` or `{`"),
        }
    }
}

struct ExpectedList<'a>(&'a [Expected]);

impl fmt::Display for ExpectedList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, expected) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(if index + 1 == self.0.len() { " or " } else { ", " })?;
            }
            expected.fmt(f)?;
        }
        Ok(())
    }
}

/// A description of the token found at an error location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Found {
    Identifier,
    String,
    Bytes,
    Char,
    Integer,
    Float,
    Bool,
    Open(Balanced),
    Close(Balanced),
    Colon,
    Comma,
    Hash,
    EndOfInput,
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Found::Identifier => f.write_str("identifier"),
            Found::String => f.write_str("string"),
            Found::Bytes => f.write_str("byte string"),
            Found::Char => f.write_str("char"),
            Found::Integer => f.write_str("integer"),
            Found::Float => f.write_str("float"),
            Found::Bool => f.write_str("bool"),
            Found::Open(balanced) => write!(f, "`{}`", balanced.open_char()),
            Found::Close(balanced) => write!(f, "`{}`", balanced.close_char()),
            Found::Colon => f.write_str("`:`"),
            Found::Comma => f.write_str("`,`"),
            Found::Hash => f.write_str("`#`"),
            Found::EndOfInput => f.write_str("end of input"),
        }
    }
}

/// A separator that appeared where it is not allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    Comma,
    Colon,
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Separator::Comma => ",",
            Separator::Colon => ":",
        })
    }
}

fn unbalanced_message(
    expected: &Option<Balanced>,
    found: &Option<Balanced>,
    opened_at: &Option<usize>,
) -> String {
    let found = match found {
        Some(balanced) => format!("`{}`", balanced.close_char()),
        None => "end of input".to_string(),
    };
    match (expected, opened_at) {
        (Some(expected), Some(offset)) => format!(
            "expected `{}` to close `{}` opened at byte {offset}, found {found}",
            expected.close_char(),
            expected.open_char()
        ),
        (Some(expected), None) => format!("expected `{}`, found {found}", expected.close_char()),
        (None, _) => format!("unmatched {found}"),
    }
}

/// Represents all errors that can occur while serializing or deserializing RSN.
///
/// Parser and tokenizer failures are wrapped in [`ErrorKind::Parse`]. When
/// the failure can be tied to the source text, `location` holds its byte range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}{}", LocationSuffix(.location))]
pub struct Error {
    pub kind: ErrorKind,
    pub location: Option<Range<usize>>,
}

struct LocationSuffix<'a>(&'a Option<Range<usize>>);

impl fmt::Display for LocationSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(location) => write!(f, " at byte {}", location.start),
            None => Ok(()),
        }
    }
}

/// The kinds of (de)serialization errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("{0}")]
    Parse(ParseErrorKind),

    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("missing field `{0}`")]
    MissingField(String),

    #[error("unknown variant `{variant}`, expected {expected}")]
    UnknownVariant { variant: String, expected: String },

    #[error("unknown field `{field}`, expected {expected}")]
    UnknownField { field: String, expected: String },

    #[error("duplicate key `{0}`")]
    DuplicateKeyRejected(String),

    #[error("invalid length {len}, expected {expected}")]
    InvalidLength { len: usize, expected: String },

    #[error("IO error: {0}")]
    Io(String),

    #[error("{0}")]
    Custom(String),
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Error {
            kind,
            location: None,
        }
    }

    /// Wraps a parse error, keeping its location.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_rsn::error::{Error, ErrorKind, ParseError, ParseErrorKind};
    ///
    /// let err = Error::from_parse(ParseError::new(ParseErrorKind::TrailingData, 4..5));
    /// assert_eq!(err.kind, ErrorKind::Parse(ParseErrorKind::TrailingData));
    /// assert_eq!(err.offset(), Some(4));
    /// ```
    pub fn from_parse(err: ParseError) -> Self {
        Error {
            kind: ErrorKind::Parse(err.kind),
            location: Some(err.location),
        }
    }

    /// Creates a type mismatch error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_rsn::Error;
    ///
    /// let err = Error::type_mismatch("u8", "string");
    /// assert_eq!(err.to_string(), "expected u8, found string");
    /// ```
    pub fn type_mismatch(expected: impl fmt::Display, found: impl fmt::Display) -> Self {
        Error::new(ErrorKind::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        })
    }

    /// Creates an error with a custom message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::new(ErrorKind::Custom(msg.to_string()))
    }

    /// Creates an I/O error for reading or writing failures.
    pub fn io(err: &std::io::Error) -> Self {
        Error::new(ErrorKind::Io(err.to_string()))
    }

    /// Attaches `location` unless the error already has one.
    #[must_use]
    pub fn at(mut self, location: Range<usize>) -> Self {
        if self.location.is_none() {
            self.location = Some(location);
        }
        self
    }

    /// The byte offset the error points at, if known.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        self.location.as_ref().map(|location| location.start)
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::custom(msg)
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::custom(msg)
    }

    fn invalid_type(unexp: serde::de::Unexpected<'_>, exp: &dyn serde::de::Expected) -> Self {
        Error::type_mismatch(exp, unexp)
    }

    fn invalid_value(unexp: serde::de::Unexpected<'_>, exp: &dyn serde::de::Expected) -> Self {
        Error::type_mismatch(exp, unexp)
    }

    fn invalid_length(len: usize, exp: &dyn serde::de::Expected) -> Self {
        Error::new(ErrorKind::InvalidLength {
            len,
            expected: exp.to_string(),
        })
    }

    fn unknown_variant(variant: &str, expected: &'static [&'static str]) -> Self {
        Error::new(ErrorKind::UnknownVariant {
            variant: variant.to_string(),
            expected: one_of(expected),
        })
    }

    fn unknown_field(field: &str, expected: &'static [&'static str]) -> Self {
        Error::new(ErrorKind::UnknownField {
            field: field.to_string(),
            expected: one_of(expected),
        })
    }

    fn missing_field(field: &'static str) -> Self {
        Error::new(ErrorKind::MissingField(field.to_string()))
    }

    fn duplicate_field(field: &'static str) -> Self {
        Error::new(ErrorKind::DuplicateKeyRejected(field.to_string()))
    }
}

fn one_of(names: &[&str]) -> String {
    match names {
        [] => "nothing".to_string(),
        [only] => format!("`{only}`"),
        names => {
            let quoted: Vec<String> = names.iter().map(|name| format!("`{name}`")).collect();
            format!("one of {}", quoted.join(", "))
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
