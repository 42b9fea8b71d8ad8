//! Lexical analysis of RSN source text.
//!
//! [`Tokenizer`] turns a `&str` into a lazy sequence of [`Token`]s. Tokens
//! never own text they can borrow: identifiers, comments and escape-free
//! strings point straight into the source, and only literals containing escape
//! sequences are decoded into owned buffers.
//!
//! ## Examples
//!
//! ```rust
//! use serde_rsn::tokenizer::{Balanced, TokenKind, Tokenizer};
//! use serde_rsn::Integer;
//!
//! let kinds: Vec<_> = Tokenizer::minified("[1u8, \"two\"] // done")
//!     .map(|token| token.unwrap().kind)
//!     .collect();
//! assert_eq!(
//!     kinds,
//!     vec![
//!         TokenKind::Open(Balanced::Bracket),
//!         TokenKind::Integer(Integer::U8(1)),
//!         TokenKind::Comma,
//!         TokenKind::String("two".into()),
//!         TokenKind::Close(Balanced::Bracket),
//!     ]
//! );
//! ```

use crate::error::{NumericError, TokenizerError, TokenizerErrorKind};
use crate::Integer;
use num_bigint::BigInt;
use std::borrow::Cow;
use std::ops::Range;
use unicode_xid::UnicodeXID;

/// A lexical unit with its byte range in the source.
#[derive(Clone, Debug, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub location: Range<usize>,
}

/// The kinds of tokens RSN source is made of.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind<'a> {
    Identifier(&'a str),
    /// `Cow::Owned` when escape sequences had to be decoded.
    String(Cow<'a, str>),
    Bytes(Cow<'a, [u8]>),
    Char(char),
    Integer(Integer),
    Float(f64),
    Bool(bool),
    Open(Balanced),
    Close(Balanced),
    Colon,
    Comma,
    Hash,
    /// Only produced by [`Tokenizer::full`].
    Whitespace(&'a str),
    /// Only produced by [`Tokenizer::full`].
    Comment(&'a str),
}

/// A pair of opening and closing delimiters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Balanced {
    Paren,
    Bracket,
    Brace,
}

impl Balanced {
    #[must_use]
    pub const fn open_char(self) -> char {
        match self {
            Balanced::Paren => '(',
            Balanced::Bracket => '[',
            Balanced::Brace => '{',
        }
    }

    #[must_use]
    pub const fn close_char(self) -> char {
        match self {
            Balanced::Paren => ')',
            Balanced::Bracket => ']',
            Balanced::Brace => '}',
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum LiteralMode {
    Text,
    Bytes,
}

enum Escaped {
    Char(char),
    Byte(u8),
    Continuation,
}

type Result<T> = std::result::Result<T, TokenizerError>;

/// A forward-only lexer over one source buffer.
///
/// After the first error the tokenizer is exhausted and yields `None`.
#[derive(Clone, Debug)]
pub struct Tokenizer<'a> {
    source: &'a str,
    offset: usize,
    include_all: bool,
    balance: Vec<(Balanced, usize)>,
    failed: bool,
}

impl<'a> Tokenizer<'a> {
    /// Creates a tokenizer that emits whitespace and comment tokens when
    /// `include_all` is set and skips them otherwise.
    #[must_use]
    pub fn new(source: &'a str, include_all: bool) -> Self {
        Tokenizer {
            source,
            offset: 0,
            include_all,
            balance: Vec::new(),
            failed: false,
        }
    }

    /// Creates a tokenizer that skips whitespace and comments.
    #[must_use]
    pub fn minified(source: &'a str) -> Self {
        Self::new(source, false)
    }

    /// Creates a tokenizer that emits whitespace and comments as tokens.
    #[must_use]
    pub fn full(source: &'a str) -> Self {
        Self::new(source, true)
    }

    #[must_use]
    pub const fn source(&self) -> &'a str {
        self.source
    }

    /// The byte offset of the next unread character.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// The innermost opening delimiter that has not been closed yet, with its
    /// byte offset.
    #[must_use]
    pub fn unclosed(&self) -> Option<(Balanced, usize)> {
        self.balance.last().copied()
    }

    fn peek(&self) -> Option<char> {
        self.source[self.offset..].chars().next()
    }

    fn peek_byte(&self, ahead: usize) -> Option<u8> {
        self.source.as_bytes().get(self.offset + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.offset += ch.len_utf8();
        Some(ch)
    }

    fn error(&self, kind: TokenizerErrorKind, location: Range<usize>) -> TokenizerError {
        TokenizerError::new(kind, location)
    }

    fn unterminated(&self, start: usize) -> TokenizerError {
        self.error(
            TokenizerErrorKind::UnterminatedString,
            start..self.source.len(),
        )
    }

    fn unexpected(&self, ch: char, at: usize) -> TokenizerError {
        self.error(
            TokenizerErrorKind::UnexpectedCharacter(ch),
            at..at + ch.len_utf8(),
        )
    }

    fn invalid_escape(&self, escape_start: usize) -> TokenizerError {
        self.error(
            TokenizerErrorKind::InvalidEscapeSequence,
            escape_start..self.offset,
        )
    }

    fn numeric(&self, reason: NumericError, start: usize) -> TokenizerError {
        self.error(
            TokenizerErrorKind::InvalidNumericLiteral(reason),
            start..self.offset,
        )
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.offset += ch.len_utf8();
        }
    }

    fn comment(&mut self, start: usize) -> Result<TokenKind<'a>> {
        match self.peek_byte(1) {
            Some(b'/') => {
                let rest = &self.source[start..];
                self.offset = start + rest.find('\n').unwrap_or(rest.len());
            }
            Some(b'*') => {
                self.offset += 2;
                let bytes = self.source.as_bytes();
                let mut depth = 1_usize;
                loop {
                    match (bytes.get(self.offset), bytes.get(self.offset + 1)) {
                        (Some(b'/'), Some(b'*')) => {
                            depth += 1;
                            self.offset += 2;
                        }
                        (Some(b'*'), Some(b'/')) => {
                            depth -= 1;
                            self.offset += 2;
                            if depth == 0 {
                                break;
                            }
                        }
                        (Some(_), _) => self.offset += 1,
                        (None, _) => {
                            return Err(self.error(
                                TokenizerErrorKind::UnterminatedComment,
                                start..self.source.len(),
                            ))
                        }
                    }
                }
            }
            _ => return Err(self.unexpected('/', start)),
        }
        Ok(TokenKind::Comment(&self.source[start..self.offset]))
    }

    fn token(&mut self, start: usize, ch: char) -> Result<TokenKind<'a>> {
        match ch {
            '"' => {
                self.offset += 1;
                self.string(start)
            }
            '\'' => {
                self.offset += 1;
                self.char_literal(start, LiteralMode::Text)
            }
            'b' if self.peek_byte(1) == Some(b'"') => {
                self.offset += 2;
                self.byte_string(start)
            }
            'b' if self.peek_byte(1) == Some(b'\'') => {
                self.offset += 2;
                self.char_literal(start, LiteralMode::Bytes)
            }
            'b' if self.peek_byte(1) == Some(b'r')
                && matches!(self.peek_byte(2), Some(b'"' | b'#')) =>
            {
                self.offset += 2;
                self.raw_string(start, LiteralMode::Bytes)
            }
            'r' if matches!(self.peek_byte(1), Some(b'"' | b'#')) => {
                self.offset += 1;
                self.raw_string(start, LiteralMode::Text)
            }
            '0'..='9' => self.number(start),
            '+' | '-' => match self.peek_byte(1) {
                Some(b'0'..=b'9') => self.number(start),
                Some(b'i' | b'N') => self.signed_special_float(start, ch),
                _ => Err(self.unexpected(ch, start)),
            },
            '(' | '[' | '{' => {
                self.offset += 1;
                let balanced = match ch {
                    '(' => Balanced::Paren,
                    '[' => Balanced::Bracket,
                    _ => Balanced::Brace,
                };
                self.balance.push((balanced, start));
                Ok(TokenKind::Open(balanced))
            }
            ')' | ']' | '}' => {
                self.offset += 1;
                let balanced = match ch {
                    ')' => Balanced::Paren,
                    ']' => Balanced::Bracket,
                    _ => Balanced::Brace,
                };
                if matches!(self.balance.last(), Some((open, _)) if *open == balanced) {
                    self.balance.pop();
                }
                Ok(TokenKind::Close(balanced))
            }
            ':' => {
                self.offset += 1;
                Ok(TokenKind::Colon)
            }
            ',' => {
                self.offset += 1;
                Ok(TokenKind::Comma)
            }
            '#' => {
                self.offset += 1;
                Ok(TokenKind::Hash)
            }
            ch if ch == '_' || ch.is_xid_start() => Ok(self.identifier(start)),
            other => Err(self.unexpected(other, start)),
        }
    }

    fn eat_identifier(&mut self) {
        while let Some(ch) = self.peek() {
            if !ch.is_xid_continue() {
                break;
            }
            self.offset += ch.len_utf8();
        }
    }

    fn identifier(&mut self, start: usize) -> TokenKind<'a> {
        self.bump();
        self.eat_identifier();
        match &self.source[start..self.offset] {
            "true" => TokenKind::Bool(true),
            "false" => TokenKind::Bool(false),
            "inf" => TokenKind::Float(f64::INFINITY),
            "NaN" => TokenKind::Float(f64::NAN),
            ident => TokenKind::Identifier(ident),
        }
    }

    fn signed_special_float(&mut self, start: usize, sign: char) -> Result<TokenKind<'a>> {
        self.offset += 1;
        self.eat_identifier();
        let value = match &self.source[start + 1..self.offset] {
            "inf" => f64::INFINITY,
            "NaN" => f64::NAN,
            _ => return Err(self.unexpected(sign, start)),
        };
        Ok(TokenKind::Float(if sign == '-' { -value } else { value }))
    }

    fn escape(&mut self, literal_start: usize, mode: LiteralMode) -> Result<Escaped> {
        let escape_start = self.offset - 1;
        let Some(ch) = self.bump() else {
            return Err(self.unterminated(literal_start));
        };
        let escaped = match ch {
            '"' => '"',
            '\'' => '\'',
            '\\' => '\\',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            '0' => '\0',
            'x' => {
                let digits = self
                    .source
                    .get(self.offset..self.offset + 2)
                    .filter(|digits| digits.bytes().all(|byte| byte.is_ascii_hexdigit()));
                let Some(byte) = digits.and_then(|digits| u8::from_str_radix(digits, 16).ok())
                else {
                    return Err(self.invalid_escape(escape_start));
                };
                self.offset += 2;
                return match mode {
                    LiteralMode::Bytes => Ok(Escaped::Byte(byte)),
                    LiteralMode::Text if byte.is_ascii() => Ok(Escaped::Char(char::from(byte))),
                    LiteralMode::Text => Err(self.invalid_escape(escape_start)),
                };
            }
            'u' if mode == LiteralMode::Text => return self.unicode_escape(escape_start),
            '\n' => {
                self.skip_whitespace();
                return Ok(Escaped::Continuation);
            }
            '\r' if self.peek() == Some('\n') => {
                self.skip_whitespace();
                return Ok(Escaped::Continuation);
            }
            _ => return Err(self.invalid_escape(escape_start)),
        };
        Ok(match mode {
            LiteralMode::Text => Escaped::Char(escaped),
            LiteralMode::Bytes => Escaped::Byte(escaped as u8),
        })
    }

    fn unicode_escape(&mut self, escape_start: usize) -> Result<Escaped> {
        if self.peek() != Some('{') {
            return Err(self.invalid_escape(escape_start));
        }
        self.offset += 1;
        let mut value = 0_u32;
        let mut digits = 0;
        loop {
            match self.bump() {
                Some('}') => break,
                Some('_') if digits > 0 => {}
                Some(ch) if ch.is_ascii_hexdigit() && digits < 6 => {
                    digits += 1;
                    value = value * 16 + ch.to_digit(16).unwrap_or_default();
                }
                _ => return Err(self.invalid_escape(escape_start)),
            }
        }
        match char::from_u32(value) {
            Some(ch) if digits > 0 => Ok(Escaped::Char(ch)),
            _ => Err(self.invalid_escape(escape_start)),
        }
    }

    fn string(&mut self, start: usize) -> Result<TokenKind<'a>> {
        let source = self.source;
        let content_start = self.offset;
        let mut decoded: Option<String> = None;
        loop {
            let Some(ch) = self.bump() else {
                return Err(self.unterminated(start));
            };
            match ch {
                '"' => {
                    let content_end = self.offset - 1;
                    return Ok(TokenKind::String(match decoded {
                        Some(decoded) => Cow::Owned(decoded),
                        None => Cow::Borrowed(&source[content_start..content_end]),
                    }));
                }
                '\\' => {
                    let escape_start = self.offset - 1;
                    let escaped = self.escape(start, LiteralMode::Text)?;
                    let buffer = decoded
                        .get_or_insert_with(|| source[content_start..escape_start].to_string());
                    if let Escaped::Char(ch) = escaped {
                        buffer.push(ch);
                    }
                }
                ch => {
                    if let Some(buffer) = &mut decoded {
                        buffer.push(ch);
                    }
                }
            }
        }
    }

    fn byte_string(&mut self, start: usize) -> Result<TokenKind<'a>> {
        let source = self.source;
        let content_start = self.offset;
        let mut decoded: Option<Vec<u8>> = None;
        loop {
            let at = self.offset;
            let Some(ch) = self.bump() else {
                return Err(self.unterminated(start));
            };
            match ch {
                '"' => {
                    let content_end = self.offset - 1;
                    return Ok(TokenKind::Bytes(match decoded {
                        Some(decoded) => Cow::Owned(decoded),
                        None => Cow::Borrowed(source[content_start..content_end].as_bytes()),
                    }));
                }
                '\\' => {
                    let escaped = self.escape(start, LiteralMode::Bytes)?;
                    let buffer = decoded
                        .get_or_insert_with(|| source[content_start..at].as_bytes().to_vec());
                    if let Escaped::Byte(byte) = escaped {
                        buffer.push(byte);
                    }
                }
                ch if ch.is_ascii() => {
                    if let Some(buffer) = &mut decoded {
                        buffer.push(ch as u8);
                    }
                }
                ch => return Err(self.unexpected(ch, at)),
            }
        }
    }

    fn raw_string(&mut self, start: usize, mode: LiteralMode) -> Result<TokenKind<'a>> {
        let hashes_start = self.offset;
        while self.peek_byte(0) == Some(b'#') {
            self.offset += 1;
        }
        let hashes = self.offset - hashes_start;
        if self.peek_byte(0) != Some(b'"') {
            // `r#name` is a raw identifier rather than a raw string.
            return match self.peek() {
                Some(ch) if mode == LiteralMode::Text
                    && hashes == 1
                    && (ch == '_' || ch.is_xid_start()) =>
                {
                    let ident_start = self.offset;
                    self.bump();
                    self.eat_identifier();
                    Ok(TokenKind::Identifier(&self.source[ident_start..self.offset]))
                }
                _ => Err(self.unexpected('#', hashes_start)),
            };
        }
        self.offset += 1;
        let content_start = self.offset;
        let terminator = format!("\"{}", "#".repeat(hashes));
        let Some(length) = self.source[content_start..].find(&terminator) else {
            return Err(self.unterminated(start));
        };
        let content = &self.source[content_start..content_start + length];
        self.offset = content_start + length + terminator.len();
        match mode {
            LiteralMode::Text => Ok(TokenKind::String(Cow::Borrowed(content))),
            LiteralMode::Bytes => match content.char_indices().find(|(_, ch)| !ch.is_ascii()) {
                Some((index, ch)) => Err(self.unexpected(ch, content_start + index)),
                None => Ok(TokenKind::Bytes(Cow::Borrowed(content.as_bytes()))),
            },
        }
    }

    fn char_literal(&mut self, start: usize, mode: LiteralMode) -> Result<TokenKind<'a>> {
        let at = self.offset;
        let value = match self.bump() {
            None => return Err(self.unterminated(start)),
            Some('\\') => match self.escape(start, mode)? {
                Escaped::Char(ch) => u32::from(ch),
                Escaped::Byte(byte) => u32::from(byte),
                Escaped::Continuation => return Err(self.unexpected('\n', at + 1)),
            },
            Some('\'') => return Err(self.unexpected('\'', at)),
            Some(ch) if mode == LiteralMode::Bytes && !ch.is_ascii() => {
                return Err(self.unexpected(ch, at))
            }
            Some(ch) => u32::from(ch),
        };
        let close_at = self.offset;
        match self.bump() {
            Some('\'') => {}
            Some(other) => return Err(self.unexpected(other, close_at)),
            None => return Err(self.unterminated(start)),
        }
        Ok(match mode {
            LiteralMode::Text => {
                TokenKind::Char(char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER))
            }
            LiteralMode::Bytes => TokenKind::Integer(Integer::U8(value as u8)),
        })
    }

    fn eat_digits(&mut self, radix: u32) -> usize {
        let mut digits = 0;
        while let Some(byte) = self.peek_byte(0) {
            if byte == b'_' {
                self.offset += 1;
            } else if char::from(byte).is_digit(radix) {
                digits += 1;
                self.offset += 1;
            } else {
                break;
            }
        }
        digits
    }

    fn number(&mut self, start: usize) -> Result<TokenKind<'a>> {
        let signed = matches!(self.peek_byte(0), Some(b'+' | b'-'));
        let negative = self.peek_byte(0) == Some(b'-');
        if signed {
            self.offset += 1;
        }
        let radix = match (self.peek_byte(0), self.peek_byte(1)) {
            (Some(b'0'), Some(b'x')) => 16,
            (Some(b'0'), Some(b'o')) => 8,
            (Some(b'0'), Some(b'b')) => 2,
            _ => 10,
        };
        if radix != 10 {
            self.offset += 2;
        }
        let digits_start = self.offset;
        if self.eat_digits(radix) == 0 {
            return Err(self.numeric(NumericError::ExpectedDigit, start));
        }

        let mut is_float = false;
        if radix == 10 {
            if self.peek_byte(0) == Some(b'.') && matches!(self.peek_byte(1), Some(b'0'..=b'9')) {
                self.offset += 1;
                self.eat_digits(10);
                is_float = true;
            }
            if matches!(self.peek_byte(0), Some(b'e' | b'E')) {
                let sign = usize::from(matches!(self.peek_byte(1), Some(b'+' | b'-')));
                if matches!(self.peek_byte(1 + sign), Some(b'0'..=b'9')) {
                    self.offset += 1 + sign;
                    self.eat_digits(10);
                    is_float = true;
                }
            }
        }
        let digits_end = self.offset;

        let suffix_start = self.offset;
        while matches!(self.peek_byte(0), Some(byte) if byte.is_ascii_alphanumeric()) {
            self.offset += 1;
        }
        let suffix = &self.source[suffix_start..self.offset];
        let digits = strip_underscores(&self.source[digits_start..digits_end]);

        if is_float || matches!(suffix, "f32" | "f64") {
            if radix != 10 {
                return Err(self.numeric(NumericError::MalformedFloat, start));
            }
            let text = if negative {
                Cow::Owned(format!("-{digits}"))
            } else {
                digits
            };
            let value = match suffix {
                "" | "f64" => text.parse::<f64>().ok(),
                "f32" => text.parse::<f32>().ok().map(f64::from),
                _ => return Err(self.numeric(NumericError::UnknownSuffix, start)),
            };
            return match value {
                Some(value) => Ok(TokenKind::Float(value)),
                None => Err(self.numeric(NumericError::MalformedFloat, start)),
            };
        }

        match integer_literal(&digits, radix, signed, negative, suffix) {
            Ok(integer) => Ok(TokenKind::Integer(integer)),
            Err(reason) => Err(self.numeric(reason, start)),
        }
    }
}

fn strip_underscores(digits: &str) -> Cow<'_, str> {
    if digits.contains('_') {
        Cow::Owned(digits.chars().filter(|ch| *ch != '_').collect())
    } else {
        Cow::Borrowed(digits)
    }
}

fn integer_literal(
    digits: &str,
    radix: u32,
    signed: bool,
    negative: bool,
    suffix: &str,
) -> std::result::Result<Integer, NumericError> {
    let Ok(magnitude) = u128::from_str_radix(digits, radix) else {
        if !suffix.is_empty() {
            return Err(suffix_width(suffix).map_or(NumericError::UnknownSuffix, NumericError::Overflow));
        }
        let big = BigInt::parse_bytes(digits.as_bytes(), radix).ok_or(NumericError::ExpectedDigit)?;
        return Ok(Integer::Big(if negative { -big } else { big }));
    };

    // `i128::MIN` has a magnitude one past `i128::MAX`.
    let value: Option<i128> = if negative {
        (magnitude <= i128::MIN.unsigned_abs()).then(|| (magnitude as i128).wrapping_neg())
    } else {
        i128::try_from(magnitude).ok()
    };

    macro_rules! unsigned {
        ($ty:ident, $variant:ident) => {
            if negative && magnitude != 0 {
                None
            } else {
                $ty::try_from(magnitude).ok().map(Integer::$variant)
            }
        };
    }
    macro_rules! signed {
        ($ty:ident, $variant:ident) => {
            value.and_then(|value| $ty::try_from(value).ok()).map(Integer::$variant)
        };
    }

    let integer = match suffix {
        "" if !signed => Some(match u64::try_from(magnitude) {
            Ok(value) => Integer::U64(value),
            Err(_) => Integer::U128(magnitude),
        }),
        "" => Some(match value {
            Some(value) => match i64::try_from(value) {
                Ok(small) => Integer::I64(small),
                Err(_) => Integer::I128(value),
            },
            None => {
                let big = BigInt::from(magnitude);
                Integer::Big(if negative { -big } else { big })
            }
        }),
        "u8" => unsigned!(u8, U8),
        "u16" => unsigned!(u16, U16),
        "u32" => unsigned!(u32, U32),
        "u64" => unsigned!(u64, U64),
        "u128" => unsigned!(u128, U128),
        "usize" => unsigned!(usize, Usize),
        "i8" => signed!(i8, I8),
        "i16" => signed!(i16, I16),
        "i32" => signed!(i32, I32),
        "i64" => signed!(i64, I64),
        "i128" => signed!(i128, I128),
        "isize" => signed!(isize, Isize),
        _ => return Err(NumericError::UnknownSuffix),
    };
    integer.ok_or_else(|| NumericError::Overflow(suffix_width(suffix).unwrap_or("integer")))
}

fn suffix_width(suffix: &str) -> Option<&'static str> {
    const WIDTHS: [&str; 12] = [
        "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32", "i64", "i128", "isize",
    ];
    WIDTHS.iter().copied().find(|width| *width == suffix)
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let start = self.offset;
            let ch = self.peek()?;
            let result = if ch.is_whitespace() {
                self.skip_whitespace();
                if !self.include_all {
                    continue;
                }
                Ok(TokenKind::Whitespace(&self.source[start..self.offset]))
            } else if ch == '/' {
                match self.comment(start) {
                    Ok(_) if !self.include_all => continue,
                    other => other,
                }
            } else {
                self.token(start, ch)
            };
            return Some(match result {
                Ok(kind) => Ok(Token {
                    kind,
                    location: start..self.offset,
                }),
                Err(err) => {
                    self.failed = true;
                    Err(err)
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind<'_>> {
        Tokenizer::minified(source)
            .map(|token| token.expect("tokenizes"))
            .map(|token| token.kind)
            .collect()
    }

    fn single(source: &str) -> TokenKind<'_> {
        let mut tokens = kinds(source);
        assert_eq!(tokens.len(), 1, "{source:?} produced {tokens:?}");
        tokens.remove(0)
    }

    fn error(source: &str) -> TokenizerError {
        Tokenizer::minified(source)
            .find_map(|token| token.err())
            .expect("tokenizer error")
    }

    #[test]
    fn test_symbols_and_balance() {
        let mut tokenizer = Tokenizer::minified("{ [ ( ) ] : , #");
        let kinds: Vec<_> = tokenizer.by_ref().map(|t| t.unwrap().kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Open(Balanced::Brace),
                TokenKind::Open(Balanced::Bracket),
                TokenKind::Open(Balanced::Paren),
                TokenKind::Close(Balanced::Paren),
                TokenKind::Close(Balanced::Bracket),
                TokenKind::Colon,
                TokenKind::Comma,
                TokenKind::Hash,
            ]
        );
        assert_eq!(tokenizer.unclosed(), Some((Balanced::Brace, 0)));
    }

    #[test]
    fn test_locations_are_increasing() {
        let tokens: Vec<_> = Tokenizer::full("a: [1, \"x\"] // c\n")
            .map(|t| t.unwrap())
            .collect();
        for pair in tokens.windows(2) {
            assert_eq!(pair[0].location.end, pair[1].location.start);
        }
        assert_eq!(tokens.last().map(|t| t.location.end), Some(18));
    }

    #[test]
    fn test_identifiers_and_keywords() {
        assert_eq!(single("hello_world"), TokenKind::Identifier("hello_world"));
        assert_eq!(single("_"), TokenKind::Identifier("_"));
        assert_eq!(single("übung"), TokenKind::Identifier("übung"));
        assert_eq!(single("true"), TokenKind::Bool(true));
        assert_eq!(single("false"), TokenKind::Bool(false));
        assert_eq!(single("r#true"), TokenKind::Identifier("true"));
        assert!(matches!(single("inf"), TokenKind::Float(f) if f == f64::INFINITY));
        assert!(matches!(single("-inf"), TokenKind::Float(f) if f == f64::NEG_INFINITY));
        assert!(matches!(single("NaN"), TokenKind::Float(f) if f.is_nan()));
        assert!(matches!(single("+NaN"), TokenKind::Float(f) if f.is_nan()));
    }

    #[test]
    fn test_strings_borrow_without_escapes() {
        match single(r#""plain""#) {
            TokenKind::String(Cow::Borrowed(text)) => assert_eq!(text, "plain"),
            other => panic!("expected borrowed string, got {other:?}"),
        }
        match single(r#""tab\tquote\"""#) {
            TokenKind::String(Cow::Owned(text)) => assert_eq!(text, "tab\tquote\""),
            other => panic!("expected owned string, got {other:?}"),
        }
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            single(r#""\0\\\n\r\'\x41\u{1F980}\u{1_F980}""#),
            TokenKind::String("\0\\\n\r'A🦀🦀".into())
        );
        assert_eq!(
            single("\"line \\\n     continued\""),
            TokenKind::String("line continued".into())
        );
        assert_eq!(single(r#"r"no \escapes""#), TokenKind::String(r"no \escapes".into()));
        assert_eq!(
            single(r###"r##"has "# inside"##"###),
            TokenKind::String(r##"has "# inside"##.into())
        );
    }

    #[test]
    fn test_invalid_escapes() {
        let err = error(r#""bad \q escape""#);
        assert_eq!(err.kind, TokenizerErrorKind::InvalidEscapeSequence);
        assert_eq!(err.location, 5..7);
        assert_eq!(
            error(r#""\x80""#).kind,
            TokenizerErrorKind::InvalidEscapeSequence
        );
        assert_eq!(
            error(r#""\u{110000}""#).kind,
            TokenizerErrorKind::InvalidEscapeSequence
        );
        assert_eq!(
            error(r#""\u{}""#).kind,
            TokenizerErrorKind::InvalidEscapeSequence
        );
    }

    #[test]
    fn test_unterminated_string_points_at_quote() {
        let err = error(r#"  "abc"#);
        assert_eq!(err.kind, TokenizerErrorKind::UnterminatedString);
        assert_eq!(err.location.start, 2);
        assert_eq!(error(r#""abc\"#).kind, TokenizerErrorKind::UnterminatedString);
        assert_eq!(error("r#\"abc\"").kind, TokenizerErrorKind::UnterminatedString);
        assert_eq!(error("'a").kind, TokenizerErrorKind::UnterminatedString);
    }

    #[test]
    fn test_bytes() {
        assert_eq!(
            single(r#"b"a\xff\n""#),
            TokenKind::Bytes(Cow::Owned(vec![b'a', 0xff, b'\n']))
        );
        assert_eq!(single(r#"b"abc""#), TokenKind::Bytes(Cow::Borrowed(&b"abc"[..])));
        assert_eq!(single(r##"br#"a"b"#"##), TokenKind::Bytes(Cow::Borrowed(&b"a\"b"[..])));
        assert_eq!(single("b'x'"), TokenKind::Integer(Integer::U8(b'x')));
        assert_eq!(single(r"b'\xff'"), TokenKind::Integer(Integer::U8(0xff)));
        assert_eq!(
            error("b\"é\"").kind,
            TokenizerErrorKind::UnexpectedCharacter('é')
        );
    }

    #[test]
    fn test_chars() {
        assert_eq!(single("'a'"), TokenKind::Char('a'));
        assert_eq!(single(r"'\''"), TokenKind::Char('\''));
        assert_eq!(single(r"'\u{1F980}'"), TokenKind::Char('🦀'));
        assert_eq!(error("'ab'").kind, TokenizerErrorKind::UnexpectedCharacter('b'));
    }

    #[test]
    fn test_integers() {
        assert_eq!(single("42"), TokenKind::Integer(Integer::U64(42)));
        assert_eq!(single("-42"), TokenKind::Integer(Integer::I64(-42)));
        assert_eq!(single("+42"), TokenKind::Integer(Integer::I64(42)));
        assert_eq!(single("1_000_000"), TokenKind::Integer(Integer::U64(1_000_000)));
        assert_eq!(single("0xff"), TokenKind::Integer(Integer::U64(255)));
        assert_eq!(single("0o17"), TokenKind::Integer(Integer::U64(15)));
        assert_eq!(single("0b1010"), TokenKind::Integer(Integer::U64(10)));
        assert_eq!(
            single("340282366920938463463374607431768211455"),
            TokenKind::Integer(Integer::U128(u128::MAX))
        );
        assert_eq!(
            single("-170141183460469231731687303715884105728"),
            TokenKind::Integer(Integer::I128(i128::MIN))
        );
        match single("340282366920938463463374607431768211456") {
            TokenKind::Integer(Integer::Big(big)) => {
                assert_eq!(big.to_string(), "340282366920938463463374607431768211456");
            }
            other => panic!("expected big integer, got {other:?}"),
        }
    }

    #[test]
    fn test_integer_suffixes_select_width() {
        assert!(matches!(single("255u8"), TokenKind::Integer(Integer::U8(255))));
        assert!(matches!(single("-128i8"), TokenKind::Integer(Integer::I8(-128))));
        assert!(matches!(single("7usize"), TokenKind::Integer(Integer::Usize(7))));
        assert!(matches!(single("-7isize"), TokenKind::Integer(Integer::Isize(-7))));
        assert!(matches!(single("1_u16"), TokenKind::Integer(Integer::U16(1))));
        assert!(matches!(single("0xffu8"), TokenKind::Integer(Integer::U8(255))));
        assert!(matches!(single("-0u32"), TokenKind::Integer(Integer::U32(0))));
    }

    #[test]
    fn test_integer_overflow_is_an_error() {
        for (source, width) in [
            ("256u8", "u8"),
            ("128i8", "i8"),
            ("-1u64", "u64"),
            ("-129i8", "i8"),
            ("340282366920938463463374607431768211456u128", "u128"),
        ] {
            assert_eq!(
                error(source).kind,
                TokenizerErrorKind::InvalidNumericLiteral(NumericError::Overflow(width)),
                "{source}"
            );
        }
        assert_eq!(
            error("12abc").kind,
            TokenizerErrorKind::InvalidNumericLiteral(NumericError::UnknownSuffix)
        );
        assert_eq!(
            error("0x").kind,
            TokenizerErrorKind::InvalidNumericLiteral(NumericError::ExpectedDigit)
        );
    }

    #[test]
    fn test_floats() {
        assert_eq!(single("1.5"), TokenKind::Float(1.5));
        assert_eq!(single("-0.25"), TokenKind::Float(-0.25));
        assert_eq!(single("1e3"), TokenKind::Float(1000.0));
        assert_eq!(single("2.5E-1"), TokenKind::Float(0.25));
        assert_eq!(single("1_0.0_1"), TokenKind::Float(10.01));
        assert_eq!(single("3f64"), TokenKind::Float(3.0));
        assert_eq!(single("0.5f32"), TokenKind::Float(0.5));
        assert_eq!(
            error("1.5u8").kind,
            TokenizerErrorKind::InvalidNumericLiteral(NumericError::UnknownSuffix)
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(kinds("1 // trailing\n2"), kinds("1 2"));
        assert_eq!(kinds("1 /* a /* nested */ comment */ 2"), kinds("1 2"));
        let full: Vec<_> = Tokenizer::full("/* x */1")
            .map(|t| t.unwrap().kind)
            .collect();
        assert_eq!(
            full,
            vec![TokenKind::Comment("/* x */"), TokenKind::Integer(Integer::U64(1))]
        );
        let err = error("1 /* /* */");
        assert_eq!(err.kind, TokenizerErrorKind::UnterminatedComment);
        assert_eq!(err.location.start, 2);
    }

    #[test]
    fn test_unexpected_characters() {
        let err = error("[1, @]");
        assert_eq!(err.kind, TokenizerErrorKind::UnexpectedCharacter('@'));
        assert_eq!(err.location, 4..5);
        assert_eq!(error("-x").kind, TokenizerErrorKind::UnexpectedCharacter('-'));
        assert_eq!(error("1 / 2").kind, TokenizerErrorKind::UnexpectedCharacter('/'));
    }

    #[test]
    fn test_fused_after_error() {
        let mut tokenizer = Tokenizer::minified("@ 1");
        assert!(matches!(tokenizer.next(), Some(Err(_))));
        assert!(tokenizer.next().is_none());
    }
}
