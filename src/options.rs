//! Configuration for parsing and writing RSN.
//!
//! - [`ParseConfig`]: limits and leniency switches for the parser and deserializer
//! - [`WriteConfig`]: output layout for the writer and serializer
//!
//! ## Examples
//!
//! ```rust
//! use serde_rsn::{to_string_with_config, WriteConfig};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Data { x: i32, y: i32 }
//!
//! let data = Data { x: 1, y: 2 };
//!
//! let rsn = to_string_with_config(&data, &WriteConfig::new()).unwrap();
//! assert_eq!(rsn, "Data{x:1,y:2}");
//!
//! let rsn = to_string_with_config(&data, &WriteConfig::new().with_anonymous_structs(true)).unwrap();
//! assert_eq!(rsn, "{x:1,y:2}");
//! ```

use std::borrow::Cow;

/// Parser and deserializer configuration.
///
/// # Examples
///
/// ```rust
/// use serde_rsn::ParseConfig;
///
/// let config = ParseConfig::new()
///     .with_max_depth(16)
///     .with_allow_duplicate_keys(false);
/// assert_eq!(config.max_depth, 16);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseConfig {
    /// Containers nested deeper than this fail with `DepthLimitExceeded`.
    pub max_depth: usize,
    /// When `false`, deserializing a map or struct that repeats a key fails
    /// with `DuplicateKeyRejected`.
    pub allow_duplicate_keys: bool,
    /// Accept `key: value` pairs at the root without surrounding braces.
    pub allow_implicit_map_at_root: bool,
    /// Emit `Comment` events instead of skipping comments.
    pub include_comments: bool,
    /// Stop after the first complete value instead of rejecting anything that
    /// follows it.
    pub allow_trailing_data: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        ParseConfig {
            max_depth: 128,
            allow_duplicate_keys: true,
            allow_implicit_map_at_root: false,
            include_comments: false,
            allow_trailing_data: false,
        }
    }
}

impl ParseConfig {
    /// Creates the default configuration (depth limit 128, duplicate keys allowed).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration that rejects duplicate keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_rsn::ParseConfig;
    ///
    /// assert!(!ParseConfig::strict().allow_duplicate_keys);
    /// ```
    #[must_use]
    pub fn strict() -> Self {
        ParseConfig {
            allow_duplicate_keys: false,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_allow_duplicate_keys(mut self, allow: bool) -> Self {
        self.allow_duplicate_keys = allow;
        self
    }

    /// Allows a document such as `name: "x" size: 3` to parse as a map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_rsn::{ParseConfig, Value};
    ///
    /// let config = ParseConfig::new().with_implicit_map_at_root(true);
    /// let value = Value::parse("a: 1\nb: 2", &config).unwrap();
    /// assert_eq!(value.as_map().map(|map| map.len()), Some(2));
    /// ```
    #[must_use]
    pub fn with_implicit_map_at_root(mut self, allow: bool) -> Self {
        self.allow_implicit_map_at_root = allow;
        self
    }

    #[must_use]
    pub fn with_include_comments(mut self, include: bool) -> Self {
        self.include_comments = include;
        self
    }

    #[must_use]
    pub fn with_allow_trailing_data(mut self, allow: bool) -> Self {
        self.allow_trailing_data = allow;
        self
    }
}

/// Whitespace layout for written RSN.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// No whitespace beyond what separates tokens.
    #[default]
    Compact,
    /// One item per line, indented by `indent_width` spaces per nesting level,
    /// with a trailing comma after the last item.
    Pretty { indent_width: usize },
}

/// How identifiers that collide with keywords (`true`, `false`, `inf`, `NaN`)
/// are written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KeywordEscape {
    /// `r#true`
    #[default]
    Raw,
    /// `"true"`; only used where a string is accepted in place of an
    /// identifier, such as map keys.
    Quoted,
}

/// Writer and serializer configuration.
///
/// # Examples
///
/// ```rust
/// use serde_rsn::{OutputMode, WriteConfig};
///
/// // Default compact output
/// let config = WriteConfig::new();
/// assert_eq!(config.mode, OutputMode::Compact);
///
/// // Pretty output with 4-space indentation
/// let config = WriteConfig::pretty().with_indent(4);
/// assert_eq!(config.mode, OutputMode::Pretty { indent_width: 4 });
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteConfig {
    pub mode: OutputMode,
    /// Written once per nesting level in place of `indent_width` spaces.
    pub indentation: Option<Cow<'static, str>>,
    /// Line break between entries of pretty containers and implicit root maps.
    pub newline: Cow<'static, str>,
    pub keyword_escape: KeywordEscape,
    /// Write serialized structs as `{field: value}` instead of `Name{field: value}`.
    pub anonymous_structs: bool,
    /// Write a root-level map or struct as bare `key: value` lines.
    pub implicit_map_at_root: bool,
    /// Write a width suffix (`5u8`) on integers that are not of a default width.
    pub integer_suffixes: bool,
}

impl Default for WriteConfig {
    fn default() -> Self {
        WriteConfig {
            mode: OutputMode::default(),
            indentation: None,
            newline: Cow::Borrowed("\n"),
            keyword_escape: KeywordEscape::default(),
            anonymous_structs: false,
            implicit_map_at_root: false,
            integer_suffixes: false,
        }
    }
}

impl WriteConfig {
    /// Creates the default compact configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pretty configuration with 2-space indentation.
    #[must_use]
    pub fn pretty() -> Self {
        WriteConfig {
            mode: OutputMode::Pretty { indent_width: 2 },
            ..Default::default()
        }
    }

    /// Sets the indentation width. Switches to pretty mode if needed.
    #[must_use]
    pub fn with_indent(mut self, indent_width: usize) -> Self {
        self.mode = OutputMode::Pretty { indent_width };
        self
    }

    /// Indents with `indentation` repeated once per level, such as `"\t"`.
    /// Switches to pretty mode if needed.
    ///
    /// The text must be whitespace for the output to parse back.
    #[must_use]
    pub fn with_indentation(mut self, indentation: impl Into<Cow<'static, str>>) -> Self {
        if !self.is_pretty() {
            self.mode = OutputMode::Pretty { indent_width: 2 };
        }
        self.indentation = Some(indentation.into());
        self
    }

    /// Sets the line break, such as `"\r\n"`. The text must be whitespace.
    #[must_use]
    pub fn with_newline(mut self, newline: impl Into<Cow<'static, str>>) -> Self {
        self.newline = newline.into();
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_keyword_escape(mut self, keyword_escape: KeywordEscape) -> Self {
        self.keyword_escape = keyword_escape;
        self
    }

    #[must_use]
    pub fn with_anonymous_structs(mut self, anonymous: bool) -> Self {
        self.anonymous_structs = anonymous;
        self
    }

    #[must_use]
    pub fn with_implicit_map_at_root(mut self, implicit: bool) -> Self {
        self.implicit_map_at_root = implicit;
        self
    }

    #[must_use]
    pub fn with_integer_suffixes(mut self, suffixes: bool) -> Self {
        self.integer_suffixes = suffixes;
        self
    }

    pub(crate) const fn is_pretty(&self) -> bool {
        matches!(self.mode, OutputMode::Pretty { .. })
    }
}
