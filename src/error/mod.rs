//! Error types for parsing, navigation, and value conversion.
//!
//! Parse failures are always surfaced as an explicit [`ParseError`] from the
//! parsing entry points. Navigation failures travel through query chains as
//! values (see [`crate::query::QueryResult::NotFound`]) and only become a
//! [`QueryError`] when a caller asks for one. Typed extraction of text that
//! does not fit the requested type produces a [`ConversionError`].

use std::fmt;

/// Source location within an XML document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number (in characters, not bytes).
    pub column: u32,
    /// 0-based byte offset from the start of the input.
    pub byte_offset: usize,
}

impl SourceLocation {
    /// Computes the line and column of `byte_offset` within `input`.
    ///
    /// Offsets past the end of the input are clamped to the end.
    #[must_use]
    pub fn from_offset(input: &str, byte_offset: usize) -> Self {
        let mut end = byte_offset.min(input.len());
        while !input.is_char_boundary(end) {
            end -= 1;
        }
        let before = &input[..end];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |pos| pos + 1);
        let column = before[line_start..].chars().count() + 1;
        Self {
            line: u32::try_from(line).unwrap_or(u32::MAX),
            column: u32::try_from(column).unwrap_or(u32::MAX),
            byte_offset,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// What stage of document loading failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// The markup is not well-formed.
    Syntax,
    /// The input bytes could not be obtained.
    Io,
    /// The input bytes could not be decoded to text.
    Encoding,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "parse error"),
            Self::Io => write!(f, "read error"),
            Self::Encoding => write!(f, "encoding error"),
        }
    }
}

/// The error type returned when a document cannot be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Which stage failed.
    pub kind: ParseErrorKind,
    /// The primary error message.
    pub message: String,
    /// Where in the source the error occurred. Default for I/O and
    /// encoding failures.
    pub location: SourceLocation,
}

impl ParseError {
    /// Creates a syntax error at the given location.
    pub fn syntax(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind: ParseErrorKind::Syntax,
            message: message.into(),
            location,
        }
    }

    /// Creates an I/O error.
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: ParseErrorKind::Io,
            message: message.into(),
            location: SourceLocation::default(),
        }
    }

    /// Creates an encoding error.
    pub fn encoding(message: impl Into<String>) -> Self {
        Self {
            kind: ParseErrorKind::Encoding,
            message: message.into(),
            location: SourceLocation::default(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParseErrorKind::Syntax => {
                write!(f, "{} at {}: {}", self.kind, self.location, self.message)
            }
            ParseErrorKind::Io | ParseErrorKind::Encoding => {
                write!(f, "{}: {}", self.kind, self.message)
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

/// A navigation failure, carrying the path diagnostic of the failed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    /// The diagnostic message, including the traversal path.
    pub message: String,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "query failed: {}", self.message)
    }
}

impl std::error::Error for QueryError {}

/// An error from strict typed extraction of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// The text is not a valid representation of the target type.
    Invalid {
        /// The text that failed to convert.
        text: String,
        /// The target type name.
        target: &'static str,
    },
    /// The text matches none of the allowed raw values of an enum.
    UnknownVariant {
        /// The text that failed to match.
        text: String,
        /// The allowed raw values.
        expected: Vec<String>,
    },
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid { text, target } => {
                write!(f, "cannot convert {text:?} to {target}")
            }
            Self::UnknownVariant { text, expected } if expected.is_empty() => {
                write!(f, "unknown variant {text:?}")
            }
            Self::UnknownVariant { text, expected } => {
                write!(
                    f,
                    "unknown variant {text:?}, expected one of: {}",
                    expected.join(", ")
                )
            }
        }
    }
}

impl std::error::Error for ConversionError {}
