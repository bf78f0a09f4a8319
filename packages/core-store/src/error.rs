//! Error types for the core layer.

use crate::path::{Path, PathError};

/// Why a document failed to parse.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("unterminated string")]
    UnterminatedString,

    #[error("unterminated block comment")]
    UnterminatedComment,

    #[error("invalid escape sequence '\\{0}'")]
    InvalidEscape(char),

    #[error("invalid unicode escape: {0}")]
    InvalidUnicode(String),

    #[error("control character U+{0:04X} in string")]
    ControlCharacter(u32),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("trailing comma before '{0}'")]
    TrailingComma(char),

    #[error("expected ':' after object key")]
    ExpectedColon,

    #[error("expected string key")]
    ExpectedKey,

    #[error("expected ',' or '{0}'")]
    ExpectedSeparator(char),

    #[error("nesting deeper than {0} levels")]
    DepthLimit(usize),

    #[error("document root must be an object")]
    RootNotObject,

    #[error("trailing content after document root")]
    TrailingContent,
}

/// A parse failure with the 1-based position where it was detected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}, column {column}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub kind: ParseErrorKind,
}

/// Errors at the core layer.
///
/// Missing settings are never errors; these cover malformed input and
/// writes that cannot be carried out.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("path error: {0}")]
    Path(#[from] PathError),

    #[error("invalid path: {message}")]
    InvalidPath { message: String },

    /// A write tried to descend through a value that is not an object.
    #[error("cannot create '{path}': an ancestor is not an object")]
    PathConflict { path: Path },

    /// An indexed write past the longest array the live layer will grow.
    #[error("index {index} is out of range (at most {limit} elements)")]
    IndexOutOfRange { index: usize, limit: usize },

    #[error("invalid layer priority: {priority}")]
    InvalidPriority { priority: f64 },

    #[error("invalid layer: {message}")]
    InvalidLayer { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn parse_error_display() {
        let e = ParseError {
            line: 3,
            column: 14,
            kind: ParseErrorKind::TrailingComma('}'),
        };
        assert_eq!(e.to_string(), "line 3, column 14: trailing comma before '}'");
    }

    #[test]
    fn parse_error_converts_and_chains() {
        let e: Error = ParseError {
            line: 1,
            column: 1,
            kind: ParseErrorKind::RootNotObject,
        }
        .into();
        assert!(matches!(e, Error::Parse(_)));
        assert!(e.to_string().contains("document root must be an object"));
        assert!(StdError::source(&e).is_some());
    }

    #[test]
    fn path_conflict_display() {
        let e = Error::PathConflict {
            path: Path::parse(".a.b").unwrap(),
        };
        assert!(e.to_string().contains(".a.b"));
    }

    #[test]
    fn index_out_of_range_display() {
        let e = Error::IndexOutOfRange {
            index: 70000,
            limit: 65536,
        };
        assert_eq!(
            e.to_string(),
            "index 70000 is out of range (at most 65536 elements)"
        );
    }

    #[test]
    fn control_character_display() {
        let kind = ParseErrorKind::ControlCharacter(0x0a);
        assert_eq!(kind.to_string(), "control character U+000A in string");
    }

    #[test]
    fn invalid_priority_source_is_none() {
        let e = Error::InvalidPriority { priority: f64::NAN };
        assert!(StdError::source(&e).is_none());
        assert!(e.to_string().contains("NaN"));
    }
}
