//! Error types for reading, writing and querying cfx2 documents.
//!
//! Every failure in the crate is an [`Error`]. Each error maps onto one of the
//! library's stable result codes ([`ErrorCode`]), which is what input/output
//! error sinks receive and what callers porting code against the numeric codes
//! can compare with.
//!
//! ## Error Categories
//!
//! - **Resource errors**: allocation failure, a source that cannot be opened
//! - **Syntax errors**: reported by the lexer or parser with a line number
//! - **Usage errors**: invalid arguments, missing attributes or child nodes
//!
//! ## Examples
//!
//! ```rust
//! use cfx2::{from_str, ErrorCode};
//!
//! let err = from_str("Node (a: 'x'").unwrap_err();
//! assert_eq!(err.code(), ErrorCode::SyntaxError);
//! assert_eq!(err.line(), Some(1));
//! ```

use std::fmt;
use thiserror::Error;

/// Stable result codes shared by every operation in the crate.
///
/// The numeric values are fixed and returned by [`ErrorCode::as_i32`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    Ok = 0,
    Eof = 1,
    SyntaxError = 2,
    Interrupted = 3,
    InvalidParameter = 4,
    CannotOpenSource = 5,
    AllocError = 6,
    AttributeNotFound = 7,
    MissingNodeName = 8,
    NodeNotFound = 9,
}

impl ErrorCode {
    /// Human readable description of the code.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cfx2::ErrorCode;
    ///
    /// assert_eq!(ErrorCode::Eof.description(), "unexpected end of file");
    /// ```
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            ErrorCode::Ok => "ok",
            ErrorCode::Eof => "unexpected end of file",
            ErrorCode::SyntaxError => "document syntax error",
            ErrorCode::Interrupted => "operation interrupted",
            ErrorCode::InvalidParameter => "invalid function argument",
            ErrorCode::CannotOpenSource => "unable to open the specified file",
            ErrorCode::AllocError => "memory allocation error",
            ErrorCode::AttributeNotFound => "unable to find the specified node attribute",
            ErrorCode::MissingNodeName => "node name empty or not specified",
            ErrorCode::NodeNotFound => "node not found",
        }
    }

    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Looks up the code with the given numeric value.
    #[must_use]
    pub const fn from_i32(value: i32) -> Option<Self> {
        Some(match value {
            0 => ErrorCode::Ok,
            1 => ErrorCode::Eof,
            2 => ErrorCode::SyntaxError,
            3 => ErrorCode::Interrupted,
            4 => ErrorCode::InvalidParameter,
            5 => ErrorCode::CannotOpenSource,
            6 => ErrorCode::AllocError,
            7 => ErrorCode::AttributeNotFound,
            8 => ErrorCode::MissingNodeName,
            9 => ErrorCode::NodeNotFound,
            _ => return None,
        })
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Represents all errors produced by this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Input ended in the middle of a construct
    #[error("Unexpected end of input at line {line}: expected {expected}")]
    UnexpectedEof { line: usize, expected: String },

    /// Lexical or grammatical error in a document or command
    #[error("Syntax error at line {line}: {msg}")]
    Syntax { line: usize, msg: String },

    /// A callback asked for iteration to stop
    #[error("operation interrupted")]
    Interrupted,

    #[error("Invalid argument: {0}")]
    InvalidParameter(String),

    /// A document source could not be opened
    #[error("Unable to open `{path}`: {reason}")]
    CannotOpen { path: String, reason: String },

    /// IO error while reading or writing an already opened stream
    #[error("IO error: {0}")]
    Io(String),

    #[error("Memory allocation error: {0}")]
    Alloc(String),

    #[error("Unable to find attribute `{0}`")]
    AttributeNotFound(String),

    /// The writer met a node without a name below the document root
    #[error(
        "Node name empty or not specified. Parent node: {}",
        .parent.as_deref().map_or_else(|| "document root".to_string(), |p| format!("`{p}`"))
    )]
    MissingNodeName { parent: Option<String> },

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// A path query could not be resolved or is malformed
    #[error("Invalid query `{0}`")]
    InvalidQuery(String),
}

impl Error {
    /// Creates a syntax error at the given line.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cfx2::Error;
    ///
    /// let err = Error::syntax(10, "Expected node name.");
    /// assert!(err.to_string().contains("line 10"));
    /// ```
    pub fn syntax(line: usize, msg: &str) -> Self {
        Error::Syntax {
            line,
            msg: msg.to_string(),
        }
    }

    pub fn unexpected_eof(line: usize, expected: &str) -> Self {
        Error::UnexpectedEof {
            line,
            expected: expected.to_string(),
        }
    }

    pub fn invalid_parameter<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidParameter(msg.to_string())
    }

    pub fn cannot_open<T: fmt::Display>(path: &str, reason: T) -> Self {
        Error::CannotOpen {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates an I/O error for stream reading/writing failures.
    pub fn io<T: fmt::Display>(msg: T) -> Self {
        Error::Io(msg.to_string())
    }

    pub fn alloc<T: fmt::Display>(msg: T) -> Self {
        Error::Alloc(msg.to_string())
    }

    pub fn attribute_not_found(name: &str) -> Self {
        Error::AttributeNotFound(name.to_string())
    }

    pub fn node_not_found(name: &str) -> Self {
        Error::NodeNotFound(name.to_string())
    }

    pub fn missing_node_name(parent: Option<&str>) -> Self {
        Error::MissingNodeName {
            parent: parent.map(str::to_string),
        }
    }

    pub fn invalid_query(query: &str) -> Self {
        Error::InvalidQuery(query.to_string())
    }

    /// Result code of this error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cfx2::{Error, ErrorCode};
    ///
    /// assert_eq!(Error::Interrupted.code(), ErrorCode::Interrupted);
    /// assert_eq!(Error::node_not_found("x").code().as_i32(), 9);
    /// ```
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::UnexpectedEof { .. } => ErrorCode::Eof,
            Error::Syntax { .. } => ErrorCode::SyntaxError,
            Error::Interrupted => ErrorCode::Interrupted,
            Error::InvalidParameter(_) | Error::InvalidQuery(_) => ErrorCode::InvalidParameter,
            Error::CannotOpen { .. } | Error::Io(_) => ErrorCode::CannotOpenSource,
            Error::Alloc(_) => ErrorCode::AllocError,
            Error::AttributeNotFound(_) => ErrorCode::AttributeNotFound,
            Error::MissingNodeName { .. } => ErrorCode::MissingNodeName,
            Error::NodeNotFound(_) => ErrorCode::NodeNotFound,
        }
    }

    /// Source line the error was detected on, for lexical and syntax errors.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Syntax { line, .. } | Error::UnexpectedEof { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::io(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip_through_i32() {
        for value in 0..10 {
            let code = ErrorCode::from_i32(value).unwrap();
            assert_eq!(code.as_i32(), value);
        }
        assert_eq!(ErrorCode::from_i32(10), None);
        assert_eq!(ErrorCode::from_i32(-1), None);
    }

    #[test]
    fn test_missing_node_name_message() {
        let err = Error::missing_node_name(Some("Users"));
        assert_eq!(
            err.to_string(),
            "Node name empty or not specified. Parent node: `Users`"
        );

        let err = Error::missing_node_name(None);
        assert_eq!(
            err.to_string(),
            "Node name empty or not specified. Parent node: document root"
        );
        assert_eq!(err.code(), ErrorCode::MissingNodeName);
    }

    #[test]
    fn test_line_only_for_syntax_errors() {
        assert_eq!(Error::syntax(3, "x").line(), Some(3));
        assert_eq!(Error::unexpected_eof(7, "')'").line(), Some(7));
        assert_eq!(Error::Interrupted.line(), None);
    }

    #[test]
    fn test_io_errors_map_to_cannot_open() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.code(), ErrorCode::CannotOpenSource);
        assert!(err.to_string().contains("gone"));
    }
}
