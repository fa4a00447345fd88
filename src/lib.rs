//! # cfx2
//!
//! Reader, writer and query engine for cfx2 documents, a small
//! indentation-structured configuration format.
//!
//! ## What is cfx2?
//!
//! A cfx2 document is a tree of named nodes. Every node may carry a text and
//! an ordered list of attributes, and nesting is expressed by indentation:
//!
//! ```text
//! Users (count: '2')
//!   root: 'Administrator' (homeDir: '/root', hasPassword)
//!   guest (homeDir: '/home/guest')
//! ```
//!
//! See [`format`] for the full grammar.
//!
//! ## Key Features
//!
//! - **Streaming lexer**: Reads any [`Input`] in fixed-size chunks
//! - **Shared buffers**: Parsed strings of one block of siblings live in one
//!   reference-counted arena
//! - **Path queries**: `Users/root.homeDir` style lookups that can also create
//!   and assign
//! - **Select commands**: `select user*, *Dir` pattern matching over children
//! - **Merging**: Combine two nodes with per-field precedence flags
//! - **Serde Compatible**: [`Node`] and [`Attribute`] implement `Serialize`
//!   and `Deserialize`
//!
//! ## Quick Start
//!
//! ```rust
//! use cfx2::{from_str, to_string};
//!
//! let mut doc = from_str("Users\n  root: 'Administrator' (homeDir: '/root')").unwrap();
//!
//! assert_eq!(doc.query_value("Users/root.homeDir"), Some("/root"));
//!
//! doc.apply("Users/guest.homeDir:/home/guest").unwrap();
//! assert_eq!(
//!     to_string(&doc).unwrap(),
//!     "Users\n  root: 'Administrator' (homeDir: '/root')\n  guest (homeDir: '/home/guest')\n"
//! );
//! ```
//!
//! ### Select Commands
//!
//! ```rust
//! use cfx2::{compile, from_str};
//!
//! let doc = from_str("userA\nuserB\nadminX").unwrap();
//! let cmd = compile("select user*").unwrap();
//!
//! let names: Vec<_> = cmd.select(&doc).filter_map(|n| n.name()).collect();
//! assert_eq!(names, ["userA", "userB"]);
//! ```
//!
//! ### Partial Documents
//!
//! [`from_str`] discards everything on a syntax error. [`read`] keeps the
//! top-level nodes completed before the error:
//!
//! ```rust
//! use cfx2::{read, SliceInput};
//!
//! let parsed = read(SliceInput::from("Ok: 'fine'\nBroken ("));
//! assert!(!parsed.is_ok());
//! assert_eq!(parsed.document.child_count(), 1);
//! ```
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - Parsing, editing and writing a document
//! - **`queries.rs`** - Path queries and select commands
//! - **`merge.rs`** - Merging configuration layers
//!
//! Run any example with: `cargo run --example <name>`

pub mod arena;
pub mod command;
pub mod de;
pub mod error;
pub mod format;
pub mod io;
pub mod lexer;
pub mod merge;
pub mod node;
pub mod options;
pub mod query;
pub mod reader;
pub mod ser;
pub mod writer;

pub use arena::{SharedBuffer, SharedStr, Span, Text};
pub use command::{Command, Mask, Operation, Piece};
pub use error::{Error, ErrorCode, Result};
pub use io::{Input, IoOutput, Output, ReadInput, SliceInput};
pub use merge::{merge, MergeFlags};
pub use node::{Attribute, Node, Uniqueness};
pub use options::{ParseOptions, Quoting, WriteOptions};
pub use query::{Resolved, ResolvedMut};
pub use reader::{Parsed, Parser};
pub use writer::Writer;

use std::fs::File;
use std::path::Path;

/// Parses a document from a string.
///
/// # Examples
///
/// ```rust
/// use cfx2::from_str;
///
/// let doc = from_str("Window: 'main' (width: 640, height: 480)").unwrap();
/// let window = &doc.children()[0];
/// assert_eq!(window.text(), Some("main"));
/// assert_eq!(window.attrib_i64("height").unwrap(), 480);
/// ```
///
/// # Errors
///
/// Returns the first syntax error, with its line number.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str(s: &str) -> Result<Node> {
    from_str_with_options(s, ParseOptions::default())
}

/// Parses a document from a string with custom options.
///
/// # Examples
///
/// ```rust
/// use cfx2::{from_str_with_options, ParseOptions};
///
/// let options = ParseOptions::new().with_tab_width(2);
/// let doc = from_str_with_options("A\n\tB\n  C", options).unwrap();
/// assert_eq!(doc.children()[0].child_count(), 2);
/// ```
///
/// # Errors
///
/// Returns the first syntax error, with its line number.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_options(s: &str, options: ParseOptions) -> Result<Node> {
    from_slice_with_options(s.as_bytes(), &options)
}

/// Parses a document from bytes.
///
/// Only quoted texts have to be valid UTF-8; everything outside quotes is
/// ASCII by construction.
///
/// # Errors
///
/// Returns the first syntax error, with its line number.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice(v: &[u8]) -> Result<Node> {
    from_slice_with_options(v, &ParseOptions::default())
}

fn from_slice_with_options(v: &[u8], options: &ParseOptions) -> Result<Node> {
    Parser::with_options(SliceInput::new(v), options)
        .parse()
        .into_result()
}

/// Parses a document from an I/O stream.
///
/// # Examples
///
/// ```rust
/// use cfx2::from_reader;
/// use std::io::Cursor;
///
/// let doc = from_reader(Cursor::new(b"A\n  B")).unwrap();
/// assert_eq!(doc.query_node("A/B").and_then(|n| n.name()), Some("B"));
/// ```
///
/// # Errors
///
/// Returns [`Error::Io`] if reading fails, otherwise the first syntax error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R>(reader: R) -> Result<Node>
where
    R: std::io::Read,
{
    Parser::new(ReadInput::new(reader)).parse().into_result()
}

/// Parses the document stored at `path`.
///
/// # Errors
///
/// Returns [`Error::CannotOpen`] if the file cannot be opened, otherwise the
/// first syntax error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Node> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::cannot_open(&path.display().to_string(), e))?;
    from_reader(file)
}

/// Parses everything `input` provides, keeping a partial document on error.
///
/// Errors are also passed to [`Input::handle_error`] as they occur.
pub fn read<I: Input>(input: I) -> Parsed {
    Parser::new(input).parse()
}

/// Writes a document to a string.
///
/// # Examples
///
/// ```rust
/// use cfx2::{to_string, Node};
///
/// let mut doc = Node::document();
/// doc.add_child(Node::new("A").with_text("x"));
/// doc.add_child(Node::new("B"));
/// assert_eq!(to_string(&doc).unwrap(), "A: 'x'\n\nB\n");
/// ```
///
/// # Errors
///
/// Returns [`Error::MissingNodeName`] if a node below the root is unnamed.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string(document: &Node) -> Result<String> {
    to_string_with_options(document, WriteOptions::default())
}

/// Writes a document to a string with custom options.
///
/// # Errors
///
/// Returns [`Error::MissingNodeName`] if a node below the root is unnamed.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options(document: &Node, options: WriteOptions) -> Result<String> {
    let bytes = Writer::with_options(Vec::new(), options).write_document(document)?;
    String::from_utf8(bytes).map_err(Error::io)
}

/// Writes a document to an I/O stream.
///
/// # Examples
///
/// ```rust
/// use cfx2::{from_str, to_writer};
///
/// let doc = from_str("A (k: 'v')").unwrap();
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &doc).unwrap();
/// assert_eq!(buffer, b"A (k: 'v')\n");
/// ```
///
/// # Errors
///
/// Returns an error if writing fails or a node below the root is unnamed.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W>(writer: W, document: &Node) -> Result<()>
where
    W: std::io::Write,
{
    Writer::new(IoOutput::new(writer)).write_document(document)?;
    Ok(())
}

/// Writes a document to the file at `path`, replacing its contents.
///
/// # Errors
///
/// Returns [`Error::CannotOpen`] if the file cannot be created, otherwise
/// the writer's error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_path<P: AsRef<Path>>(document: &Node, path: P) -> Result<()> {
    let path = path.as_ref();
    let file =
        File::create(path).map_err(|e| Error::cannot_open(&path.display().to_string(), e))?;
    to_writer(std::io::BufWriter::new(file), document)
}

/// Compiles a select command.
///
/// # Errors
///
/// Returns [`Error::Syntax`] for a malformed command.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn compile(command: &str) -> Result<Command> {
    Command::compile(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    const USERS: &str = "Users (count: '2')\n  root: 'Administrator' (homeDir: '/root', hasPassword)\n  guest (homeDir: '/home/guest')\n\nGroups\n  wheel (members: 'root')\n";

    #[test]
    fn test_write_read_back() {
        let doc = from_str(USERS).unwrap();
        assert_eq!(to_string(&doc).unwrap(), USERS);
    }

    #[test]
    fn test_from_slice_matches_from_str() {
        assert_eq!(from_slice(USERS.as_bytes()).unwrap(), from_str(USERS).unwrap());
    }

    #[test]
    fn test_from_slice_invalid_utf8_in_quotes() {
        let err = from_slice(b"A: '\xff'").unwrap_err();
        assert_eq!(err.code(), ErrorCode::SyntaxError);
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = from_path("/nonexistent/dir/doc.cfx2").unwrap_err();
        assert!(matches!(err, Error::CannotOpen { .. }));
        assert_eq!(err.code(), ErrorCode::CannotOpenSource);
    }

    #[test]
    fn test_path_round_trip() {
        let path = std::env::temp_dir().join(format!("cfx2-lib-{}.cfx2", std::process::id()));
        let doc = from_str(USERS).unwrap();
        to_path(&doc, &path).unwrap();
        let back = from_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_read_keeps_partial_document() {
        let parsed = read(SliceInput::from("A\nB\n  C (x: 'y' =\nD"));
        assert_eq!(parsed.document.child_count(), 1);
        assert_eq!(parsed.error.as_ref().and_then(Error::line), Some(3));
    }

    #[test]
    fn test_to_string_with_options() {
        let doc = from_str("A: 'x'\nB").unwrap();
        let options = WriteOptions::new().with_separate_top_level(false);
        assert_eq!(to_string_with_options(&doc, options).unwrap(), "A: 'x'\nB\n");
    }

    #[test]
    fn test_compile() {
        assert!(compile("select *").is_ok());
        assert!(compile("where").is_err());
    }
}
