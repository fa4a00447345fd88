//! The document format.
//!
//! This module contains only documentation.
//!
//! # Overview
//!
//! A document is a sequence of nodes, one per line. Each node has a name, an
//! optional text, an optional attribute list and any number of child nodes.
//! Nesting is expressed by indentation alone.
//!
//! ```text
//! Users (count: '2')
//!   root: 'Administrator' (homeDir: '/root', hasPassword)
//!   guest: 'Guest account' (homeDir: '/home/guest')
//!
//! Groups
//!   wheel (members: 'root')
//! ```
//!
//! # Lexical Structure
//!
//! | Token | Syntax | Example |
//! |-------|--------|---------|
//! | Identifier | bytes from `A-Z a-z 0-9 _ - ~ ! @ # $ %` | `homeDir`, `user-1` |
//! | Text | single quotes, `\` escapes the next byte | `'it\'s'` |
//! | String | double quotes, same escaping | `"value"` |
//! | Punctuation | `:` `,` `=` `(` `)` `*` | |
//! | Comment | anything between `{` and `}` | `{ ignored }` |
//!
//! Identifiers and single-quoted texts are interchangeable wherever a name is
//! expected. Double-quoted strings are only accepted as values.
//!
//! Identifier classification is byte-oriented: any byte outside the set above,
//! including every non-ASCII byte, has to appear inside quotes.
//!
//! # Indentation
//!
//! - A space counts 1, a tab counts [`ParseOptions::tab_width`] (default 4)
//! - A newline resets the count; comments do not. In `  {c} B` the comment
//!   is skipped and `B` is indented by 2, and whitespace after a comment
//!   keeps adding to the same count
//! - A node is a child of the closest preceding node indented less than it
//! - The first child of a node fixes the indentation of its siblings; a later
//!   node indented less than that closes the block
//!
//! ```text
//! A
//!     B        { child of A, sibling indent is now 4 }
//!       C      { child of B }
//!   D          { indented less than B: closes A's block, becomes top-level }
//! ```
//!
//! # Nodes
//!
//! ```text
//! name
//! name: text
//! name (attr, attr: value)
//! name: text (attr: value)
//! ```
//!
//! An attribute without `: value` has no value, which is distinct from an
//! empty value (`attr: ''`). Attribute names are unique only by convention;
//! the parser keeps duplicates in order.
//!
//! # Writing
//!
//! The writer indents each level by [`WriteOptions::indent`] spaces (default
//! 2), writes names bare when they are identifiers and quotes them otherwise,
//! quotes texts and values according to [`Quoting`], and separates top-level
//! nodes with a blank line. Comments are not preserved.
//!
//! # Errors
//!
//! Syntax errors carry the 1-based line number of the offending token and are
//! passed to [`Input::handle_error`] before the parse stops. The resulting
//! [`Error`] maps to an [`ErrorCode`] with the classic numeric values:
//!
//! | Code | Value | Meaning |
//! |------|-------|---------|
//! | `Ok` | 0 | success |
//! | `Eof` | 1 | input ended inside a token |
//! | `SyntaxError` | 2 | malformed input |
//! | `Interrupted` | 3 | a callback stopped an iteration |
//! | `InvalidParameter` | 4 | invalid argument or query |
//! | `CannotOpenSource` | 5 | file could not be read or written |
//! | `AllocError` | 6 | storage could not be reserved |
//! | `AttributeNotFound` | 7 | no attribute with that name |
//! | `MissingNodeName` | 8 | unnamed node below the root |
//! | `NodeNotFound` | 9 | no child with that name or index |
//!
//! [`ParseOptions::tab_width`]: crate::ParseOptions::tab_width
//! [`WriteOptions::indent`]: crate::WriteOptions::indent
//! [`Quoting`]: crate::Quoting
//! [`Input::handle_error`]: crate::Input::handle_error
//! [`Error`]: crate::Error
//! [`ErrorCode`]: crate::ErrorCode
