//! Configuration options for reading and writing documents.
//!
//! - [`ParseOptions`]: lexer and parser settings
//! - [`WriteOptions`]: output formatting
//! - [`Quoting`]: when the writer quotes text and attribute values
//!
//! ## Examples
//!
//! ```rust
//! use cfx2::{from_str, to_string_with_options, Quoting, WriteOptions};
//!
//! let doc = from_str("Window: 'main' (width: 640)").unwrap();
//!
//! let options = WriteOptions::new().with_quoting(Quoting::Minimal);
//! let text = to_string_with_options(&doc, options).unwrap();
//! assert_eq!(text, "Window: main (width: 640)\n");
//! ```

/// Quoting policy for node text and attribute values.
///
/// Names are always written bare when they consist of identifier characters
/// only. Values are quoted unconditionally by default so that they read back
/// as the exact same string.
///
/// # Examples
///
/// ```rust
/// use cfx2::Quoting;
///
/// assert_eq!(Quoting::default(), Quoting::Always);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Quoting {
    #[default]
    Always,
    /// Quote only values that are empty or contain non-identifier characters
    Minimal,
}

/// Settings for the lexer and parser.
///
/// # Examples
///
/// ```rust
/// use cfx2::ParseOptions;
///
/// let options = ParseOptions::new().with_tab_width(8).with_shared_buffers(false);
/// assert_eq!(options.tab_width, 8);
/// assert!(!options.shared_buffers);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Indentation contributed by a tab character
    pub tab_width: usize,
    /// Store parsed strings in per-scope arenas instead of individual allocations
    pub shared_buffers: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            tab_width: 4,
            shared_buffers: true,
        }
    }
}

impl ParseOptions {
    /// Creates default options (tab counts as 4, shared buffers enabled).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }

    /// Enables or disables arena storage for parsed strings.
    ///
    /// With shared buffers disabled every name and value owns its own
    /// allocation and no node carries an arena.
    #[must_use]
    pub fn with_shared_buffers(mut self, shared_buffers: bool) -> Self {
        self.shared_buffers = shared_buffers;
        self
    }
}

/// Output formatting for the writer.
///
/// # Examples
///
/// ```rust
/// use cfx2::{Quoting, WriteOptions};
///
/// let options = WriteOptions::new()
///     .with_indent(4)
///     .with_separate_top_level(false)
///     .with_quoting(Quoting::Minimal);
/// assert_eq!(options.indent, 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteOptions {
    /// Spaces per nesting level
    pub indent: usize,
    /// Emit a blank line between top-level nodes
    pub separate_top_level: bool,
    pub quoting: Quoting,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            indent: 2,
            separate_top_level: true,
            quoting: Quoting::default(),
        }
    }
}

impl WriteOptions {
    /// Creates default options (2-space indent, blank line between top-level
    /// nodes, values always quoted).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cfx2::WriteOptions;
    ///
    /// let options = WriteOptions::new();
    /// assert_eq!(options.indent, 2);
    /// assert!(options.separate_top_level);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options producing the smallest output that still reads back unchanged.
    #[must_use]
    pub fn compact() -> Self {
        WriteOptions {
            indent: 1,
            separate_top_level: false,
            quoting: Quoting::Minimal,
        }
    }

    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    #[must_use]
    pub fn with_separate_top_level(mut self, separate: bool) -> Self {
        self.separate_top_level = separate;
        self
    }

    #[must_use]
    pub fn with_quoting(mut self, quoting: Quoting) -> Self {
        self.quoting = quoting;
        self
    }
}
