//! Document serialization.
//!
//! The writer emits one line per node:
//!
//! ```text
//! <indent><name>[: <text>][ (<attr>[: <value>], ...)]
//! ```
//!
//! Names are written bare when they consist of identifier characters only,
//! otherwise in single quotes with `'` and `\` escaped. Text and attribute
//! values follow [`Quoting`]. Top-level nodes are separated by a blank line
//! unless [`WriteOptions::separate_top_level`] is off.
//!
//! ```rust
//! use cfx2::{Node, Writer};
//!
//! let mut doc = Node::document();
//! let users = doc.add_child(Node::new("Users"));
//! users.add_child(Node::new("root").with_text("admin"));
//! users.set_attrib("count", Some("1")).unwrap();
//! doc.add_child(Node::new("Groups"));
//!
//! let bytes = Writer::new(Vec::new()).write_document(&doc).unwrap();
//! assert_eq!(
//!     String::from_utf8(bytes).unwrap(),
//!     "Users (count: '1')\n  root: 'admin'\n\nGroups\n"
//! );
//! ```

use crate::io::Output;
use crate::lexer::is_identifier;
use crate::node::{Attribute, Node};
use crate::options::{Quoting, WriteOptions};
use crate::{Error, Result};
use tracing::debug;

const SPACES: &[u8] = b"                                ";

/// Writes nodes to an [`Output`].
pub struct Writer<O> {
    output: O,
    options: WriteOptions,
    written: usize,
}

impl<O: Output> Writer<O> {
    pub fn new(output: O) -> Self {
        Self::with_options(output, WriteOptions::default())
    }

    pub fn with_options(output: O, options: WriteOptions) -> Self {
        Writer {
            output,
            options,
            written: 0,
        }
    }

    /// Writes the children of `document` as top-level nodes and returns the
    /// output.
    ///
    /// The output's `finished` hook runs even if writing fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingNodeName`] if a node below the root has no
    /// name, or the output's error.
    pub fn write_document(mut self, document: &Node) -> Result<O> {
        let result = self.write_top_level(document.children());
        self.finish(result)
    }

    /// Writes `node` and its subtree as a single top-level node.
    ///
    /// # Errors
    ///
    /// Same as [`Writer::write_document`].
    pub fn write_node(mut self, node: &Node) -> Result<O> {
        let result = self.write_top_level(std::slice::from_ref(node));
        self.finish(result)
    }

    fn finish(mut self, result: Result<()>) -> Result<O> {
        let finished = self.output.finished();
        result?;
        finished?;
        debug!(bytes = self.written, "document written");
        Ok(self.output)
    }

    fn write_top_level(&mut self, nodes: &[Node]) -> Result<()> {
        for (i, node) in nodes.iter().enumerate() {
            self.write_tree(node, 0, None)?;
            if self.options.separate_top_level && i + 1 < nodes.len() {
                self.write(b"\n")?;
            }
        }
        Ok(())
    }

    fn write_tree(&mut self, node: &Node, depth: usize, parent: Option<&Node>) -> Result<()> {
        self.write_indent(depth)?;

        let name = match node.name() {
            Some(name) => name,
            None => {
                let err = Error::missing_node_name(parent.and_then(Node::name));
                self.output.handle_error(err.code(), &err.to_string());
                return Err(err);
            }
        };
        self.write_name(name)?;

        if let Some(text) = node.text() {
            self.write(b": ")?;
            self.write_value(text)?;
        }

        if !node.attributes().is_empty() {
            self.write(b" (")?;
            for (i, attrib) in node.attributes().iter().enumerate() {
                if i > 0 {
                    self.write(b", ")?;
                }
                self.write_attribute(attrib)?;
            }
            self.write(b")")?;
        }
        self.write(b"\n")?;

        for child in node.children() {
            self.write_tree(child, depth + 1, Some(node))?;
        }
        Ok(())
    }

    fn write_attribute(&mut self, attrib: &Attribute) -> Result<()> {
        self.write_name(attrib.name())?;
        if let Some(value) = attrib.value() {
            self.write(b": ")?;
            self.write_value(value)?;
        }
        Ok(())
    }

    fn write_indent(&mut self, depth: usize) -> Result<()> {
        let mut remaining = depth * self.options.indent;
        while remaining > 0 {
            let n = remaining.min(SPACES.len());
            self.write(&SPACES[..n])?;
            remaining -= n;
        }
        Ok(())
    }

    fn write_name(&mut self, name: &str) -> Result<()> {
        if is_identifier(name) {
            self.write(name.as_bytes())
        } else {
            self.write_quoted(name)
        }
    }

    fn write_value(&mut self, value: &str) -> Result<()> {
        match self.options.quoting {
            Quoting::Minimal if is_identifier(value) => self.write(value.as_bytes()),
            _ => self.write_quoted(value),
        }
    }

    fn write_quoted(&mut self, s: &str) -> Result<()> {
        self.write(b"'")?;
        let bytes = s.as_bytes();
        let mut start = 0;
        for (i, &b) in bytes.iter().enumerate() {
            if b == b'\'' || b == b'\\' {
                self.write(&bytes[start..i])?;
                self.write(b"\\")?;
                start = i;
            }
        }
        self.write(&bytes[start..])?;
        self.write(b"'")
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.written += bytes.len();
        self.output.write(bytes)
    }
}
