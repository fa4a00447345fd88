//! Indentation-driven document parser.
//!
//! ## Grammar
//!
//! ```text
//! document   := node*
//! node       := NAME [':' value] ['(' attributes ')'] child*
//! attributes := NAME [':' value] (',' NAME [':' value])*
//! value      := TEXT | STRING
//! ```
//!
//! A node is a child of the nearest preceding node whose indentation is
//! smaller than its own. Within one block of children, the first child's
//! indentation becomes the minimum for its siblings; a node indented less
//! than that closes the block and is reconsidered one level up.
//!
//! ## Storage
//!
//! The names and values of one block of sibling nodes are allocated in one
//! shared buffer. When the block is complete the buffer is frozen and attached
//! to the block's parent (the document root for top-level nodes). Empty blocks
//! attach nothing.
//!
//! ## Errors
//!
//! A syntax error stops the parse. The document keeps every top-level node
//! completed before the one containing the error.
//!
//! ```rust
//! use cfx2::{Parser, SliceInput};
//!
//! let parsed = Parser::new(SliceInput::from("Good\nBad (a: 'x'")).parse();
//! assert!(parsed.error.is_some());
//! assert_eq!(parsed.document.child_count(), 1);
//! assert_eq!(parsed.document.children()[0].name(), Some("Good"));
//! ```

use crate::arena::{SharedBuffer, SharedStr, Span, Text};
use crate::io::Input;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::node::{Attribute, Node};
use crate::options::ParseOptions;
use crate::{Error, Result};
use tracing::debug;

/// String stored before its arena is frozen.
enum Slot {
    Span(Span),
    Owned(Text),
}

impl Slot {
    fn resolve(self, arena: Option<&SharedStr>) -> Text {
        match (self, arena) {
            (Slot::Owned(text), _) => text,
            (Slot::Span(span), Some(arena)) => arena.text(span),
            (Slot::Span(_), None) => Text::default(),
        }
    }
}

/// Node whose own strings still refer to the enclosing scope's buffer.
struct Pending {
    indent: usize,
    name: Slot,
    text: Option<Slot>,
    attributes: Vec<(Slot, Option<Slot>)>,
    children: Vec<Node>,
    shared: Option<SharedStr>,
}

impl Pending {
    fn resolve(self, arena: Option<&SharedStr>) -> Node {
        let attributes = self
            .attributes
            .into_iter()
            .map(|(name, value)| Attribute {
                name: name.resolve(arena),
                value: value.map(|v| v.resolve(arena)),
            })
            .collect();

        Node {
            attributes,
            children: self.children,
            text: self.text.map(|t| t.resolve(arena)),
            name: Some(self.name.resolve(arena)),
            shared: self.shared,
        }
    }
}

/// Allocation scope of one block of sibling nodes.
struct Scope {
    buffer: Option<SharedBuffer>,
}

impl Scope {
    fn new(shared: bool) -> Self {
        Scope {
            buffer: shared.then(SharedBuffer::new),
        }
    }

    fn store(&mut self, s: String) -> Result<Slot> {
        match &mut self.buffer {
            Some(buffer) if !s.is_empty() => Ok(Slot::Span(buffer.alloc(&s)?)),
            _ => Ok(Slot::Owned(Text::from(s))),
        }
    }

    fn close(self, pending: Vec<Pending>) -> (Vec<Node>, Option<SharedStr>) {
        let arena = self
            .buffer
            .filter(|buffer| !buffer.is_empty())
            .map(SharedBuffer::freeze);
        let nodes = pending
            .into_iter()
            .map(|p| p.resolve(arena.as_ref()))
            .collect();
        (nodes, arena)
    }
}

/// Result of a parse: the (possibly partial) document and the error that
/// stopped it, if any.
#[derive(Debug)]
pub struct Parsed {
    pub document: Node,
    pub error: Option<Error>,
}

impl Parsed {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Returns the document, discarding a partial tree on error.
    ///
    /// # Errors
    ///
    /// Returns the error that stopped the parse.
    pub fn into_result(self) -> Result<Node> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.document),
        }
    }
}

/// Recursive-descent document parser over an [`Input`].
pub struct Parser<I> {
    lexer: Lexer<I>,
    shared_buffers: bool,
}

impl<I: Input> Parser<I> {
    pub fn new(input: I) -> Self {
        Self::with_options(input, &ParseOptions::default())
    }

    pub fn with_options(input: I, options: &ParseOptions) -> Self {
        Parser {
            lexer: Lexer::with_options(input, options),
            shared_buffers: options.shared_buffers,
        }
    }

    /// Parses the whole input into a document.
    ///
    /// The input's `finished` hook is called before returning.
    pub fn parse(mut self) -> Parsed {
        let mut scope = Scope::new(self.shared_buffers);
        let mut top = Vec::new();

        let mut error = loop {
            match self.node(0, &mut scope) {
                Ok(Some(node)) => top.push(node),
                Ok(None) => break None,
                Err(err) => break Some(err),
            }
        };
        if let Some(err) = self.lexer.take_input_error() {
            error = Some(self.lexer.report(err));
        }

        let (children, shared) = scope.close(top);
        let document = Node {
            children,
            shared,
            ..Node::default()
        };
        self.lexer.finish();

        debug!(
            top_level = document.child_count(),
            arena_bytes = document.shared_buffer().map_or(0, SharedStr::len),
            error = ?error,
            "parsed document"
        );
        Parsed { document, error }
    }

    fn fail(&mut self, line: Option<usize>, msg: &str) -> Error {
        let line = line.unwrap_or_else(|| self.lexer.line());
        self.lexer.report(Error::syntax(line, msg))
    }

    fn store(&mut self, scope: &mut Scope, s: String) -> Result<Slot> {
        scope.store(s).map_err(|err| self.lexer.report(err))
    }

    /// Consumes the next token if `accept` holds for its kind, failing with
    /// `msg` otherwise.
    fn expect(&mut self, accept: fn(TokenKind) -> bool, msg: &str) -> Result<String> {
        let found = self.lexer.peek()?.map(|t| (t.kind, t.line));
        match found {
            Some((kind, _)) if accept(kind) => {
                let token = self.lexer.next_token()?;
                Ok(token.and_then(Token::into_text).unwrap_or_default())
            }
            Some((_, line)) => Err(self.fail(Some(line), msg)),
            None => Err(self.fail(None, msg)),
        }
    }

    fn expect_value(&mut self, msg: &str) -> Result<String> {
        self.expect(TokenKind::is_value, msg)
    }

    /// Names are bare or single-quoted, and never empty.
    fn expect_name(&mut self, msg: &str) -> Result<String> {
        let line = self.lexer.peek()?.map(|t| t.line);
        let name = self.expect(|kind| kind == TokenKind::Text, msg)?;
        if name.is_empty() {
            return Err(self.fail(line, msg));
        }
        Ok(name)
    }

    fn node(&mut self, min_indent: usize, scope: &mut Scope) -> Result<Option<Pending>> {
        let (kind, indent, line) = match self.lexer.peek()? {
            Some(token) => (token.kind, token.indent, token.line),
            None => return Ok(None),
        };
        if kind != TokenKind::Text {
            return Err(self.fail(Some(line), "Expected node name."));
        }
        if indent < min_indent {
            return Ok(None);
        }

        let name = self.expect_name("Expected node name.")?;
        let name = self.store(scope, name)?;
        let mut pending = Pending {
            indent,
            name,
            text: None,
            attributes: Vec::new(),
            children: Vec::new(),
            shared: None,
        };

        if self.lexer.next_if(TokenKind::Colon)?.is_some() {
            let text = self.expect_value("Expected node value after ':' symbol.")?;
            pending.text = Some(self.store(scope, text)?);
        }

        if self.lexer.next_if(TokenKind::ParenL)?.is_some() {
            self.attributes(&mut pending, scope)?;
        }

        let mut block = Scope::new(self.shared_buffers);
        let mut children: Vec<Pending> = Vec::new();
        let mut threshold = indent + 1;
        while let Some(child) = self.node(threshold, &mut block)? {
            if children.is_empty() {
                threshold = child.indent;
            }
            children.push(child);
        }

        let (children, shared) = block.close(children);
        pending.children = children;
        pending.shared = shared;
        Ok(Some(pending))
    }

    fn attributes(&mut self, pending: &mut Pending, scope: &mut Scope) -> Result<()> {
        loop {
            let name = self.expect_name("Expected attribute name.")?;
            let name = self.store(scope, name)?;

            if self.lexer.peek()?.is_none() {
                return Err(self.fail(None, "Expected one of ':', ',', ')' symbols."));
            }

            let value = if self.lexer.next_if(TokenKind::Colon)?.is_some() {
                let value = self.expect_value("Expected attribute value after ':'.")?;
                Some(self.store(scope, value)?)
            } else {
                None
            };
            pending.attributes.push((name, value));

            if self.lexer.next_if(TokenKind::Comma)?.is_none() {
                break;
            }
        }

        if self.lexer.next_if(TokenKind::ParenR)?.is_none() {
            let line = self.lexer.peek()?.map(|t| t.line);
            return Err(self.fail(line, "Expected ')' symbol after attribute list."));
        }
        Ok(())
    }
}
