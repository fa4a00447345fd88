//! The `select` command language.
//!
//! ```text
//! command := 'select' masks
//! masks   := '*' | mask (',' mask)*
//! mask    := NAME | NAME '*' | '*' NAME
//! ```
//!
//! A command is compiled once and can then be executed against any number of
//! nodes. Execution visits the direct children of the node, in order, whose
//! name matches at least one mask. `select *` matches every child.
//!
//! ```rust
//! use cfx2::{from_str, Command};
//!
//! let doc = from_str("userA\nuserB\nadminX").unwrap();
//! let cmd = Command::compile("select user*").unwrap();
//!
//! let names: Vec<_> = cmd.select(&doc).filter_map(|n| n.name()).collect();
//! assert_eq!(names, ["userA", "userB"]);
//! ```

use crate::io::SliceInput;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::node::Node;
use crate::{Error, Result};
use std::fmt;
use std::ops::ControlFlow;
use std::str::FromStr;
use tracing::trace;

const KEYWORDS: [&str; 2] = ["select", "where"];

fn is_keyword(token: &Token) -> bool {
    KEYWORDS.iter().any(|word| token.is_word(word))
}

/// Which part of a name a [`Mask`] compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Piece {
    /// `name`
    Full,
    /// `name*`, matches names starting with `name`
    Left,
    /// `*name`, matches names ending with `name`
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mask {
    name: String,
    piece: Piece,
}

impl Mask {
    pub fn new(name: impl Into<String>, piece: Piece) -> Self {
        Mask {
            name: name.into(),
            piece,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn piece(&self) -> Piece {
        self.piece
    }

    /// Whether `name` matches this mask.
    ///
    /// ```rust
    /// use cfx2::{Mask, Piece};
    ///
    /// assert!(Mask::new("user", Piece::Left).matches("userA"));
    /// assert!(Mask::new("Dir", Piece::Right).matches("homeDir"));
    /// assert!(!Mask::new("user", Piece::Full).matches("userA"));
    /// ```
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self.piece {
            Piece::Full => name == self.name,
            Piece::Left => name.starts_with(&self.name),
            Piece::Right => name.ends_with(&self.name),
        }
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.piece {
            Piece::Full => f.write_str(&self.name),
            Piece::Left => write!(f, "{}*", self.name),
            Piece::Right => write!(f, "*{}", self.name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Select,
}

/// A compiled command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    op: Operation,
    /// Empty for `select *`
    masks: Vec<Mask>,
}

impl Command {
    /// Compiles `command`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Syntax`] if the command is not a well-formed `select`
    /// command, including any `where` clause.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cfx2::{Command, Piece};
    ///
    /// let cmd = Command::compile("select user*, *Dir, root").unwrap();
    /// let pieces: Vec<_> = cmd.masks().iter().map(|m| m.piece()).collect();
    /// assert_eq!(pieces, [Piece::Left, Piece::Right, Piece::Full]);
    ///
    /// assert!(Command::compile("delete user").is_err());
    /// assert!(Command::compile("select a, *").is_err());
    /// ```
    pub fn compile(command: &str) -> Result<Self> {
        let mut lexer = Lexer::new(SliceInput::from(command));
        let result = Self::parse(&mut lexer);
        lexer.finish();

        let cmd = result?;
        trace!(command, masks = cmd.masks.len(), "compiled command");
        Ok(cmd)
    }

    fn parse(lexer: &mut Lexer<SliceInput<'_>>) -> Result<Self> {
        match lexer.next_token()? {
            Some(token) if token.is_word("select") => {}
            Some(token) if token.kind == TokenKind::Text => {
                return Err(syntax(lexer, "Unknown command."));
            }
            _ => return Err(syntax(lexer, "Expected command.")),
        }

        let masks = Self::parse_masks(lexer)?;

        match lexer.peek()? {
            None => Ok(Command {
                op: Operation::Select,
                masks,
            }),
            Some(token) if token.is_word("where") => {
                Err(syntax(lexer, "'where' clauses are not supported."))
            }
            Some(_) => Err(syntax(lexer, "Unexpected token after mask list.")),
        }
    }

    fn parse_masks(lexer: &mut Lexer<SliceInput<'_>>) -> Result<Vec<Mask>> {
        let mut masks = Vec::new();

        loop {
            let mask = match lexer.next_token()? {
                Some(token) if token.kind == TokenKind::Asterisk => {
                    if matches!(lexer.peek()?, Some(next) if next.kind == TokenKind::Text && !is_keyword(next))
                    {
                        let name = lexer.next_token()?.and_then(Token::into_text);
                        Mask::new(name.unwrap_or_default(), Piece::Right)
                    } else if masks.is_empty() {
                        return Ok(masks);
                    } else {
                        return Err(syntax(lexer, "Unexpected '*'."));
                    }
                }
                Some(token) if token.kind == TokenKind::Text && !is_keyword(&token) => {
                    let piece = if lexer.next_if(TokenKind::Asterisk)?.is_some() {
                        Piece::Left
                    } else {
                        Piece::Full
                    };
                    Mask::new(token.into_text().unwrap_or_default(), piece)
                }
                _ => return Err(syntax(lexer, "Expected mask.")),
            };
            masks.push(mask);

            if lexer.next_if(TokenKind::Comma)?.is_none() {
                return Ok(masks);
            }
        }
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        self.op
    }

    /// The mask list. Empty for a command that matches everything.
    #[must_use]
    pub fn masks(&self) -> &[Mask] {
        &self.masks
    }

    /// Whether `node` is selected by this command.
    ///
    /// Unnamed nodes only match `select *`.
    #[must_use]
    pub fn matches(&self, node: &Node) -> bool {
        if self.masks.is_empty() {
            return true;
        }
        node.name()
            .is_some_and(|name| self.masks.iter().any(|mask| mask.matches(name)))
    }

    /// Calls `on_node` for each matching child of `node`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Interrupted`] if `on_node` breaks.
    pub fn execute<F>(&self, node: &Node, mut on_node: F) -> Result<()>
    where
        F: FnMut(&Node) -> ControlFlow<()>,
    {
        match self.op {
            Operation::Select => node.iterate_children(|_, child| {
                if self.matches(child) {
                    on_node(child)
                } else {
                    ControlFlow::Continue(())
                }
            }),
        }
    }

    /// Iterator over the matching children of `node`.
    ///
    /// The yielded nodes borrow from `node` only, so they outlive the command.
    pub fn select<'a, 'n: 'a>(&'a self, node: &'n Node) -> impl Iterator<Item = &'n Node> + 'a {
        node.children().iter().filter(move |child| self.matches(child))
    }
}

fn syntax(lexer: &mut Lexer<SliceInput<'_>>, msg: &str) -> Error {
    let err = Error::syntax(lexer.line(), msg);
    lexer.report(err)
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Command::compile(s)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            Operation::Select => f.write_str("select ")?,
        }
        if self.masks.is_empty() {
            return f.write_str("*");
        }
        for (i, mask) in self.masks.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{mask}")?;
        }
        Ok(())
    }
}

impl Node {
    /// Compiles `command` and collects the matching children.
    ///
    /// # Errors
    ///
    /// Returns the compilation error if `command` is malformed.
    pub fn select(&self, command: &str) -> Result<Vec<&Node>> {
        let cmd = Command::compile(command)?;
        Ok(self.children().iter().filter(|child| cmd.matches(child)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{from_str, ErrorCode};

    fn names<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Vec<&'a str> {
        nodes.into_iter().filter_map(Node::name).collect()
    }

    #[test]
    fn test_compile_masks() {
        let cmd = Command::compile("select a, b*, *c").unwrap();
        assert_eq!(cmd.operation(), Operation::Select);
        assert_eq!(
            cmd.masks(),
            [
                Mask::new("a", Piece::Full),
                Mask::new("b", Piece::Left),
                Mask::new("c", Piece::Right),
            ]
        );
        assert_eq!(cmd.to_string(), "select a, b*, *c");
    }

    #[test]
    fn test_select_all() {
        let cmd = Command::compile("select *").unwrap();
        assert!(cmd.masks().is_empty());
        assert_eq!(cmd.to_string(), "select *");

        let doc = from_str("a\nb\nc").unwrap();
        assert_eq!(names(cmd.select(&doc)), ["a", "b", "c"]);
    }

    #[test]
    fn test_compile_errors() {
        for bad in [
            "",
            "select",
            "update a",
            ": a",
            "select a,",
            "select a, *",
            "select *, a",
            "select a b",
            "select a where x",
            "select where",
            "select (a)",
        ] {
            let err = Command::compile(bad).unwrap_err();
            assert_eq!(err.code(), ErrorCode::SyntaxError, "{bad:?}");
        }
    }

    #[test]
    fn test_where_is_rejected_with_message() {
        let err = Command::compile("select a where b").unwrap_err();
        assert!(err.to_string().contains("'where' clauses are not supported"));
    }

    #[test]
    fn test_mask_matching() {
        let doc = from_str("userA\nuserB\nadminX\nsuperuser").unwrap();
        assert_eq!(doc.select("select user*").unwrap(), [&doc.children()[0], &doc.children()[1]]);
        assert_eq!(names(doc.select("select *user").unwrap()), ["superuser"]);
        assert_eq!(names(doc.select("select adminX, *B").unwrap()), ["userB", "adminX"]);
        assert!(doc.select("select nobody").unwrap().is_empty());
    }

    #[test]
    fn test_suffix_longer_than_name() {
        assert!(!Mask::new("longer", Piece::Right).matches("er"));
        assert!(!Mask::new("longer", Piece::Left).matches("lo"));
    }

    #[test]
    fn test_unnamed_children() {
        let mut doc = Node::document();
        doc.add_child(Node::default());
        doc.add_child(Node::new("named"));
        assert_eq!(Command::compile("select *").unwrap().select(&doc).count(), 2);
        assert_eq!(Command::compile("select *d").unwrap().select(&doc).count(), 1);
    }

    #[test]
    fn test_execute_and_interrupt() {
        let doc = from_str("x1\nx2\ny\nx3").unwrap();
        let cmd: Command = "select x*".parse().unwrap();

        let mut seen = Vec::new();
        cmd.execute(&doc, |node| {
            seen.extend(node.name().map(str::to_owned));
            ControlFlow::Continue(())
        })
        .unwrap();
        assert_eq!(seen, ["x1", "x2", "x3"]);

        let mut count = 0;
        let result = cmd.execute(&doc, |_| {
            count += 1;
            if count == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(result, Err(Error::Interrupted));
        assert_eq!(count, 2);
    }

    fn compile_and_select<'n>(node: &'n Node, command: &str) -> Vec<&'n Node> {
        let cmd = Command::compile(command).unwrap();
        cmd.select(node).collect()
    }

    #[test]
    fn test_selection_outlives_command() {
        let doc = from_str("keep1\ndrop\nkeep2").unwrap();
        assert_eq!(names(compile_and_select(&doc, "select keep*")), ["keep1", "keep2"]);
        assert_eq!(names(doc.select("select drop").unwrap()), ["drop"]);
    }

    #[test]
    fn test_quoted_mask_names() {
        let doc = from_str("'with space'\nother").unwrap();
        assert_eq!(names(doc.select("select 'with space'").unwrap()), ["with space"]);
    }
}
