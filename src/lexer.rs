//! Tokenizer shared by the document parser and the command compiler.
//!
//! The lexer pulls bytes from an [`Input`] in chunks and produces [`Token`]s
//! with one token of lookahead. Whitespace and `{ ... }` comments are skipped;
//! each token records the indentation of the whitespace run preceding it on
//! its line and the line number it starts on.
//!
//! ```rust
//! use cfx2::lexer::{Lexer, TokenKind};
//! use cfx2::SliceInput;
//!
//! let mut lexer = Lexer::new(SliceInput::from("  Node: 'a b'"));
//! let name = lexer.next_token().unwrap().unwrap();
//! assert_eq!(name.kind, TokenKind::Text);
//! assert_eq!(name.indent, 2);
//! assert_eq!(name.text.as_deref(), Some("Node"));
//!
//! assert_eq!(lexer.next_token().unwrap().unwrap().kind, TokenKind::Colon);
//! let value = lexer.next_token().unwrap().unwrap();
//! assert_eq!(value.text.as_deref(), Some("a b"));
//! assert!(lexer.next_token().unwrap().is_none());
//! ```

use crate::io::Input;
use crate::options::ParseOptions;
use crate::{Error, Result};

const CHUNK_SIZE: usize = 4096;

/// Whether `b` may appear in a bare identifier.
///
/// # Examples
///
/// ```rust
/// use cfx2::lexer::is_ident_byte;
///
/// assert!(is_ident_byte(b'a'));
/// assert!(is_ident_byte(b'$'));
/// assert!(!is_ident_byte(b'.'));
/// assert!(!is_ident_byte(b' '));
/// ```
#[must_use]
pub const fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'~' | b'!' | b'@' | b'#' | b'$' | b'%')
}

/// Whether `s` can be written without quotes.
#[must_use]
pub fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(is_ident_byte)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare identifier or single-quoted text
    Text,
    /// Double-quoted string
    String,
    Colon,
    Comma,
    Equals,
    ParenL,
    ParenR,
    Asterisk,
}

impl TokenKind {
    /// Whether tokens of this kind carry a text payload.
    #[must_use]
    pub const fn is_value(self) -> bool {
        matches!(self, TokenKind::Text | TokenKind::String)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub indent: usize,
    pub line: usize,
    pub text: Option<String>,
}

impl Token {
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        self.text
    }

    /// Whether this is the bare word `word`.
    #[must_use]
    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokenKind::Text && self.text.as_deref() == Some(word)
    }
}

/// Streaming tokenizer with one token of lookahead.
pub struct Lexer<I> {
    input: I,
    buf: Box<[u8]>,
    pos: usize,
    end: usize,
    line: usize,
    tab_width: usize,
    lookahead: Option<Token>,
}

impl<I: Input> Lexer<I> {
    pub fn new(input: I) -> Self {
        Self::with_options(input, &ParseOptions::default())
    }

    pub fn with_options(input: I, options: &ParseOptions) -> Self {
        Lexer {
            input,
            buf: vec![0; CHUNK_SIZE].into_boxed_slice(),
            pos: 0,
            end: 0,
            line: 1,
            tab_width: options.tab_width,
            lookahead: None,
        }
    }

    /// Current line number (1-based).
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Returns the next token without consuming it.
    ///
    /// `Ok(None)` means the input is exhausted.
    ///
    /// # Errors
    ///
    /// Lexical errors are reported to the input's error sink and returned.
    pub fn peek(&mut self) -> Result<Option<&Token>> {
        if self.lookahead.is_none() {
            self.lookahead = self.read_token()?;
        }
        Ok(self.lookahead.as_ref())
    }

    /// Consumes and returns the next token.
    ///
    /// # Errors
    ///
    /// Lexical errors are reported to the input's error sink and returned.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        match self.lookahead.take() {
            Some(token) => Ok(Some(token)),
            None => self.read_token(),
        }
    }

    /// Consumes the next token only if it is of the given kind.
    ///
    /// # Errors
    ///
    /// Lexical errors are reported to the input's error sink and returned.
    pub fn next_if(&mut self, kind: TokenKind) -> Result<Option<Token>> {
        if matches!(self.peek()?, Some(token) if token.kind == kind) {
            self.next_token()
        } else {
            Ok(None)
        }
    }

    /// Passes `err` to the input's error sink and hands it back.
    pub fn report(&mut self, err: Error) -> Error {
        let line = err.line().unwrap_or(self.line);
        match &err {
            Error::Syntax { msg, .. } => self.input.handle_error(err.code(), line, msg),
            other => self.input.handle_error(other.code(), line, &other.to_string()),
        }
        err
    }

    /// Takes the resource error that ended the input early, if any.
    pub fn take_input_error(&mut self) -> Option<Error> {
        self.input.take_error()
    }

    /// Signals the input that lexing is done and returns it.
    pub fn finish(mut self) -> I {
        self.input.finished();
        self.input
    }

    fn fill(&mut self) -> bool {
        if self.pos < self.end {
            return true;
        }
        if self.input.is_eof() {
            return false;
        }
        self.pos = 0;
        self.end = self.input.read(&mut self.buf);
        self.end > 0
    }

    fn peek_byte(&mut self) -> Option<u8> {
        if self.fill() {
            Some(self.buf[self.pos])
        } else {
            None
        }
    }

    fn next_byte(&mut self) -> Option<u8> {
        let b = self.peek_byte()?;
        self.pos += 1;
        Some(b)
    }

    fn read_token(&mut self) -> Result<Option<Token>> {
        let mut indent = 0;

        let first = loop {
            let Some(b) = self.next_byte() else {
                return Ok(None);
            };
            match b {
                b'\n' => {
                    self.line += 1;
                    indent = 0;
                }
                b' ' => indent += 1,
                b'\t' => indent += self.tab_width,
                b'{' => self.skip_comment()?,
                b if b.is_ascii_whitespace() || b == 0x0b => {}
                b => break b,
            }
        };

        let line = self.line;
        let (kind, text) = match first {
            b'*' => (TokenKind::Asterisk, None),
            b':' => (TokenKind::Colon, None),
            b',' => (TokenKind::Comma, None),
            b'=' => (TokenKind::Equals, None),
            b'(' => (TokenKind::ParenL, None),
            b')' => (TokenKind::ParenR, None),
            b'\'' => (TokenKind::Text, Some(self.read_quoted(b'\'')?)),
            b'"' => (TokenKind::String, Some(self.read_quoted(b'"')?)),
            b if is_ident_byte(b) => (TokenKind::Text, Some(self.read_ident(b))),
            _ => return Err(self.report(Error::syntax(line, "Unexpected character in input."))),
        };

        Ok(Some(Token {
            kind,
            indent,
            line,
            text,
        }))
    }

    fn skip_comment(&mut self) -> Result<()> {
        loop {
            match self.next_byte() {
                Some(b'}') => return Ok(()),
                Some(b'\n') => self.line += 1,
                Some(_) => {}
                None => {
                    let err = Error::unexpected_eof(self.line, "'}' closing the comment");
                    return Err(self.report(err));
                }
            }
        }
    }

    fn read_ident(&mut self, first: u8) -> String {
        let mut text = String::from(first as char);
        while let Some(b) = self.peek_byte() {
            if !is_ident_byte(b) {
                break;
            }
            text.push(b as char);
            self.pos += 1;
        }
        text
    }

    fn read_quoted(&mut self, terminator: u8) -> Result<String> {
        let start_line = self.line;
        let mut bytes = Vec::new();

        loop {
            let mut b = self.require_byte(terminator)?;
            if b == terminator {
                break;
            }
            if b == b'\\' {
                b = self.require_byte(terminator)?;
            }
            if b == b'\n' {
                self.line += 1;
            }
            bytes.push(b);
        }

        String::from_utf8(bytes)
            .map_err(|_| self.report(Error::syntax(start_line, "Invalid UTF-8 in quoted text.")))
    }

    fn require_byte(&mut self, terminator: u8) -> Result<u8> {
        match self.next_byte() {
            Some(b) => Ok(b),
            None => {
                let expected = format!("closing {} quote", terminator as char);
                let err = Error::unexpected_eof(self.line, &expected);
                Err(self.report(err))
            }
        }
    }
}
