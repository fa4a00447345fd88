//! Byte sources and sinks used by the parser and the writer.
//!
//! The parser pulls bytes from an [`Input`] and the writer pushes bytes into
//! an [`Output`]. Both carry an error sink that is invoked once per failure
//! with the result code and a human readable description; the default sinks
//! log through `tracing`.

use crate::{Error, ErrorCode, Result};
use std::io;
use tracing::warn;

/// Pull-based byte source.
pub trait Input {
    /// Reads up to `buf.len()` bytes, returning how many were read.
    ///
    /// Returning 0 with a non-empty `buf` means no more bytes are available.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    fn is_eof(&self) -> bool;

    /// Called once for every lexical or syntax error.
    fn handle_error(&mut self, code: ErrorCode, line: usize, desc: &str) {
        warn!(code = code.as_i32(), line, "{desc}");
    }

    /// Hands over a resource error that ended the input early.
    ///
    /// The parser checks this once it is done, and a returned error takes
    /// precedence over any syntax error caused by the truncated input.
    fn take_error(&mut self) -> Option<Error> {
        None
    }

    /// Called when the parser is done with the input.
    fn finished(&mut self) {}
}

impl<T: Input + ?Sized> Input for &mut T {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        (**self).read(buf)
    }

    fn is_eof(&self) -> bool {
        (**self).is_eof()
    }

    fn handle_error(&mut self, code: ErrorCode, line: usize, desc: &str) {
        (**self).handle_error(code, line, desc);
    }

    fn take_error(&mut self) -> Option<Error> {
        (**self).take_error()
    }

    fn finished(&mut self) {
        (**self).finished();
    }
}

/// [`Input`] over an in-memory byte slice.
///
/// # Examples
///
/// ```rust
/// use cfx2::{Input, SliceInput};
///
/// let mut input = SliceInput::new(b"Node");
/// let mut buf = [0u8; 3];
/// assert_eq!(input.read(&mut buf), 3);
/// assert!(!input.is_eof());
/// assert_eq!(input.read(&mut buf), 1);
/// assert!(input.is_eof());
/// ```
#[derive(Debug, Clone)]
pub struct SliceInput<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceInput<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        SliceInput { data, pos: 0 }
    }
}

impl<'a> From<&'a str> for SliceInput<'a> {
    fn from(s: &'a str) -> Self {
        SliceInput::new(s.as_bytes())
    }
}

impl Input for SliceInput<'_> {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        let rest = &self.data[self.pos..];
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        n
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.data.len()
    }
}

/// [`Input`] over any [`io::Read`].
///
/// A read failure ends the input and is kept until the parser takes it
/// through [`Input::take_error`].
#[derive(Debug)]
pub struct ReadInput<R> {
    reader: R,
    eof: bool,
    error: Option<io::Error>,
}

impl<R: io::Read> ReadInput<R> {
    pub fn new(reader: R) -> Self {
        ReadInput {
            reader,
            eof: false,
            error: None,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: io::Read> Input for ReadInput<R> {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        if self.eof || buf.is_empty() {
            return 0;
        }
        loop {
            match self.reader.read(buf) {
                Ok(0) => {
                    self.eof = true;
                    return 0;
                }
                Ok(n) => return n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    warn!(error = %err, "read failed");
                    self.eof = true;
                    self.error = Some(err);
                    return 0;
                }
            }
        }
    }

    fn is_eof(&self) -> bool {
        self.eof
    }

    fn take_error(&mut self) -> Option<Error> {
        self.error.take().map(Error::io)
    }
}

/// Push-based byte sink.
pub trait Output {
    /// Writes all of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the underlying sink fails.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Called once when the writer gives up on a document.
    fn handle_error(&mut self, code: ErrorCode, desc: &str) {
        warn!(code = code.as_i32(), "{desc}");
    }

    /// Called after the last byte has been written.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if flushing fails.
    fn finished(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Output for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl<T: Output + ?Sized> Output for &mut T {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write(bytes)
    }

    fn handle_error(&mut self, code: ErrorCode, desc: &str) {
        (**self).handle_error(code, desc);
    }

    fn finished(&mut self) -> Result<()> {
        (**self).finished()
    }
}

/// [`Output`] over any [`io::Write`], flushed when the writer finishes.
///
/// # Examples
///
/// ```rust
/// use cfx2::{IoOutput, Output};
///
/// let mut output = IoOutput::new(Vec::new());
/// output.write(b"Node\n").unwrap();
/// output.finished().unwrap();
/// assert_eq!(output.into_inner(), b"Node\n");
/// ```
#[derive(Debug)]
pub struct IoOutput<W> {
    writer: W,
}

impl<W: io::Write> IoOutput<W> {
    pub fn new(writer: W) -> Self {
        IoOutput { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write> Output for IoOutput<W> {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        Ok(self.writer.write_all(bytes)?)
    }

    fn finished(&mut self) -> Result<()> {
        Ok(self.writer.flush()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_input_reports_eof() {
        let mut input = ReadInput::new(io::Cursor::new(b"abc".to_vec()));
        let mut buf = [0u8; 8];
        assert_eq!(input.read(&mut buf), 3);
        assert!(!input.is_eof());
        assert_eq!(input.read(&mut buf), 0);
        assert!(input.is_eof());
    }

    struct FailingReader {
        chunk: Option<&'static [u8]>,
    }

    impl io::Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.chunk.take() {
                Some(chunk) => {
                    buf[..chunk.len()].copy_from_slice(chunk);
                    Ok(chunk.len())
                }
                None => Err(io::Error::new(io::ErrorKind::Other, "disk gone")),
            }
        }
    }

    #[test]
    fn test_read_input_keeps_failure() {
        let mut input = ReadInput::new(FailingReader { chunk: Some(b"A\n") });
        let mut buf = [0u8; 8];
        assert_eq!(input.read(&mut buf), 2);
        assert_eq!(input.read(&mut buf), 0);
        assert!(input.is_eof());

        let err = input.take_error().unwrap();
        assert_eq!(err, Error::io("disk gone"));
        assert_eq!(err.code(), ErrorCode::CannotOpenSource);
        assert!(input.take_error().is_none());
    }

    #[test]
    fn test_slice_input_empty() {
        let mut input = SliceInput::from("");
        assert!(input.is_eof());
        assert_eq!(input.read(&mut [0u8; 4]), 0);
    }

    #[test]
    fn test_vec_output_appends() {
        let mut out = Vec::new();
        Output::write(&mut out, b"ab").unwrap();
        Output::write(&mut out, b"cd").unwrap();
        Output::finished(&mut out).unwrap();
        assert_eq!(out, b"abcd");
    }
}
