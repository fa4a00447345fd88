//! String storage for document trees.
//!
//! Names and values parsed from a document are not allocated one by one.
//! Each block of sibling nodes fills a [`SharedBuffer`] by bump allocation;
//! once the block is complete the buffer is frozen into a [`SharedStr`] that is
//! attached to the parent node and referenced by every string stored in it.
//!
//! Strings are handed out as [`Span`]s (byte offsets) rather than addresses,
//! so growing a buffer never invalidates anything that was already issued.
//!
//! A single string field is a [`Text`]: either standalone storage or a span
//! inside a frozen arena. The variant, not the address, decides which.
//!
//! ```rust
//! use cfx2::{SharedBuffer, Text};
//!
//! let mut buffer = SharedBuffer::new();
//! let name = buffer.alloc("Window").unwrap();
//! let title = buffer.alloc("Main window").unwrap();
//!
//! let arena = buffer.freeze();
//! let title = arena.text(title);
//! assert_eq!(title, "Main window");
//! assert!(title.is_shared());
//! assert_eq!(arena.text(name), "Window");
//! ```

use crate::{Error, Result};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Deref, Range};
use std::sync::Arc;
use tracing::trace;

/// Smallest capacity a buffer grows to.
pub const MIN_CAPACITY: usize = 16;

fn round_capacity(required: usize) -> Result<usize> {
    required
        .checked_next_power_of_two()
        .map(|capacity| capacity.max(MIN_CAPACITY))
        .ok_or_else(|| Error::alloc(format!("cannot grow a shared buffer to {required} bytes")))
}

/// Location of a string inside an arena.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    start: u32,
    len: u32,
}

impl Span {
    #[must_use]
    pub fn start(&self) -> usize {
        self.start as usize
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start()..self.start() + self.len()
    }
}

/// Growable bump arena used while a block of nodes is being built.
///
/// Capacity is tracked explicitly: when an allocation does not fit, the
/// buffer grows to the next power of two of the required size (at least
/// [`MIN_CAPACITY`] bytes).
///
/// # Examples
///
/// ```rust
/// use cfx2::SharedBuffer;
///
/// let mut buffer = SharedBuffer::new();
/// assert_eq!(buffer.capacity(), 0);
///
/// let span = buffer.alloc("Hello").unwrap();
/// assert_eq!(buffer.capacity(), 16);
///
/// buffer.alloc(&"x".repeat(20)).unwrap();
/// assert_eq!(buffer.capacity(), 32);
/// assert_eq!(buffer.get(span), "Hello");
/// ```
#[derive(Debug, Default)]
pub struct SharedBuffer {
    data: String,
    capacity: usize,
    chunks: usize,
    growths: usize,
}

impl SharedBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer able to hold at least `bytes` bytes without growing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Alloc`] if the memory cannot be reserved.
    pub fn with_capacity(bytes: usize) -> Result<Self> {
        let mut buffer = SharedBuffer::new();
        if bytes > 0 {
            buffer.grow(bytes)?;
        }
        Ok(buffer)
    }

    /// Copies `s` into the buffer and returns its location.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Alloc`] if the buffer needs to grow and memory cannot
    /// be obtained, or if the buffer would exceed 4 GiB.
    pub fn alloc(&mut self, s: &str) -> Result<Span> {
        let required = self
            .data
            .len()
            .checked_add(s.len())
            .ok_or_else(|| Error::alloc("shared buffer size overflow"))?;

        if required > self.capacity {
            self.grow(required)?;
        }

        let start = u32::try_from(self.data.len())
            .map_err(|_| Error::alloc("shared buffer exceeds 4 GiB"))?;
        let len = u32::try_from(s.len()).map_err(|_| Error::alloc("string exceeds 4 GiB"))?;

        self.data.push_str(s);
        self.chunks += 1;
        Ok(Span { start, len })
    }

    fn grow(&mut self, required: usize) -> Result<()> {
        let capacity = round_capacity(required)?;
        self.data
            .try_reserve_exact(capacity - self.data.len())
            .map_err(|err| Error::alloc(err))?;

        trace!(
            from = self.capacity,
            to = capacity,
            used = self.data.len(),
            "growing shared buffer"
        );
        self.capacity = capacity;
        self.growths += 1;
        Ok(())
    }

    /// Returns the string stored at `span`.
    ///
    /// Spans that were not issued by this buffer resolve to an empty string.
    #[must_use]
    pub fn get(&self, span: Span) -> &str {
        self.data.get(span.range()).unwrap_or_default()
    }

    /// Bytes in use.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of strings allocated so far.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    /// Number of times the backing storage was (re)allocated.
    #[must_use]
    pub fn growth_count(&self) -> usize {
        self.growths
    }

    /// Turns the buffer into an immutable, reference-counted arena.
    #[must_use]
    pub fn freeze(self) -> SharedStr {
        SharedStr(Arc::from(self.data))
    }
}

/// Frozen arena shared by a node and the strings stored in it.
///
/// Cloning is cheap and shares the same storage. The storage is released when
/// the last clone (including those held by [`Text::Shared`] values) is dropped.
#[derive(Clone)]
pub struct SharedStr(Arc<str>);

impl SharedStr {
    /// Whether both handles refer to the same arena.
    #[must_use]
    pub fn ptr_eq(&self, other: &SharedStr) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, span: Span) -> &str {
        self.0.get(span.range()).unwrap_or_default()
    }

    /// Creates a [`Text`] referencing the string at `span`.
    ///
    /// Empty strings are never stored in an arena.
    #[must_use]
    pub fn text(&self, span: Span) -> Text {
        if span.is_empty() {
            Text::default()
        } else {
            Text::Shared {
                buffer: self.clone(),
                span,
            }
        }
    }

    /// Number of live handles to this arena.
    #[must_use]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl fmt::Debug for SharedStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedStr")
            .field("len", &self.len())
            .field("refs", &self.ref_count())
            .finish()
    }
}

/// A name or value string.
///
/// Equality, ordering of comparisons and hashing look at the content only,
/// never at where it is stored.
///
/// # Examples
///
/// ```rust
/// use cfx2::Text;
///
/// let text = Text::from("value");
/// assert_eq!(text, "value");
/// assert_eq!(text.len(), 5);
/// assert!(!text.is_shared());
/// ```
#[derive(Clone)]
pub enum Text {
    /// Standalone storage
    Owned(Box<str>),
    /// A string inside a frozen arena
    Shared { buffer: SharedStr, span: Span },
}

impl Text {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Text::Owned(s) => s,
            Text::Shared { buffer, span } => buffer.get(*span),
        }
    }

    #[must_use]
    pub fn is_shared(&self) -> bool {
        matches!(self, Text::Shared { .. })
    }

    /// Whether this string lives in `buffer`.
    #[must_use]
    pub fn references(&self, buffer: &SharedStr) -> bool {
        match self {
            Text::Shared { buffer: own, .. } => own.ptr_eq(buffer),
            Text::Owned(_) => false,
        }
    }

    /// Moves the string to standalone storage if it lives in `owner`.
    ///
    /// Returns `true` if the string was copied.
    pub fn detach_if_owned(&mut self, owner: &SharedStr) -> bool {
        if self.references(owner) {
            *self = self.detached();
            true
        } else {
            false
        }
    }

    /// A standalone copy of this string.
    #[must_use]
    pub fn detached(&self) -> Text {
        Text::Owned(Box::from(self.as_str()))
    }
}

impl Default for Text {
    fn default() -> Self {
        Text::Owned(Box::from(""))
    }
}

impl Deref for Text {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for Text {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for Text {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Text {}

impl Hash for Text {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl PartialEq<str> for Text {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Text {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Text::Owned(Box::from(s))
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Text::Owned(s.into_boxed_str())
    }
}

impl From<Box<str>> for Text {
    fn from(s: Box<str>) -> Self {
        Text::Owned(s)
    }
}
