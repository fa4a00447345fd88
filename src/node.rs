//! The document tree.
//!
//! A [`Node`] has an optional name, an optional text value, an ordered list
//! of [`Attribute`]s and an ordered list of child nodes. A document is an
//! unnamed node whose children are the top-level nodes.
//!
//! Strings are stored as [`Text`], either standalone or inside an arena
//! attached to some node (usually the parent of the nodes using it). Removing
//! a child copies every string that lives in the parent's arena, so a removed
//! subtree never depends on storage owned by the tree it was taken from.
//!
//! ## Examples
//!
//! ```rust
//! use cfx2::{Node, Uniqueness};
//!
//! let mut doc = Node::document();
//! let window = doc.create_child("Window", Some("main"), Uniqueness::Unique);
//! window.set_attrib("width", Some("640")).unwrap();
//! window.set_attrib_i64("height", 480).unwrap();
//!
//! let window = doc.find_child("Window").unwrap();
//! assert_eq!(window.text(), Some("main"));
//! assert_eq!(window.attrib_i64("height").unwrap(), 480);
//! ```

use crate::arena::{SharedBuffer, SharedStr, Text};
use crate::{Error, Result};
use std::iter;
use std::ops::ControlFlow;
use tracing::debug;

/// How [`Node::create_child`] treats an existing child of the same name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Uniqueness {
    /// Always append a new child
    #[default]
    Multiple,
    /// Reuse the first child with that name if there is one
    Unique,
}

/// A name/value pair attached to a node.
///
/// Names are never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub(crate) name: Text,
    pub(crate) value: Option<Text>,
}

impl Attribute {
    /// Creates an attribute.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `name` is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cfx2::Attribute;
    ///
    /// let attrib = Attribute::new("width", Some("640")).unwrap();
    /// assert_eq!(attrib.name(), "width");
    /// assert_eq!(attrib.value(), Some("640"));
    ///
    /// assert!(Attribute::new("", None).is_err());
    /// ```
    pub fn new(name: &str, value: Option<&str>) -> Result<Self> {
        Self::from_parts(Text::from(name), value.map(Text::from))
    }

    pub(crate) fn from_parts(name: Text, value: Option<Text>) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::invalid_parameter("attribute name must not be empty"));
        }
        Ok(Attribute { name, value })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set_value(&mut self, value: Option<&str>) {
        self.value = value.map(Text::from);
    }

    pub(crate) fn detached(&self) -> Attribute {
        Attribute {
            name: self.name.detached(),
            value: self.value.as_ref().map(Text::detached),
        }
    }

    fn strings(&self) -> impl Iterator<Item = &Text> {
        iter::once(&self.name).chain(self.value.iter())
    }

    fn strings_mut(&mut self) -> impl Iterator<Item = &mut Text> {
        iter::once(&mut self.name).chain(self.value.iter_mut())
    }
}

/// A document node.
///
/// Fields are declared in release order: attributes, children, text and
/// name, then the arena this node owns.
#[derive(Debug, Default)]
pub struct Node {
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) children: Vec<Node>,
    pub(crate) text: Option<Text>,
    pub(crate) name: Option<Text>,
    pub(crate) shared: Option<SharedStr>,
}

impl Node {
    /// Creates a childless node. An empty `name` leaves the node unnamed.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Node {
            name: (!name.is_empty()).then(|| Text::from(name)),
            ..Node::default()
        }
    }

    /// Creates an empty document root.
    #[must_use]
    pub fn document() -> Self {
        Node::default()
    }

    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Renames the node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `name` is empty.
    pub fn set_name(&mut self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::invalid_parameter("node name must not be empty"));
        }
        self.name = Some(Text::from(name));
        Ok(())
    }

    pub fn clear_name(&mut self) {
        self.name = None;
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = Some(Text::from(text));
    }

    pub fn clear_text(&mut self) {
        self.text = None;
    }

    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// First attribute called `name`.
    #[must_use]
    pub fn find_attrib(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    pub fn find_attrib_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.attributes.iter_mut().find(|a| a.name() == name)
    }

    /// Value of the first attribute called `name`.
    ///
    /// Returns `None` both when the attribute is missing and when it has no
    /// value; use [`Node::find_attrib`] to tell the two apart.
    #[must_use]
    pub fn attrib(&self, name: &str) -> Option<&str> {
        self.find_attrib(name).and_then(Attribute::value)
    }

    /// Reads an attribute as an integer.
    ///
    /// The value is parsed like C's `strtol` with base 0: leading whitespace
    /// and sign are accepted, `0x` selects hexadecimal, a leading `0` octal,
    /// and parsing stops at the first invalid character.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AttributeNotFound`] if the attribute is missing or
    /// has no value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cfx2::Node;
    ///
    /// let mut node = Node::new("Port");
    /// node.set_attrib("mask", Some("0xff")).unwrap();
    /// node.set_attrib("size", Some("12px")).unwrap();
    /// assert_eq!(node.attrib_i64("mask").unwrap(), 255);
    /// assert_eq!(node.attrib_i64("size").unwrap(), 12);
    /// ```
    pub fn attrib_i64(&self, name: &str) -> Result<i64> {
        self.attrib(name)
            .map(parse_c_long)
            .ok_or_else(|| Error::attribute_not_found(name))
    }

    /// Reads an attribute as a float, accepting the longest numeric prefix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AttributeNotFound`] if the attribute is missing or
    /// has no value.
    pub fn attrib_f64(&self, name: &str) -> Result<f64> {
        self.attrib(name)
            .map(parse_c_double)
            .ok_or_else(|| Error::attribute_not_found(name))
    }

    /// Sets the value of the first attribute called `name`, appending a new
    /// attribute if there is none.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `name` is empty.
    pub fn set_attrib(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        match self.find_attrib_mut(name) {
            Some(attrib) => attrib.set_value(value),
            None => self.attributes.push(Attribute::new(name, value)?),
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `name` is empty.
    pub fn set_attrib_i64(&mut self, name: &str, value: i64) -> Result<()> {
        self.set_attrib(name, Some(&value.to_string()))
    }

    /// Stores a float using the shortest `%g`-style representation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `name` is empty.
    pub fn set_attrib_f64(&mut self, name: &str, value: f64) -> Result<()> {
        self.set_attrib(name, Some(&format_g(value)))
    }

    /// Appends an attribute even if one with the same name exists.
    pub fn add_attrib(&mut self, attrib: Attribute) {
        self.attributes.push(attrib);
    }

    /// Removes and returns the first attribute called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for an empty name and
    /// [`Error::AttributeNotFound`] if no attribute matches.
    pub fn remove_attrib(&mut self, name: &str) -> Result<Attribute> {
        if name.is_empty() {
            return Err(Error::invalid_parameter("attribute name must not be empty"));
        }
        let index = self
            .attributes
            .iter()
            .position(|a| a.name() == name)
            .ok_or_else(|| Error::attribute_not_found(name))?;
        Ok(self.attributes.remove(index))
    }

    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Children as a mutable slice; the list itself can only change through
    /// the add/insert/remove methods.
    pub fn children_mut(&mut self) -> &mut [Node] {
        &mut self.children
    }

    #[must_use]
    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.children.get_mut(index)
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Appends `child` and returns a reference to it.
    pub fn add_child(&mut self, child: Node) -> &mut Node {
        let index = self.children.len();
        self.insert_child(index, child)
    }

    /// Inserts `child` at `index`, clamped to the number of children.
    pub fn insert_child(&mut self, index: usize, child: Node) -> &mut Node {
        let index = index.min(self.children.len());
        self.children.insert(index, child);
        &mut self.children[index]
    }

    /// Returns a child called `name`, creating it if needed.
    ///
    /// With [`Uniqueness::Unique`] the first existing child of that name is
    /// reused; with [`Uniqueness::Multiple`] a new child is always appended.
    /// If `text` is given it replaces the child's text either way.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cfx2::{Node, Uniqueness};
    ///
    /// let mut parent = Node::new("Settings");
    /// parent.create_child("Volume", Some("3"), Uniqueness::Unique);
    /// parent.create_child("Volume", Some("7"), Uniqueness::Unique);
    /// assert_eq!(parent.child_count(), 1);
    /// assert_eq!(parent.children()[0].text(), Some("7"));
    ///
    /// parent.create_child("Volume", None, Uniqueness::Multiple);
    /// assert_eq!(parent.child_count(), 2);
    /// ```
    pub fn create_child(
        &mut self,
        name: &str,
        text: Option<&str>,
        uniqueness: Uniqueness,
    ) -> &mut Node {
        let existing = match uniqueness {
            Uniqueness::Unique => self.children.iter().position(|c| c.name() == Some(name)),
            Uniqueness::Multiple => None,
        };
        let index = match existing {
            Some(index) => index,
            None => {
                self.children.push(Node::new(name));
                self.children.len() - 1
            }
        };

        let child = &mut self.children[index];
        if let Some(text) = text {
            child.set_text(text);
        }
        child
    }

    /// First child called `name`.
    #[must_use]
    pub fn find_child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name() == Some(name))
    }

    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.children.iter_mut().find(|c| c.name() == Some(name))
    }

    /// First child for which `test(index, child)` holds.
    pub fn find_child_by<F>(&self, mut test: F) -> Option<&Node>
    where
        F: FnMut(usize, &Node) -> bool,
    {
        self.children
            .iter()
            .enumerate()
            .find(|(i, c)| test(*i, *c))
            .map(|(_, c)| c)
    }

    /// Calls `f` for each child in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Interrupted`] if `f` breaks.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::ops::ControlFlow;
    /// use cfx2::{from_str, ErrorCode};
    ///
    /// let doc = from_str("A\nB\nC").unwrap();
    /// let mut seen = Vec::new();
    /// let result = doc.iterate_children(|_, node| {
    ///     seen.push(node.name().unwrap_or_default().to_string());
    ///     if node.name() == Some("B") { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
    /// });
    /// assert_eq!(result.unwrap_err().code(), ErrorCode::Interrupted);
    /// assert_eq!(seen, ["A", "B"]);
    /// ```
    pub fn iterate_children<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(usize, &Node) -> ControlFlow<()>,
    {
        for (i, child) in self.children.iter().enumerate() {
            if f(i, child).is_break() {
                return Err(Error::Interrupted);
            }
        }
        Ok(())
    }

    /// Index of `child` among this node's children, compared by identity.
    #[must_use]
    pub fn position_of(&self, child: &Node) -> Option<usize> {
        self.children.iter().position(|c| std::ptr::eq(c, child))
    }

    /// Unlinks the child at `index` and returns it as an independent tree.
    ///
    /// Every string of the removed subtree that lives in this node's arena is
    /// copied out first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if `index` is out of range.
    pub fn remove_child(&mut self, index: usize) -> Result<Node> {
        if index >= self.children.len() {
            return Err(Error::node_not_found(&format!("child #{index}")));
        }
        let mut child = self.children.remove(index);
        if let Some(shared) = &self.shared {
            child.detach_from(shared);
        }
        Ok(child)
    }

    /// Removes the first child called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if there is no such child.
    pub fn remove_child_named(&mut self, name: &str) -> Result<Node> {
        let index = self
            .children
            .iter()
            .position(|c| c.name() == Some(name))
            .ok_or_else(|| Error::node_not_found(name))?;
        self.remove_child(index)
    }

    /// Copies every string of this subtree stored in `owner` to standalone
    /// storage.
    pub fn detach_from(&mut self, owner: &SharedStr) {
        for text in self.strings_mut() {
            text.detach_if_owned(owner);
        }
        for child in &mut self.children {
            child.detach_from(owner);
        }
    }

    /// Whether any of this node's own strings live in `buffer`.
    #[must_use]
    pub fn references(&self, buffer: &SharedStr) -> bool {
        self.strings().any(|t| t.references(buffer))
    }

    /// The arena owned by this node, if any.
    #[must_use]
    pub fn shared_buffer(&self) -> Option<&SharedStr> {
        self.shared.as_ref()
    }

    /// Copies the node into fresh standalone storage.
    ///
    /// Children are cloned too when `recursive` is set; otherwise the copy is
    /// childless.
    #[must_use]
    pub fn clone_node(&self, recursive: bool) -> Node {
        Node {
            attributes: self.attributes.iter().map(Attribute::detached).collect(),
            children: if recursive {
                self.children.iter().map(|c| c.clone_node(true)).collect()
            } else {
                Vec::new()
            },
            text: self.text.as_ref().map(Text::detached),
            name: self.name.as_ref().map(Text::detached),
            shared: None,
        }
    }

    /// Moves the strings of all direct children into one new arena owned by
    /// this node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Alloc`] if the arena cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cfx2::Node;
    ///
    /// let mut parent = Node::new("Parent")
    ///     .with_child(Node::new("A").with_text("one"))
    ///     .with_child(Node::new("B"));
    /// parent.pack().unwrap();
    ///
    /// let arena = parent.shared_buffer().unwrap();
    /// assert!(parent.children().iter().all(|c| c.references(arena)));
    /// ```
    pub fn pack(&mut self) -> Result<()> {
        let total = self
            .children
            .iter()
            .flat_map(Node::strings)
            .map(|t| t.len())
            .sum::<usize>();
        if total == 0 {
            return Ok(());
        }

        let mut buffer = SharedBuffer::with_capacity(total)?;
        let mut spans = Vec::new();
        for text in self.children.iter().flat_map(Node::strings) {
            spans.push(buffer.alloc(text)?);
        }

        let arena = buffer.freeze();
        let mut spans = spans.into_iter();
        for child in &mut self.children {
            for text in child.strings_mut() {
                if let Some(span) = spans.next() {
                    *text = arena.text(span);
                }
            }
        }

        debug!(
            children = self.children.len(),
            bytes = arena.len(),
            "packed child strings"
        );
        self.shared = Some(arena);
        Ok(())
    }

    pub(crate) fn strings(&self) -> impl Iterator<Item = &Text> {
        self.name
            .iter()
            .chain(self.text.iter())
            .chain(self.attributes.iter().flat_map(Attribute::strings))
    }

    pub(crate) fn strings_mut(&mut self) -> impl Iterator<Item = &mut Text> {
        self.name
            .iter_mut()
            .chain(self.text.iter_mut())
            .chain(self.attributes.iter_mut().flat_map(Attribute::strings_mut))
    }
}

impl Clone for Node {
    fn clone(&self) -> Self {
        self.clone_node(true)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.text == other.text
            && self.attributes == other.attributes
            && self.children == other.children
    }
}

impl Eq for Node {}

/// `strtol(s, NULL, 0)`: longest valid prefix, saturating on overflow.
fn parse_c_long(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, digits) = if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
    {
        if rest.bytes().next().is_some_and(|b| b.is_ascii_hexdigit()) {
            (16, rest)
        } else {
            (10, "0")
        }
    } else if s.len() > 1 && s.starts_with('0') {
        (8, &s[1..])
    } else {
        (10, s)
    };

    let mut value: i64 = 0;
    for c in digits.chars() {
        let Some(digit) = c.to_digit(radix) else {
            break;
        };
        let digit = i64::from(digit);
        let next = value.checked_mul(i64::from(radix)).and_then(|v| {
            if negative {
                v.checked_sub(digit)
            } else {
                v.checked_add(digit)
            }
        });
        match next {
            Some(next) => value = next,
            None => return if negative { i64::MIN } else { i64::MAX },
        }
    }
    value
}

/// `strtod(s, NULL)`: longest prefix that forms a decimal float, 0 if none.
fn parse_c_double(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let lower = s[end..].to_ascii_lowercase();
    for special in ["infinity", "inf", "nan"] {
        if lower.starts_with(special) {
            return s[..end + special.len()].parse().unwrap_or(0.0);
        }
    }

    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    if bytes.get(end) == Some(&b'.') {
        end += 1;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
    }
    if end == digits_start || &s[digits_start..end] == "." {
        return 0.0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        if bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
                exp_end += 1;
            }
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(0.0)
}

/// Formats like C's `%g`: six significant digits, trailing zeros removed.
fn format_g(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let scientific = format!("{value:.5e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if !(-4..6).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa),
            exponent.unsigned_abs()
        )
    } else {
        let decimals = usize::try_from(5 - exponent).unwrap_or(0);
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_tree_is_send_and_sync() {
        assert_send_sync::<Node>();
        assert_send_sync::<Attribute>();
        assert_send_sync::<SharedStr>();
    }

    fn sample() -> Node {
        let mut parent = Node::new("Parent");
        let a = parent.add_child(Node::new("A").with_text("text-a"));
        a.set_attrib("x", Some("1")).unwrap();
        parent.add_child(Node::new("B").with_child(Node::new("Inner").with_text("deep")));
        parent
    }

    #[test]
    fn test_duplicate_attributes_first_match() {
        let mut node = Node::new("N");
        node.add_attrib(Attribute::new("k", Some("first")).unwrap());
        node.add_attrib(Attribute::new("k", Some("second")).unwrap());

        assert_eq!(node.attrib("k"), Some("first"));
        node.set_attrib("k", Some("changed")).unwrap();
        assert_eq!(node.attributes()[0].value(), Some("changed"));
        assert_eq!(node.attributes()[1].value(), Some("second"));

        node.remove_attrib("k").unwrap();
        assert_eq!(node.attrib("k"), Some("second"));
    }

    #[test]
    fn test_attribute_errors() {
        let mut node = Node::new("N");
        assert!(matches!(
            node.set_attrib("", Some("v")),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            node.remove_attrib(""),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            node.remove_attrib("missing"),
            Err(Error::AttributeNotFound(_))
        ));

        node.set_attrib("flag", None).unwrap();
        assert!(node.find_attrib("flag").is_some());
        assert_eq!(node.attrib("flag"), None);
        assert!(matches!(
            node.attrib_i64("flag"),
            Err(Error::AttributeNotFound(_))
        ));
    }

    #[test]
    fn test_parse_c_long() {
        assert_eq!(parse_c_long("42"), 42);
        assert_eq!(parse_c_long("  -17abc"), -17);
        assert_eq!(parse_c_long("0x1F"), 31);
        assert_eq!(parse_c_long("0X1f"), 31);
        assert_eq!(parse_c_long("017"), 15);
        assert_eq!(parse_c_long("09"), 0);
        assert_eq!(parse_c_long("0"), 0);
        assert_eq!(parse_c_long("0xg"), 0);
        assert_eq!(parse_c_long("abc"), 0);
        assert_eq!(parse_c_long("99999999999999999999"), i64::MAX);
        assert_eq!(parse_c_long("-99999999999999999999"), i64::MIN);
    }

    #[test]
    fn test_parse_c_double() {
        assert_eq!(parse_c_double("3.5"), 3.5);
        assert_eq!(parse_c_double(" -2.5e2xyz"), -250.0);
        assert_eq!(parse_c_double("1e"), 1.0);
        assert_eq!(parse_c_double(".5"), 0.5);
        assert_eq!(parse_c_double("7."), 7.0);
        assert_eq!(parse_c_double("."), 0.0);
        assert_eq!(parse_c_double("junk"), 0.0);
        assert!(parse_c_double("-inf").is_infinite());
        assert!(parse_c_double("nan").is_nan());
    }

    #[test]
    fn test_format_g() {
        assert_eq!(format_g(0.5), "0.5");
        assert_eq!(format_g(100.0), "100");
        assert_eq!(format_g(1.0 / 3.0), "0.333333");
        assert_eq!(format_g(123456.0), "123456");
        assert_eq!(format_g(1234567.0), "1.23457e+06");
        assert_eq!(format_g(0.0001), "0.0001");
        assert_eq!(format_g(0.00001), "1e-05");
        assert_eq!(format_g(-2.5), "-2.5");
        assert_eq!(format_g(0.0), "0");
    }

    #[test]
    fn test_float_attribute_round_trip() {
        let mut node = Node::new("N");
        node.set_attrib_f64("ratio", 0.75).unwrap();
        assert_eq!(node.attrib("ratio"), Some("0.75"));
        assert_eq!(node.attrib_f64("ratio").unwrap(), 0.75);
    }

    #[test]
    fn test_insert_child_clamps() {
        let mut node = Node::new("N");
        node.add_child(Node::new("b"));
        node.insert_child(0, Node::new("a"));
        node.insert_child(99, Node::new("c"));
        let names: Vec<_> = node.children().iter().filter_map(Node::name).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_find_child_by_index_and_test() {
        let parent = sample();
        let found = parent.find_child_by(|i, c| i == 1 && c.has_children());
        assert_eq!(found.and_then(Node::name), Some("B"));
        assert!(parent.find_child_by(|_, c| c.name() == Some("Z")).is_none());
    }

    #[test]
    fn test_position_of_uses_identity() {
        let parent = sample();
        let b = &parent.children()[1];
        assert_eq!(parent.position_of(b), Some(1));

        let lookalike = b.clone();
        assert_eq!(parent.position_of(&lookalike), None);
    }

    #[test]
    fn test_remove_child_missing() {
        let mut parent = sample();
        assert!(matches!(
            parent.remove_child(5),
            Err(Error::NodeNotFound(_))
        ));
        assert!(matches!(
            parent.remove_child_named("Nope"),
            Err(Error::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_remove_child_detaches_from_parent_arena() {
        let mut parent = sample();
        parent.pack().unwrap();
        let arena = parent.shared_buffer().cloned().unwrap();
        assert!(parent.children()[0].references(&arena));

        let removed = parent.remove_child_named("A").unwrap();
        assert!(!removed.references(&arena));
        drop(parent);

        assert_eq!(arena.ref_count(), 1);
        assert_eq!(removed.name(), Some("A"));
        assert_eq!(removed.text(), Some("text-a"));
        assert_eq!(removed.attrib("x"), Some("1"));
    }

    #[test]
    fn test_clone_is_deep_and_independent() {
        let mut original = sample();
        original.pack().unwrap();

        let copy = original.clone_node(true);
        assert_eq!(copy, original);
        assert!(copy.shared_buffer().is_none());
        let arena = original.shared_buffer().cloned().unwrap();
        assert!(copy.children().iter().all(|c| !c.references(&arena)));

        drop(original);
        assert_eq!(copy.children()[1].children()[0].text(), Some("deep"));
    }

    #[test]
    fn test_shallow_clone_drops_children() {
        let original = sample();
        let copy = original.clone_node(false);
        assert_eq!(copy.name(), Some("Parent"));
        assert!(!copy.has_children());
    }

    #[test]
    fn test_pack_without_strings_is_noop() {
        let mut node = Node::document();
        node.pack().unwrap();
        assert!(node.shared_buffer().is_none());
    }

    #[test]
    fn test_new_with_empty_name_is_unnamed() {
        assert_eq!(Node::new("").name(), None);
        assert!(Node::new("x").set_name("").is_err());
    }
}
