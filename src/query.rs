//! Path queries.
//!
//! A path addresses one node or attribute below a base node:
//!
//! ```text
//! path := segment ('/' segment)* ['.' attribute] [':' value]
//! ```
//!
//! Segments and attribute names are identifiers. Each segment selects the
//! first child of that name; an empty segment stays on the current node, so
//! `".width"` addresses an attribute of the base node itself. The optional
//! `:value` suffix (everything after the colon, verbatim) assigns the node's
//! text or the attribute's value.
//!
//! Read-only queries ([`Node::query`]) fail on missing nodes and on
//! assignments. Modifying queries ([`Node::query_mut`]) create whatever is
//! missing. A malformed path fails before anything is created.
//!
//! ```rust
//! use cfx2::Node;
//!
//! let mut root = Node::document();
//! root.apply("Users/root.homeDir:/root").unwrap();
//!
//! assert_eq!(root.query_value("Users/root.homeDir"), Some("/root"));
//! assert!(root.query_node("Users/guest").is_none());
//! ```

use crate::lexer::is_ident_byte;
use crate::node::{Attribute, Node, Uniqueness};
use crate::{Error, Result};

/// Parsed form of a path string.
#[derive(Debug, PartialEq, Eq)]
struct Path<'q> {
    segments: Vec<&'q str>,
    attribute: Option<&'q str>,
    assignment: Option<&'q str>,
}

fn ident_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| !is_ident_byte(b))
        .map_or(bytes.len(), |n| start + n)
}

impl<'q> Path<'q> {
    fn parse(command: &'q str) -> Option<Self> {
        let bytes = command.as_bytes();
        let mut path = Path {
            segments: Vec::new(),
            attribute: None,
            assignment: None,
        };

        let mut pos = 0;
        loop {
            let end = ident_end(bytes, pos);
            path.segments.push(&command[pos..end]);
            pos = end;

            match bytes.get(pos) {
                None => return Some(path),
                Some(b'/') => pos += 1,
                Some(b':') => {
                    path.assignment = Some(&command[pos + 1..]);
                    return Some(path);
                }
                Some(b'.') => {
                    let start = pos + 1;
                    let end = ident_end(bytes, start);
                    if end == start {
                        return None;
                    }
                    path.attribute = Some(&command[start..end]);
                    return match bytes.get(end) {
                        None => Some(path),
                        Some(b':') => {
                            path.assignment = Some(&command[end + 1..]);
                            Some(path)
                        }
                        Some(_) => None,
                    };
                }
                Some(_) => return None,
            }
        }
    }
}

/// Target of a read-only query.
#[derive(Debug, Clone, Copy)]
pub enum Resolved<'a> {
    Node(&'a Node),
    Attribute(&'a Attribute),
}

impl<'a> Resolved<'a> {
    /// The node's text or the attribute's value.
    #[must_use]
    pub fn value(self) -> Option<&'a str> {
        match self {
            Resolved::Node(node) => node.text(),
            Resolved::Attribute(attrib) => attrib.value(),
        }
    }
}

/// Target of a modifying query.
#[derive(Debug)]
pub enum ResolvedMut<'a> {
    Node(&'a mut Node),
    Attribute(&'a mut Attribute),
}

impl Node {
    /// Resolves `command` without modifying the tree.
    ///
    /// Returns `None` if the path is malformed, contains an assignment, or
    /// names a node or attribute that does not exist.
    #[must_use]
    pub fn query(&self, command: &str) -> Option<Resolved<'_>> {
        let path = Path::parse(command)?;
        if path.assignment.is_some() {
            return None;
        }

        let mut node = self;
        for segment in path.segments {
            if !segment.is_empty() {
                node = node.find_child(segment)?;
            }
        }

        match path.attribute {
            Some(name) => node.find_attrib(name).map(Resolved::Attribute),
            None => Some(Resolved::Node(node)),
        }
    }

    /// Resolves `command`, creating missing nodes and attributes and applying
    /// a trailing `:value` assignment.
    ///
    /// Returns `None` only if the path is malformed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cfx2::{Node, ResolvedMut};
    ///
    /// let mut root = Node::document();
    /// match root.query_mut("a/b/c.attr:5") {
    ///     Some(ResolvedMut::Attribute(attrib)) => assert_eq!(attrib.value(), Some("5")),
    ///     _ => unreachable!(),
    /// }
    /// assert_eq!(root.query_value("a/b/c.attr"), Some("5"));
    /// ```
    pub fn query_mut(&mut self, command: &str) -> Option<ResolvedMut<'_>> {
        let path = Path::parse(command)?;

        let mut node = self;
        for segment in path.segments {
            if !segment.is_empty() {
                node = node.create_child(segment, None, Uniqueness::Unique);
            }
        }

        match path.attribute {
            Some(name) => {
                let attrib = node.attrib_or_create(name);
                if let Some(value) = path.assignment {
                    attrib.set_value(Some(value));
                }
                Some(ResolvedMut::Attribute(attrib))
            }
            None => {
                if let Some(value) = path.assignment {
                    node.set_text(value);
                }
                Some(ResolvedMut::Node(node))
            }
        }
    }

    /// Runs a modifying query for its side effects.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] if the path is malformed.
    pub fn apply(&mut self, command: &str) -> Result<()> {
        self.query_mut(command)
            .map(|_| ())
            .ok_or_else(|| Error::invalid_query(command))
    }

    #[must_use]
    pub fn query_node(&self, command: &str) -> Option<&Node> {
        match self.query(command)? {
            Resolved::Node(node) => Some(node),
            Resolved::Attribute(_) => None,
        }
    }

    /// Like [`Node::query_mut`], but only succeeds for node paths.
    pub fn query_node_mut(&mut self, command: &str) -> Option<&mut Node> {
        match self.query_mut(command)? {
            ResolvedMut::Node(node) => Some(node),
            ResolvedMut::Attribute(_) => None,
        }
    }

    #[must_use]
    pub fn query_attrib(&self, command: &str) -> Option<&Attribute> {
        match self.query(command)? {
            Resolved::Attribute(attrib) => Some(attrib),
            Resolved::Node(_) => None,
        }
    }

    /// Text of the addressed node or value of the addressed attribute.
    #[must_use]
    pub fn query_value(&self, command: &str) -> Option<&str> {
        self.query(command)?.value()
    }

    fn attrib_or_create(&mut self, name: &str) -> &mut Attribute {
        let index = match self.attributes.iter().position(|a| a.name() == name) {
            Some(index) => index,
            None => {
                self.attributes.push(Attribute {
                    name: name.into(),
                    value: None,
                });
                self.attributes.len() - 1
            }
        };
        &mut self.attributes[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_str;

    #[test]
    fn test_parse_paths() {
        assert_eq!(
            Path::parse("a/b.c:x/y.z"),
            Some(Path {
                segments: vec!["a", "b"],
                attribute: Some("c"),
                assignment: Some("x/y.z"),
            })
        );
        assert_eq!(
            Path::parse(""),
            Some(Path {
                segments: vec![""],
                attribute: None,
                assignment: None,
            })
        );
        assert_eq!(Path::parse("a//b").map(|p| p.segments), Some(vec!["a", "", "b"]));
        assert_eq!(Path::parse(".attr").and_then(|p| p.attribute), Some("attr"));

        for bad in ["a b", "a.b.c", "a.b/c", ".", "a.", "a?", "a.b?"] {
            assert_eq!(Path::parse(bad), None, "{bad:?}");
        }
    }

    #[test]
    fn test_create_and_read_back() {
        let mut root = Node::document();
        root.apply("a/b/c.attr:5").unwrap();

        assert_eq!(root.query_value("a/b/c.attr"), Some("5"));
        let c = root.query_node("a/b/c").unwrap();
        assert_eq!(c.attributes().len(), 1);
        assert_eq!(root.child_count(), 1);
    }

    #[test]
    fn test_read_only_queries_never_create() {
        let root = from_str("a (k: 'v')").unwrap();
        assert!(root.query("a/missing").is_none());
        assert!(root.query("a.missing").is_none());
        assert!(root.query("a.k:new").is_none());
        assert_eq!(root.query_value("a.k"), Some("v"));
        assert_eq!(root.children()[0].child_count(), 0);
    }

    #[test]
    fn test_malformed_paths_have_no_side_effects() {
        let mut root = Node::document();
        assert!(root.query_mut("x/y?").is_none());
        assert!(matches!(root.apply("x.a.b"), Err(Error::InvalidQuery(_))));
        assert!(!root.has_children());
    }

    #[test]
    fn test_empty_segments_stay_on_node() {
        let mut root = from_str("Node (attrib2: 'value2')\n  Child2: 'text2'").unwrap();
        let node = root.child_mut(0).unwrap();
        assert_eq!(node.query_value(".attrib2"), Some("value2"));
        assert_eq!(node.query_value("Child2"), Some("text2"));
        assert_eq!(node.query_node("").and_then(Node::name), Some("Node"));

        node.apply(":new text").unwrap();
        assert_eq!(node.text(), Some("new text"));
    }

    #[test]
    fn test_assignment_to_existing_first_match() {
        let mut root = from_str("A: 'one'\nA: 'two'").unwrap();
        root.apply("A:changed").unwrap();
        assert_eq!(root.children()[0].text(), Some("changed"));
        assert_eq!(root.children()[1].text(), Some("two"));
    }

    #[test]
    fn test_query_kinds() {
        let root = from_str("A: 'text' (k: 'v', flag)").unwrap();
        assert!(root.query_attrib("A").is_none());
        assert!(root.query_node("A.k").is_none());
        assert_eq!(root.query_attrib("A.k").map(Attribute::name), Some("k"));
        assert!(root.query_attrib("A.flag").is_some());
        assert_eq!(root.query_value("A.flag"), None);
        assert_eq!(root.query_value("A"), Some("text"));
    }

    #[test]
    fn test_query_node_mut_creates() {
        let mut root = Node::document();
        let node = root.query_node_mut("one/two").unwrap();
        node.set_text("deep");
        assert_eq!(root.query_value("one/two"), Some("deep"));
        assert!(root.query_node_mut("one.attr").is_none());
        assert!(root.query_attrib("one.attr").is_some());
    }
}
