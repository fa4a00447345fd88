//! Combining two nodes into one.
//!
//! [`merge`] takes each side either by value ([`Cow::Owned`]), in which case
//! its storage, attributes and children are moved into the result, or by
//! reference ([`Cow::Borrowed`]), in which case everything taken from it is
//! copied into fresh storage and the original is left untouched.
//!
//! ## Rules
//!
//! - Name and text come from the left side unless `NAME_FROM_RIGHT` /
//!   `TEXT_FROM_RIGHT` is given.
//! - The result lists the left attributes first, then those right attributes
//!   whose names are not present yet. On a name collision the existing value
//!   is kept unless `PREFER_ATTRIBS_FROM_RIGHT` is given.
//! - Children of the left side come first unless `RIGHT_CHILDREN_FIRST` is
//!   given.
//!
//! ```rust
//! use std::borrow::Cow;
//! use cfx2::{merge, MergeFlags, Node};
//!
//! let mut left = Node::new("Config");
//! left.set_attrib("mode", Some("fast")).unwrap();
//! let mut right = Node::new("Overrides");
//! right.set_attrib("mode", Some("safe")).unwrap();
//! right.set_attrib("debug", None).unwrap();
//!
//! let merged = merge(
//!     Cow::Borrowed(&left),
//!     Cow::Owned(right),
//!     MergeFlags::PREFER_ATTRIBS_FROM_RIGHT,
//! )
//! .unwrap();
//! assert_eq!(merged.name(), Some("Config"));
//! assert_eq!(merged.attrib("mode"), Some("safe"));
//! assert_eq!(merged.attributes().len(), 2);
//! assert_eq!(left.attrib("mode"), Some("fast"));
//! ```

use crate::node::Node;
use crate::{Error, Result};
use bitflags::bitflags;
use std::borrow::Cow;
use std::mem;

bitflags! {
    /// Options for [`merge`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MergeFlags: u32 {
        /// Take the name from the left side (default)
        const NAME_FROM_LEFT = 0x0004;
        /// Take the text from the left side (default)
        const TEXT_FROM_LEFT = 0x0008;
        const NAME_FROM_RIGHT = 0x0010;
        const TEXT_FROM_RIGHT = 0x0020;
        /// Keep the left value on attribute name collisions (default)
        const PREFER_ATTRIBS_FROM_LEFT = 0x0040;
        const PREFER_ATTRIBS_FROM_RIGHT = 0x0080;
        /// Emit left children before right children (default)
        const LEFT_CHILDREN_FIRST = 0x0100;
        const RIGHT_CHILDREN_FIRST = 0x0200;
    }
}

const EXCLUSIVE: [(MergeFlags, MergeFlags, &str); 4] = [
    (MergeFlags::NAME_FROM_LEFT, MergeFlags::NAME_FROM_RIGHT, "name"),
    (MergeFlags::TEXT_FROM_LEFT, MergeFlags::TEXT_FROM_RIGHT, "text"),
    (
        MergeFlags::PREFER_ATTRIBS_FROM_LEFT,
        MergeFlags::PREFER_ATTRIBS_FROM_RIGHT,
        "attribute priority",
    ),
    (
        MergeFlags::LEFT_CHILDREN_FIRST,
        MergeFlags::RIGHT_CHILDREN_FIRST,
        "children order",
    ),
];

fn into_node(side: Cow<'_, Node>) -> Node {
    match side {
        Cow::Owned(node) => node,
        Cow::Borrowed(node) => node.clone_node(true),
    }
}

/// Merges `left` and `right` into a new node.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if both sides borrow the same node or
/// if `flags` asks for both the left and the right variant of one option.
pub fn merge(left: Cow<'_, Node>, right: Cow<'_, Node>, flags: MergeFlags) -> Result<Node> {
    if let (Cow::Borrowed(l), Cow::Borrowed(r)) = (&left, &right) {
        if std::ptr::eq(*l, *r) {
            return Err(Error::invalid_parameter("cannot merge a node with itself"));
        }
    }
    for (from_left, from_right, what) in EXCLUSIVE {
        if flags.contains(from_left | from_right) {
            return Err(Error::invalid_parameter(format!(
                "conflicting merge flags for {what}"
            )));
        }
    }

    let mut left = into_node(left);
    let mut right = into_node(right);

    let name = if flags.contains(MergeFlags::NAME_FROM_RIGHT) {
        right.name.take()
    } else {
        left.name.take()
    };
    let text = if flags.contains(MergeFlags::TEXT_FROM_RIGHT) {
        right.text.take()
    } else {
        left.text.take()
    };

    let prefer_right = flags.contains(MergeFlags::PREFER_ATTRIBS_FROM_RIGHT);
    let mut attributes = mem::take(&mut left.attributes);
    for attrib in mem::take(&mut right.attributes) {
        match attributes.iter_mut().find(|a| a.name == attrib.name) {
            Some(existing) if prefer_right => existing.value = attrib.value,
            Some(_) => {}
            None => attributes.push(attrib),
        }
    }

    let (mut children, tail) = if flags.contains(MergeFlags::RIGHT_CHILDREN_FIRST) {
        (mem::take(&mut right.children), mem::take(&mut left.children))
    } else {
        (mem::take(&mut left.children), mem::take(&mut right.children))
    };
    children.extend(tail);

    Ok(Node {
        attributes,
        children,
        text,
        name,
        shared: left.shared.take().or_else(|| right.shared.take()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_str;

    fn pair() -> (Node, Node) {
        let mut left = Node::new("Left").with_text("left text");
        left.set_attrib("shared", Some("L")).unwrap();
        left.set_attrib("only_left", Some("1")).unwrap();
        left.add_child(Node::new("l1"));
        left.add_child(Node::new("l2"));

        let mut right = Node::new("Right").with_text("right text");
        right.set_attrib("shared", Some("R")).unwrap();
        right.set_attrib("only_right", Some("2")).unwrap();
        right.add_child(Node::new("r1"));
        (left, right)
    }

    fn child_names(node: &Node) -> Vec<&str> {
        node.children().iter().filter_map(Node::name).collect()
    }

    fn attrib_pairs(node: &Node) -> Vec<(&str, Option<&str>)> {
        node.attributes()
            .iter()
            .map(|a| (a.name(), a.value()))
            .collect()
    }

    #[test]
    fn test_single_attribute_collision() {
        let mut left = Node::new("N");
        left.set_attrib("a", Some("left")).unwrap();
        let mut right = Node::new("N");
        right.set_attrib("a", Some("right")).unwrap();

        let merged = merge(
            Cow::Borrowed(&left),
            Cow::Borrowed(&right),
            MergeFlags::PREFER_ATTRIBS_FROM_RIGHT,
        )
        .unwrap();
        assert_eq!(attrib_pairs(&merged), vec![("a", Some("right"))]);

        let merged = merge(
            Cow::Borrowed(&left),
            Cow::Borrowed(&right),
            MergeFlags::empty(),
        )
        .unwrap();
        assert_eq!(attrib_pairs(&merged), vec![("a", Some("left"))]);
    }

    #[test]
    fn test_all_ownership_combinations_agree() {
        let flags_list = [
            MergeFlags::empty(),
            MergeFlags::NAME_FROM_RIGHT | MergeFlags::TEXT_FROM_RIGHT,
            MergeFlags::PREFER_ATTRIBS_FROM_RIGHT | MergeFlags::RIGHT_CHILDREN_FIRST,
            MergeFlags::NAME_FROM_LEFT
                | MergeFlags::TEXT_FROM_LEFT
                | MergeFlags::PREFER_ATTRIBS_FROM_LEFT
                | MergeFlags::LEFT_CHILDREN_FIRST,
        ];

        for flags in flags_list {
            let (left, right) = pair();
            let expected =
                merge(Cow::Borrowed(&left), Cow::Borrowed(&right), flags).unwrap();

            let owned_left = merge(Cow::Owned(left.clone()), Cow::Borrowed(&right), flags).unwrap();
            let owned_right = merge(Cow::Borrowed(&left), Cow::Owned(right.clone()), flags).unwrap();
            let owned_both = merge(Cow::Owned(left.clone()), Cow::Owned(right.clone()), flags).unwrap();

            assert_eq!(owned_left, expected, "{flags:?}");
            assert_eq!(owned_right, expected, "{flags:?}");
            assert_eq!(owned_both, expected, "{flags:?}");

            // borrowed inputs are untouched
            assert_eq!(left, pair().0);
            assert_eq!(right, pair().1);
        }
    }

    #[test]
    fn test_defaults() {
        let (left, right) = pair();
        let merged = merge(Cow::Owned(left), Cow::Owned(right), MergeFlags::empty()).unwrap();
        assert_eq!(merged.name(), Some("Left"));
        assert_eq!(merged.text(), Some("left text"));
        assert_eq!(
            attrib_pairs(&merged),
            vec![
                ("shared", Some("L")),
                ("only_left", Some("1")),
                ("only_right", Some("2")),
            ]
        );
        assert_eq!(child_names(&merged), ["l1", "l2", "r1"]);
    }

    #[test]
    fn test_right_wins_everything() {
        let (left, right) = pair();
        let flags = MergeFlags::NAME_FROM_RIGHT
            | MergeFlags::TEXT_FROM_RIGHT
            | MergeFlags::PREFER_ATTRIBS_FROM_RIGHT
            | MergeFlags::RIGHT_CHILDREN_FIRST;
        let merged = merge(Cow::Borrowed(&left), Cow::Owned(right), flags).unwrap();
        assert_eq!(merged.name(), Some("Right"));
        assert_eq!(merged.text(), Some("right text"));
        assert_eq!(merged.attrib("shared"), Some("R"));
        assert_eq!(merged.attributes()[0].name(), "shared");
        assert_eq!(child_names(&merged), ["r1", "l1", "l2"]);
    }

    #[test]
    fn test_rejects_self_merge_and_conflicts() {
        let (left, right) = pair();
        assert!(matches!(
            merge(Cow::Borrowed(&left), Cow::Borrowed(&left), MergeFlags::empty()),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            merge(
                Cow::Borrowed(&left),
                Cow::Borrowed(&right),
                MergeFlags::LEFT_CHILDREN_FIRST | MergeFlags::RIGHT_CHILDREN_FIRST
            ),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_owned_side_keeps_its_arena() {
        let doc = from_str("A: 'one' (k: 'v')\nB: 'two'").unwrap();
        let arena = doc.shared_buffer().cloned().unwrap();

        let right = Node::new("R").with_text("r");
        let merged = merge(Cow::Owned(doc), Cow::Owned(right), MergeFlags::empty()).unwrap();
        assert!(merged.shared_buffer().unwrap().ptr_eq(&arena));
        assert_eq!(merged.children()[0].attrib("k"), Some("v"));
    }

    #[test]
    fn test_borrowed_side_is_copied_out_of_its_arena() {
        let doc = from_str("A: 'one' (k: 'v')").unwrap();
        let arena = doc.shared_buffer().cloned().unwrap();

        let merged = merge(
            Cow::Owned(Node::new("Root")),
            Cow::Borrowed(&doc),
            MergeFlags::empty(),
        )
        .unwrap();
        assert!(merged.shared_buffer().is_none());
        assert!(!merged.children()[0].references(&arena));
        drop(doc);
        assert_eq!(arena.ref_count(), 1);
    }
}
