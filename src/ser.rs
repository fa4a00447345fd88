//! `Serialize` implementations for the document tree.
//!
//! A [`Node`] serializes as a struct with the fields `name`, `text`,
//! `attributes` and `children`; an [`Attribute`] as a struct with `name` and
//! `value`. Missing names, texts and values become `None`.
//!
//! ```rust
//! use cfx2::from_str;
//!
//! let doc = from_str("Window: 'main' (width: 640)").unwrap();
//! let json = serde_json::to_value(&doc.children()[0]).unwrap();
//!
//! assert_eq!(json["name"], "Window");
//! assert_eq!(json["text"], "main");
//! assert_eq!(json["attributes"][0]["value"], "640");
//! assert_eq!(json["children"].as_array().map(Vec::len), Some(0));
//! ```

use crate::arena::Text;
use crate::node::{Attribute, Node};
use serde::ser::{Serialize, SerializeStruct, Serializer};

impl Serialize for Text {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl Serialize for Attribute {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Attribute", 2)?;
        state.serialize_field("name", self.name())?;
        state.serialize_field("value", &self.value())?;
        state.end()
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Node", 4)?;
        state.serialize_field("name", &self.name())?;
        state.serialize_field("text", &self.text())?;
        state.serialize_field("attributes", self.attributes())?;
        state.serialize_field("children", self.children())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_to_json() {
        let mut node = Node::new("Users").with_text("all");
        node.set_attrib("flag", None).unwrap();
        node.add_child(Node::new("root"));

        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({
                "name": "Users",
                "text": "all",
                "attributes": [{ "name": "flag", "value": null }],
                "children": [
                    { "name": "root", "text": null, "attributes": [], "children": [] }
                ]
            })
        );
    }

    #[test]
    fn test_document_root_has_no_name() {
        let value = serde_json::to_value(Node::document()).unwrap();
        assert_eq!(value["name"], serde_json::Value::Null);
    }

    #[test]
    fn test_shared_text_serializes_as_str() {
        let doc = crate::from_str("A: 'shared'").unwrap();
        let text = &doc.children()[0].text;
        assert!(text.as_ref().is_some_and(Text::is_shared));
        assert_eq!(serde_json::to_string(text).unwrap(), "\"shared\"");
    }
}
