//! `Deserialize` implementations for the document tree.
//!
//! Accepts the shapes produced by the `Serialize` impls. Every field of a
//! node is optional, and an attribute may also be given as a bare string,
//! which is read as a value-less attribute of that name.
//!
//! ```rust
//! use cfx2::Node;
//!
//! let node: Node = serde_json::from_str(
//!     r#"{"name": "Users", "attributes": ["locked", {"name": "count", "value": "2"}]}"#,
//! )
//! .unwrap();
//!
//! assert_eq!(node.name(), Some("Users"));
//! assert_eq!(node.attrib("count"), Some("2"));
//! assert!(node.find_attrib("locked").is_some());
//! ```

use crate::node::{Attribute, Node};
use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use std::fmt;

#[derive(Clone, Copy)]
enum Field {
    Name,
    Text,
    Value,
    Attributes,
    Children,
    Other,
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldVisitor;

        impl<'de> Visitor<'de> for FieldVisitor {
            type Value = Field;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a field name")
            }

            fn visit_str<E>(self, value: &str) -> Result<Field, E> {
                Ok(match value {
                    "name" => Field::Name,
                    "text" => Field::Text,
                    "value" => Field::Value,
                    "attributes" => Field::Attributes,
                    "children" => Field::Children,
                    _ => Field::Other,
                })
            }
        }

        deserializer.deserialize_identifier(FieldVisitor)
    }
}

fn duplicate<E: de::Error>(field: &'static str) -> E {
    E::duplicate_field(field)
}

impl<'de> Deserialize<'de> for Attribute {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct AttributeVisitor;

        impl<'de> Visitor<'de> for AttributeVisitor {
            type Value = Attribute;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an attribute name or a {name, value} map")
            }

            fn visit_str<E>(self, name: &str) -> Result<Attribute, E>
            where
                E: de::Error,
            {
                Attribute::new(name, None).map_err(E::custom)
            }

            fn visit_map<A>(self, mut map: A) -> Result<Attribute, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut name: Option<String> = None;
                let mut value: Option<Option<String>> = None;

                while let Some(key) = map.next_key()? {
                    match key {
                        Field::Name => {
                            if name.is_some() {
                                return Err(duplicate("name"));
                            }
                            name = Some(map.next_value()?);
                        }
                        Field::Value => {
                            if value.is_some() {
                                return Err(duplicate("value"));
                            }
                            value = Some(map.next_value()?);
                        }
                        _ => {
                            map.next_value::<de::IgnoredAny>()?;
                        }
                    }
                }

                let name = name.ok_or_else(|| de::Error::missing_field("name"))?;
                Attribute::new(&name, value.flatten().as_deref()).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(AttributeVisitor)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct NodeVisitor;

        impl<'de> Visitor<'de> for NodeVisitor {
            type Value = Node;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a node map")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Node, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut node = Node::default();
                let mut seen = [false; 4];

                while let Some(key) = map.next_key()? {
                    let slot = match key {
                        Field::Name => 0,
                        Field::Text => 1,
                        Field::Attributes => 2,
                        Field::Children => 3,
                        Field::Value | Field::Other => {
                            map.next_value::<de::IgnoredAny>()?;
                            continue;
                        }
                    };
                    if seen[slot] {
                        return Err(duplicate(["name", "text", "attributes", "children"][slot]));
                    }
                    seen[slot] = true;

                    match key {
                        Field::Name => {
                            if let Some(name) = map.next_value::<Option<String>>()? {
                                node.set_name(&name).map_err(de::Error::custom)?;
                            }
                        }
                        Field::Text => {
                            if let Some(text) = map.next_value::<Option<String>>()? {
                                node.set_text(&text);
                            }
                        }
                        Field::Attributes => {
                            for attrib in map.next_value::<Vec<Attribute>>()? {
                                node.add_attrib(attrib);
                            }
                        }
                        _ => {
                            for child in map.next_value::<Vec<Node>>()? {
                                node.add_child(child);
                            }
                        }
                    }
                }

                Ok(node)
            }
        }

        deserializer.deserialize_map(NodeVisitor)
    }
}
