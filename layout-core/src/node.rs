//! Content nodes - the blocks a layout places on the grid.
//!
//! Nodes are owned by the document store. The engine reads their id and
//! type tag and hands back [`NodePatch`]es; it never creates or deletes them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Opaque per-node data bag (author content, formatting, per-type fields).
pub type NodeData = serde_json::Map<String, serde_json::Value>;

/// A partial update to a node's data bag.
///
/// Keys overwrite; a `null` value removes the key.
pub type NodePatch = serde_json::Map<String, serde_json::Value>;

/// Patches keyed by the node they apply to.
pub type NodePatches = BTreeMap<NodeId, NodePatch>;

/// Stable identifier for a node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create an id from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The type tag of a node.
///
/// The set is open: tags the node catalog defines but the engine has no
/// policy for are kept verbatim in [`NodeKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    /// Section heading.
    Heading,
    /// Highlighted callout box.
    Callout,
    /// Static image.
    Image,
    /// Embedded video.
    Video,
    /// Body text.
    Text,
    /// Block quote.
    Quote,
    /// Data table.
    Table,
    /// Interactive poll.
    Poll,
    /// Citation or link to another document.
    Reference,
    /// Horizontal separator.
    Separator,
    /// Any other catalog type.
    Other(String),
}

impl NodeKind {
    /// The wire tag for this kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Heading => "heading",
            Self::Callout => "callout",
            Self::Image => "image",
            Self::Video => "video",
            Self::Text => "text",
            Self::Quote => "quote",
            Self::Table => "table",
            Self::Poll => "poll",
            Self::Reference => "reference",
            Self::Separator => "separator",
            Self::Other(tag) => tag,
        }
    }
}

impl From<&str> for NodeKind {
    fn from(tag: &str) -> Self {
        match tag {
            "heading" => Self::Heading,
            "callout" => Self::Callout,
            "image" => Self::Image,
            "video" => Self::Video,
            "text" => Self::Text,
            "quote" => Self::Quote,
            "table" => Self::Table,
            "poll" => Self::Poll,
            "reference" => Self::Reference,
            "separator" => Self::Separator,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for NodeKind {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A content node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier.
    pub id: NodeId,
    /// Node type tag.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Author-supplied data.
    #[serde(default)]
    pub data: NodeData,
}

impl Node {
    /// Create a node with an empty data bag.
    #[must_use]
    pub fn new(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            data: NodeData::new(),
        }
    }

    /// Set a single data field.
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Return a copy of this node with `patch` merged into its data bag.
    #[must_use]
    pub fn with_patch(&self, patch: &NodePatch) -> Self {
        let mut node = self.clone();
        for (key, value) in patch {
            if value.is_null() {
                node.data.remove(key);
            } else {
                node.data.insert(key.clone(), value.clone());
            }
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_parses_known_tags() {
        assert_eq!(NodeKind::from("heading"), NodeKind::Heading);
        assert_eq!(NodeKind::from("separator"), NodeKind::Separator);
    }

    #[test]
    fn test_kind_keeps_unknown_tags() {
        let kind = NodeKind::from("kanban");
        assert_eq!(kind, NodeKind::Other("kanban".to_string()));
        assert_eq!(kind.as_str(), "kanban");
    }

    #[test]
    fn test_node_serializes_type_tag() {
        let node = Node::new("t1", NodeKind::Text).with_data("content", json!("hi"));
        let value = serde_json::to_value(&node).expect("should serialize");
        assert_eq!(value, json!({"id": "t1", "type": "text", "data": {"content": "hi"}}));
    }

    #[test]
    fn test_node_without_data_deserializes() {
        let node: Node =
            serde_json::from_str(r#"{"id":"x","type":"poll"}"#).expect("should deserialize");
        assert_eq!(node.kind, NodeKind::Poll);
        assert!(node.data.is_empty());
    }

    #[test]
    fn test_patch_overwrites_and_removes() {
        let node = Node::new("n", NodeKind::Image)
            .with_data("src", json!("a.png"))
            .with_data("fontScale", json!(0.9));

        let mut patch = NodePatch::new();
        patch.insert("src".to_string(), json!("b.png"));
        patch.insert("fontScale".to_string(), serde_json::Value::Null);
        patch.insert("spacing".to_string(), json!("compact"));

        let patched = node.with_patch(&patch);
        assert_eq!(patched.data["src"], json!("b.png"));
        assert_eq!(patched.data["spacing"], json!("compact"));
        assert!(!patched.data.contains_key("fontScale"));
        // Input node is left as is
        assert_eq!(node.data["src"], json!("a.png"));
    }
}
