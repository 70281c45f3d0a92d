//! Labeled, renderer-facing content attached to a description node.

use indexmap::IndexSet;
use serde::Serialize;

use crate::node::DescriptionNode;

/// Label of the default representation the engine attaches to every
/// traversed node.
pub const CONTENTS: &str = "contents";

/// What a representation carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Contents {
    /// A primitive display value.
    Text(String),
    /// A single nested subtree, e.g. a decoded view of the value.
    Node(Box<DescriptionNode>),
    /// Child nodes of a composite, in container iteration order.
    Nodes(Vec<DescriptionNode>),
}

impl Contents {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&DescriptionNode> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_nodes(&self) -> Option<&[DescriptionNode]> {
        match self {
            Self::Nodes(nodes) => Some(nodes),
            _ => None,
        }
    }

    /// Every node held directly by these contents.
    pub fn nodes(&self) -> &[DescriptionNode] {
        match self {
            Self::Text(_) => &[],
            Self::Node(node) => std::slice::from_ref(node.as_ref()),
            Self::Nodes(nodes) => nodes,
        }
    }
}

/// A named bundle of content plus free-form hint tags for renderers.
///
/// Representations are immutable once attached to a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Representation {
    label: String,
    contents: Contents,
    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    hints: IndexSet<String>,
}

impl Representation {
    pub fn new(label: impl Into<String>, contents: Contents) -> Self {
        Self {
            label: label.into(),
            contents,
            hints: IndexSet::new(),
        }
    }

    pub fn text(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(label, Contents::Text(text.into()))
    }

    pub fn node(label: impl Into<String>, node: DescriptionNode) -> Self {
        Self::new(label, Contents::Node(Box::new(node)))
    }

    pub fn nodes(label: impl Into<String>, nodes: Vec<DescriptionNode>) -> Self {
        Self::new(label, Contents::Nodes(nodes))
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.insert(hint.into());
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn contents(&self) -> &Contents {
        &self.contents
    }

    pub fn hints(&self) -> impl Iterator<Item = &str> {
        self.hints.iter().map(String::as_str)
    }

    pub fn has_hint(&self, hint: &str) -> bool {
        self.hints.contains(hint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_contents_hold_no_nodes() {
        let rep = Representation::text("custom", "hello").with_hint("inline");
        assert_eq!(rep.label(), "custom");
        assert_eq!(rep.contents().as_text(), Some("hello"));
        assert!(rep.contents().nodes().is_empty());
        assert!(rep.has_hint("inline"));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let rep = Representation::text("custom", "hello");
        let json = serde_json::to_value(&rep).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "label": "custom",
                "contents": { "kind": "text", "value": "hello" }
            })
        );
    }
}
