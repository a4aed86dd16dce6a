//! Regulation tree nodes
//!
//! A [`Node`] is one labelled element of a regulation: a section, paragraph,
//! appendix, subpart or interpretation. Nodes arrive from the content source
//! as YAML or JSON; after loading, `label_id` and `node_type` are always
//! recomputed from the label so a stale or missing value in the source cannot
//! disagree with the label itself.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::format::markup_id;
use crate::label::{Label, SUBPART};
use crate::node_type::NodeType;
use crate::tree::Sortable;

/// Element of a regulation tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Citation path
    pub label: Label,

    /// Markup id derived from `label`
    #[serde(default)]
    pub label_id: String,

    /// Structural kind derived from `label`
    #[serde(default = "default_node_type")]
    pub node_type: NodeType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Body text; opaque to the engine and possibly decorated by layers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default)]
    pub children: Vec<Node>,

    /// Ordering key cached by the tree builder
    #[serde(skip)]
    pub sortable: Option<Sortable>,
}

fn default_node_type() -> NodeType {
    NodeType::RegText
}

impl Node {
    /// Create a childless node, classifying its label.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::MalformedLabel`] for labels that fail
    /// validation.
    pub fn new(label: impl Into<Label>) -> Result<Self> {
        let label = label.into();
        let node_type = NodeType::classify(&label)?;
        Ok(Self {
            label_id: markup_id(&label),
            label,
            node_type,
            title: None,
            text: None,
            children: Vec::new(),
            sortable: None,
        })
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Structurally empty grouping node standing in for absent content.
    ///
    /// Used when a requested section does not exist in one of the two
    /// versions being compared.
    pub fn placeholder() -> Self {
        Self {
            label: Label::default(),
            label_id: String::new(),
            node_type: NodeType::EmptyPart,
            title: None,
            text: None,
            children: Vec::new(),
            sortable: None,
        }
    }

    /// Grouping node for sections outside any subpart of `part`.
    pub fn empty_part(part: &str, children: Vec<Node>) -> Self {
        let label = Label::new([part, SUBPART]);
        Self {
            label_id: markup_id(&label),
            label,
            node_type: NodeType::EmptyPart,
            title: None,
            text: None,
            children,
            sortable: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.label.is_empty()
    }

    /// Recompute `label_id` and `node_type` for this node and its subtree.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::MalformedLabel`] on the first node whose
    /// label fails validation.
    pub fn normalize(&mut self) -> Result<()> {
        self.node_type = NodeType::classify(&self.label)?;
        self.label_id = markup_id(&self.label);
        for child in &mut self.children {
            child.normalize()?;
        }
        Ok(())
    }

    /// Parse a tree from YAML and normalize it.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut node: Node = serde_yaml_ng::from_str(yaml)?;
        node.normalize()?;
        Ok(node)
    }

    /// Parse a tree from JSON and normalize it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut node: Node = serde_json::from_str(json)?;
        node.normalize()?;
        Ok(node)
    }

    /// Load a tree from a `.yaml`/`.yml` or `.json` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "Loading regulation tree");
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    /// Pre-order iterator over this node and all descendants.
    pub fn walk(&self) -> impl Iterator<Item = &Node> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Find a descendant (or self) by markup id.
    pub fn find(&self, label_id: &str) -> Option<&Node> {
        self.walk().find(|node| node.label_id == label_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    const TREE_YAML: &str = r#"
label: ["204"]
title: "Part 204 - Reserve Requirements"
children:
  - label: ["204", "Subpart"]
    children:
      - label: ["204", "1"]
        title: "§ 204.1 Authority."
        text: "(a) Authority."
        children:
          - label: ["204", "1", "a"]
            text: "(a) Authority."
  - label: ["204", "A"]
    title: "Appendix A to Part 204—Forms"
  - label: ["204", "Interp"]
    title: "Supplement I to Part 204—Official Interpretations"
"#;

    #[test]
    fn test_from_yaml_classifies_nodes() {
        let tree = Node::from_yaml_str(TREE_YAML).unwrap();
        assert_eq!(tree.label_id, "204");
        assert_eq!(tree.node_type, NodeType::RegText);
        assert_eq!(tree.children[0].node_type, NodeType::EmptyPart);
        assert_eq!(tree.children[1].node_type, NodeType::Appendix);
        assert_eq!(tree.children[2].node_type, NodeType::Interp);
        assert_eq!(tree.find("204-1-a").map(|n| n.node_type), Some(NodeType::RegText));
    }

    #[test]
    fn test_walk_is_pre_order() {
        let tree = Node::from_yaml_str(TREE_YAML).unwrap();
        let ids: Vec<&str> = tree.walk().map(|n| n.label_id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["204", "204-Subpart", "204-1", "204-1-a", "204-A", "204-Interp"]
        );
    }

    #[test]
    fn test_from_json_rejects_bad_label() {
        let result = Node::from_json_str(r#"{"label": ["204", ""], "children": []}"#);
        assert!(matches!(result, Err(EngineError::MalformedLabel { .. })));
    }

    #[test]
    fn test_json_omits_sortable() {
        let node = Node::new(["204", "2"]).unwrap().with_text("text");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["label_id"], "204-2");
        assert_eq!(json["node_type"], "regtext");
        assert!(json.get("sortable").is_none());
        assert!(json.get("title").is_none());
    }

    #[test]
    fn test_placeholder() {
        let node = Node::placeholder();
        assert!(node.is_placeholder());
        assert_eq!(node.node_type, NodeType::EmptyPart);
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_empty_part_wraps_children() {
        let section = Node::new(["204", "3"]).unwrap();
        let group = Node::empty_part("204", vec![section]);
        assert_eq!(group.label_id, "204-Subpart");
        assert_eq!(group.children.len(), 1);
    }
}
