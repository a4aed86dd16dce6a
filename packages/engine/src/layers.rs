//! Rendering layers
//!
//! A [`Layer`] decorates nodes of an assembled tree before rendering
//! (definitions, internal citations, paragraph markers and the like). The
//! engine only owns the seam and the traversal: layers run in the order they
//! were added, over every node, parents before children. Node text the core
//! does not understand is left as it is.

use crate::error::Result;
use crate::format::{label_to_text_with, LabelTextOptions};
use crate::node::Node;
use crate::node_type::{Citation, NodeType};

/// Decoration applied to each node of a tree.
pub trait Layer {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Decorate a single node. Children are visited separately.
    fn apply(&self, node: &mut Node) -> Result<()>;
}

/// Ordered sequence of layers.
#[derive(Default)]
pub struct LayerPipeline {
    layers: Vec<Box<dyn Layer>>,
}

impl LayerPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_layer(mut self, layer: impl Layer + 'static) -> Self {
        self.add_layer(layer);
        self
    }

    pub fn add_layer(&mut self, layer: impl Layer + 'static) {
        self.layers.push(Box::new(layer));
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.layers.iter().map(|layer| layer.name()).collect()
    }

    /// Run every layer over `tree`, pre-order.
    ///
    /// # Errors
    ///
    /// Stops at the first layer error.
    pub fn apply(&self, tree: &mut Node) -> Result<()> {
        for layer in &self.layers {
            tracing::debug!(layer = layer.name(), root = %tree.label_id, "Applying layer");
            apply_pre_order(layer.as_ref(), tree)?;
        }
        Ok(())
    }
}

fn apply_pre_order(layer: &dyn Layer, node: &mut Node) -> Result<()> {
    let mut stack = vec![node];
    while let Some(node) = stack.pop() {
        layer.apply(node)?;
        stack.extend(node.children.iter_mut().rev());
    }
    Ok(())
}

/// Fill missing titles of sections, appendices and subparts with their
/// citation text (`"§ 2323.1"`, `"Appendix A"`, `"Subpart C"`).
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderLayer;

impl Layer for HeaderLayer {
    fn name(&self) -> &str {
        "header"
    }

    fn apply(&self, node: &mut Node) -> Result<()> {
        if node.title.is_some() || node.is_placeholder() {
            return Ok(());
        }
        let is_header = match Citation::parse(&node.label)? {
            Citation::Section { paragraphs, .. } => paragraphs.is_empty(),
            Citation::Appendix { rest, .. } => rest.is_empty(),
            Citation::Subpart { .. } => true,
            _ => false,
        };
        if is_header {
            let options = LabelTextOptions {
                is_section_header: node.node_type == NodeType::RegText,
                ..LabelTextOptions::default()
            };
            node.title = Some(label_to_text_with(&node.label, options)?);
        }
        Ok(())
    }
}
