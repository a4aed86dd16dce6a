//! Regsite Engine
//!
//! The label model behind a regulation reading site.
//! This library provides functionality for:
//! - Classifying citation labels (`["2323", "5", "r", "3"]`) into node types
//! - Rendering labels as markup ids and human-readable citation text
//! - Assembling regulation trees with citation-aware sibling ordering
//! - Merging tables of contents with version change records for diff views
//!
//! # Example
//!
//! ```
//! use regsite_engine::{label_to_text, Label, Node, NodeType, TreeBuilder};
//!
//! let label = Label::from(["2323", "7", "b", "Interp", "1", "v"]);
//! assert_eq!(NodeType::classify(&label).unwrap(), NodeType::Interp);
//! assert_eq!(label_to_text(&label, true, false).unwrap(), "Comment for 2323.7(b)-1.v");
//!
//! let nodes = vec![
//!     Node::new(["2323", "2"]).unwrap(),
//!     Node::new(["2323"]).unwrap(),
//!     Node::new(["2323", "1"]).unwrap(),
//! ];
//! let tree = TreeBuilder::build(nodes).unwrap();
//! let ids: Vec<&str> = tree.children.iter().map(|n| n.label_id.as_str()).collect();
//! assert_eq!(ids, vec!["2323-1", "2323-2"]);
//! ```

pub mod config;
pub mod diff;
pub mod error;
pub mod format;
pub mod label;
pub mod layers;
pub mod node;
pub mod node_type;
pub mod roman;
pub mod toc;
pub mod tree;

// Re-export commonly used items
pub use diff::{
    diff_toc, footer_nav, merge, modified_deleted_sections, section_view, sort_toc, ChangeRecord,
    ChangeSet, DiffContext, DiffOp, DiffUrl, FooterNav, NavLink,
};
pub use error::{EngineError, Result};
pub use format::{label_to_text, markup_id, to_markup_id, transform_part, LabelTextOptions};
pub use label::Label;
pub use layers::{HeaderLayer, Layer, LayerPipeline};
pub use node::Node;
pub use node_type::{Citation, NodeType};
pub use roman::roman_nums;
pub use toc::{table_of_contents, TocEntry};
pub use tree::{
    add_child, add_node_to_tree, build_tree_hash, make_label_sortable, parent_in_tree,
    parent_label, Sortable, TreeBuilder, TreeHash,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
