//! Table of contents
//!
//! A flattened, ordered projection of a regulation's top-level content:
//! sections (lifted out of their subpart groupings), appendices and the
//! interpretation supplement. Entries parse their titles into a short
//! display label and a sub-label:
//!
//! - `"§ 8888.2 Definitions."` → `"§ 8888.2"` / `"Definitions."`
//! - `"Appendix C to Part 8888—Model Forms"` → `"Appendix C to Part 8888"` / `"Model Forms"`

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::diff::DiffOp;
use crate::format::markup_id;
use crate::label::{Label, INTERP};
use crate::node::Node;
use crate::node_type::NodeType;

/// Section title: section symbol, section number, then the heading.
static SECTION_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^§+\s*([\w.\-()]+)\s*(.*)$").expect("valid regex"));

/// Separators tried, in order, when splitting appendix and supplement titles.
const TITLE_SEPARATORS: [char; 2] = ['—', '-'];

/// One entry of a (possibly diff-annotated) table of contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Markup id of the entry's section
    pub section_id: String,

    /// Section label
    pub index: Label,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Short display label parsed from the title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Remainder of the title after the display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_label: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_section: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_appendix: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_supplement: bool,

    /// Diff annotation between two versions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<DiffOp>,

    /// Section diff view link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl TocEntry {
    /// Create an entry for `index`, deriving display labels from `title`.
    pub fn new(index: Label, title: Option<String>) -> Self {
        let mut entry = Self {
            section_id: markup_id(&index),
            index,
            title,
            ..Self::default()
        };
        entry.apply_title();
        entry
    }

    pub fn from_node(node: &Node) -> Self {
        Self::new(node.label.clone(), node.title.clone())
    }

    #[must_use]
    pub fn with_op(mut self, op: DiffOp) -> Self {
        self.op = Some(op);
        self
    }

    /// Fill `label`/`sub_label` and the kind flags from the title.
    pub fn apply_title(&mut self) {
        let Some(title) = self.title.as_deref() else {
            return;
        };

        if let Some((label, sub_label)) = parse_section_title(title) {
            self.is_section = true;
            self.label = Some(label);
            self.sub_label = Some(sub_label);
            return;
        }

        let Some(second) = self.index.get(1) else {
            return;
        };
        if second == INTERP {
            self.is_supplement = true;
        } else if second.starts_with(|c: char| c.is_ascii_alphabetic()) {
            self.is_appendix = true;
        } else {
            return;
        }

        match split_title(title) {
            Some((label, sub_label)) => {
                self.label = Some(label);
                self.sub_label = Some(sub_label);
            }
            None => self.label = Some(title.to_string()),
        }
    }
}

/// Split `"§ 8888.2 Definitions."` into `("§ 8888.2", "Definitions.")`.
pub fn parse_section_title(title: &str) -> Option<(String, String)> {
    let caps = SECTION_TITLE.captures(title.trim())?;
    Some((format!("§ {}", &caps[1]), caps[2].trim().to_string()))
}

/// Split an appendix or supplement title on its first separator.
pub fn split_title(title: &str) -> Option<(String, String)> {
    TITLE_SEPARATORS.iter().find_map(|sep| {
        title
            .split_once(*sep)
            .map(|(head, tail)| (head.trim().to_string(), tail.trim().to_string()))
    })
}

/// Project a regulation tree onto its table of contents.
///
/// Sections inside subparts and empty parts are lifted to the top level;
/// sections, appendices and the supplement at the root contribute
/// themselves.
pub fn table_of_contents(tree: &Node) -> Vec<TocEntry> {
    let mut toc = Vec::new();
    for child in &tree.children {
        match child.node_type {
            NodeType::Subpart | NodeType::EmptyPart => {
                toc.extend(child.children.iter().map(TocEntry::from_node));
            }
            NodeType::RegText | NodeType::Appendix | NodeType::Interp => {
                toc.push(TocEntry::from_node(child));
            }
        }
    }
    toc
}
