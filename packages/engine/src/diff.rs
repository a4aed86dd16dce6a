//! Version comparison
//!
//! Merges a table of contents with the change records between two versions
//! of a regulation. Each entry is annotated with its [`DiffOp`] and a link
//! to the section diff view; sections added in the newer version are
//! synthesized from their change records. The merged sequence then drives
//! previous/next navigation in the diff view.
//!
//! # Examples
//!
//! ```
//! use regsite_engine::diff::{diff_toc, ChangeSet, DiffContext, DiffOp};
//! use regsite_engine::label::Label;
//! use regsite_engine::toc::TocEntry;
//!
//! let toc = vec![TocEntry::new(Label::from(["8888", "1"]), None)];
//! let changes = ChangeSet::from_json_str(r#"{"8888-1-a": {"op": "modified"}}"#).unwrap();
//! let ctx = DiffContext::new("old", "new", "old");
//!
//! let merged = diff_toc(&ctx, &toc, &changes);
//! assert_eq!(merged[0].op, Some(DiffOp::Modified));
//! assert_eq!(merged[0].url.as_deref(), Some("/diff/8888-1/old/new?from_version=old"));
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::config::{DIFF_URL_PREFIX, FROM_VERSION_PARAM};
use crate::error::{EngineError, Result};
use crate::label::{Label, INTERP};
use crate::node::Node;
use crate::node_type::NodeType;
use crate::toc::TocEntry;

/// Kind of change a label underwent between two versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffOp {
    Added,
    Modified,
    Deleted,
}

impl DiffOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffOp::Added => "added",
            DiffOp::Modified => "modified",
            DiffOp::Deleted => "deleted",
        }
    }

    /// Parse the op of the change record keyed by `label_id`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MalformedChangeRecord`] for anything other
    /// than `added`, `modified` or `deleted`.
    pub fn parse(op: &str, label_id: &str) -> Result<DiffOp> {
        match op {
            "added" => Ok(DiffOp::Added),
            "modified" => Ok(DiffOp::Modified),
            "deleted" => Ok(DiffOp::Deleted),
            other => Err(EngineError::MalformedChangeRecord {
                label_id: label_id.to_string(),
                reason: format!("unknown op '{other}'"),
            }),
        }
    }
}

impl fmt::Display for DiffOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Change record as delivered by the diff source, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawChangeRecord {
    pub op: String,
    #[serde(default)]
    pub node: Option<Node>,
}

/// Validated change to one label.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord {
    pub op: DiffOp,
    /// New content; always present for additions
    pub node: Option<Node>,
}

/// Change records keyed by label id (`"8888-1-a"`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    records: BTreeMap<String, ChangeRecord>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON object of change records.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, RawChangeRecord> = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Validate raw records.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MalformedChangeRecord`] for unknown ops or
    /// additions without a node, and [`EngineError::MalformedLabel`] for
    /// node payloads whose labels fail validation.
    pub fn from_raw(raw: BTreeMap<String, RawChangeRecord>) -> Result<Self> {
        let mut changes = Self::new();
        for (label_id, record) in raw {
            let op = DiffOp::parse(&record.op, &label_id)?;
            let node = match record.node {
                Some(mut node) => {
                    node.normalize()?;
                    Some(node)
                }
                None if op == DiffOp::Added => {
                    return Err(EngineError::MalformedChangeRecord {
                        label_id,
                        reason: "added record has no node".to_string(),
                    });
                }
                None => None,
            };
            changes.insert(label_id, ChangeRecord { op, node });
        }
        Ok(changes)
    }

    pub fn insert(&mut self, label_id: impl Into<String>, record: ChangeRecord) {
        self.records.insert(label_id.into(), record);
    }

    pub fn get(&self, label_id: &str) -> Option<&ChangeRecord> {
        self.records.get(label_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChangeRecord)> {
        self.records.iter().map(|(id, record)| (id.as_str(), record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Versions being compared, and the version the reader navigated from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffContext {
    pub old_version: String,
    pub new_version: String,
    pub from_version: String,
}

impl DiffContext {
    pub fn new(
        old_version: impl Into<String>,
        new_version: impl Into<String>,
        from_version: impl Into<String>,
    ) -> Self {
        Self {
            old_version: old_version.into(),
            new_version: new_version.into(),
            from_version: from_version.into(),
        }
    }

    /// Link to the diff view of one section.
    pub fn url(&self, section_id: &str) -> String {
        DiffUrl::new(section_id, self).to_string()
    }
}

/// Diff view link: `/diff/{section}/{old}/{new}?from_version={from}`.
#[derive(Debug, Clone, Copy)]
pub struct DiffUrl<'a> {
    section_id: &'a str,
    ctx: &'a DiffContext,
}

impl<'a> DiffUrl<'a> {
    pub fn new(section_id: &'a str, ctx: &'a DiffContext) -> Self {
        Self { section_id, ctx }
    }
}

impl fmt::Display for DiffUrl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{DIFF_URL_PREFIX}/{}/{}/{}?{FROM_VERSION_PARAM}={}",
            self.section_id, self.ctx.old_version, self.ctx.new_version, self.ctx.from_version
        )
    }
}

/// Top-level section a changed label belongs to.
///
/// Any interpretation change belongs to the part's supplement; everything
/// else to its first two segments.
pub fn owning_section(label: &Label) -> Label {
    if label.contains(INTERP) {
        Label::new([label.part().unwrap_or_default(), INTERP])
    } else {
        label.truncated(2)
    }
}

/// Sections touched by `changes`, split into `(modified, deleted)`.
///
/// A section is deleted only when its own record is a deletion; deleting a
/// paragraph inside it counts as a modification.
pub fn modified_deleted_sections(changes: &ChangeSet) -> (HashSet<Label>, HashSet<Label>) {
    let mut modified = HashSet::new();
    let mut deleted = HashSet::new();
    for (label_id, record) in changes.iter() {
        let label = Label::from_id(label_id);
        let section = owning_section(&label);
        if record.op == DiffOp::Deleted && section == label {
            deleted.insert(section);
        } else {
            modified.insert(section);
        }
    }
    (modified, deleted)
}

/// Merge `old_toc` with `changes` into an annotated, ordered sequence.
///
/// Additions of top-level sections with a title become new entries. Every
/// entry gets a diff URL; entries without an op are marked deleted, then
/// modified, according to [`modified_deleted_sections`].
pub fn diff_toc(ctx: &DiffContext, old_toc: &[TocEntry], changes: &ChangeSet) -> Vec<TocEntry> {
    let mut compiled = old_toc.to_vec();

    for (label_id, record) in changes.iter() {
        if record.op != DiffOp::Added {
            continue;
        }
        let Some(node) = &record.node else {
            continue;
        };
        let has_title = node.title.as_deref().is_some_and(|title| !title.is_empty());
        if node.label.len() == 2 && has_title {
            tracing::debug!(label_id, "Adding new section to diff TOC");
            compiled.push(TocEntry::from_node(node).with_op(DiffOp::Added));
        }
    }

    let (modified, deleted) = modified_deleted_sections(changes);

    for entry in &mut compiled {
        entry.url = Some(ctx.url(&entry.section_id));
        if entry.op.is_none() {
            if deleted.contains(&entry.index) {
                entry.op = Some(DiffOp::Deleted);
            } else if modified.contains(&entry.index) {
                entry.op = Some(DiffOp::Modified);
            }
        }
    }

    sort_toc(&mut compiled);

    tracing::debug!(
        entries = compiled.len(),
        modified = modified.len(),
        deleted = deleted.len(),
        "Merged diff TOC"
    );
    compiled
}

/// Alias of [`diff_toc`] taking the versions positionally.
///
/// # Errors
///
/// Never fails today; kept fallible so callers propagate merge conditions
/// uniformly with the rest of the engine.
pub fn merge(
    old_version: &str,
    new_version: &str,
    old_toc: &[TocEntry],
    changes: &ChangeSet,
    from_version: &str,
) -> Result<Vec<TocEntry>> {
    let ctx = DiffContext::new(old_version, new_version, from_version);
    Ok(diff_toc(&ctx, old_toc, changes))
}

/// Normalized label segment for TOC ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum TocKey<'a> {
    Number(u64),
    Text(&'a str),
    Interp,
}

fn toc_key(index: &Label) -> Vec<TocKey<'_>> {
    index
        .segments()
        .iter()
        .map(|segment| match segment.parse::<u64>() {
            Ok(number) => TocKey::Number(number),
            Err(_) if segment == INTERP => TocKey::Interp,
            Err(_) => TocKey::Text(segment),
        })
        .collect()
}

/// Stable sort by index: numbers numerically, then letters, then the
/// supplement.
pub fn sort_toc(toc: &mut [TocEntry]) {
    toc.sort_by(|a, b| compare_index(&a.index, &b.index));
}

fn compare_index(a: &Label, b: &Label) -> Ordering {
    toc_key(a).cmp(&toc_key(b))
}

/// Link to a neighbouring section in the diff view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub section_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FooterNav {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<NavLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<NavLink>,
}

impl FooterNav {
    pub fn is_empty(&self) -> bool {
        self.previous.is_none() && self.next.is_none()
    }
}

fn nav_link(entry: &TocEntry, ctx: &DiffContext) -> NavLink {
    NavLink {
        section_id: entry.section_id.clone(),
        label: entry.label.clone().or_else(|| entry.title.clone()),
        url: ctx.url(&entry.section_id),
    }
}

/// Previous/next links around `current` in a merged TOC.
///
/// Empty when `current` is not in the TOC.
pub fn footer_nav(current: &str, toc: &[TocEntry], ctx: &DiffContext) -> FooterNav {
    let Some(position) = toc.iter().position(|entry| entry.section_id == current) else {
        tracing::debug!(current, "Section not in TOC, no footer navigation");
        return FooterNav::default();
    };

    FooterNav {
        previous: position
            .checked_sub(1)
            .and_then(|i| toc.get(i))
            .map(|entry| nav_link(entry, ctx)),
        next: toc.get(position + 1).map(|entry| nav_link(entry, ctx)),
    }
}

/// Wrap a section for the diff view.
///
/// A section missing from one of the versions becomes a placeholder; a
/// regulation-text section is grouped under its part's empty part so the
/// view always renders a grouping level.
pub fn section_view(section: Option<Node>) -> Node {
    let child = match section {
        None => Node::placeholder(),
        Some(node) if node.node_type == NodeType::RegText => {
            let part = node.label.part().unwrap_or_default().to_string();
            Node::empty_part(&part, vec![node])
        }
        Some(node) => node,
    };
    Node::placeholder().with_children(vec![child])
}
