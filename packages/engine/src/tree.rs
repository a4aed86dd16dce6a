//! Tree assembly
//!
//! Builds an ordered regulation tree out of labelled nodes. Each node's
//! structural parent is derived from its label ([`parent_label`]), and
//! siblings are kept ordered by a kind-aware comparator:
//!
//! - siblings are grouped by [`NodeType`] (grouping nodes, text, appendices,
//!   interpretations)
//! - within a kind, the final meaningful segment is compared using a
//!   [`SortStrategy`] inferred from the whole sibling set: roman numerals by
//!   value, numbered segments numerically (`"2(a)"` between `"1"` and `"3"`),
//!   anything else lexicographically
//!
//! The label → node lookup used during assembly ([`TreeHash`]) is an arena
//! scoped to one assembly. It is consumed when the finished tree is returned.
//!
//! # Example
//!
//! ```
//! use regsite_engine::node::Node;
//! use regsite_engine::tree::TreeBuilder;
//!
//! let nodes = vec![
//!     Node::new(["204", "3"]).unwrap(),
//!     Node::new(["204"]).unwrap(),
//!     Node::new(["204", "2"]).unwrap(),
//!     Node::new(["204", "2", "Interp"]).unwrap(),
//!     Node::new(["204", "Interp"]).unwrap(),
//! ];
//! let tree = TreeBuilder::build(nodes).unwrap();
//! let ids: Vec<&str> = tree.children.iter().map(|c| c.label_id.as_str()).collect();
//! assert_eq!(ids, ["204-2", "204-3", "204-Interp"]);
//! assert_eq!(tree.children[2].children[0].label_id, "204-2-Interp");
//! ```

use regex::Regex;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::error::{EngineError, Result};
use crate::format::markup_id;
use crate::label::{Label, INTERP};
use crate::node::Node;
use crate::node_type::NodeType;
use crate::roman::{all_roman, parse_roman};

/// Leading number with an optional sub-designator suffix (`"30"`, `"2(a)"`, `"12b"`).
static NUMBERED_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(.*)$").expect("valid regex"));

/// Cached ordering key of a node among its siblings.
///
/// Variant order is significant: roman keys never mix with the others within
/// one kind, and numbered segments sort before plain text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sortable {
    /// Value of a roman numeral (`"ix"` → 9)
    Roman(u32),
    /// Leading number and remaining suffix (`"2(a)"` → `(2, "(a)")`)
    Number(u64, String),
    /// Raw segment
    Text(String),
}

/// Build the ordering key for one segment.
///
/// With `roman` set, a canonical roman numeral yields its integer value.
/// Otherwise numbered segments compare by number then suffix, and anything
/// else by its raw text.
pub fn make_label_sortable(segment: &str, roman: bool) -> Sortable {
    if roman {
        if let Some(value) = parse_roman(segment) {
            return Sortable::Roman(value);
        }
    }
    if let Some(caps) = NUMBERED_SEGMENT.captures(segment) {
        if let Ok(number) = caps[1].parse::<u64>() {
            return Sortable::Number(number, caps[2].to_string());
        }
    }
    Sortable::Text(segment.to_string())
}

/// How a set of same-kind siblings is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortStrategy {
    /// Every segment is a roman numeral; compare by value
    Roman,
    /// Some segments are numbered; numbers first, by value then suffix
    Numeric,
    /// No numbered segments; compare raw text
    Lexical,
}

impl SortStrategy {
    /// Infer the strategy for a sibling set from its final segments.
    pub fn for_segments<'a, I>(segments: I) -> SortStrategy
    where
        I: IntoIterator<Item = &'a str>,
        I::IntoIter: Clone,
    {
        let segments = segments.into_iter();
        if all_roman(segments.clone()) {
            SortStrategy::Roman
        } else if segments
            .clone()
            .any(|s| s.starts_with(|c: char| c.is_ascii_digit()))
        {
            SortStrategy::Numeric
        } else {
            SortStrategy::Lexical
        }
    }

    pub fn key(&self, segment: &str) -> Sortable {
        match self {
            SortStrategy::Roman => make_label_sortable(segment, true),
            SortStrategy::Numeric => make_label_sortable(segment, false),
            SortStrategy::Lexical => Sortable::Text(segment.to_string()),
        }
    }

    /// Whether `key` could have been produced by this strategy.
    fn produced(&self, key: &Sortable) -> bool {
        match self {
            SortStrategy::Roman => matches!(key, Sortable::Roman(_)),
            SortStrategy::Numeric => !matches!(key, Sortable::Roman(_)),
            SortStrategy::Lexical => matches!(key, Sortable::Text(_)),
        }
    }
}

fn kind_rank(node_type: NodeType) -> u8 {
    match node_type {
        NodeType::EmptyPart => 0,
        NodeType::Subpart => 1,
        NodeType::RegText => 2,
        NodeType::Appendix => 3,
        NodeType::Interp => 4,
    }
}

fn sort_segment(node: &Node) -> &str {
    node.label.sort_segment().unwrap_or_default()
}

/// Total order over siblings: kind, cached key, then label as a tie-break.
fn sibling_order(a: &Node, b: &Node) -> Ordering {
    kind_rank(a.node_type)
        .cmp(&kind_rank(b.node_type))
        .then_with(|| a.sortable.cmp(&b.sortable))
        .then_with(|| a.label.cmp(&b.label))
}

/// Ordered child storage the builder can insert into.
trait Siblings {
    fn count(&self) -> usize;
    fn node(&self, index: usize) -> &Node;
    fn node_mut(&mut self, index: usize) -> &mut Node;
    fn insert_at(&mut self, index: usize, child: Node);
    fn sort_all(&mut self);

    fn strategy_for(&self, kind: NodeType, extra: Option<&Node>) -> SortStrategy {
        let segments: Vec<&str> = (0..self.count())
            .map(|i| self.node(i))
            .chain(extra)
            .filter(|n| n.node_type == kind)
            .map(sort_segment)
            .collect();
        SortStrategy::for_segments(segments.iter().copied())
    }
}

impl Siblings for Vec<Node> {
    fn count(&self) -> usize {
        self.len()
    }

    fn node(&self, index: usize) -> &Node {
        &self[index]
    }

    fn node_mut(&mut self, index: usize) -> &mut Node {
        &mut self[index]
    }

    fn insert_at(&mut self, index: usize, child: Node) {
        self.insert(index, child);
    }

    fn sort_all(&mut self) {
        self.sort_by(sibling_order);
    }
}

/// Recompute every sibling's key from its kind's current strategy.
fn assign_keys<S: Siblings>(siblings: &mut S) {
    let mut strategies: Vec<(NodeType, SortStrategy)> = Vec::new();
    for i in 0..siblings.count() {
        let kind = siblings.node(i).node_type;
        let strategy = match strategies.iter().find(|(k, _)| *k == kind) {
            Some((_, strategy)) => *strategy,
            None => {
                let strategy = siblings.strategy_for(kind, None);
                strategies.push((kind, strategy));
                strategy
            }
        };
        let node = siblings.node_mut(i);
        node.sortable = Some(strategy.key(sort_segment(node)));
    }
}

/// Insert `child` keeping siblings ordered.
///
/// When the new child leaves every cached key valid, it is placed by binary
/// search. Otherwise (keys missing, or the roman/non-roman shape of its kind
/// changed) all keys are recomputed and the set re-sorted, so the resulting
/// order never depends on insertion order.
fn insert_ordered<S: Siblings>(siblings: &mut S, mut child: Node) {
    let kind = child.node_type;
    let strategy = siblings.strategy_for(kind, Some(&child));
    child.sortable = Some(strategy.key(sort_segment(&child)));

    let stale = (0..siblings.count()).any(|i| {
        let node = siblings.node(i);
        match &node.sortable {
            None => true,
            Some(key) => node.node_type == kind && !strategy.produced(key),
        }
    });

    if stale {
        let end = siblings.count();
        siblings.insert_at(end, child);
        assign_keys(siblings);
        siblings.sort_all();
        return;
    }

    let (mut lo, mut hi) = (0, siblings.count());
    while lo < hi {
        let mid = (lo + hi) / 2;
        if sibling_order(siblings.node(mid), &child) == Ordering::Greater {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    siblings.insert_at(lo, child);
}

/// Insert `child` into `parent.children` at its ordered position.
///
/// Every sibling ends up with a cached [`Sortable`] key.
pub fn add_child(parent: &mut Node, child: Node) {
    insert_ordered(&mut parent.children, child);
}

/// Label of the node's structural parent, or `None` for a bare part.
///
/// Interpretation nodes ending in the marker attach to a synthetic parent:
/// `["204", "Interp"]` → `["204"]`, `["204", "2", "Interp"]` →
/// `["204", "Interp"]`, `["204", "2", "a", "Interp"]` →
/// `["204", "2", "Interp"]`. Everything else drops its last segment.
pub fn parent_label(node: &Node) -> Option<Label> {
    parent_of(&node.label)
}

/// [`parent_label`] for a bare label.
pub fn parent_of(label: &Label) -> Option<Label> {
    if label.len() <= 1 {
        return None;
    }
    match label.interp_index() {
        Some(pos) if pos + 1 == label.len() => {
            let target = label.truncated(pos);
            if target.len() == 1 {
                Some(target)
            } else {
                Some(target.without_last().child(INTERP))
            }
        }
        _ => Some(label.without_last()),
    }
}

/// Whether the parent of the node with `label_id` is registered.
pub fn parent_in_tree(label_id: &str, tree_hash: &TreeHash) -> bool {
    parent_of(&Label::from_id(label_id))
        .is_some_and(|parent| tree_hash.contains(&markup_id(&parent)))
}

#[derive(Debug)]
struct Slot {
    /// Node data; its own `children` vector stays empty while in the arena
    node: Node,
    children: Vec<usize>,
}

/// Arena view over one parent's children.
struct ArenaSiblings<'a> {
    slots: &'a mut Vec<Slot>,
    ids: &'a mut Vec<usize>,
}

impl Siblings for ArenaSiblings<'_> {
    fn count(&self) -> usize {
        self.ids.len()
    }

    fn node(&self, index: usize) -> &Node {
        &self.slots[self.ids[index]].node
    }

    fn node_mut(&mut self, index: usize) -> &mut Node {
        &mut self.slots[self.ids[index]].node
    }

    fn insert_at(&mut self, index: usize, child: Node) {
        let id = self.slots.len();
        self.slots.push(Slot {
            node: child,
            children: Vec::new(),
        });
        self.ids.insert(index, id);
    }

    fn sort_all(&mut self) {
        let slots = &*self.slots;
        self.ids
            .sort_by(|a, b| sibling_order(&slots[*a].node, &slots[*b].node));
    }
}

/// Label id → node lookup for one tree assembly.
///
/// Nodes live in an arena in insertion order; because a node is only ever
/// registered after its parent, iteration order is a valid pre-order with
/// ancestors before descendants.
#[derive(Debug, Default)]
pub struct TreeHash {
    slots: Vec<Slot>,
    index: HashMap<String, usize>,
}

/// Flatten an existing tree into a lookup, keeping its child order.
///
/// # Errors
///
/// [`EngineError::DuplicateLabel`] if two nodes of the tree share an id.
pub fn build_tree_hash(tree: Node) -> Result<TreeHash> {
    let mut hash = TreeHash::default();
    let mut stack: Vec<(Option<usize>, Node)> = vec![(None, tree)];

    while let Some((parent, mut node)) = stack.pop() {
        if hash.contains(&node.label_id) {
            return Err(EngineError::DuplicateLabel(node.label_id));
        }
        let children = std::mem::take(&mut node.children);
        let id = hash.slots.len();
        hash.index.insert(node.label_id.clone(), id);
        hash.slots.push(Slot {
            node,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            hash.slots[parent].children.push(id);
        }
        stack.extend(children.into_iter().rev().map(|child| (Some(id), child)));
    }
    Ok(hash)
}

/// Attach `node` (and any subtree it carries) below `parent_label_id`.
pub fn add_node_to_tree(
    node: Node,
    parent_label_id: &str,
    tree_hash: &mut TreeHash,
) -> Result<()> {
    tree_hash.add_node(node, parent_label_id)
}

impl TreeHash {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, label_id: &str) -> bool {
        self.index.contains_key(label_id)
    }

    /// Registered ids in pre-order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|slot| slot.node.label_id.as_str())
    }

    /// Node data for `label_id`. Its `children` are tracked by the hash; use
    /// [`TreeHash::children`].
    pub fn get(&self, label_id: &str) -> Option<&Node> {
        self.index.get(label_id).map(|&id| &self.slots[id].node)
    }

    /// Ordered children of `label_id`.
    pub fn children(&self, label_id: &str) -> Vec<&Node> {
        self.index
            .get(label_id)
            .map(|&id| {
                self.slots[id]
                    .children
                    .iter()
                    .map(|&child| &self.slots[child].node)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Attach `node` and its subtree below `parent_label_id`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::OrphanNode`] if the parent is not registered
    /// - [`EngineError::DuplicateLabel`] if any node in the subtree is
    pub fn add_node(&mut self, node: Node, parent_label_id: &str) -> Result<()> {
        let Some(&parent) = self.index.get(parent_label_id) else {
            return Err(EngineError::OrphanNode {
                label_id: node.label_id,
                parent_id: parent_label_id.to_string(),
            });
        };

        let mut stack = vec![(parent, node)];
        while let Some((parent, mut node)) = stack.pop() {
            let children = std::mem::take(&mut node.children);
            let id = self.attach(parent, node)?;
            stack.extend(children.into_iter().rev().map(|child| (id, child)));
        }
        Ok(())
    }

    fn attach(&mut self, parent: usize, node: Node) -> Result<usize> {
        if self.contains(&node.label_id) {
            return Err(EngineError::DuplicateLabel(node.label_id));
        }
        let label_id = node.label_id.clone();
        let id = self.slots.len();

        let mut ids = std::mem::take(&mut self.slots[parent].children);
        insert_ordered(
            &mut ArenaSiblings {
                slots: &mut self.slots,
                ids: &mut ids,
            },
            node,
        );
        self.slots[parent].children = ids;

        tracing::debug!(
            label_id = %label_id,
            parent = %self.slots[parent].node.label_id,
            "Attached node"
        );
        self.index.insert(label_id, id);
        Ok(id)
    }

    /// Reassemble the rooted tree, consuming the lookup.
    ///
    /// Returns `None` for an empty hash.
    pub fn into_tree(self) -> Option<Node> {
        let mut built: Vec<Option<Node>> = Vec::with_capacity(self.slots.len());
        let mut child_ids: Vec<Vec<usize>> = Vec::with_capacity(self.slots.len());
        for slot in self.slots {
            built.push(Some(slot.node));
            child_ids.push(slot.children);
        }

        // Children always have larger ids than their parent.
        for id in (0..built.len()).rev() {
            let children: Vec<Node> = child_ids[id]
                .iter()
                .filter_map(|&child| built[child].take())
                .collect();
            if let Some(node) = built[id].as_mut() {
                node.children = children;
            }
        }
        built.into_iter().next().flatten()
    }
}

/// Assembles regulation trees from labelled nodes.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    hash: TreeHash,
}

impl TreeBuilder {
    /// Seed the builder with an existing tree, e.g. an older version that
    /// change-record nodes will be attached to.
    ///
    /// # Errors
    ///
    /// [`EngineError::DuplicateLabel`] if the tree repeats an id.
    pub fn from_tree(tree: Node) -> Result<Self> {
        Ok(Self {
            hash: build_tree_hash(tree)?,
        })
    }

    /// Build a rooted tree from an unordered flat collection of nodes.
    ///
    /// # Errors
    ///
    /// - [`EngineError::MalformedLabel`] for any invalid label
    /// - [`EngineError::MissingRoot`] / [`EngineError::MultipleRoots`] unless
    ///   exactly one node is a bare part
    /// - [`EngineError::OrphanNode`] for a node whose parent never appears
    /// - [`EngineError::DuplicateLabel`] for repeated labels
    pub fn build(nodes: Vec<Node>) -> Result<Node> {
        let mut root: Option<Node> = None;
        let mut rest = Vec::with_capacity(nodes.len());
        for mut node in nodes {
            node.normalize()?;
            if node.label.len() > 1 {
                rest.push(node);
                continue;
            }
            if let Some(existing) = &root {
                return Err(EngineError::MultipleRoots {
                    first: existing.label_id.clone(),
                    second: node.label_id,
                });
            }
            root = Some(node);
        }

        let root = root.ok_or(EngineError::MissingRoot)?;
        let mut builder = Self::from_tree(root)?;
        builder.extend(rest)?;
        builder.finish().ok_or(EngineError::MissingRoot)
    }

    /// Place `nodes` under their structural parents.
    ///
    /// Nodes whose parent is not yet registered are deferred and retried
    /// until a full pass makes no progress. Every placement is planned
    /// before the lookup is touched, so on error the builder is unchanged.
    ///
    /// # Errors
    ///
    /// - [`EngineError::OrphanNode`] naming the first node that could not
    ///   be placed
    /// - [`EngineError::DuplicateLabel`] for an id already in the tree or
    ///   repeated among `nodes`
    /// - [`EngineError::MultipleRoots`] for a bare part
    pub fn extend(&mut self, nodes: Vec<Node>) -> Result<()> {
        let mut pending = Vec::with_capacity(nodes.len());
        for mut node in nodes {
            node.normalize()?;
            pending.push(node);
        }
        // Parents always have shorter labels, so this usually places
        // everything in a single pass.
        pending.sort_by_key(|node| node.label.len());

        let plan = self.plan_placement(&pending)?;
        let mut pending: Vec<Option<Node>> = pending.into_iter().map(Some).collect();
        for (index, parent_id) in plan {
            if let Some(node) = pending[index].take() {
                self.hash.add_node(node, &parent_id)?;
            }
        }
        Ok(())
    }

    /// Order in which `pending` can be attached, as `(index, parent id)`
    /// pairs with every parent placed before its children.
    fn plan_placement(&self, pending: &[Node]) -> Result<Vec<(usize, String)>> {
        let mut seen: HashSet<&str> = HashSet::new();
        for node in pending {
            for id in node.walk().map(|n| n.label_id.as_str()) {
                if self.hash.contains(id) || !seen.insert(id) {
                    return Err(EngineError::DuplicateLabel(id.to_string()));
                }
            }
        }

        let mut plan = Vec::with_capacity(pending.len());
        let mut placed: HashSet<&str> = HashSet::new();
        let mut remaining: Vec<usize> = (0..pending.len()).collect();

        while !remaining.is_empty() {
            let before = remaining.len();
            let mut deferred = Vec::new();

            for index in remaining {
                let node = &pending[index];
                let Some(parent) = parent_label(node) else {
                    return Err(EngineError::MultipleRoots {
                        first: self.hash.keys().next().unwrap_or_default().to_string(),
                        second: node.label_id.clone(),
                    });
                };
                let parent_id = markup_id(&parent);
                if self.hash.contains(&parent_id) || placed.contains(parent_id.as_str()) {
                    placed.extend(node.walk().map(|n| n.label_id.as_str()));
                    plan.push((index, parent_id));
                } else {
                    deferred.push(index);
                }
            }

            if deferred.len() == before {
                for &index in &deferred {
                    tracing::warn!(
                        label_id = %pending[index].label_id,
                        "Node has no parent in tree"
                    );
                }
                let orphan = &pending[deferred[0]];
                let parent_id = parent_label(orphan)
                    .map(|p| markup_id(&p))
                    .unwrap_or_default();
                return Err(EngineError::OrphanNode {
                    label_id: orphan.label_id.clone(),
                    parent_id,
                });
            }
            if !deferred.is_empty() {
                tracing::debug!(deferred = deferred.len(), "Retrying deferred nodes");
            }
            remaining = deferred;
        }
        Ok(plan)
    }

    pub fn tree_hash(&self) -> &TreeHash {
        &self.hash
    }

    /// Return the assembled tree, dropping the lookup.
    pub fn finish(self) -> Option<Node> {
        self.hash.into_tree()
    }
}
