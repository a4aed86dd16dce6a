//! World struct for Cucumber BDD tests
//!
//! Contains the test state that persists across steps in a scenario.

use cucumber::World;
use regsite_engine::{ChangeSet, DiffContext, EngineError, FooterNav, Node, TocEntry};
use std::collections::HashMap;
use std::fmt;

use crate::helpers::fixtures::load_all_trees;

/// Test world that holds state across steps in a Cucumber scenario.
#[derive(World)]
#[world(init = Self::new)]
pub struct RegsiteWorld {
    /// Fixture trees keyed by part
    pub trees: HashMap<String, Node>,
    /// Flat nodes waiting to be assembled
    pub nodes: Vec<Node>,
    /// Tree under test (loaded or built)
    pub tree: Option<Node>,
    pub changes: ChangeSet,
    pub ctx: DiffContext,
    /// Last merged table of contents
    pub merged: Vec<TocEntry>,
    pub nav: Option<FooterNav>,
    /// Last rendered citation text
    pub text: Option<String>,
    /// Last error (if an operation failed)
    pub error: Option<EngineError>,
}

impl fmt::Debug for RegsiteWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegsiteWorld")
            .field("trees", &format!("<{} trees loaded>", self.trees.len()))
            .field("nodes", &self.nodes.len())
            .field("tree", &self.tree.as_ref().map(|t| t.label_id.as_str()))
            .field("changes", &self.changes.len())
            .field("ctx", &self.ctx)
            .field("merged", &self.merged.len())
            .field("nav", &self.nav)
            .field("text", &self.text)
            .field("error", &self.error.as_ref().map(|e| e.to_string()))
            .finish()
    }
}

impl Default for RegsiteWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl RegsiteWorld {
    /// Create a new world with all fixture trees loaded.
    pub fn new() -> Self {
        let trees = match load_all_trees() {
            Ok(trees) => trees,
            Err(e) => panic!("Failed to load fixture trees: {}", e),
        };

        Self {
            trees,
            nodes: Vec::new(),
            tree: None,
            changes: ChangeSet::new(),
            ctx: DiffContext::default(),
            merged: Vec::new(),
            nav: None,
            text: None,
            error: None,
        }
    }

    /// Store the outcome of a fallible operation.
    pub fn record<T>(&mut self, result: Result<T, EngineError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.error = None;
                Some(value)
            }
            Err(e) => {
                self.error = Some(e);
                None
            }
        }
    }

    /// Tree under test; panics when no step produced one.
    pub fn tree(&self) -> &Node {
        match &self.tree {
            Some(tree) => tree,
            None => panic!("No tree in scenario (error: {:?})", self.error_message()),
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::RegsiteWorld;

    #[test]
    fn test_world_initialization() {
        let world = RegsiteWorld::new();
        assert!(
            world.trees.contains_key("8888"),
            "Expected the 8888 fixture tree to be loaded"
        );
    }
}
