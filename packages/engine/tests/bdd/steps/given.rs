//! Given step definitions
//!
//! Steps that set up the initial state for scenarios.

use cucumber::{gherkin::Step, given};
use regsite_engine::{DiffContext, Label, Node};

use crate::helpers::fixtures::{fixtures_dir, load_change_set};
use crate::world::RegsiteWorld;

// =============================================================================
// Fixture steps
// =============================================================================

#[given(expr = "the regulation tree {string}")]
fn load_regulation_tree(world: &mut RegsiteWorld, part: String) {
    let Some(tree) = world.trees.get(&part) else {
        panic!("No fixture tree for part {}", part);
    };
    world.tree = Some(tree.clone());
}

#[given(expr = "the change set {string}")]
fn load_changes(world: &mut RegsiteWorld, name: String) {
    world.changes = match load_change_set(&name) {
        Ok(changes) => changes,
        Err(e) => panic!("Failed to load change set {}: {}", name, e),
    };
}

#[given(expr = "the flat node fixture {string}")]
fn load_flat_nodes(world: &mut RegsiteWorld, name: String) {
    let path = fixtures_dir().join("nodes").join(format!("{name}.json"));
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    world.nodes = serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e));
}

#[given(expr = "comparing version {string} to {string} from {string}")]
fn set_versions(world: &mut RegsiteWorld, old: String, new: String, from: String) {
    world.ctx = DiffContext::new(old, new, from);
}

// =============================================================================
// Tree building steps
// =============================================================================

/// Table columns: `label` (label id) and an optional `title`.
///
/// Labels are not validated here so that malformed input reaches the builder.
#[given("the following nodes:")]
fn set_nodes(world: &mut RegsiteWorld, step: &Step) {
    let Some(table) = &step.table else {
        panic!("Step requires a table");
    };
    world.nodes = table
        .rows
        .iter()
        .skip(1)
        .map(|row| {
            let mut node = Node {
                label: Label::from_id(&row[0]),
                ..Node::placeholder()
            };
            node.title = row.get(1).filter(|title| !title.is_empty()).cloned();
            node
        })
        .collect();
}
