//! Then step definitions
//!
//! Steps that verify outcomes and assertions.

use cucumber::{gherkin::Step, then};
use regsite_engine::{EngineError, FooterNav, Label, NodeType};

use crate::world::RegsiteWorld;

// =============================================================================
// Label text steps
// =============================================================================

#[then(expr = "the citation text is {string}")]
fn assert_citation_text(world: &mut RegsiteWorld, expected: String) {
    assert_eq!(
        world.text.as_deref(),
        Some(expected.as_str()),
        "Unexpected citation text (error: {:?})",
        world.error_message()
    );
}

#[then(expr = "the label {string} is classified as {string}")]
fn assert_classification(_world: &mut RegsiteWorld, label: String, expected: String) {
    let node_type = NodeType::classify(&Label::from_id(&label))
        .unwrap_or_else(|e| panic!("Failed to classify {}: {}", label, e));
    assert_eq!(node_type.as_str(), expected);
}

#[then("rendering fails with a malformed label error")]
fn assert_rendering_failed(world: &mut RegsiteWorld) {
    assert!(
        matches!(world.error, Some(EngineError::MalformedLabel { .. })),
        "Expected a malformed label error, got {:?}",
        world.error_message()
    );
}

// =============================================================================
// Tree building steps
// =============================================================================

#[then(expr = "the children of {string} are {string}")]
fn assert_children(world: &mut RegsiteWorld, parent: String, expected: String) {
    let Some(node) = world.tree().find(&parent) else {
        panic!("Node {} not found in tree", parent);
    };
    let actual: Vec<&str> = node.children.iter().map(|c| c.label_id.as_str()).collect();
    let expected: Vec<&str> = expected.split(',').map(str::trim).collect();
    assert_eq!(actual, expected, "Unexpected children of {}", parent);
}

#[then(
    regex = r"^the build fails with an? (orphan node|missing root|multiple roots|malformed label|duplicate label) error$"
)]
fn assert_build_failed(world: &mut RegsiteWorld, kind: String) {
    let matched = match (kind.as_str(), &world.error) {
        ("orphan node", Some(EngineError::OrphanNode { .. })) => true,
        ("missing root", Some(EngineError::MissingRoot)) => true,
        ("multiple roots", Some(EngineError::MultipleRoots { .. })) => true,
        ("malformed label", Some(EngineError::MalformedLabel { .. })) => true,
        ("duplicate label", Some(EngineError::DuplicateLabel(_))) => true,
        _ => false,
    };
    assert!(
        matched,
        "Expected a {} error, got {:?}",
        kind,
        world.error_message()
    );
    assert!(world.tree.is_none(), "No tree should have been built");
}

// =============================================================================
// Diff TOC steps
// =============================================================================

/// Table columns: `section_id` and `op` (empty for unchanged entries).
#[then("the merged table of contents is:")]
fn assert_merged_toc(world: &mut RegsiteWorld, step: &Step) {
    let Some(table) = &step.table else {
        panic!("Step requires a table");
    };
    let expected: Vec<(String, String)> = table
        .rows
        .iter()
        .skip(1)
        .map(|row| (row[0].clone(), row.get(1).cloned().unwrap_or_default()))
        .collect();
    let actual: Vec<(String, String)> = world
        .merged
        .iter()
        .map(|entry| {
            let op = entry.op.map(|op| op.to_string()).unwrap_or_default();
            (entry.section_id.clone(), op)
        })
        .collect();
    assert_eq!(actual, expected);
}

#[then("every merged entry links to its diff view")]
fn assert_entry_urls(world: &mut RegsiteWorld) {
    for entry in &world.merged {
        assert_eq!(
            entry.url.as_deref(),
            Some(world.ctx.url(&entry.section_id).as_str()),
            "Unexpected URL for {}",
            entry.section_id
        );
    }
}

fn nav(world: &RegsiteWorld) -> &FooterNav {
    match &world.nav {
        Some(nav) => nav,
        None => panic!("No footer navigation was built"),
    }
}

#[then(expr = "the previous link points to {string}")]
fn assert_previous(world: &mut RegsiteWorld, section_id: String) {
    let previous = nav(world).previous.as_ref().map(|l| l.section_id.as_str());
    assert_eq!(previous, Some(section_id.as_str()));
}

#[then(expr = "the next link points to {string}")]
fn assert_next(world: &mut RegsiteWorld, section_id: String) {
    let next = nav(world).next.as_ref().map(|l| l.section_id.as_str());
    assert_eq!(next, Some(section_id.as_str()));
}

#[then("there is no previous link")]
fn assert_no_previous(world: &mut RegsiteWorld) {
    assert!(nav(world).previous.is_none());
}

#[then("there is no next link")]
fn assert_no_next(world: &mut RegsiteWorld) {
    assert!(nav(world).next.is_none());
}

#[then("there is no footer navigation")]
fn assert_no_nav(world: &mut RegsiteWorld) {
    assert!(nav(world).is_empty());
}

#[then(expr = "every link carries the {string} parameter")]
fn assert_links_carry_param(world: &mut RegsiteWorld, param: String) {
    let nav = nav(world);
    let needle = format!("?{}={}", param, world.ctx.from_version);
    for link in nav.previous.iter().chain(nav.next.iter()) {
        assert!(
            link.url.ends_with(&needle),
            "Link {} lacks {}",
            link.url,
            needle
        );
    }
}
