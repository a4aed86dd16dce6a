//! When step definitions
//!
//! Steps that perform actions (rendering, building, merging).

use cucumber::when;
use regsite_engine::{
    diff_toc, footer_nav, label_to_text, table_of_contents, DiffOp, Label, TreeBuilder,
};

use crate::world::RegsiteWorld;

// =============================================================================
// Label text steps
// =============================================================================

fn render(world: &mut RegsiteWorld, label: &str, include_section: bool, is_section_header: bool) {
    let label = Label::from_id(label);
    let text = world.record(label_to_text(&label, include_section, is_section_header));
    world.text = text;
}

#[when(expr = "the label {string} is rendered")]
fn render_label(world: &mut RegsiteWorld, label: String) {
    render(world, &label, true, false);
}

#[when(expr = "the label {string} is rendered as a section header")]
fn render_section_header(world: &mut RegsiteWorld, label: String) {
    render(world, &label, true, true);
}

#[when(expr = "the label {string} is rendered without its part")]
fn render_without_part(world: &mut RegsiteWorld, label: String) {
    render(world, &label, false, false);
}

// =============================================================================
// Tree building steps
// =============================================================================

#[when("the tree is built")]
fn build_tree(world: &mut RegsiteWorld) {
    let nodes = std::mem::take(&mut world.nodes);
    let tree = world.record(TreeBuilder::build(nodes));
    world.tree = tree;
}

#[when("the added sections are attached to the tree")]
fn attach_added_sections(world: &mut RegsiteWorld) {
    let added: Vec<_> = world
        .changes
        .iter()
        .filter(|(_, record)| record.op == DiffOp::Added)
        .filter_map(|(_, record)| record.node.clone())
        .collect();

    let seeded = TreeBuilder::from_tree(world.tree().clone());
    let Some(mut builder) = world.record(seeded) else {
        return;
    };
    if world.record(builder.extend(added)).is_some() {
        world.tree = builder.finish();
    }
}

// =============================================================================
// Diff TOC steps
// =============================================================================

fn merge_toc(world: &mut RegsiteWorld) {
    let toc = table_of_contents(world.tree());
    world.merged = diff_toc(&world.ctx, &toc, &world.changes);
}

#[when("the table of contents is merged with the changes")]
fn merge_with_changes(world: &mut RegsiteWorld) {
    merge_toc(world);
}

#[when(expr = "the footer navigation for {string} is built")]
fn build_footer_nav(world: &mut RegsiteWorld, current: String) {
    if world.merged.is_empty() {
        merge_toc(world);
    }
    world.nav = Some(footer_nav(&current, &world.merged, &world.ctx));
}
