//! Fixture loader for BDD tests
//!
//! Loads regulation trees and change sets from the project-level
//! `fixtures/` directory.

use regsite_engine::{ChangeSet, EngineError, Node};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Path of the `fixtures/` directory at the project root.
pub fn fixtures_dir() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir)
        .parent() // packages/
        .and_then(|p| p.parent()) // project root
        .map(|p| p.join("fixtures"))
        .expect("Could not find fixtures directory")
}

/// Load every regulation tree under `fixtures/regulation`, keyed by part.
pub fn load_all_trees() -> Result<HashMap<String, Node>, EngineError> {
    let regulation_dir = fixtures_dir().join("regulation");
    let mut trees = HashMap::new();

    for entry in WalkDir::new(&regulation_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "yaml") {
            let tree = Node::from_file(path)?;
            tracing::debug!(part = %tree.label_id, path = %path.display(), "Loaded tree");
            trees.insert(tree.label_id.clone(), tree);
        }
    }

    tracing::info!(count = trees.len(), "Loaded regulation trees");
    Ok(trees)
}

/// Load `fixtures/changes/{name}.json`.
pub fn load_change_set(name: &str) -> Result<ChangeSet, EngineError> {
    let path = fixtures_dir().join("changes").join(format!("{name}.json"));
    let content = std::fs::read_to_string(&path)?;
    ChangeSet::from_json_str(&content)
}
