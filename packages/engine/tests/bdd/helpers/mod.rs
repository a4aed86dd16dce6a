//! Shared helpers for the BDD runner

pub mod fixtures;
