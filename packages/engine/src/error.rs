//! Error types for the regsite engine

use thiserror::Error;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Label is empty or has a segment that fits no recognised shape
    #[error("Malformed label '{label}': {reason}")]
    MalformedLabel { label: String, reason: String },

    /// Node whose structural parent never appears in the tree being assembled
    #[error("Orphan node {label_id}: parent {parent_id} not found")]
    OrphanNode { label_id: String, parent_id: String },

    /// Two nodes share the same markup id
    #[error("Duplicate label: {0}")]
    DuplicateLabel(String),

    /// Flat node list contains no single-segment root
    #[error("No root node found (expected a single-segment part label)")]
    MissingRoot,

    /// Flat node list contains more than one single-segment root
    #[error("Multiple root nodes: {first} and {second}")]
    MultipleRoots { first: String, second: String },

    /// Change record with an unknown op or a missing payload
    #[error("Malformed change record for {label_id}: {reason}")]
    MalformedChangeRecord { label_id: String, reason: String },

    /// YAML parsing error
    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl EngineError {
    /// Build a [`EngineError::MalformedLabel`] from any label rendering.
    pub fn malformed_label(label: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::MalformedLabel {
            label: label.into(),
            reason: reason.into(),
        }
    }

    /// Whether the caller should render a "content unavailable" page.
    ///
    /// Data-integrity conditions from the upstream content source fall in
    /// this bucket; loader failures (IO, parse) do not.
    pub fn is_content_error(&self) -> bool {
        matches!(
            self,
            EngineError::MalformedLabel { .. }
                | EngineError::OrphanNode { .. }
                | EngineError::DuplicateLabel(_)
                | EngineError::MissingRoot
                | EngineError::MultipleRoots { .. }
                | EngineError::MalformedChangeRecord { .. }
        )
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
