//! Regulation citation labels
//!
//! A [`Label`] is the path from a regulation's part number down to the most
//! specific cited unit, e.g. `["243", "5", "b", "Interp", "1"]`. Segments are
//! opaque strings; meaning is derived positionally and from two reserved
//! markers:
//!
//! - [`SUBPART`] in position 1 introduces a subpart grouping
//! - [`INTERP`] anywhere past position 0 marks official interpretation
//!
//! # Examples
//!
//! ```
//! use regsite_engine::label::Label;
//!
//! let label = Label::from_id("243-5-b-Interp-1");
//! assert_eq!(label.len(), 5);
//! assert_eq!(label.part(), Some("243"));
//! assert_eq!(label.interp_index(), Some(3));
//! assert_eq!(label.to_string(), "243-5-b-Interp-1");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::MAX_TREE_DEPTH;
use crate::error::{EngineError, Result};

/// Reserved segment marking an interpretation (commentary) node.
pub const INTERP: &str = "Interp";

/// Reserved segment marking a subpart grouping.
pub const SUBPART: &str = "Subpart";

/// Separator used when joining segments into an id.
pub const SEPARATOR: char = '-';

/// Ordered sequence of citation segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(Vec<String>);

impl Label {
    /// Create a label from any sequence of segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Split a `-`-joined id (as used for change-record keys) into a label.
    pub fn from_id(id: &str) -> Self {
        if id.is_empty() {
            return Self::default();
        }
        Self::new(id.split(SEPARATOR))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// The regulation part number (first segment).
    pub fn part(&self) -> Option<&str> {
        self.get(0)
    }

    /// Position of the [`INTERP`] marker, if present.
    pub fn interp_index(&self) -> Option<usize> {
        self.0.iter().position(|s| s == INTERP)
    }

    pub fn contains(&self, segment: &str) -> bool {
        self.0.iter().any(|s| s == segment)
    }

    /// The final segment that carries ordering information.
    ///
    /// For labels ending in the interpretation marker this is the segment
    /// before it (`["204", "4", "Interp"]` sorts as `"4"`).
    pub fn sort_segment(&self) -> Option<&str> {
        match self.0.as_slice() {
            [.., prev, last] if last == INTERP => Some(prev.as_str()),
            [.., last] => Some(last.as_str()),
            [] => None,
        }
    }

    /// Copy of the first `len` segments.
    pub fn truncated(&self, len: usize) -> Label {
        Label(self.0.iter().take(len).cloned().collect())
    }

    /// Copy of this label with `segment` appended.
    pub fn child(&self, segment: impl Into<String>) -> Label {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Label(segments)
    }

    /// Copy of this label without its last segment.
    pub fn without_last(&self) -> Label {
        self.truncated(self.len().saturating_sub(1))
    }

    /// Raw `-`-joined rendering, without stripping markup-unsafe characters.
    pub fn id(&self) -> String {
        self.0.join("-")
    }

    /// Check that this label has a recognised shape.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MalformedLabel`] when the label is empty, too
    /// deep, has an empty segment or one containing `-` or whitespace, or
    /// misuses the reserved [`INTERP`]/[`SUBPART`] markers.
    pub fn validate(&self) -> Result<()> {
        let malformed = |reason: &str| Err(EngineError::malformed_label(self.id(), reason));

        if self.0.is_empty() {
            return malformed("label has no segments");
        }
        if self.0.len() > MAX_TREE_DEPTH {
            return malformed(&format!("more than {MAX_TREE_DEPTH} segments"));
        }
        for segment in &self.0 {
            if segment.is_empty() {
                return malformed("empty segment");
            }
            if segment.contains(SEPARATOR) || segment.chars().any(char::is_whitespace) {
                return malformed(&format!("segment '{segment}' contains a separator"));
            }
        }
        if self.0.len() == 1 {
            return Ok(());
        }

        let interps = self.0.iter().filter(|s| *s == INTERP).count();
        if interps > 1 {
            return malformed("more than one Interp marker");
        }
        if self.0[0] == INTERP || self.0[0] == SUBPART {
            return malformed("reserved marker in part position");
        }

        if let Some(pos) = self.0.iter().position(|s| s == SUBPART) {
            if interps > 0 {
                return malformed("both Subpart and Interp markers");
            }
            if pos != 1 {
                return malformed("Subpart marker outside position 1");
            }
            if self.0.len() > 3 {
                return malformed("Subpart label has more than one letter");
            }
        }
        Ok(())
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl<S: Into<String>> From<Vec<S>> for Label {
    fn from(segments: Vec<S>) -> Self {
        Self::new(segments)
    }
}

impl From<&[&str]> for Label {
    fn from(segments: &[&str]) -> Self {
        Self::new(segments.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for Label {
    fn from(segments: [&str; N]) -> Self {
        Self::new(segments)
    }
}
