//! Label classification
//!
//! Maps a [`Label`] to the structural kind of node it names. Classification
//! looks only at the label's segments:
//!
//! 1. a single segment is the regulation part itself ([`NodeType::RegText`])
//! 2. any [`INTERP`] marker makes it an interpretation ([`NodeType::Interp`])
//! 3. [`SUBPART`] in position 1 is a subpart, or the ungrouped placeholder when
//!    no letter follows
//! 4. an upper-case letter in position 1 roots an appendix
//! 5. everything else is ordinary regulation text
//!
//! [`Citation`] carries the same decision together with the pieces each kind
//! needs for rendering, so callers can match exhaustively instead of
//! re-deriving positions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::label::{Label, INTERP, SUBPART};

/// Structural kind of a regulation node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Ordinary regulation text
    RegText,
    /// Appendix-rooted node
    Appendix,
    /// Interpretation (commentary) node
    Interp,
    /// Named subpart grouping
    Subpart,
    /// Placeholder grouping for sections outside any subpart
    EmptyPart,
}

impl NodeType {
    /// Classify a label.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::MalformedLabel`] if the label fails
    /// [`Label::validate`].
    pub fn classify(label: &Label) -> Result<NodeType> {
        Ok(Citation::parse(label)?.node_type())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::RegText => "regtext",
            NodeType::Appendix => "appendix",
            NodeType::Interp => "interp",
            NodeType::Subpart => "subpart",
            NodeType::EmptyPart => "emptypart",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A label decomposed according to its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Citation<'a> {
    /// Bare part, e.g. `["204"]`
    Part { part: &'a str },
    /// Section and paragraphs, e.g. `["204", "5", "r", "3"]`
    Section {
        part: &'a str,
        section: &'a str,
        paragraphs: &'a [String],
    },
    /// Appendix, e.g. `["204", "A", "4", "b"]`
    Appendix {
        part: &'a str,
        appendix: &'a str,
        rest: &'a [String],
    },
    /// Subpart, e.g. `["204", "Subpart", "C"]`
    Subpart { part: &'a str, letter: &'a str },
    /// Ungrouped-sections placeholder, e.g. `["204", "Subpart"]`
    EmptyPart { part: &'a str },
    /// Interpretation of `target`, with comment numbering after the marker
    Interp {
        target: Box<Citation<'a>>,
        comment: &'a [String],
    },
}

impl<'a> Citation<'a> {
    /// Validate and decompose a label.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::MalformedLabel`] if the label fails
    /// [`Label::validate`].
    pub fn parse(label: &'a Label) -> Result<Citation<'a>> {
        label.validate()?;
        Ok(Self::from_segments(label.segments()))
    }

    /// Decompose segments that have already been validated.
    fn from_segments(segments: &'a [String]) -> Citation<'a> {
        let part = segments[0].as_str();
        if segments.len() == 1 {
            return Citation::Part { part };
        }

        if let Some(pos) = segments.iter().position(|s| s == INTERP) {
            return Citation::Interp {
                target: Box::new(Self::from_segments(&segments[..pos])),
                comment: &segments[pos + 1..],
            };
        }

        let second = segments[1].as_str();
        if second == SUBPART {
            return match segments.get(2) {
                Some(letter) => Citation::Subpart {
                    part,
                    letter: letter.as_str(),
                },
                None => Citation::EmptyPart { part },
            };
        }

        if is_appendix_segment(second) {
            return Citation::Appendix {
                part,
                appendix: second,
                rest: &segments[2..],
            };
        }

        Citation::Section {
            part,
            section: second,
            paragraphs: &segments[2..],
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Citation::Part { .. } | Citation::Section { .. } => NodeType::RegText,
            Citation::Appendix { .. } => NodeType::Appendix,
            Citation::Subpart { .. } => NodeType::Subpart,
            Citation::EmptyPart { .. } => NodeType::EmptyPart,
            Citation::Interp { .. } => NodeType::Interp,
        }
    }

    pub fn part(&self) -> &'a str {
        match self {
            Citation::Part { part }
            | Citation::Section { part, .. }
            | Citation::Appendix { part, .. }
            | Citation::Subpart { part, .. }
            | Citation::EmptyPart { part } => part,
            Citation::Interp { target, .. } => target.part(),
        }
    }
}

/// Appendix keys start with an upper-case ASCII letter (`A`, `B`, `MS`).
fn is_appendix_segment(segment: &str) -> bool {
    segment.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}
