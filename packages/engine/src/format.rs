//! Label rendering
//!
//! Two renderings of a [`Label`]:
//!
//! - a markup id, safe for use as an HTML fragment identifier
//!   (`["243", "A", "30(a)"]` → `"243-A-30a"`)
//! - human-readable citation text (`"2323.5(r)(3)"`, `"Appendix A-4(b)(2)"`,
//!   `"Comment for 2323.7(b)-1.v"`)
//!
//! # Examples
//!
//! ```
//! use regsite_engine::format::{label_to_text, markup_id};
//! use regsite_engine::label::Label;
//!
//! assert_eq!(markup_id(&Label::from(["243", "A", "30(a)"])), "243-A-30a");
//!
//! let text = label_to_text(&Label::from(["2323", "1"]), true, true).unwrap();
//! assert_eq!(text, "§ 2323.1");
//! ```

use crate::error::Result;
use crate::label::Label;
use crate::node_type::Citation;

/// Section symbol used for section headers.
pub const SECTION_SYMBOL: &str = "§";

/// Options for [`label_to_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelTextOptions {
    /// Prefix section citations with `"{part}."`
    pub include_section: bool,
    /// Prefix section citations with the section symbol
    pub is_section_header: bool,
}

impl Default for LabelTextOptions {
    fn default() -> Self {
        Self {
            include_section: true,
            is_section_header: false,
        }
    }
}

/// Strip characters that are not valid in a fragment identifier.
///
/// Letters and digits (any script), `_`, `.` and `:` survive; grouping
/// parentheses in combined segments such as `"30(a)"` are removed.
pub fn to_markup_id(label: &Label) -> Vec<String> {
    label
        .segments()
        .iter()
        .map(|segment| segment.chars().filter(|c| is_fragment_char(*c)).collect())
        .collect()
}

fn is_fragment_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | ':')
}

/// [`to_markup_id`] joined with `-`.
pub fn markup_id(label: &Label) -> String {
    to_markup_id(label).join("-")
}

/// Render the top-level part number.
///
/// Pass-through today; the hook exists for jurisdictions that number parts
/// differently from their storage keys.
pub fn transform_part(part: &str) -> String {
    part.to_string()
}

/// Render a label as citation text.
///
/// # Errors
///
/// Returns [`crate::EngineError::MalformedLabel`] if the label fails
/// validation.
pub fn label_to_text(
    label: &Label,
    include_section: bool,
    is_section_header: bool,
) -> Result<String> {
    label_to_text_with(
        label,
        LabelTextOptions {
            include_section,
            is_section_header,
        },
    )
}

/// [`label_to_text`] taking an options struct.
pub fn label_to_text_with(label: &Label, options: LabelTextOptions) -> Result<String> {
    let citation = Citation::parse(label)?;
    Ok(citation_text(&citation, options))
}

/// Render an already-parsed citation.
pub fn citation_text(citation: &Citation<'_>, options: LabelTextOptions) -> String {
    match citation {
        Citation::Part { part } | Citation::EmptyPart { part } => {
            format!("Regulation {}", transform_part(part))
        }
        Citation::Section {
            part,
            section,
            paragraphs,
        } => {
            let mut text = if options.include_section {
                format!("{}.{}", transform_part(part), section)
            } else {
                (*section).to_string()
            };
            push_paragraphs(&mut text, paragraphs);
            if options.is_section_header {
                format!("{SECTION_SYMBOL} {text}")
            } else {
                text
            }
        }
        Citation::Appendix { appendix, rest, .. } => match rest.split_first() {
            None => format!("Appendix {appendix}"),
            Some((first, paragraphs)) => {
                let mut text = format!("Appendix {appendix}-{first}");
                push_paragraphs(&mut text, paragraphs);
                text
            }
        },
        Citation::Subpart { letter, .. } => format!("Subpart {letter}"),
        Citation::Interp { target, comment } => {
            let mut text = match target.as_ref() {
                Citation::Part { part } => {
                    format!("Supplement I to Part {}", transform_part(part))
                }
                other => {
                    let target_options = LabelTextOptions {
                        is_section_header: false,
                        ..options
                    };
                    format!("Comment for {}", citation_text(other, target_options))
                }
            };
            if !comment.is_empty() {
                text.push('-');
                text.push_str(&comment.join("."));
            }
            text
        }
    }
}

fn push_paragraphs(text: &mut String, paragraphs: &[String]) {
    for paragraph in paragraphs {
        text.push('(');
        text.push_str(paragraph);
        text.push(')');
    }
}
