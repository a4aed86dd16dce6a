//! Configuration constants for the regsite engine
//!
//! Centralized values used by the tree builder and the diff view:
//! - Bounds on roman-numeral scanning and label depth
//! - URL layout for section diff links
//!
//! Currently these are compile-time constants. Per-call settings live in
//! plain option structs ([`crate::format::LabelTextOptions`],
//! [`crate::diff::DiffContext`]).

/// Largest value the roman-numeral sequence is scanned up to.
///
/// Sibling sets are tested for roman keys by walking [`crate::roman::roman_nums`]
/// lazily; this caps the walk for segments that only look roman (`"mmmmm"`).
/// 3999 is the largest value expressible in standard notation.
pub const MAX_ROMAN_VALUE: u32 = 3_999;

/// Maximum number of segments in a label.
///
/// CFR citations rarely exceed eight levels (part, section, four paragraph
/// levels, Interp marker, comment numbers). 32 leaves ample headroom while
/// bounding recursion when rebuilding trees.
pub const MAX_TREE_DEPTH: usize = 32;

/// Path prefix of the section diff view.
pub const DIFF_URL_PREFIX: &str = "/diff";

/// Query parameter carrying the version a reader navigated from.
pub const FROM_VERSION_PARAM: &str = "from_version";
