//! Lower-case roman numerals
//!
//! Fourth-level CFR paragraphs are numbered `i, ii, iii, iv, ...`. Sorting
//! those lexicographically puts `ix` before `v`, so the tree builder needs to
//! recognise roman sibling sets and compare them by value.
//!
//! # Examples
//!
//! ```
//! use regsite_engine::roman::{parse_roman, roman_nums};
//!
//! let first: Vec<String> = roman_nums().take(5).collect();
//! assert_eq!(first, ["i", "ii", "iii", "iv", "v"]);
//! assert_eq!(parse_roman("xiv"), Some(14));
//! ```

use std::collections::HashSet;

use crate::config::MAX_ROMAN_VALUE;

const NUMERALS: [(u32, &str); 13] = [
    (1000, "m"),
    (900, "cm"),
    (500, "d"),
    (400, "cd"),
    (100, "c"),
    (90, "xc"),
    (50, "l"),
    (40, "xl"),
    (10, "x"),
    (9, "ix"),
    (5, "v"),
    (4, "iv"),
    (1, "i"),
];

/// Render a positive integer as a lower-case roman numeral.
pub fn to_roman(mut value: u32) -> String {
    let mut out = String::new();
    for (amount, chars) in NUMERALS {
        while value >= amount {
            out.push_str(chars);
            value -= amount;
        }
    }
    out
}

/// Lazy, unbounded sequence of lower-case roman numerals.
///
/// Every call to [`roman_nums`] starts a fresh sequence at `"i"`.
#[derive(Debug, Clone)]
pub struct RomanNumerals {
    next: u32,
}

impl Iterator for RomanNumerals {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let value = self.next;
        self.next = self.next.checked_add(1)?;
        Some(to_roman(value))
    }
}

/// Start a new roman-numeral sequence: `i, ii, iii, iv, v, ...`
pub fn roman_nums() -> RomanNumerals {
    RomanNumerals { next: 1 }
}

fn looks_roman(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| matches!(c, 'i' | 'v' | 'x' | 'l' | 'c' | 'd' | 'm'))
}

/// Parse a canonical lower-case roman numeral.
///
/// Returns `None` for anything that does not round-trip through
/// [`to_roman`] (e.g. `"iiii"`, `"vx"`, upper case) or exceeds
/// [`MAX_ROMAN_VALUE`].
pub fn parse_roman(segment: &str) -> Option<u32> {
    if !looks_roman(segment) {
        return None;
    }

    let mut rest = segment;
    let mut value = 0u32;
    for (amount, chars) in NUMERALS {
        while let Some(stripped) = rest.strip_prefix(chars) {
            value += amount;
            rest = stripped;
        }
    }

    if !rest.is_empty() || value == 0 || value > MAX_ROMAN_VALUE || to_roman(value) != segment {
        return None;
    }
    Some(value)
}

/// Whether every segment appears in the roman-numeral sequence.
///
/// Walks [`roman_nums`] only as far as needed to find each segment, so small
/// sibling sets (`{iv, v, ix}`) stop after a handful of numerals.
pub fn all_roman<'a, I>(segments: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let mut wanted: HashSet<&str> = HashSet::new();
    for segment in segments {
        if !looks_roman(segment) {
            return false;
        }
        wanted.insert(segment);
    }
    if wanted.is_empty() {
        return false;
    }

    for numeral in roman_nums().take(MAX_ROMAN_VALUE as usize) {
        wanted.remove(numeral.as_str());
        if wanted.is_empty() {
            return true;
        }
    }
    false
}
