//! Console display width.
//!
//! Based on Markus Kuhn's `wcwidth`: a glyph is two columns if its base
//! character falls in an East-Asian wide or fullwidth range and one column
//! otherwise. Combining marks are already folded into their glyph and add
//! nothing.

use std::sync::LazyLock;

use regex::Regex;

use crate::codec;
use crate::segment::{self, Glyph};

/// Width of East-Asian ambiguous characters. They are treated like any
/// other narrow character.
pub const AMBIGUOUS_WIDTH: usize = 1;

const WIDE_WIDTH: usize = 2;

/// Ranges whose characters occupy two columns.
const WIDE_RANGES: [(u32, u32); 13] = [
    (0x1100, 0x115F), // Hangul Jamo initial consonants
    (0x2329, 0x2329),
    (0x232A, 0x232A),
    (0x2E80, 0x303E), // CJK ... Yi, minus U+303F
    (0x3040, 0xA4CF),
    (0xAC00, 0xD7A3), // Hangul Syllables
    (0xF900, 0xFAFF), // CJK Compatibility Ideographs
    (0xFE10, 0xFE19), // Vertical forms
    (0xFE30, 0xFE6F), // CJK Compatibility Forms
    (0xFF00, 0xFF60), // Fullwidth Forms
    (0xFFE0, 0xFFE6),
    (0x20000, 0x2FFFD),
    (0x30000, 0x3FFFD),
];

static SGR_ESCAPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\x1B\[\d*m").unwrap());

pub fn is_wide(codepoint: u32) -> bool {
    WIDE_RANGES
        .iter()
        .any(|&(lo, hi)| (lo..=hi).contains(&codepoint))
}

/// Columns taken by one glyph, decided by its base character.
pub fn glyph_width(glyph: &Glyph<'_>) -> usize {
    match glyph.base().codepoint() {
        0 => 0,
        cp if is_wide(cp) => WIDE_WIDTH,
        _ => AMBIGUOUS_WIDTH,
    }
}

/// Remove ANSI SGR color/format escapes (`ESC [ digits m`).
pub fn strip_sgr(text: &str) -> std::borrow::Cow<'_, str> {
    SGR_ESCAPE.replace_all(text, "")
}

/// Number of console columns needed to show `text`.
///
/// Color and format escapes take no space. This segments the whole string,
/// so it is slow on large inputs.
pub fn display_width(text: &str) -> usize {
    let text = strip_sgr(text);
    if text.bytes().all(|b| (0x01..=0x7F).contains(&b)) {
        return text.len();
    }
    segment::glyphs(&text).iter().map(glyph_width).sum()
}

/// Number of scalar values in `text`, counting combining marks separately.
pub fn character_length(text: &str) -> usize {
    codec::sequences(text).count()
}
