//! Summary truncation that respects glyphs and prefers word boundaries.

use std::borrow::Cow;

use crate::segment::{self, Glyph};
use crate::width::character_length;

/// Default terminal appended to shortened text (U+2026).
pub const ELLIPSIS: &str = "\u{2026}";

/// Break here and append the terminal.
const BREAK_CHARACTERS: &[u8] = b" \n;:[(,-";

/// Cut right after these, without a terminal.
const STOP_CHARACTERS: &[u8] = b".!?";

fn is_one_of(glyph: &Glyph<'_>, set: &[u8]) -> bool {
    glyph.single_byte().is_some_and(|b| set.contains(&b))
}

/// Shorten `text` to at most `max_len` glyphs, appending `terminal` when the
/// cut is not at a sentence stop.
///
/// Scanning backward from `max_len`, the first stop character (`. ! ?`) wins
/// and the text is cut just after it. Otherwise the earliest break character
/// of the run nearest the limit is used, as long as the terminal still fits
/// after it. With no usable boundary the text is cut hard.
///
/// Only reliable for Latin scripts; there is no word-break data for others.
pub fn shorten<'a>(text: &'a str, max_len: usize, terminal: &str) -> Cow<'a, str> {
    if text.len() <= max_len {
        return Cow::Borrowed(text);
    }

    let glyphs = segment::glyphs(text);
    if glyphs.len() <= max_len {
        return Cow::Borrowed(text);
    }

    // When the terminal is longer than the limit this collapses to zero and
    // the result is the terminal alone.
    let terminal_area = max_len - max_len.min(character_length(terminal));

    let mut word_boundary = None;
    let mut stop_boundary = None;
    for ii in (0..=max_len).rev() {
        let glyph = &glyphs[ii];
        if is_one_of(glyph, BREAK_CHARACTERS) && ii <= terminal_area {
            word_boundary = Some(ii);
        } else if is_one_of(glyph, STOP_CHARACTERS) && ii < max_len {
            stop_boundary = Some(ii + 1);
            break;
        } else if word_boundary.is_some() {
            break;
        }
    }

    if let Some(end) = stop_boundary {
        return Cow::Owned(segment::join(&glyphs[..end]));
    }

    // a boundary at 0 means nothing but break characters precede it
    let end = match word_boundary {
        None | Some(0) => terminal_area,
        Some(end) => end,
    };
    let mut out = segment::join(&glyphs[..end]);
    out.push_str(terminal);
    Cow::Owned(out)
}

/// [`shorten`] with the ellipsis terminal.
pub fn shorten_default(text: &str, max_len: usize) -> Cow<'_, str> {
    shorten(text, max_len, ELLIPSIS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn stop_character_wins_without_terminal() {
        assert_eq!(shorten_default("Hello, world! Extra.", 13), "Hello, world!");
    }

    #[test]
    fn hard_cut_when_no_boundary() {
        assert_eq!(shorten("abcdefghij", 5, "..."), "ab...");
    }

    #[rstest]
    #[case("short", 10, "short")]
    #[case("ab你好", 4, "ab你好")]
    #[case("the quick brown fox", 12, "the quick\u{2026}")]
    #[case("one two three", 8, "one two\u{2026}")]
    #[case("done. and more text", 8, "done.")]
    #[case("     abcdef", 4, "   \u{2026}")]
    fn shortening(#[case] text: &str, #[case] max_len: usize, #[case] expected: &str) {
        assert_eq!(shorten_default(text, max_len), expected);
    }

    #[test]
    fn unchanged_text_is_borrowed() {
        assert!(matches!(shorten_default("tiny", 10), Cow::Borrowed("tiny")));
        // six bytes but two glyphs
        assert!(matches!(shorten_default("你好", 3), Cow::Borrowed(_)));
    }

    #[test]
    fn terminal_longer_than_limit() {
        assert_eq!(shorten("abcdefgh", 2, "....."), ".....");
    }

    #[test]
    fn never_splits_a_glyph() {
        let text = "e\u{0301}e\u{0301}e\u{0301}e\u{0301}";
        let out = shorten(text, 2, "");
        assert_eq!(out, "e\u{0301}e\u{0301}");
    }
}
