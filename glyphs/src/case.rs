//! Case conversion and character translation that never split a
//! multi-byte character.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use crate::codec;
use crate::segment;

pub fn to_lower_case(text: &str) -> String {
    codec::sequences(text)
        .filter_map(|seq| seq.to_char())
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn to_upper_case(text: &str) -> String {
    codec::sequences(text)
        .filter_map(|seq| seq.to_char())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Capitalize ASCII `a-z` letters that start a word (at the beginning or
/// after a space). Everything else is left alone, so `"AAA"` stays `"AAA"`.
pub fn to_title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for glyph in segment::glyphs(text) {
        let base = glyph.base().single_byte();
        if at_word_start && base.is_some_and(|b| b.is_ascii_lowercase()) {
            out.push_str(&to_upper_case(&glyph.to_string()));
        } else {
            glyph.push_to(&mut out);
        }
        at_word_start = glyph.is_byte(b' ');
    }
    out
}

/// Replace characters found in `map`; unmapped characters pass through.
pub fn translate<K, V>(text: &str, map: &HashMap<K, V>) -> String
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<str>,
{
    let mut out = String::with_capacity(text.len());
    for seq in codec::sequences(text) {
        match seq.as_str().and_then(|c| map.get(c)) {
            Some(replacement) => out.push_str(replacement.as_ref()),
            None => seq.push_to(&mut out),
        }
    }
    out
}
