//! Glyph segmentation: a base character with its trailing combining marks.

use std::fmt;

use crate::codec::{self, ByteSeq};
use crate::error::Result;

/// Combining diacritical mark blocks. Nothing else is folded into a glyph.
const COMBINING_RANGES: [(u32, u32); 4] = [
    (0x0300, 0x036F), // Combining Diacritical Marks
    (0x1DC0, 0x1DFF), // Combining Diacritical Marks Supplement
    (0x20D0, 0x20FF), // Combining Diacritical Marks for Symbols
    (0xFE20, 0xFE2F), // Combining Half Marks
];

pub fn is_combining(codepoint: u32) -> bool {
    COMBINING_RANGES
        .iter()
        .any(|&(lo, hi)| (lo..=hi).contains(&codepoint))
}

/// True if any scalar of `character` is a combining mark.
pub fn is_combining_character(character: &str) -> bool {
    codec::sequences(character).any(|seq| is_combining(seq.codepoint()))
}

/// One display unit. Never empty; the first sequence is the base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph<'a> {
    seqs: Vec<ByteSeq<'a>>,
}

impl<'a> Glyph<'a> {
    fn new(base: ByteSeq<'a>) -> Self {
        Glyph { seqs: vec![base] }
    }

    pub fn base(&self) -> ByteSeq<'a> {
        self.seqs[0]
    }

    pub fn marks(&self) -> &[ByteSeq<'a>] {
        &self.seqs[1..]
    }

    pub fn sequences(&self) -> &[ByteSeq<'a>] {
        &self.seqs
    }

    /// The byte, when the glyph is a lone one-byte character.
    pub fn single_byte(&self) -> Option<u8> {
        match self.seqs.as_slice() {
            [only] => only.single_byte(),
            _ => None,
        }
    }

    pub fn is_byte(&self, b: u8) -> bool {
        self.single_byte() == Some(b)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.seqs
            .iter()
            .flat_map(|seq| seq.as_bytes().iter().copied())
            .collect()
    }

    pub fn push_to(&self, out: &mut String) {
        for seq in &self.seqs {
            seq.push_to(out);
        }
    }
}

impl fmt::Display for Glyph<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for seq in &self.seqs {
            write!(f, "{}", seq)?;
        }
        Ok(())
    }
}

/// Concatenate glyphs back into a string.
pub fn join(glyphs: &[Glyph<'_>]) -> String {
    let mut out = String::new();
    for glyph in glyphs {
        glyph.push_to(&mut out);
    }
    out
}

fn fold<'a>(seqs: impl IntoIterator<Item = ByteSeq<'a>>) -> Vec<Glyph<'a>> {
    let mut out: Vec<Glyph<'a>> = Vec::new();
    for seq in seqs {
        if !is_combining(seq.codepoint()) {
            out.push(Glyph::new(seq));
            continue;
        }
        match out.last_mut() {
            Some(glyph) => glyph.seqs.push(seq),
            // a leading mark gets a synthesized space to sit on
            None => out.push(Glyph {
                seqs: vec![ByteSeq::SPACE, seq],
            }),
        }
    }
    out
}

/// Segment raw bytes into glyphs.
pub fn to_glyphs(bytes: &[u8]) -> Result<Vec<Glyph<'_>>> {
    codec::decode_all(bytes).map(fold)
}

/// Segment a string into glyphs.
pub fn glyphs(text: &str) -> Vec<Glyph<'_>> {
    fold(codec::sequences(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn combining_marks_attach_to_previous_glyph() {
        let text = "e\u{0301}a\u{20D7}\u{FE20}b";
        let glyphs = glyphs(text);
        assert_eq!(glyphs.len(), 3);
        assert_eq!(glyphs[0].to_string(), "e\u{0301}");
        assert_eq!(glyphs[1].marks().len(), 2);
        assert!(glyphs[2].is_byte(b'b'));
        assert_eq!(join(&glyphs), text);
    }

    #[test]
    fn leading_mark_gets_synthesized_space() {
        let glyphs = glyphs("\u{0301}ab");
        assert_eq!(glyphs.len(), 1 + 2);
        assert_eq!(glyphs[0].base().single_byte(), Some(b' '));
        assert_eq!(glyphs[0].to_string(), " \u{0301}");
    }

    #[test]
    fn range_edges() {
        for cp in [0x0300, 0x036F, 0x1DC0, 0x1DFF, 0x20D0, 0x20FF, 0xFE20, 0xFE2F] {
            assert!(is_combining(cp), "{cp:#X}");
        }
        for cp in [0x02FF, 0x0370, 0x1AB0, 0xFE30, 0x41] {
            assert!(!is_combining(cp), "{cp:#X}");
        }
        assert!(is_combining_character("\u{0308}"));
        assert!(!is_combining_character("a"));
    }

    #[test]
    fn byte_segmentation_fails_on_invalid_input() {
        assert_eq!(to_glyphs(b"ok\xC3"), Err(Error::InvalidEncoding { offset: 2 }));
        let glyphs = to_glyphs("o\u{0308}k".as_bytes()).unwrap();
        assert_eq!(glyphs.len(), 2);
        assert_eq!(glyphs[0].to_bytes(), "o\u{0308}".as_bytes());
    }
}
