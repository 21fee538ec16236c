//! Byte-level UTF-8 decoding.
//!
//! Two validity notions live here:
//! - [`decode_one`] / [`decode_all`] use the permissive lead-byte table, which
//!   still accepts the historical 5- and 6-byte forms (lead bytes up to `0xFD`).
//! - [`is_well_formed`] and [`repair`] follow modern UTF-8: at most 4 bytes, no
//!   overlong forms, no surrogates, nothing above U+10FFFF.
//!
//! Anything that passes the strict check also decodes under the permissive
//! table, so a repaired buffer always round-trips through [`decode_all`].

use std::borrow::Cow;
use std::fmt;

use crate::error::{Error, Result};

/// The encoding of U+FFFD.
pub const REPLACEMENT: &[u8] = b"\xEF\xBF\xBD";

/// Payload mask for the lead byte, indexed by sequence length - 1.
const LEAD_MASK: [u8; 6] = [0x7F, 0x1F, 0x0F, 0x07, 0x03, 0x01];

/// The encoded form of exactly one scalar value.
///
/// Only produced by decoding, so the lead byte always agrees with the length
/// and every trailing byte is a continuation byte.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteSeq<'a>(&'a [u8]);

impl<'a> ByteSeq<'a> {
    pub(crate) const SPACE: ByteSeq<'static> = ByteSeq(b" ");

    pub fn as_bytes(&self) -> &'a [u8] {
        self.0
    }

    /// The sequence as text, or `None` for a legacy 5/6-byte form.
    pub fn as_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.0).ok()
    }

    /// The byte, when this is a one-byte sequence.
    pub fn single_byte(&self) -> Option<u8> {
        match self.0 {
            [b] => Some(*b),
            _ => None,
        }
    }

    /// Decode to a codepoint by masking the lead byte for its length class
    /// and shifting in six bits per continuation byte.
    pub fn codepoint(&self) -> u32 {
        let (lead, rest) = match self.0.split_first() {
            Some(split) => split,
            None => return 0,
        };
        let mask = LEAD_MASK[rest.len().min(LEAD_MASK.len() - 1)];
        rest.iter()
            .fold(u32::from(lead & mask), |acc, &b| (acc << 6) | u32::from(b & 0x3F))
    }

    pub fn to_char(&self) -> Option<char> {
        char::from_u32(self.codepoint())
    }

    /// Append to a string. Legacy forms have no `char`, so they become U+FFFD.
    pub fn push_to(&self, out: &mut String) {
        match self.as_str() {
            Some(s) => out.push_str(s),
            None => out.push(char::REPLACEMENT_CHARACTER),
        }
    }
}

impl fmt::Debug for ByteSeq<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteSeq({:02X?} U+{:04X})", self.0, self.codepoint())
    }
}

impl fmt::Display for ByteSeq<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => f.write_str(s),
            None => write!(f, "{}", char::REPLACEMENT_CHARACTER),
        }
    }
}

fn is_continuation(b: u8) -> bool {
    (0x80..=0xBF).contains(&b)
}

/// Declared sequence length for a lead byte under the permissive table.
fn declared_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF7 => Some(4),
        0xF8..=0xFB => Some(5),
        0xFC..=0xFD => Some(6),
        // stray continuation bytes, C0/C1 overlong leads, FE/FF
        _ => None,
    }
}

/// Decode the sequence starting at `offset`.
pub fn decode_one(bytes: &[u8], offset: usize) -> Result<ByteSeq<'_>> {
    let invalid = Error::InvalidEncoding { offset };
    let lead = *bytes.get(offset).ok_or(invalid.clone())?;
    let len = declared_len(lead).ok_or(invalid.clone())?;
    let seq = bytes.get(offset..offset + len).ok_or(invalid.clone())?;
    if !seq[1..].iter().all(|&b| is_continuation(b)) {
        return Err(invalid);
    }
    Ok(ByteSeq(seq))
}

/// Decode a whole buffer. Fails on the first invalid sequence with no
/// partial result.
pub fn decode_all(bytes: &[u8]) -> Result<Vec<ByteSeq<'_>>> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut offset = 0;
    while offset < bytes.len() {
        let seq = decode_one(bytes, offset)?;
        offset += seq.0.len();
        out.push(seq);
    }
    Ok(out)
}

/// Decode a buffer straight to codepoints.
pub fn codepoints(bytes: &[u8]) -> Result<Vec<u32>> {
    Ok(decode_all(bytes)?.iter().map(ByteSeq::codepoint).collect())
}

/// The sequences of a string. Infallible, since `str` is already valid.
pub fn sequences(text: &str) -> impl Iterator<Item = ByteSeq<'_>> {
    let bytes = text.as_bytes();
    text.char_indices()
        .map(move |(i, c)| ByteSeq(&bytes[i..i + c.len_utf8()]))
}

/// Length of the strictly valid sequence at `offset`, if there is one.
fn strict_len_at(bytes: &[u8], offset: usize) -> Option<usize> {
    let lead = *bytes.get(offset)?;
    let (len, second) = match lead {
        0x00..=0x7F => return Some(1),
        0xC2..=0xDF => (2, 0x80..=0xBF),
        0xE0 => (3, 0xA0..=0xBF),
        0xE1..=0xEC | 0xEE..=0xEF => (3, 0x80..=0xBF),
        0xED => (3, 0x80..=0x9F),
        0xF0 => (4, 0x90..=0xBF),
        0xF1..=0xF3 => (4, 0x80..=0xBF),
        0xF4 => (4, 0x80..=0x8F),
        _ => return None,
    };
    let tail = bytes.get(offset + 1..offset + len)?;
    let ok = second.contains(&tail[0]) && tail[1..].iter().all(|&b| is_continuation(b));
    ok.then_some(len)
}

/// True if `bytes` is entirely made of valid 1-4 byte UTF-8 sequences.
pub fn is_well_formed(bytes: &[u8]) -> bool {
    if bytes.is_ascii() {
        return true;
    }
    let mut offset = 0;
    while offset < bytes.len() {
        match strict_len_at(bytes, offset) {
            Some(len) => offset += len,
            None => return false,
        }
    }
    true
}

/// True if `bytes` is well-formed UTF-8 made only of Basic Multilingual
/// Plane characters, excluding NUL.
pub fn is_utf8_with_only_bmp(bytes: &[u8]) -> bool {
    let mut offset = 0;
    while offset < bytes.len() {
        match strict_len_at(bytes, offset) {
            Some(1) if bytes[offset] == 0 => return false,
            Some(len @ 1..=3) => offset += len,
            _ => return false,
        }
    }
    true
}

/// View `bytes` as a string, reporting where the first invalid sequence
/// starts if it is not well-formed.
pub fn to_str(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| Error::InvalidEncoding {
        offset: e.valid_up_to(),
    })
}

/// Make `bytes` valid UTF-8.
///
/// Valid input is borrowed unchanged. Otherwise every valid sequence is kept
/// verbatim and every byte that does not start one becomes U+FFFD, advancing
/// by a single byte.
pub fn repair(bytes: &[u8]) -> Cow<'_, str> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(bytes.len() + REPLACEMENT.len());
    let mut offset = 0;
    while offset < bytes.len() {
        match strict_len_at(bytes, offset) {
            Some(len) => {
                ByteSeq(&bytes[offset..offset + len]).push_to(&mut out);
                offset += len;
            }
            None => {
                out.push(char::REPLACEMENT_CHARACTER);
                offset += 1;
            }
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"a", 0x61)]
    #[case("é".as_bytes(), 0xE9)]
    #[case("你".as_bytes(), 0x4F60)]
    #[case("😀".as_bytes(), 0x1F600)]
    fn decodes_codepoints_per_length_class(#[case] bytes: &[u8], #[case] expected: u32) {
        let seq = decode_one(bytes, 0).unwrap();
        assert_eq!(seq.as_bytes(), bytes);
        assert_eq!(seq.codepoint(), expected);
    }

    #[test]
    fn legacy_five_and_six_byte_forms_decode() {
        let five = [0xF8, 0x88, 0x80, 0x80, 0x80];
        let seq = decode_one(&five, 0).unwrap();
        assert_eq!(seq.codepoint(), 0x20_0000);
        assert_eq!(seq.as_str(), None);

        let six = [0xFC, 0x84, 0x80, 0x80, 0x80, 0x80];
        assert_eq!(decode_one(&six, 0).unwrap().codepoint(), 0x400_0000);
    }

    #[rstest]
    #[case(&[0x80])]
    #[case(&[0xBF, 0x41])]
    #[case(&[0xC0, 0x80])]
    #[case(&[0xFE])]
    #[case(&[0xE4, 0xBD])]
    #[case(&[0xE4, 0x41, 0xA0])]
    fn rejects_invalid_leads_and_truncation(#[case] bytes: &[u8]) {
        assert_eq!(
            decode_one(bytes, 0),
            Err(Error::InvalidEncoding { offset: 0 })
        );
    }

    #[test]
    fn decode_all_reports_offset_and_no_partial_output() {
        let bytes = b"ab\xFFcd";
        assert_eq!(decode_all(bytes), Err(Error::InvalidEncoding { offset: 2 }));

        let ok = decode_all("a你b".as_bytes()).unwrap();
        assert_eq!(ok.len(), 3);
        assert_eq!(ok[1].as_str(), Some("你"));
    }

    #[test]
    fn codepoints_of_mixed_text() {
        assert_eq!(
            codepoints("aé你".as_bytes()).unwrap(),
            vec![0x61, 0xE9, 0x4F60]
        );
    }

    #[rstest]
    #[case(b"plain ascii", true)]
    #[case("ünïcödé 你好 😀".as_bytes(), true)]
    #[case(b"\x00nul", true)]
    #[case(b"\xE0\x80\x80", false)]
    #[case(b"\xED\xA0\x80", false)]
    #[case(b"\xF4\x90\x80\x80", false)]
    #[case(b"\xF8\x88\x80\x80\x80", false)]
    #[case(b"\xC3", false)]
    fn well_formedness_matches_modern_utf8(#[case] bytes: &[u8], #[case] expected: bool) {
        assert_eq!(is_well_formed(bytes), expected);
        assert_eq!(std::str::from_utf8(bytes).is_ok(), expected);
    }

    #[test]
    fn bmp_only_check() {
        assert!(is_utf8_with_only_bmp("hello 你好".as_bytes()));
        assert!(!is_utf8_with_only_bmp("😀".as_bytes()));
        assert!(!is_utf8_with_only_bmp(b"\x00"));
        assert!(!is_utf8_with_only_bmp(b"\xE0\x80\x80"));
    }

    #[test]
    fn repair_borrows_valid_input() {
        let text = "already fine 你好";
        assert!(matches!(repair(text.as_bytes()), Cow::Borrowed(s) if s == text));
    }

    #[test]
    fn repair_replaces_one_byte_at_a_time() {
        assert_eq!(repair(b"a\xFFb"), "a\u{FFFD}b");
        // truncated 3-byte sequence: both bytes replaced individually
        assert_eq!(repair(b"x\xE4\xBD"), "x\u{FFFD}\u{FFFD}");
        // valid sequence right after garbage survives
        assert_eq!(repair(b"\x80\xE4\xBD\xA0"), "\u{FFFD}你");
        assert_eq!(repair(b"\xED\xA0\x80").chars().count(), 3);
    }

    #[test]
    fn to_str_reports_first_bad_offset() {
        assert_eq!(to_str("ok 你".as_bytes()), Ok("ok 你"));
        assert_eq!(to_str(b"ab\xC0\xAF"), Err(Error::InvalidEncoding { offset: 2 }));
    }
}
