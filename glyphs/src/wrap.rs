//! Hard wrapping at a fixed character count.

use crate::codec::{self, ByteSeq};
use crate::lines::split_lines;
use crate::segment;

/// Index of the first sequence at or after `from` equal to `delimiter`, or
/// the last index when the construct is never closed.
fn skip_to(seqs: &[(ByteSeq<'_>, usize)], from: usize, delimiter: u8) -> usize {
    seqs[from..]
        .iter()
        .position(|(seq, _)| seq.single_byte() == Some(delimiter))
        .map_or(seqs.len() - 1, |pos| from + pos)
}

/// Hard-wrap HTML so that each line holds `width` visible characters.
///
/// A tag (`<...>`) counts as nothing and an entity (`&...;`) as a single
/// character; lines never break inside either. A `width` of 0 disables
/// wrapping.
pub fn hard_wrap_html(html: &str, width: usize) -> Vec<String> {
    if html.is_empty() {
        return Vec::new();
    }
    if width == 0 {
        return vec![html.to_string()];
    }

    // each sequence paired with the byte offset just past it
    let mut end = 0;
    let seqs: Vec<(ByteSeq<'_>, usize)> = codec::sequences(html)
        .map(|seq| {
            end += seq.as_bytes().len();
            (seq, end)
        })
        .collect();

    let mut lines = Vec::new();
    let mut start = 0;
    let mut counted = 0;
    let mut ii = 0;
    while ii < seqs.len() {
        match seqs[ii].0.single_byte() {
            Some(b'&') => {
                ii = skip_to(&seqs, ii, b';');
                counted += 1;
            }
            Some(b'<') => ii = skip_to(&seqs, ii, b'>'),
            _ => counted += 1,
        }

        if counted == width {
            let end = seqs[ii].1;
            lines.push(html[start..end].to_string());
            start = end;
            counted = 0;
        }
        ii += 1;
    }

    if start < html.len() {
        lines.push(html[start..].to_string());
    }
    lines
}

/// Hard-wrap plain text: each logical line is cut every `width` glyphs.
/// Line endings are dropped and empty lines produce nothing. A `width` of 0
/// disables wrapping.
pub fn hard_wrap(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    for line in split_lines(text, false) {
        if width == 0 {
            if !line.is_empty() {
                out.push(line.to_string());
            }
            continue;
        }
        let glyphs = segment::glyphs(line);
        out.extend(glyphs.chunks(width).map(segment::join));
    }
    out
}
