pub mod header;
pub mod paragraph;

use crate::engine::Engine;
use crate::node::Node;

/// A rule that owns runs of whole lines in a document.
///
/// The driver offers each rule the lines from `cursor` onward, in order;
/// the first rule to claim a non-zero count gets those lines joined back
/// together as `markup_text` input.
pub trait BlockRule {
    /// How many lines starting at `cursor` belong to this rule, 0 for none.
    /// `lines` keep their line endings.
    fn matching_line_count(&self, lines: &[&str], cursor: usize) -> usize;

    fn markup_text(&self, text: &str, engine: &mut dyn Engine) -> Node;
}

pub(crate) fn is_blank(line: &str) -> bool {
    line.trim_matches([' ', '\t', '\n', '\r', '\0', '\x0B']).is_empty()
}

/// Count the blank lines from `start` on.
pub(crate) fn blank_run(lines: &[&str], start: usize) -> usize {
    lines
        .iter()
        .skip(start)
        .take_while(|line| is_blank(line))
        .count()
}
