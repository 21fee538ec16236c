use super::header::HeaderBlockRule;
use super::{BlockRule, blank_run, is_blank};
use crate::engine::{Engine, OutputMode};
use crate::node::Node;

/// Consecutive non-blank lines, up to the next blank line or heading.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParagraphBlockRule;

impl BlockRule for ParagraphBlockRule {
    fn matching_line_count(&self, lines: &[&str], cursor: usize) -> usize {
        let mut end = cursor;
        while end < lines.len() && !is_blank(lines[end]) {
            if end > cursor && HeaderBlockRule.matching_line_count(lines, end) > 0 {
                break;
            }
            end += 1;
        }
        match end - cursor {
            0 => 0,
            n => n + blank_run(lines, end),
        }
    }

    fn markup_text(&self, text: &str, engine: &mut dyn Engine) -> Node {
        let text = text.trim();
        match engine.output_mode() {
            OutputMode::PlainText => Node::text(text),
            OutputMode::Structured => Node::tag("p", &[], engine.apply_rules(text)),
        }
    }
}
