//! Headings, in two forms:
//!
//! ```text
//! == Single line ==        Setext
//! ==                       ======
//! ```
//!
//! A single-line heading is one to five leading `=`, its level being the
//! count. A setext heading is a line of text underlined by at least two `=`
//! (level 1) or `-` (level 2).

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use glyphs::character_length;
use glyphs::lines::split_lines;

use super::{BlockRule, blank_run};
use crate::GENERATE_TOC_OPTION;
use crate::engine::{Engine, OutputMode};
use crate::node::Node;
use crate::toc::generate_anchor;

const MAX_LEVEL: u8 = 5;

static SETEXT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([^\n]+)\n[-=]{2,}\s*$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingStyle {
    SingleLine,
    Setext,
}

/// A recognized heading, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// 1 is the most prominent, 5 the least.
    pub level: u8,
    pub text: String,
    pub style: HeadingStyle,
}

fn strip_ending(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

impl Heading {
    /// Split the text claimed by [`HeaderBlockRule`] into level and body.
    pub fn parse(text: &str) -> Heading {
        let text = text.trim();
        let mut lines = split_lines(text, false).into_iter();
        let first = lines.next().unwrap_or_default();

        if let Some(underline) = lines.next() {
            let level = if underline.trim_start().starts_with('=') { 1 } else { 2 };
            return Heading {
                level,
                text: first.trim().to_string(),
                style: HeadingStyle::Setext,
            };
        }

        let marks = first.bytes().take_while(|&b| b == b'=').count();
        Heading {
            level: marks.clamp(1, MAX_LEVEL as usize) as u8,
            text: first.trim_matches([' ', '=']).to_string(),
            style: HeadingStyle::SingleLine,
        }
    }

    fn render_plain(&self) -> Node {
        let underline = if self.level == 1 { "=" } else { "-" };
        Node::text(format!(
            "{}\n{}",
            self.text,
            underline.repeat(character_length(&self.text))
        ))
    }

    fn render_structured(&self, engine: &mut dyn Engine) -> Node {
        let mut children = Vec::new();
        if engine.config_flag(GENERATE_TOC_OPTION) {
            children.push(generate_anchor(self.level, &self.text, engine));
        }
        children.extend(engine.apply_rules(&self.text));
        Node::tag(format!("h{}", self.level + 1), &[], children)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderBlockRule;

impl HeaderBlockRule {
    /// Lines taken by the heading itself, before trailing blank lines.
    fn heading_lines(lines: &[&str], cursor: usize) -> usize {
        let Some(current) = lines.get(cursor) else {
            return 0;
        };
        if current.starts_with('=') {
            return 1;
        }
        match lines.get(cursor + 1) {
            Some(next) => {
                let pair = format!("{}\n{}", strip_ending(current), next);
                if SETEXT.is_match(&pair) { 2 } else { 0 }
            }
            None => 0,
        }
    }
}

impl BlockRule for HeaderBlockRule {
    fn matching_line_count(&self, lines: &[&str], cursor: usize) -> usize {
        match Self::heading_lines(lines, cursor) {
            0 => 0,
            n => n + blank_run(lines, cursor + n),
        }
    }

    fn markup_text(&self, text: &str, engine: &mut dyn Engine) -> Node {
        let heading = Heading::parse(text);
        debug!(
            target: "markup.header",
            level = heading.level,
            style = ?heading.style,
            len = heading.text.len(),
            "heading_recognized"
        );
        match engine.output_mode() {
            OutputMode::PlainText => heading.render_plain(),
            OutputMode::Structured => heading.render_structured(engine),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEngine;
    use rstest::rstest;

    #[rstest]
    #[case(&["Title\n", "=====\n"], 2, 1, HeadingStyle::Setext)]
    #[case(&["Title\n", "-----"], 2, 2, HeadingStyle::Setext)]
    #[case(&["Title\r\n", "==\r\n"], 2, 1, HeadingStyle::Setext)]
    #[case(&["Title\r", "--\r"], 2, 2, HeadingStyle::Setext)]
    #[case(&["=== Heading\n"], 1, 3, HeadingStyle::SingleLine)]
    #[case(&["= A =\n"], 1, 1, HeadingStyle::SingleLine)]
    #[case(&["======= Deep\n"], 1, 5, HeadingStyle::SingleLine)]
    fn recognizes_headings(
        #[case] lines: &[&str],
        #[case] count: usize,
        #[case] level: u8,
        #[case] style: HeadingStyle,
    ) {
        assert_eq!(HeaderBlockRule.matching_line_count(lines, 0), count);
        let heading = Heading::parse(&lines[..count].concat());
        assert_eq!(heading.level, level);
        assert_eq!(heading.style, style);
    }

    #[test]
    fn body_text_is_trimmed() {
        assert_eq!(Heading::parse("=== Heading ===\n").text, "Heading");
        assert_eq!(Heading::parse("  Title  \n----\n").text, "Title");
    }

    #[test]
    fn single_line_body_keeps_inner_tabs() {
        let heading = Heading::parse("==\tTabbed\t==\n");
        assert_eq!(heading.level, 2);
        assert_eq!(heading.text, "\tTabbed\t");
    }

    #[rstest]
    #[case(&["plain text\n"])]
    #[case(&["plain text\n", "more text\n"])]
    #[case(&["Title\n", "=\n"])]
    #[case(&["Title\n", "== x\n"])]
    #[case(&[])]
    fn rejects_non_headings(#[case] lines: &[&str]) {
        assert_eq!(HeaderBlockRule.matching_line_count(lines, 0), 0);
    }

    #[test]
    fn absorbs_following_blank_lines() {
        let lines = ["=== Heading\n", "\n", "  \t\n", "text\n"];
        assert_eq!(HeaderBlockRule.matching_line_count(&lines, 0), 3);
        let lines = ["Title\n", "=====\n", "\n", "text\n"];
        assert_eq!(HeaderBlockRule.matching_line_count(&lines, 0), 3);
    }

    #[test]
    fn matches_from_cursor() {
        let lines = ["text\n", "\n", "== Two\n"];
        assert_eq!(HeaderBlockRule.matching_line_count(&lines, 0), 0);
        assert_eq!(HeaderBlockRule.matching_line_count(&lines, 2), 1);
        assert_eq!(HeaderBlockRule.matching_line_count(&lines, 3), 0);
    }

    #[test]
    fn level_without_marks_is_one() {
        let heading = Heading::parse("no marks");
        assert_eq!(heading.level, 1);
        assert_eq!(heading.text, "no marks");
    }

    #[test]
    fn plain_text_underlines_by_level() {
        let mut engine = TestEngine::plain();
        let node = HeaderBlockRule.markup_text("= Über =", &mut engine);
        assert_eq!(node, Node::text("Über\n===="));
        let node = HeaderBlockRule.markup_text("Sub\n---\n", &mut engine);
        assert_eq!(node, Node::text("Sub\n---"));
        assert!(engine.metadata.get::<crate::TableOfContents>(crate::toc::TOC_KEY).is_none());
    }

    #[test]
    fn structured_heading_carries_anchor() {
        let mut engine = TestEngine::structured();
        let node = HeaderBlockRule.markup_text("== Getting *started*", &mut engine);
        assert_eq!(
            node.to_string(),
            "<h3><a name=\"getting-started\"></a>Getting <em>started</em></h3>"
        );
    }

    #[test]
    fn structured_heading_without_toc() {
        let mut engine = TestEngine::structured();
        engine.generate_toc = false;
        let node = HeaderBlockRule.markup_text("= Plain =", &mut engine);
        assert_eq!(node.to_string(), "<h2>Plain</h2>");
        assert!(engine.metadata.get::<crate::TableOfContents>(crate::toc::TOC_KEY).is_none());
    }
}
