//! Inline markup inside a block's text: emphasis, code spans, links and
//! images, parsed with pulldown-cmark.
//!
//! Block structure is decided by the block rules, so any block-level
//! syntax left in a fragment is escaped before parsing and the fragment
//! always comes back as a flat run of inline nodes.

use std::sync::LazyLock;

use pulldown_cmark::{Event, Options, Parser as CmarkParser, Tag, TagEnd};
use regex::Regex;

use crate::node::Node;

/// How links are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkStyle {
    /// `<a href>` elements.
    #[default]
    Anchor,
    /// Only the link text, for names that are themselves placed in a link.
    NameOnly,
}

/// A leading ordered-list marker: digits then `.` or `)`.
static ORDERED_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{1,9})([.)])").unwrap());

/// A link reference definition, which would otherwise vanish from the text.
static REFERENCE_DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[^\]]*\]:").unwrap());

#[derive(Debug, Clone, Copy)]
pub struct InlineRules {
    options: Options,
}

impl Default for InlineRules {
    fn default() -> Self {
        Self::new()
    }
}

impl InlineRules {
    pub fn new() -> Self {
        InlineRules {
            options: Options::ENABLE_STRIKETHROUGH,
        }
    }

    pub fn render(&self, text: &str, links: LinkStyle) -> Vec<Node> {
        let source = escape_block_markers(text);
        let events: Vec<Event<'_>> = CmarkParser::new_ext(&source, self.options).collect();
        let mut i = 0;
        let mut nodes = Vec::new();
        let mut paragraphs = 0;
        while i < events.len() {
            match &events[i] {
                Event::Start(Tag::Paragraph) => {
                    i += 1;
                    if paragraphs > 0 {
                        push_text(&mut nodes, "\n");
                    }
                    paragraphs += 1;
                    let children = collect(&events, &mut i, links, &|e| matches!(e, TagEnd::Paragraph));
                    extend(&mut nodes, children);
                }
                _ => {
                    let children = collect(&events, &mut i, links, &|_| false);
                    extend(&mut nodes, children);
                }
            }
        }
        nodes
    }
}

/// Escape whatever would make pulldown-cmark open a block other than a
/// paragraph. Leading indentation is dropped so nothing becomes a code block.
fn escape_block_markers(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for (n, line) in text.split('\n').enumerate() {
        if n > 0 {
            out.push('\n');
        }
        let line = line.trim_start_matches([' ', '\t']);
        let first = line.as_bytes().first().copied();
        match first {
            Some(b'#' | b'>' | b'-' | b'+' | b'=' | b'|') => {
                out.push('\\');
                out.push_str(line);
            }
            Some(b'*' | b'_') if is_list_or_rule(line) => {
                out.push('\\');
                out.push_str(line);
            }
            Some(b'`' | b'~') if line.starts_with("```") || line.starts_with("~~~") => {
                out.push('\\');
                out.push_str(line);
            }
            Some(b'[') if REFERENCE_DEFINITION.is_match(line) => {
                out.push('\\');
                out.push_str(line);
            }
            Some(b'0'..=b'9') => match ORDERED_MARKER.captures(line) {
                Some(caps) => {
                    let digits = &caps[1];
                    out.push_str(digits);
                    out.push('\\');
                    out.push_str(&line[digits.len()..]);
                }
                None => out.push_str(line),
            },
            _ => out.push_str(line),
        }
    }
    out
}

/// `* item`, or a line of only `*`/`_` and spaces.
fn is_list_or_rule(line: &str) -> bool {
    let marker = line.as_bytes()[0];
    matches!(line.as_bytes().get(1), None | Some(b' ' | b'\t'))
        || line.bytes().all(|b| b == marker || b == b' ' || b == b'\t')
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if let Some(Node::Text(last)) = nodes.last_mut() {
        last.push_str(text);
    } else {
        nodes.push(Node::text(text));
    }
}

fn extend(nodes: &mut Vec<Node>, more: Vec<Node>) {
    for node in more {
        match node {
            Node::Text(s) => push_text(nodes, &s),
            other => nodes.push(other),
        }
    }
}

fn collect(
    events: &[Event<'_>],
    i: &mut usize,
    links: LinkStyle,
    is_end: &dyn Fn(&TagEnd) -> bool,
) -> Vec<Node> {
    let mut nodes = Vec::new();

    while *i < events.len() {
        match &events[*i] {
            Event::End(tag_end) if is_end(tag_end) => {
                *i += 1;
                break;
            }
            Event::Text(s) | Event::Html(s) | Event::InlineHtml(s) => {
                push_text(&mut nodes, s);
                *i += 1;
            }
            Event::Code(s) => {
                nodes.push(Node::tag("code", &[], vec![Node::text(s.to_string())]));
                *i += 1;
            }
            Event::SoftBreak => {
                push_text(&mut nodes, "\n");
                *i += 1;
            }
            Event::HardBreak => {
                nodes.push(Node::tag("br", &[], Vec::new()));
                *i += 1;
            }
            Event::Start(Tag::Strong) => {
                *i += 1;
                let children = collect(events, i, links, &|e| matches!(e, TagEnd::Strong));
                nodes.push(Node::tag("strong", &[], children));
            }
            Event::Start(Tag::Emphasis) => {
                *i += 1;
                let children = collect(events, i, links, &|e| matches!(e, TagEnd::Emphasis));
                nodes.push(Node::tag("em", &[], children));
            }
            Event::Start(Tag::Strikethrough) => {
                *i += 1;
                let children = collect(events, i, links, &|e| matches!(e, TagEnd::Strikethrough));
                nodes.push(Node::tag("del", &[], children));
            }
            Event::Start(Tag::Link { dest_url, title, .. }) => {
                let dest = dest_url.to_string();
                let title = title.to_string();
                *i += 1;
                let content = collect(events, i, links, &|e| matches!(e, TagEnd::Link));
                match links {
                    LinkStyle::NameOnly => extend(&mut nodes, content),
                    LinkStyle::Anchor if title.is_empty() => {
                        nodes.push(Node::tag("a", &[("href", dest.as_str())], content));
                    }
                    LinkStyle::Anchor => {
                        nodes.push(Node::tag("a", &[("href", dest.as_str()), ("title", title.as_str())], content));
                    }
                }
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                let dest = dest_url.to_string();
                *i += 1;
                let alt = collect(events, i, links, &|e| matches!(e, TagEnd::Image));
                match links {
                    LinkStyle::NameOnly => extend(&mut nodes, alt),
                    LinkStyle::Anchor => {
                        let alt: String = alt.iter().map(Node::text_content).collect();
                        nodes.push(Node::tag("img", &[("src", dest.as_str()), ("alt", alt.as_str())], Vec::new()));
                    }
                }
            }
            _ => {
                *i += 1;
            }
        }
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn html(text: &str, links: LinkStyle) -> String {
        InlineRules::new()
            .render(text, links)
            .iter()
            .map(Node::to_string)
            .collect()
    }

    #[test]
    fn emphasis_and_code() {
        assert_eq!(
            html("**bold** and *em* with `x < y`", LinkStyle::Anchor),
            "<strong>bold</strong> and <em>em</em> with <code>x &lt; y</code>"
        );
    }

    #[test]
    fn links_become_names_inside_toc() {
        let text = "see [the docs](http://example.com/)";
        assert_eq!(
            html(text, LinkStyle::Anchor),
            "see <a href=\"http://example.com/\">the docs</a>"
        );
        assert_eq!(html(text, LinkStyle::NameOnly), "see the docs");
    }

    #[rstest]
    #[case("# not a heading", "# not a heading")]
    #[case("- not a list", "- not a list")]
    #[case("* not a list", "* not a list")]
    #[case("3. not a list", "3. not a list")]
    #[case("> not a quote", "&gt; not a quote")]
    #[case("    not code", "not code")]
    #[case("~~gone~~", "<del>gone</del>")]
    fn block_syntax_stays_inline(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(html(text, LinkStyle::Anchor), expected);
    }

    #[test]
    fn line_breaks_are_kept() {
        let nodes = InlineRules::new().render("one\ntwo", LinkStyle::Anchor);
        assert_eq!(nodes, vec![Node::text("one\ntwo")]);
    }

    #[test]
    fn raw_html_is_text() {
        assert_eq!(html("a <b>c</b>", LinkStyle::Anchor), "a &lt;b&gt;c&lt;/b&gt;");
    }
}
