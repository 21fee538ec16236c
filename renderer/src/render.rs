use tracing::{debug, info};

use glyphs::lines::split_lines;
use markup::{BlockRule, Engine, HeaderBlockRule, Node, OutputMode, ParagraphBlockRule, render_table_of_contents};

use crate::config::EngineConfig;
use crate::context::RenderContext;
use crate::error::RenderError;

/// Block rules in priority order. Headings get first refusal on every line.
const RULES: [&dyn BlockRule; 2] = [&HeaderBlockRule, &ParagraphBlockRule];

/// The output of one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub mode: OutputMode,
    pub blocks: Vec<Node>,
    /// Present when anchors were generated for at least two headings.
    pub toc: Option<Node>,
}

impl RenderedDocument {
    /// Blocks as escaped markup, one per line, or as raw text separated by
    /// blank lines.
    pub fn body(&self) -> String {
        let blocks = self.blocks.iter();
        match self.mode {
            OutputMode::Structured => blocks.map(Node::to_string).collect::<Vec<_>>().join("\n"),
            OutputMode::PlainText => blocks.map(Node::text_content).collect::<Vec<_>>().join("\n\n"),
        }
    }

    pub fn toc_html(&self) -> Option<String> {
        self.toc.as_ref().map(Node::to_string)
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Render a whole document. Input must be valid UTF-8; see
/// [`glyphs::repair`] for untrusted bytes.
pub fn render_document(source: &[u8], config: &EngineConfig) -> Result<RenderedDocument, RenderError> {
    let text = glyphs::to_str(source)?;
    Ok(render_str(text, config))
}

pub fn render_str(text: &str, config: &EngineConfig) -> RenderedDocument {
    let mut ctx = RenderContext::new(config);
    info!(target: "renderer", bytes = text.len(), mode = ?ctx.output_mode(), "render_start");

    let lines = split_lines(text, true);
    let mut blocks = Vec::new();
    let mut cursor = 0;
    while cursor < lines.len() {
        if is_blank(lines[cursor]) {
            cursor += 1;
            continue;
        }
        let claimed = RULES.iter().find_map(|rule| {
            match rule.matching_line_count(&lines, cursor) {
                0 => None,
                count => Some((rule, count)),
            }
        });
        let Some((rule, count)) = claimed else {
            cursor += 1;
            continue;
        };
        let end = (cursor + count).min(lines.len());
        debug!(target: "renderer", start = cursor, lines = end - cursor, "block_claimed");
        blocks.push(rule.markup_text(&lines[cursor..end].concat(), &mut ctx));
        cursor = end;
    }

    let toc = render_table_of_contents(&ctx);
    info!(target: "renderer", blocks = blocks.len(), toc = toc.is_some(), "render_finish");
    RenderedDocument {
        mode: ctx.output_mode(),
        blocks,
        toc,
    }
}
