pub mod block;
pub mod engine;
pub mod inline;
pub mod node;
pub mod toc;

#[cfg(test)]
mod testing;

pub use block::BlockRule;
pub use block::header::{HeaderBlockRule, Heading, HeadingStyle};
pub use block::paragraph::ParagraphBlockRule;
pub use engine::{Engine, Metadata, OutputMode, StateGuard, TOC_STATE, enter_state};
pub use inline::{InlineRules, LinkStyle};
pub use node::Node;
pub use toc::{TableOfContents, TocEntry, generate_anchor, render_table_of_contents, slugify};

/// Config option that turns on anchors and table-of-contents tracking.
pub const GENERATE_TOC_OPTION: &str = "header.generate-toc";
