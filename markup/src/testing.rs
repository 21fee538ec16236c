use crate::engine::{Engine, Metadata, OutputMode, TOC_STATE};
use crate::inline::{InlineRules, LinkStyle};
use crate::node::Node;

pub(crate) struct TestEngine {
    pub mode: OutputMode,
    pub generate_toc: bool,
    pub metadata: Metadata,
    pub states: Vec<String>,
    inline: InlineRules,
}

impl TestEngine {
    pub fn structured() -> Self {
        TestEngine {
            mode: OutputMode::Structured,
            generate_toc: true,
            metadata: Metadata::new(),
            states: Vec::new(),
            inline: InlineRules::new(),
        }
    }

    pub fn plain() -> Self {
        TestEngine {
            mode: OutputMode::PlainText,
            ..Self::structured()
        }
    }
}

impl Engine for TestEngine {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn config_flag(&self, option: &str) -> bool {
        option == crate::GENERATE_TOC_OPTION && self.generate_toc
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    fn push_state(&mut self, state: &str) {
        self.states.push(state.to_string());
    }

    fn pop_state(&mut self, state: &str) {
        assert_eq!(self.states.pop().as_deref(), Some(state));
    }

    fn in_state(&self, state: &str) -> bool {
        self.states.iter().any(|s| s == state)
    }

    fn apply_rules(&mut self, text: &str) -> Vec<Node> {
        let links = if self.in_state(TOC_STATE) {
            LinkStyle::NameOnly
        } else {
            LinkStyle::Anchor
        };
        self.inline.render(text, links)
    }
}
