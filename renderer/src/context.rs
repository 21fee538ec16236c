use tracing::warn;

use markup::{Engine, InlineRules, LinkStyle, Metadata, Node, OutputMode, TOC_STATE};

use crate::config::EngineConfig;

/// Everything one document render owns: the config it runs under, the
/// document metadata and the stack of pushed states.
///
/// Build a fresh context per document; nothing carries over between renders.
#[derive(Debug)]
pub struct RenderContext<'c> {
    config: &'c EngineConfig,
    mode: OutputMode,
    metadata: Metadata,
    states: Vec<String>,
    inline: InlineRules,
}

impl<'c> RenderContext<'c> {
    pub fn new(config: &'c EngineConfig) -> Self {
        RenderContext {
            config,
            mode: config.output_mode(),
            metadata: Metadata::new(),
            states: Vec::new(),
            inline: InlineRules::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        self.config
    }

    /// Pushed states, innermost last.
    pub fn states(&self) -> &[String] {
        &self.states
    }
}

impl Engine for RenderContext<'_> {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn config_flag(&self, option: &str) -> bool {
        self.config.option(option)
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
        match self.states.pop() {
            Some(top) if top == state => {}
            top => warn!(target: "renderer.state", expected = state, found = ?top, "state_pop_mismatch"),
        }
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
