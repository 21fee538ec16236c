//! The contract block rules use to talk to the surrounding markup engine.
//!
//! One engine value belongs to one document render: it owns the document
//! metadata and the stack of named rendering states, and both are dropped
//! with it. Nothing here is global.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::node::Node;

/// State pushed while a heading body is rendered for its table-of-contents
/// name. Inline rules reduce links to their text inside it.
pub const TOC_STATE: &str = "toc";

/// How a document is being rendered, chosen once per render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// HTML-like node tree.
    #[default]
    Structured,
    /// Plain text for terminals and mail.
    PlainText,
}

/// Document-scoped values keyed by name.
#[derive(Default)]
pub struct Metadata {
    values: HashMap<String, Box<dyn Any>>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// The value under `key`, if there is one of type `T`.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key)?.downcast_ref()
    }

    pub fn set<T: Any>(&mut self, key: &str, value: T) {
        self.values.insert(key.to_string(), Box::new(value));
    }

    /// Remove and return the value under `key`. A value of another type is
    /// dropped and `None` returned.
    pub fn take<T: Any>(&mut self, key: &str) -> Option<T> {
        let value = self.values.remove(key)?;
        value.downcast().ok().map(|boxed| *boxed)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("Metadata").field("keys", &keys).finish()
    }
}

/// Services a block rule may ask of the engine rendering it.
pub trait Engine {
    fn output_mode(&self) -> OutputMode;

    /// A boolean engine option, such as [`crate::GENERATE_TOC_OPTION`].
    fn config_flag(&self, option: &str) -> bool;

    fn metadata(&self) -> &Metadata;

    fn metadata_mut(&mut self) -> &mut Metadata;

    /// Prefer [`enter_state`], which pops on every exit path.
    fn push_state(&mut self, state: &str);

    fn pop_state(&mut self, state: &str);

    fn in_state(&self, state: &str) -> bool;

    /// Render inline markup inside a text fragment.
    fn apply_rules(&mut self, text: &str) -> Vec<Node>;

    /// Collapse rendered nodes back to plain text.
    fn restore_text(&self, nodes: &[Node]) -> String {
        nodes.iter().map(Node::text_content).collect()
    }
}

/// A pushed rendering state. Pops it when dropped, including during unwind.
pub struct StateGuard<'e, E: Engine + ?Sized> {
    engine: &'e mut E,
    state: &'static str,
}

/// Push `state` and return a guard that pops it again.
pub fn enter_state<'e, E: Engine + ?Sized>(engine: &'e mut E, state: &'static str) -> StateGuard<'e, E> {
    engine.push_state(state);
    StateGuard { engine, state }
}

impl<E: Engine + ?Sized> Deref for StateGuard<'_, E> {
    type Target = E;

    fn deref(&self) -> &E {
        self.engine
    }
}

impl<E: Engine + ?Sized> DerefMut for StateGuard<'_, E> {
    fn deref_mut(&mut self) -> &mut E {
        self.engine
    }
}

impl<E: Engine + ?Sized> Drop for StateGuard<'_, E> {
    fn drop(&mut self) {
        self.engine.pop_state(self.state);
    }
}
