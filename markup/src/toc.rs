//! Heading anchors and the table of contents built from them.
//!
//! Anchors are assigned in document order, so the first heading with a
//! given slug keeps it and later ones get numeric suffixes. The table lives
//! in the engine's document metadata under [`TOC_KEY`].

use std::collections::HashMap;

use tracing::{debug, trace};

use glyphs::codec;

use crate::engine::{Engine, TOC_STATE, enter_state};
use crate::node::Node;

/// Metadata key of the document's [`TableOfContents`].
pub const TOC_KEY: &str = "header.toc";

const MAX_SLUG_LEN: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub anchor: String,
    pub level: u8,
    /// Heading body as rendered inside the toc state.
    pub name: String,
}

/// Entries in insertion order, unique by anchor.
#[derive(Debug, Clone, Default)]
pub struct TableOfContents {
    entries: Vec<TocEntry>,
    index: HashMap<String, usize>,
}

impl TableOfContents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, anchor: &str) -> bool {
        self.index.contains_key(anchor)
    }

    pub fn get(&self, anchor: &str) -> Option<&TocEntry> {
        self.index.get(anchor).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &TocEntry> {
        self.entries.iter()
    }

    /// Add an entry. An entry with the same anchor is replaced where it stands.
    pub fn push(&mut self, entry: TocEntry) {
        match self.index.get(&entry.anchor) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.index.insert(entry.anchor.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// `base` if it is free, else the first free `base-1`, `base-2`, ...
    pub fn unique_anchor(&self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut suffix = 0;
        while candidate.is_empty() || self.contains(&candidate) {
            suffix += 1;
            candidate = format!("{base}-{suffix}").trim_matches('-').to_string();
        }
        if suffix > 0 {
            trace!(target: "markup.toc", collisions = suffix, "anchor_suffixed");
        }
        candidate
    }
}

/// Reduce heading text to an anchor slug: ASCII letters and digits
/// lowercased, every other run of characters a single `-`, at most 24
/// characters, no leading or trailing `-`. May be empty.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len().min(MAX_SLUG_LEN * 2));
    for seq in codec::sequences(text) {
        match seq.single_byte() {
            Some(b) if b.is_ascii_alphanumeric() => slug.push(b.to_ascii_lowercase() as char),
            _ if slug.ends_with('-') => {}
            _ => slug.push('-'),
        }
    }
    // only ASCII was pushed, so byte and char positions agree
    let slug = slug.trim_matches('-');
    let cut = &slug[..slug.len().min(MAX_SLUG_LEN)];
    cut.trim_matches('-').to_string()
}

/// Give a heading a unique anchor and record it in the table of contents.
///
/// The heading body is rendered with the toc state pushed, so links in it
/// come out as their text, and the result becomes the entry's name.
/// Returns the empty `<a name>` marker to place inside the heading.
pub fn generate_anchor(level: u8, text: &str, engine: &mut dyn Engine) -> Node {
    let slug = slugify(text);

    let name = {
        let mut guard = enter_state(&mut *engine, TOC_STATE);
        let nodes = guard.apply_rules(text);
        guard.restore_text(&nodes)
    };

    let mut toc = engine
        .metadata_mut()
        .take::<TableOfContents>(TOC_KEY)
        .unwrap_or_default();
    let anchor = toc.unique_anchor(&slug);
    debug!(target: "markup.toc", level, anchor = %anchor, "anchor_assigned");
    toc.push(TocEntry {
        anchor: anchor.clone(),
        level,
        name,
    });
    engine.metadata_mut().set(TOC_KEY, toc);

    Node::tag("a", &[("name", anchor.as_str())], Vec::new())
}

fn close_list(stack: &mut Vec<Vec<Node>>) {
    if let Some(items) = stack.pop() {
        // one item or nested list per line
        let mut children = vec![Node::text("\n")];
        for item in items {
            children.push(item);
            children.push(Node::text("\n"));
        }
        let list = Node::tag("ul", &[], children);
        if let Some(parent) = stack.last_mut() {
            parent.push(list);
        }
    }
}

/// Nested lists of links to every recorded anchor, or `None` when the
/// document has fewer than two headings.
pub fn render_table_of_contents(engine: &dyn Engine) -> Option<Node> {
    let toc = engine.metadata().get::<TableOfContents>(TOC_KEY)?;
    if toc.len() < 2 {
        debug!(target: "markup.toc", entries = toc.len(), "toc_skipped");
        return None;
    }

    // stack[depth] collects the items of the list open at that depth
    let mut stack: Vec<Vec<Node>> = vec![Vec::new()];
    for entry in toc.iter() {
        let level = usize::from(entry.level);
        while stack.len() - 1 < level {
            stack.push(Vec::new());
        }
        while stack.len() - 1 > level {
            close_list(&mut stack);
        }
        let href = format!("#{}", entry.anchor);
        let link = Node::tag("a", &[("href", href.as_str())], vec![Node::text(entry.name.as_str())]);
        if let Some(items) = stack.last_mut() {
            items.push(Node::tag("li", &[], vec![link]));
        }
    }
    while stack.len() > 1 {
        close_list(&mut stack);
    }

    debug!(target: "markup.toc", entries = toc.len(), "toc_rendered");
    Some(Node::Fragment(stack.pop().unwrap_or_default()))
}
