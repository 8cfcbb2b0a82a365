//! In-memory page document addressed by CSS selectors
//!
//! A [`PageDocument`] holds the nodes a dashboard page exposes. Renderers never touch
//! nodes directly: they stage new contents in a [`RenderPass`] and the document commits
//! the whole pass under one write lock, so readers see either the previous render or
//! the next one, never a mix.

use crate::markup::html_escape;
use eventdedup_core::{Error, Result};
use indexmap::IndexMap;
use parking_lot::RwLock;

/// Selectors the dashboard pages expose
pub mod selectors {
    /// Live deduplication key counter
    pub const REDIS_KEYS_COUNT: &str = ".redis-keys-count";
    /// Stored events counter
    pub const POSTGRES_EVENTS_COUNT: &str = ".postgres-events-count";
    /// Shard counter
    pub const POSTGRES_SHARDS_COUNT: &str = ".postgres-shards-count";
    /// Per-shard progress bars
    pub const SHARDS_DISTRIBUTION: &str = ".shards-distribution";
    /// Time of the last statistics snapshot
    pub const LAST_UPDATE_TIME: &str = ".last-update-time";
    /// Total events on the events page
    pub const TOTAL_EVENTS_COUNT: &str = ".total-events-count";
    /// Body of the desktop events table
    pub const EVENTS_TABLE_BODY: &str = ".events-table tbody";
    /// Card list for narrow screens
    pub const MOBILE_EVENTS: &str = ".mobile-events";
    /// Pagination controls
    pub const PAGINATION: &str = ".pagination";

    /// Nodes of the statistics page
    pub const STATS_PAGE: &[&str] = &[
        REDIS_KEYS_COUNT,
        POSTGRES_EVENTS_COUNT,
        POSTGRES_SHARDS_COUNT,
        SHARDS_DISTRIBUTION,
        LAST_UPDATE_TIME,
    ];

    /// Nodes of the events page
    pub const EVENTS_PAGE: &[&str] = &[
        TOTAL_EVENTS_COUNT,
        EVENTS_TABLE_BODY,
        MOBILE_EVENTS,
        PAGINATION,
    ];
}

/// Content of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeContent {
    /// Plain text, escaped on output
    Text(String),
    /// Trusted markup produced by a renderer
    Html(String),
}

impl NodeContent {
    /// Markup for this content
    #[must_use]
    pub fn to_html(&self) -> String {
        match self {
            Self::Text(text) => html_escape(text),
            Self::Html(html) => html.clone(),
        }
    }
}

impl Default for NodeContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    classes: Vec<String>,
    content: NodeContent,
}

#[derive(Debug, Default)]
struct DocumentState {
    nodes: IndexMap<String, Node>,
    last_cycle: Option<u64>,
}

/// Result of offering a render pass to the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The pass was committed
    Applied,
    /// A newer cycle already rendered; the pass was dropped
    Stale {
        /// Cycle that currently owns the document
        latest: u64,
    },
}

/// Staged node updates for one render pass
#[derive(Debug)]
pub struct RenderPass<'a> {
    nodes: &'a IndexMap<String, Node>,
    staged: Vec<(String, NodeContent)>,
}

impl RenderPass<'_> {
    /// Whether the document has a node for `selector`
    #[must_use]
    pub fn has(&self, selector: &str) -> bool {
        self.nodes.contains_key(selector)
    }

    /// Replace the text of a node
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingNode`] if the node does not exist.
    pub fn set_text(&mut self, selector: &str, text: impl Into<String>) -> Result<()> {
        self.stage(selector, NodeContent::Text(text.into()))
    }

    /// Replace the markup of a node
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingNode`] if the node does not exist.
    pub fn set_html(&mut self, selector: &str, html: impl Into<String>) -> Result<()> {
        self.stage(selector, NodeContent::Html(html.into()))
    }

    fn stage(&mut self, selector: &str, content: NodeContent) -> Result<()> {
        if !self.has(selector) {
            return Err(Error::MissingNode {
                selector: selector.to_string(),
            });
        }
        self.staged.push((selector.to_string(), content));
        Ok(())
    }
}

/// A page's nodes, shared between refresh drivers and page handlers
#[derive(Debug, Default)]
pub struct PageDocument {
    state: RwLock<DocumentState>,
}

impl PageDocument {
    /// Empty document
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Document with an empty node for each selector
    #[must_use]
    pub fn with_nodes(selectors: &[&str]) -> Self {
        let document = Self::new();
        for selector in selectors {
            document.mount(selector, NodeContent::default());
        }
        document
    }

    /// Statistics page skeleton
    #[must_use]
    pub fn stats_page() -> Self {
        let document = Self::with_nodes(selectors::STATS_PAGE);
        for counter in [
            selectors::REDIS_KEYS_COUNT,
            selectors::POSTGRES_EVENTS_COUNT,
            selectors::POSTGRES_SHARDS_COUNT,
        ] {
            document.mount(counter, NodeContent::Text("-".to_string()));
        }
        document
    }

    /// Events page skeleton
    #[must_use]
    pub fn events_page() -> Self {
        let document = Self::with_nodes(selectors::EVENTS_PAGE);
        document.mount(
            selectors::TOTAL_EVENTS_COUNT,
            NodeContent::Text("-".to_string()),
        );
        document
    }

    /// Add a node, or replace the content of an existing one
    pub fn mount(&self, selector: &str, content: NodeContent) {
        let mut state = self.state.write();
        state.nodes.entry(selector.to_string()).or_default().content = content;
    }

    /// Remove a node
    pub fn unmount(&self, selector: &str) {
        self.state.write().nodes.shift_remove(selector);
    }

    /// Whether the document has a node for `selector`
    #[must_use]
    pub fn contains(&self, selector: &str) -> bool {
        self.state.read().nodes.contains_key(selector)
    }

    /// Current content of a node
    #[must_use]
    pub fn content(&self, selector: &str) -> Option<NodeContent> {
        self.state
            .read()
            .nodes
            .get(selector)
            .map(|node| node.content.clone())
    }

    /// Current markup of a node
    #[must_use]
    pub fn html(&self, selector: &str) -> Option<String> {
        self.content(selector).map(|content| content.to_html())
    }

    /// Add a class to a node
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingNode`] if the node does not exist.
    pub fn tag(&self, selector: &str, class: &str) -> Result<()> {
        let mut state = self.state.write();
        let node = state
            .nodes
            .get_mut(selector)
            .ok_or_else(|| Error::MissingNode {
                selector: selector.to_string(),
            })?;
        if !node.classes.iter().any(|c| c == class) {
            node.classes.push(class.to_string());
        }
        Ok(())
    }

    /// Classes added to a node
    #[must_use]
    pub fn classes(&self, selector: &str) -> Vec<String> {
        self.state
            .read()
            .nodes
            .get(selector)
            .map(|node| node.classes.clone())
            .unwrap_or_default()
    }

    /// Markup of every node, in mount order
    #[must_use]
    pub fn snapshot(&self) -> IndexMap<String, String> {
        self.state
            .read()
            .nodes
            .iter()
            .map(|(selector, node)| (selector.clone(), node.content.to_html()))
            .collect()
    }

    /// Cycle of the last committed render pass
    #[must_use]
    pub fn last_rendered_cycle(&self) -> Option<u64> {
        self.state.read().last_cycle
    }

    /// Run a render pass for `cycle` and commit it if it succeeds.
    ///
    /// A pass from a cycle older than the last committed one is not run. A pass that
    /// fails leaves every node untouched.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by `render`.
    pub fn render<F>(&self, cycle: u64, render: F) -> Result<RenderOutcome>
    where
        F: FnOnce(&mut RenderPass<'_>) -> Result<()>,
    {
        let mut guard = self.state.write();
        let state = &mut *guard;

        if let Some(latest) = state.last_cycle.filter(|latest| *latest > cycle) {
            return Ok(RenderOutcome::Stale { latest });
        }

        let mut pass = RenderPass {
            nodes: &state.nodes,
            staged: Vec::new(),
        };
        render(&mut pass)?;
        let staged = pass.staged;

        for (selector, content) in staged {
            if let Some(node) = state.nodes.get_mut(&selector) {
                node.content = content;
            }
        }
        state.last_cycle = Some(cycle);

        Ok(RenderOutcome::Applied)
    }
}
