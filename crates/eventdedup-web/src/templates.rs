//! HTML page templates
//!
//! The page templates are embedded at compile time and loaded into a `minijinja`
//! environment. Document nodes are passed as `nodes["<selector>"]`, already rendered,
//! so they are marked safe; everything else is HTML-escaped on output.

use eventdedup_core::{Error, Result};
use indexmap::IndexMap;
use minijinja::{Environment, Value, context};
use std::collections::BTreeMap;
use std::time::Duration;

/// Statistics page
pub const STATS_PAGE: &str = "stats.html";

/// Events list page
pub const EVENTS_PAGE: &str = "events.html";

/// Single event page
pub const EVENT_DETAIL_PAGE: &str = "event_detail.html";

const SOURCES: &[(&str, &str)] = &[
    (STATS_PAGE, include_str!("../templates/stats.html")),
    (EVENTS_PAGE, include_str!("../templates/events.html")),
    (EVENT_DETAIL_PAGE, include_str!("../templates/event_detail.html")),
];

/// Compiled page templates
#[derive(Debug, Clone)]
pub struct PageTemplates {
    env: Environment<'static>,
}

impl PageTemplates {
    /// Load every page template
    ///
    /// # Errors
    ///
    /// Returns an error if a template does not parse.
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        for &(name, source) in SOURCES {
            env.add_template(name, source)
                .map_err(|e| template_error(name, &e))?;
        }
        Ok(Self { env })
    }

    /// Render a page from a document snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the template is unknown or fails to render.
    pub fn render_page(
        &self,
        name: &str,
        nodes: &IndexMap<String, String>,
        refresh_interval: Duration,
    ) -> Result<String> {
        let nodes: BTreeMap<&str, Value> = nodes
            .iter()
            .map(|(selector, html)| (selector.as_str(), Value::from_safe_string(html.clone())))
            .collect();

        self.render(
            name,
            context! {
                nodes => nodes,
                refresh_seconds => refresh_seconds(refresh_interval),
            },
        )
    }

    /// Render the event detail page around already rendered markup
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_detail_page(&self, content: &str) -> Result<String> {
        self.render(
            EVENT_DETAIL_PAGE,
            context! { content => Value::from_safe_string(content.to_owned()) },
        )
    }

    fn render(&self, name: &str, ctx: Value) -> Result<String> {
        self.env
            .get_template(name)
            .and_then(|template| template.render(ctx))
            .map_err(|e| template_error(name, &e))
    }
}

/// Whole seconds for `<meta http-equiv="refresh">`, never less than one
#[must_use]
pub fn refresh_seconds(interval: Duration) -> u64 {
    interval.as_secs().max(1)
}

fn template_error(name: &str, error: &minijinja::Error) -> Error {
    Error::Other(format!("Failed to render template {name}: {error}"))
}
