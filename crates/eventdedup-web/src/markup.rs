//! Markup helpers shared by the renderers

/// Path of the database UI that the events views link to
pub const DATABASE_UI_PATH: &str = "/api/ui/database";

/// Escape text for use inside HTML element content and quoted attributes
#[must_use]
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Detail view link for one event
#[must_use]
pub fn event_detail_href(event_hash: &str) -> String {
    format!(
        "{DATABASE_UI_PATH}?event_hash={}",
        urlencoding::encode(event_hash)
    )
}

/// Event list link for one page
#[must_use]
pub fn page_href(limit: u32, offset: u64) -> String {
    format!("{DATABASE_UI_PATH}?limit={limit}&offset={offset}")
}

/// `onclick` handler that navigates to `href`; the value is attribute-escaped
#[must_use]
pub fn navigate_onclick(href: &str) -> String {
    html_escape(&format!("window.location='{href}'"))
}
