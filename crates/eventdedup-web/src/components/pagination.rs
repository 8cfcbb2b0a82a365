//! Pagination controls for navigating through the event list

use crate::markup::{html_escape, page_href};
use std::num::NonZeroU32;
use std::ops::RangeInclusive;

/// Pages shown on each side of the current page
const WINDOW_RADIUS: u64 = 2;

/// Page arithmetic for one `(total, limit, offset)` triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Total number of items
    pub total: u64,
    /// Items per page
    pub limit: NonZeroU32,
    /// Requested offset
    pub offset: u64,
    /// `ceil(total / limit)`; zero when there are no items
    pub page_count: u64,
    /// Current page (1-based), always within `1..=max(page_count, 1)`
    pub current_page: u64,
}

/// What a pagination link does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Jump to the first page
    First,
    /// One page back
    Previous,
    /// A numbered page
    Page(u64),
    /// One page forward
    Next,
    /// Jump to the last page
    Last,
}

/// A rendered pagination link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    /// Link role
    pub kind: LinkKind,
    /// Offset the link navigates to
    pub offset: u64,
    /// Rendered inert
    pub disabled: bool,
    /// Marks the current page
    pub active: bool,
}

impl Pagination {
    /// Compute the page state
    #[must_use]
    pub fn new(total: u64, limit: NonZeroU32, offset: u64) -> Self {
        let per_page = u64::from(limit.get());
        let page_count = total.div_ceil(per_page);
        let current_page = (offset / per_page).saturating_add(1).min(page_count.max(1));

        Self {
            total,
            limit,
            offset,
            page_count,
            current_page,
        }
    }

    /// Whether the current page is the first one
    #[must_use]
    pub const fn is_first(&self) -> bool {
        self.current_page == 1
    }

    /// Whether the current page is the last one (or there are no pages)
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.current_page >= self.page_count
    }

    /// Offset of the last page
    #[must_use]
    pub fn last_offset(&self) -> u64 {
        (self.page_count.max(1) - 1).saturating_mul(u64::from(self.limit.get()))
    }

    /// Offset of `page` (1-based), clamped into the valid range
    #[must_use]
    pub fn offset_for_page(&self, page: u64) -> u64 {
        page.saturating_sub(1)
            .saturating_mul(u64::from(self.limit.get()))
            .min(self.last_offset())
    }

    /// Target of the "previous" link
    #[must_use]
    pub fn prev_offset(&self) -> u64 {
        self.offset_for_page(self.current_page.saturating_sub(1))
    }

    /// Target of the "next" link
    #[must_use]
    pub fn next_offset(&self) -> u64 {
        self.offset_for_page(self.current_page.saturating_add(1))
    }

    /// Page numbers shown around the current page; empty when there are no pages
    #[must_use]
    pub fn window(&self) -> RangeInclusive<u64> {
        let start = self.current_page.saturating_sub(WINDOW_RADIUS).max(1);
        let end = self
            .current_page
            .saturating_add(WINDOW_RADIUS)
            .min(self.page_count);
        start..=end
    }

    /// Links in display order: first, previous, page window, next, last
    #[must_use]
    pub fn links(&self) -> Vec<PageLink> {
        let mut links = vec![
            PageLink {
                kind: LinkKind::First,
                offset: 0,
                disabled: self.is_first(),
                active: false,
            },
            PageLink {
                kind: LinkKind::Previous,
                offset: self.prev_offset(),
                disabled: self.is_first(),
                active: false,
            },
        ];

        links.extend(self.window().map(|page| PageLink {
            kind: LinkKind::Page(page),
            offset: self.offset_for_page(page),
            disabled: false,
            active: page == self.current_page,
        }));

        links.push(PageLink {
            kind: LinkKind::Next,
            offset: self.next_offset(),
            disabled: self.is_last(),
            active: false,
        });
        links.push(PageLink {
            kind: LinkKind::Last,
            offset: self.last_offset(),
            disabled: self.is_last(),
            active: false,
        });

        links
    }
}

/// Render the `<li>` items that go inside `.pagination`
#[must_use]
pub fn render_pagination(pagination: &Pagination) -> String {
    let limit = pagination.limit.get();
    let mut html = String::new();

    for link in pagination.links() {
        let href = html_escape(&page_href(limit, link.offset));
        let state = if link.disabled {
            " disabled"
        } else if link.active {
            " active"
        } else {
            ""
        };
        let inert = if link.disabled {
            r#" aria-disabled="true" tabindex="-1""#
        } else {
            ""
        };

        let item = match link.kind {
            LinkKind::Page(page) => format!(
                r#"<li class="page-item{state}"><a class="page-link" href="{href}"{inert}>{page}</a></li>"#
            ),
            LinkKind::First => arrow_item(state, &href, inert, "First", "&laquo;&laquo;"),
            LinkKind::Previous => arrow_item(state, &href, inert, "Previous", "&laquo;"),
            LinkKind::Next => arrow_item(state, &href, inert, "Next", "&raquo;"),
            LinkKind::Last => arrow_item(state, &href, inert, "Last", "&raquo;&raquo;"),
        };
        html.push_str(&item);
    }

    html
}

fn arrow_item(state: &str, href: &str, inert: &str, label: &str, glyph: &str) -> String {
    format!(
        r#"<li class="page-item{state}"><a class="page-link" href="{href}" aria-label="{label}"{inert}><span aria-hidden="true">{glyph}</span></a></li>"#
    )
}
