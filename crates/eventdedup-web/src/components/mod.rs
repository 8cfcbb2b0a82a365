//! View models and their markup renderers
//!
//! Each component turns a payload into a plain view model and the view model into
//! markup, so the mapping is testable without a document.

pub mod events;
pub mod pagination;
pub mod stats;

pub use events::{EventRow, EventsView, render_event_detail, render_events};
pub use pagination::{LinkKind, PageLink, Pagination, render_pagination};
pub use stats::{ShardBar, StatsView, render_stats};
