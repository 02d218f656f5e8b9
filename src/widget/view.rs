//! Render model for the feedback widget.
//!
//! DESIGN
//! ======
//! The widget never touches a DOM or terminal. `FeedbackWidget::view`
//! produces a `WidgetView` snapshot and the host draws it however it likes.

use time::OffsetDateTime;
use time::macros::format_description;
use uuid::Uuid;

use crate::record::{FeedbackRecord, PageFilter};

pub const TOGGLE_LABEL_CLOSED: &str = "Feedback";
pub const TOGGLE_LABEL_OPEN: &str = "Close";
pub const SUBMIT_LABEL: &str = "Submit";
pub const SUBMITTING_LABEL: &str = "Submitting...";
pub const EMPTY_CURRENT_PAGE: &str = "No feedback yet for this page.";
pub const EMPTY_ALL_PAGES: &str = "No feedback yet.";
pub const LOAD_FAILED: &str = "Failed to load feedback";
pub const CONNECT_FAILED: &str = "Failed to connect to feedback store";
pub const RESOLVE_LABEL: &str = "Resolve";
pub const REOPEN_LABEL: &str = "Reopen";

/// Full widget snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetView {
    pub open: bool,
    pub toggle_label: &'static str,
    pub page: String,
    pub authors: Vec<AuthorOption>,
    pub draft: String,
    pub submit_label: &'static str,
    pub submit_enabled: bool,
    pub filter: PageFilter,
    pub list: ListView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorOption {
    pub name: String,
    pub selected: bool,
}

/// What the list area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    /// Nothing loaded yet (widget never opened).
    Idle,
    Empty(&'static str),
    Error(&'static str),
    Items(Vec<FeedbackItemView>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackItemView {
    pub id: Uuid,
    pub author: String,
    pub content: String,
    /// Shown only when listing all pages.
    pub page: Option<String>,
    pub created: String,
    pub resolved: bool,
    pub action_label: &'static str,
}

impl FeedbackItemView {
    #[must_use]
    pub fn from_record(record: &FeedbackRecord, filter: PageFilter) -> Self {
        Self {
            id: record.id,
            author: record.author.clone(),
            content: record.content.clone(),
            page: match filter {
                PageFilter::All => Some(record.page.clone()),
                PageFilter::Current => None,
            },
            created: format_timestamp(record.created_at),
            resolved: record.resolved,
            action_label: if record.resolved { REOPEN_LABEL } else { RESOLVE_LABEL },
        }
    }
}

/// Build the list area from loaded records.
#[must_use]
pub fn list_view(records: &[FeedbackRecord], filter: PageFilter) -> ListView {
    if records.is_empty() {
        return ListView::Empty(match filter {
            PageFilter::Current => EMPTY_CURRENT_PAGE,
            PageFilter::All => EMPTY_ALL_PAGES,
        });
    }
    ListView::Items(records.iter().map(|r| FeedbackItemView::from_record(r, filter)).collect())
}

/// Format epoch milliseconds as `YYYY-MM-DD HH:MM` UTC; raw millis if out of range.
#[must_use]
pub fn format_timestamp(ms: i64) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute] UTC");
    match OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000) {
        Ok(dt) => dt.format(&format).unwrap_or_else(|_| ms.to_string()),
        Err(_) => ms.to_string(),
    }
}

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
