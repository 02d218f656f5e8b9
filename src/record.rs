//! Feedback record — the single entity stored in the `feedbacks` collection.
//!
//! DESIGN
//! ======
//! Records are immutable apart from their resolution pair and deletion, so
//! the only mutator is [`FeedbackRecord::apply`], which takes a
//! [`Resolution`]. `Resolution` cannot express "resolved without a time" or
//! "open with a time", which keeps `resolved`/`resolved_at` consistent in
//! every store.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ErrorCode;

// =============================================================================
// CLOCK
// =============================================================================

/// Current time as milliseconds since Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

// =============================================================================
// RECORD
// =============================================================================

/// A stored reviewer comment tied to a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub id: Uuid,
    pub author: String,
    pub content: String,
    pub page: String,
    /// Store-assigned creation time (ms).
    pub created_at: i64,
    /// Client-assigned submission time (ms).
    pub timestamp: i64,
    #[serde(default)]
    pub resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<i64>,
}

impl FeedbackRecord {
    /// Materialize a submission as a fresh, unresolved record.
    #[must_use]
    pub fn from_new(new: NewFeedback, id: Uuid, created_at: i64) -> Self {
        Self {
            id,
            author: new.author,
            content: new.content,
            page: new.page,
            created_at,
            timestamp: new.timestamp,
            resolved: false,
            resolved_at: None,
        }
    }

    pub fn apply(&mut self, resolution: Resolution) {
        self.resolved = resolution.is_resolved();
        self.resolved_at = resolution.resolved_at();
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// The mutable part of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Open,
    Resolved { at: i64 },
}

impl Resolution {
    /// Build the resolution for a requested `resolved` flag at time `now`.
    #[must_use]
    pub fn from_flag(resolved: bool, now: i64) -> Self {
        if resolved { Self::Resolved { at: now } } else { Self::Open }
    }

    #[must_use]
    pub fn is_resolved(self) -> bool {
        matches!(self, Self::Resolved { .. })
    }

    #[must_use]
    pub fn resolved_at(self) -> Option<i64> {
        match self {
            Self::Open => None,
            Self::Resolved { at } => Some(at),
        }
    }

    #[must_use]
    pub fn toggled(self, now: i64) -> Self {
        Self::from_flag(!self.is_resolved(), now)
    }
}

// =============================================================================
// SUBMISSION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please select your name")]
    MissingAuthor,
    #[error("unknown reviewer: {0}")]
    UnknownAuthor(String),
    #[error("Please enter feedback")]
    MissingContent,
}

impl ErrorCode for ValidationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingAuthor => "E_MISSING_AUTHOR",
            Self::UnknownAuthor(_) => "E_UNKNOWN_AUTHOR",
            Self::MissingContent => "E_MISSING_CONTENT",
        }
    }
}

/// Submission payload for a new record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeedback {
    pub author: String,
    pub content: String,
    pub page: String,
    pub timestamp: i64,
}

impl NewFeedback {
    /// Check required fields against the roster and return the trimmed payload.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule: author, then content.
    pub fn validate(self, roster: &Roster) -> Result<Self, ValidationError> {
        let author = self.author.trim();
        if author.is_empty() {
            return Err(ValidationError::MissingAuthor);
        }
        if !roster.contains(author) {
            return Err(ValidationError::UnknownAuthor(author.to_owned()));
        }
        let content = self.content.trim();
        if content.is_empty() {
            return Err(ValidationError::MissingContent);
        }
        Ok(Self {
            author: author.to_owned(),
            content: content.to_owned(),
            page: self.page,
            timestamp: self.timestamp,
        })
    }
}

// =============================================================================
// ROSTER
// =============================================================================

/// The fixed, ordered set of reviewer names allowed to author feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster(Vec<String>);

impl Roster {
    /// Build a roster from names, dropping blanks and duplicates while keeping order.
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if !name.is_empty() && !out.iter().any(|n| n == name) {
                out.push(name.to_owned());
            }
        }
        Self(out)
    }

    /// Parse a comma-separated list such as `FEEDBACK_REVIEWERS`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =============================================================================
// LISTING
// =============================================================================

/// Which records the widget list shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFilter {
    #[default]
    Current,
    All,
}

impl PageFilter {
    /// Client-side page filter. `Current` keeps exact `page` matches only.
    #[must_use]
    pub fn retain(self, records: Vec<FeedbackRecord>, page: &str) -> Vec<FeedbackRecord> {
        match self {
            Self::All => records,
            Self::Current => records.into_iter().filter(|r| r.page == page).collect(),
        }
    }
}

/// Order records newest first; ties fall back to id so output is stable.
pub fn sort_recent_first(records: &mut [FeedbackRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
}

#[cfg(test)]
#[path = "record_test.rs"]
mod tests;
