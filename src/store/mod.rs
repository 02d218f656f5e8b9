//! Feedback store — the seam to the `feedbacks` document collection.
//!
//! DESIGN
//! ======
//! The widget and the HTTP service both talk to `dyn FeedbackStore`, so the
//! same operations run against memory (tests, no database configured),
//! Postgres (server), or a remote server over HTTP (widget hosts).
//!
//! ERROR HANDLING
//! ==============
//! Stores never retry. Every failure is returned to the caller, which decides
//! how to surface it (HTTP status, widget alert, inline message).

pub mod memory;
pub mod postgres;
pub mod remote;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use remote::RemoteStore;

use uuid::Uuid;

use crate::error::ErrorCode;
use crate::record::{FeedbackRecord, NewFeedback, Resolution};

/// Default number of records fetched for a list view.
pub const DEFAULT_LIST_LIMIT: usize = 100;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("feedback not found: {0}")]
    NotFound(Uuid),
    #[error("rejected by store: {0}")]
    Rejected(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("store responded with status {status}: {message}")]
    Remote { status: u16, message: String },
    #[error("response decode failed: {0}")]
    Decode(String),
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_FEEDBACK_NOT_FOUND",
            Self::Rejected(_) => "E_REJECTED",
            Self::Database(_) => "E_DATABASE",
            Self::Transport(_) => "E_TRANSPORT",
            Self::Remote { .. } => "E_REMOTE",
            Self::Decode(_) => "E_DECODE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Remote { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// STORE TRAIT
// =============================================================================

/// Operations supported by the `feedbacks` collection.
#[async_trait::async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Insert a validated submission. The store assigns `id` and `created_at`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the write fails.
    async fn add(&self, new: NewFeedback) -> Result<FeedbackRecord, StoreError>;

    /// Replace the resolution pair of one record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown ids, or the backend failure.
    async fn set_resolution(&self, id: Uuid, resolution: Resolution) -> Result<FeedbackRecord, StoreError>;

    /// Remove one record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown ids, or the backend failure.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// The `limit` most recent records, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the query fails.
    async fn recent(&self, limit: usize) -> Result<Vec<FeedbackRecord>, StoreError>;
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
