//! Feedback service — create, list, resolve, delete.
//!
//! DESIGN
//! ======
//! The server re-validates every submission against the roster even though
//! the widget validates first: the collection is reachable by any HTTP
//! client. Resolution times supplied by clients are honored only when they
//! mark a record resolved; a resolved patch without a time gets the server
//! clock, an open patch always clears the time.

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::record::{FeedbackRecord, NewFeedback, Resolution, ValidationError, now_ms};
use crate::state::AppState;
use crate::store::{DEFAULT_LIST_LIMIT, StoreError};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ErrorCode for FeedbackError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Invalid(_) => false,
            Self::Store(e) => e.retryable(),
        }
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Validate and store a submission.
///
/// # Errors
///
/// Returns [`FeedbackError::Invalid`] for rejected submissions (nothing is
/// written) or the store failure.
pub async fn create(state: &AppState, new: NewFeedback) -> Result<FeedbackRecord, FeedbackError> {
    let new = new.validate(&state.roster).inspect_err(|e| {
        warn!(error = %e, "feedback submission rejected");
    })?;
    let record = state.store.add(new).await?;
    info!(id = %record.id, author = %record.author, page = %record.page, "feedback created");
    Ok(record)
}

/// Most recent records, newest first. `limit` defaults to 100 and is clamped
/// to the configured maximum.
///
/// # Errors
///
/// Returns the store failure.
pub async fn list(state: &AppState, limit: Option<usize>) -> Result<Vec<FeedbackRecord>, FeedbackError> {
    let limit = effective_limit(limit, state.max_list_limit);
    Ok(state.store.recent(limit).await?)
}

pub(crate) fn effective_limit(requested: Option<usize>, max: usize) -> usize {
    requested.unwrap_or(DEFAULT_LIST_LIMIT).min(max)
}

/// Set or clear the resolution of one record.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] (wrapped) for unknown ids.
pub async fn set_resolved(
    state: &AppState,
    id: Uuid,
    resolved: bool,
    resolved_at: Option<i64>,
) -> Result<FeedbackRecord, FeedbackError> {
    let resolution = resolution_for(resolved, resolved_at, now_ms());
    let record = state.store.set_resolution(id, resolution).await?;
    info!(%id, resolved, "feedback resolution updated");
    Ok(record)
}

pub(crate) fn resolution_for(resolved: bool, resolved_at: Option<i64>, now: i64) -> Resolution {
    match (resolved, resolved_at) {
        (true, Some(at)) => Resolution::Resolved { at },
        (true, None) => Resolution::Resolved { at: now },
        (false, _) => Resolution::Open,
    }
}

/// Delete one record.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] (wrapped) for unknown ids.
pub async fn delete(state: &AppState, id: Uuid) -> Result<(), FeedbackError> {
    state.store.delete(id).await?;
    info!(%id, "feedback deleted");
    Ok(())
}

#[cfg(test)]
#[path = "feedback_test.rs"]
mod tests;
