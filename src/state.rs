//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the feedback store behind the `FeedbackStore` trait so the same
//! handlers serve Postgres in production and memory in tests.

use std::sync::Arc;

use crate::record::Roster;
use crate::store::{FeedbackStore, MemoryStore};

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FeedbackStore>,
    pub roster: Arc<Roster>,
    /// Upper bound applied to `?limit=` on list requests.
    pub max_list_limit: usize,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn FeedbackStore>, roster: Roster, max_list_limit: usize) -> Self {
        Self { store, roster: Arc::new(roster), max_list_limit }
    }

    /// State backed by a fresh in-memory store.
    #[must_use]
    pub fn in_memory(roster: Roster, max_list_limit: usize) -> Self {
        Self::new(Arc::new(MemoryStore::new()), roster, max_list_limit)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
