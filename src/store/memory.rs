//! In-memory feedback store.
//!
//! Used by the server when `DATABASE_URL` is unset and by tests. Each
//! operation holds the lock for its whole duration, which gives the same
//! per-document atomicity a hosted document store provides.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{FeedbackStore, StoreError};
use crate::record::{FeedbackRecord, NewFeedback, Resolution, now_ms, sort_recent_first};

#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<Uuid, FeedbackRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing record verbatim (keeps its id and timestamps).
    pub async fn insert(&self, record: FeedbackRecord) {
        self.records.write().await.insert(record.id, record);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl FeedbackStore for MemoryStore {
    async fn add(&self, new: NewFeedback) -> Result<FeedbackRecord, StoreError> {
        let mut records = self.records.write().await;
        // Keep creation times strictly increasing so "newest first" is unambiguous
        // for writes landing in the same millisecond.
        let latest = records.values().map(|r| r.created_at).max().unwrap_or(i64::MIN);
        let created_at = now_ms().max(latest.saturating_add(1));
        let record = FeedbackRecord::from_new(new, Uuid::new_v4(), created_at);
        records.insert(record.id, record.clone());
        debug!(id = %record.id, page = %record.page, "memory store: feedback added");
        Ok(record)
    }

    async fn set_resolution(&self, id: Uuid, resolution: Resolution) -> Result<FeedbackRecord, StoreError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        record.apply(resolution);
        Ok(record.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records.remove(&id).map(|_| ()).ok_or(StoreError::NotFound(id))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<FeedbackRecord>, StoreError> {
        let records = self.records.read().await;
        let mut out: Vec<FeedbackRecord> = records.values().cloned().collect();
        sort_recent_first(&mut out);
        out.truncate(limit);
        Ok(out)
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
