//! Postgres-backed feedback store.
//!
//! SYSTEM CONTEXT
//! ==============
//! The `feedbacks` table is created by `src/db/migrations`. A check
//! constraint mirrors the resolution invariant, so a row can never be
//! resolved without `resolved_at` (or open with one).

use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use super::{FeedbackStore, StoreError};
use crate::record::{FeedbackRecord, NewFeedback, Resolution, now_ms};

type FeedbackRow = (Uuid, String, String, String, i64, i64, bool, Option<i64>);

const SELECT_COLUMNS: &str = "id, author, content, page, created_at, client_ts, resolved, resolved_at";

fn row_to_record(row: FeedbackRow) -> FeedbackRecord {
    let (id, author, content, page, created_at, timestamp, resolved, resolved_at) = row;
    FeedbackRecord { id, author, content, page, created_at, timestamp, resolved, resolved_at }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FeedbackStore for PgStore {
    async fn add(&self, new: NewFeedback) -> Result<FeedbackRecord, StoreError> {
        let record = FeedbackRecord::from_new(new, Uuid::new_v4(), now_ms());
        sqlx::query(
            "INSERT INTO feedbacks (id, author, content, page, created_at, client_ts, resolved, resolved_at)
             VALUES ($1, $2, $3, $4, $5, $6, FALSE, NULL)",
        )
        .bind(record.id)
        .bind(&record.author)
        .bind(&record.content)
        .bind(&record.page)
        .bind(record.created_at)
        .bind(record.timestamp)
        .execute(&self.pool)
        .await?;

        info!(id = %record.id, author = %record.author, page = %record.page, "feedback stored");
        Ok(record)
    }

    async fn set_resolution(&self, id: Uuid, resolution: Resolution) -> Result<FeedbackRecord, StoreError> {
        let sql = format!(
            "UPDATE feedbacks SET resolved = $2, resolved_at = $3 WHERE id = $1 RETURNING {SELECT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, FeedbackRow>(&sql)
            .bind(id)
            .bind(resolution.is_resolved())
            .bind(resolution.resolved_at())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))?;

        Ok(row_to_record(row))
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM feedbacks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        info!(%id, "feedback deleted");
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<FeedbackRecord>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let sql = format!("SELECT {SELECT_COLUMNS} FROM feedbacks ORDER BY created_at DESC, id DESC LIMIT $1");
        let rows = sqlx::query_as::<_, FeedbackRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), limit, "feedback listed");
        Ok(rows.into_iter().map(row_to_record).collect())
    }
}

#[cfg(test)]
#[path = "postgres_test.rs"]
mod tests;
