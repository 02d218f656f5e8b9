//! HTTP client for a remote `feedbacks` collection.
//!
//! Thin wrapper over the server's `/api/feedbacks` routes. Status mapping and
//! body decoding live in pure functions (`decode_response`, `status_error`)
//! so they can be tested without a server.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use super::{FeedbackStore, StoreError};
use crate::error::ErrorBody;
use crate::record::{FeedbackRecord, NewFeedback, Resolution};

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const CONNECT_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// CLIENT
// =============================================================================

pub struct RemoteStore {
    http: reqwest::Client,
    base_url: String,
}

impl RemoteStore {
    /// Build a client for the server at `base_url` (e.g. `http://127.0.0.1:3000`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS.min(timeout_secs)))
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Fetch the reviewer roster published by the server.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the request fails or the body is malformed.
    pub async fn reviewers(&self) -> Result<Vec<String>, StoreError> {
        let request = self.http.get(self.endpoint("/api/reviewers"));
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, StoreError> {
        let response = request.send().await.map_err(|e| StoreError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| StoreError::Transport(e.to_string()))?;
        debug!(status, bytes = text.len(), "feedback store response");
        decode_response(status, &text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// `PATCH /api/feedbacks/{id}` body.
#[derive(Debug, Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionPatch {
    pub resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<i64>,
}

impl From<Resolution> for ResolutionPatch {
    fn from(resolution: Resolution) -> Self {
        Self { resolved: resolution.is_resolved(), resolved_at: resolution.resolved_at() }
    }
}

#[derive(serde::Deserialize)]
struct OkBody {
    ok: bool,
}

// =============================================================================
// PARSING
// =============================================================================

fn decode_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, StoreError> {
    if !(200..300).contains(&status) {
        return Err(status_error(status, body));
    }
    serde_json::from_str(body).map_err(|e| StoreError::Decode(e.to_string()))
}

fn status_error(status: u16, body: &str) -> StoreError {
    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => err.message,
        Err(_) => body.trim().to_owned(),
    };
    match status {
        400 | 422 => StoreError::Rejected(message),
        _ => StoreError::Remote { status, message },
    }
}

// =============================================================================
// STORE IMPL
// =============================================================================

#[async_trait::async_trait]
impl FeedbackStore for RemoteStore {
    async fn add(&self, new: NewFeedback) -> Result<FeedbackRecord, StoreError> {
        let request = self.http.post(self.endpoint("/api/feedbacks")).json(&new);
        self.send(request).await
    }

    async fn set_resolution(&self, id: Uuid, resolution: Resolution) -> Result<FeedbackRecord, StoreError> {
        let request = self
            .http
            .patch(self.endpoint(&format!("/api/feedbacks/{id}")))
            .json(&ResolutionPatch::from(resolution));
        self.send(request).await.map_err(|e| not_found_for(e, id))
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let request = self.http.delete(self.endpoint(&format!("/api/feedbacks/{id}")));
        let body: OkBody = self.send(request).await.map_err(|e| not_found_for(e, id))?;
        if body.ok {
            Ok(())
        } else {
            Err(StoreError::Decode("delete response reported ok=false".into()))
        }
    }

    async fn recent(&self, limit: usize) -> Result<Vec<FeedbackRecord>, StoreError> {
        let request = self
            .http
            .get(self.endpoint("/api/feedbacks"))
            .query(&[("limit", limit)]);
        self.send(request).await
    }
}

/// 404 on an id-addressed route means the record is gone.
fn not_found_for(err: StoreError, id: Uuid) -> StoreError {
    match err {
        StoreError::Remote { status: 404, .. } => StoreError::NotFound(id),
        other => other,
    }
}

#[cfg(test)]
#[path = "remote_test.rs"]
mod tests;
