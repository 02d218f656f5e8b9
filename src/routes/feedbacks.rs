//! `feedbacks` collection routes.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath};
use crate::error::ErrorBody;
use crate::record::{FeedbackRecord, NewFeedback};
use crate::services::feedback::{self, FeedbackError};
use crate::state::AppState;
use crate::store::StoreError;
use crate::store::remote::ResolutionPatch;

/// Error response: status code plus a JSON `{code, message}` body.
///
/// Extractor rejections are converted in `routes::extract`.
#[derive(Debug)]
pub struct ApiError(pub StatusCode, pub ErrorBody);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(self.1)).into_response()
    }
}

impl From<FeedbackError> for ApiError {
    fn from(err: FeedbackError) -> Self {
        if let FeedbackError::Store(store_err) = &err
            && !matches!(store_err, StoreError::NotFound(_))
        {
            tracing::error!(error = %store_err, "feedback store failure");
        }
        ApiError(feedback_error_to_status(&err), ErrorBody::from_error(&err))
    }
}

pub(crate) fn feedback_error_to_status(err: &FeedbackError) -> StatusCode {
    match err {
        FeedbackError::Invalid(_) => StatusCode::BAD_REQUEST,
        FeedbackError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
        FeedbackError::Store(StoreError::Rejected(_)) => StatusCode::BAD_REQUEST,
        FeedbackError::Store(StoreError::Transport(_) | StoreError::Remote { .. }) => StatusCode::BAD_GATEWAY,
        FeedbackError::Store(StoreError::Database(_) | StoreError::Decode(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

/// `GET /api/reviewers` — the reviewer roster, in display order.
pub async fn list_reviewers(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.roster.names().to_vec())
}

/// `GET /api/feedbacks?limit=N` — most recent records, newest first.
pub async fn list_feedbacks(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<FeedbackRecord>>, ApiError> {
    let records = feedback::list(&state, query.limit).await?;
    Ok(Json(records))
}

/// `POST /api/feedbacks` — create one record.
pub async fn create_feedback(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewFeedback>,
) -> Result<(StatusCode, Json<FeedbackRecord>), ApiError> {
    let record = feedback::create(&state, body).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `PATCH /api/feedbacks/:id` — set or clear the resolution.
pub async fn patch_feedback(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ResolutionPatch>,
) -> Result<Json<FeedbackRecord>, ApiError> {
    let record = feedback::set_resolved(&state, id, body.resolved, body.resolved_at).await?;
    Ok(Json(record))
}

/// `DELETE /api/feedbacks/:id` — delete one record.
pub async fn delete_feedback(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    feedback::delete(&state, id).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[cfg(test)]
#[path = "feedbacks_test.rs"]
mod tests;
