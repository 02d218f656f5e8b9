//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the `feedbacks` collection API under a single Axum
//! router. CORS is permissive because the widget is embedded in reading
//! pages served from other origins.

pub mod extract;
pub mod feedbacks;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, patch};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/reviewers", get(feedbacks::list_reviewers))
        .route("/api/feedbacks", get(feedbacks::list_feedbacks).post(feedbacks::create_feedback))
        .route(
            "/api/feedbacks/{id}",
            patch(feedbacks::patch_feedback).delete(feedbacks::delete_feedback),
        )
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
