//! Extractors whose rejections use the API's JSON error body.
//!
//! axum's stock `Json` and `Path` reject with a plain-text response. These
//! wrappers run the stock extractor and turn its rejection into an
//! [`ApiError`], keeping the rejection's status code.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;

use super::feedbacks::ApiError;
use crate::error::ErrorBody;

pub const E_INVALID_BODY: &str = "E_INVALID_BODY";
pub const E_INVALID_PATH: &str = "E_INVALID_PATH";

/// JSON request body.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Typed path parameters.
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(status = %rejection.status(), "request body rejected");
        ApiError(
            rejection.status(),
            ErrorBody { code: E_INVALID_BODY.to_owned(), message: rejection.body_text() },
        )
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(status = %rejection.status(), "request path rejected");
        ApiError(
            rejection.status(),
            ErrorBody { code: E_INVALID_PATH.to_owned(), message: rejection.body_text() },
        )
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
