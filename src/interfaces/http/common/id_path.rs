//! Numeric `{id}` path segment
//!
//! `IdPath` behaves like `Path<i32>`, but a segment that is not an `i32`
//! answers 400 with the usual JSON envelope instead of axum's plain-text
//! rejection.

use axum::extract::rejection::PathRejection;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::debug;

use super::ApiResponse;

pub const INVALID_ID: &str = "ID must be an integer";

pub struct IdPath(pub i32);

pub struct IdPathRejection(PathRejection);

impl IntoResponse for IdPathRejection {
    fn into_response(self) -> Response {
        debug!(rejection = %self.0.body_text(), "Rejected path id");
        let body = ApiResponse::<()>::validation("Validation Error", vec![INVALID_ID.to_string()]);
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = IdPathRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i32>::from_request_parts(parts, state)
            .await
            .map_err(IdPathRejection)?;
        Ok(IdPath(id))
    }
}
