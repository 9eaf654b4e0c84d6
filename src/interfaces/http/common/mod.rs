//! Response envelope and error mapping shared by every HTTP module

pub mod id_path;
pub mod validated_json;

pub use id_path::IdPath;
pub use validated_json::{validation_details, ValidatedJson};

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::DomainError;

/// Standard API response wrapper.
///
/// On success: `{"success": true, "data": {...}}` (optionally with `message`).
/// On failure: `{"success": false, "error": "...", "details": [...]}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Per-field validation messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            error: None,
            details: None,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            data: None,
            error: Some(message.into()),
            details: None,
        }
    }

    pub fn validation(message: impl Into<String>, details: Vec<String>) -> Self {
        Self {
            details: if details.is_empty() { None } else { Some(details) },
            ..Self::error(message)
        }
    }
}

impl ApiResponse<()> {
    /// Success carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            error: None,
            details: None,
        }
    }
}

/// Error half of every handler's `Result`
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

/// Map a domain failure to its HTTP status and body. Internal failure text
/// is only exposed when `expose_internal` is set.
pub fn error_response(err: DomainError, expose_internal: bool) -> ApiError {
    let (status, body) = match err {
        DomainError::Validation { message, details } => (
            StatusCode::BAD_REQUEST,
            ApiResponse::validation(message, details),
        ),
        e @ DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, ApiResponse::error(e.to_string())),
        DomainError::Conflict(msg) => (StatusCode::BAD_REQUEST, ApiResponse::error(msg)),
        DomainError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, ApiResponse::error(msg)),
        DomainError::Internal(msg) => {
            let msg = if expose_internal {
                msg
            } else {
                "Internal Server Error".to_string()
            };
            (StatusCode::INTERNAL_SERVER_ERROR, ApiResponse::error(msg))
        }
    };
    (status, Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400_with_details() {
        let (status, Json(body)) =
            error_response(DomainError::validation(vec!["Score is required".into()]), false);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.as_deref(), Some("Validation Error"));
        assert_eq!(body.details, Some(vec!["Score is required".to_string()]));
    }

    #[test]
    fn conflict_is_a_bad_request() {
        let (status, _) = error_response(DomainError::Conflict("dup".into()), false);
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_text_is_hidden_outside_development() {
        let (status, Json(body)) =
            error_response(DomainError::Internal("pool timed out".into()), false);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.as_deref(), Some("Internal Server Error"));

        let (_, Json(body)) = error_response(DomainError::Internal("pool timed out".into()), true);
        assert_eq!(body.error.as_deref(), Some("pool timed out"));
    }

    #[test]
    fn empty_fields_are_omitted() {
        let json = serde_json::to_value(ApiResponse::<()>::error("nope")).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "nope"}));
    }
}
