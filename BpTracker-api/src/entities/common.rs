use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bp_tracker_domain::services::TrackerError;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Error response format for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type/code - machine-readable identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a not found error response
    pub fn not_found(resource: &str) -> Self {
        Self {
            error: "not_found".to_string(),
            message: format!("The requested {} could not be found", resource),
            details: None,
        }
    }

    /// Create a validation error response
    pub fn validation_error(message: &str, details: Option<serde_json::Value>) -> Self {
        Self {
            error: "validation_error".to_string(),
            message: message.to_string(),
            details,
        }
    }

    /// Create a bad request error response
    pub fn bad_request(message: &str) -> Self {
        Self {
            error: "bad_request".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    /// Create an internal error response
    pub fn internal_error() -> Self {
        Self {
            error: "internal_error".to_string(),
            message: "An unexpected error occurred".to_string(),
            details: None,
        }
    }

    fn status(&self) -> StatusCode {
        match self.error.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" | "bad_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<TrackerError> for ErrorResponse {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::Validation(message) => ErrorResponse::validation_error(&message, None),
            TrackerError::NotFound(id) => Self {
                details: Some(serde_json::json!({ "id": id })),
                ..ErrorResponse::not_found("reading")
            },
            TrackerError::FeatureDisabled(feature) => ErrorResponse::not_found(feature),
            other => {
                error!("Tracker error: {}", other);
                ErrorResponse::internal_error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorResponse::not_found("reading").status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorResponse::bad_request("bad").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorResponse::validation_error("bad", None).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorResponse::internal_error().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_tracker_error() {
        let response = ErrorResponse::from(TrackerError::Validation("pulse: required".to_string()));
        assert_eq!(response.error, "validation_error");
        assert_eq!(response.message, "pulse: required");

        let response = ErrorResponse::from(TrackerError::NotFound("42".to_string()));
        assert_eq!(response.error, "not_found");
        assert_eq!(response.details, Some(serde_json::json!({ "id": "42" })));

        let response = ErrorResponse::from(TrackerError::FeatureDisabled("charts"));
        assert_eq!(response.message, "The requested charts could not be found");

        let response = ErrorResponse::from(TrackerError::IdsExhausted);
        assert_eq!(response.error, "internal_error");
    }
}
