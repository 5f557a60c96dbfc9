use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Error taxonomy for the booking workflows.
///
/// Everything except `Persistence` is an expected business condition and comes
/// back to the caller as a structured `{success: false, message}` body with
/// HTTP 400, so clients branch on the success flag instead of catching faults.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InsufficientFunds(String),

    #[error("invalid id '{0}', expected a number")]
    Parse(String),

    #[error("database error")]
    Persistence(#[from] sqlx::Error),

    #[error("storage error")]
    Storage(#[from] std::io::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::NotFound(_)
            | ApiError::Conflict(_)
            | ApiError::InsufficientFunds(_)
            | ApiError::Parse(_) => StatusCode::BAD_REQUEST,
            ApiError::Persistence(_) | ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Persistence(ref e) => tracing::error!("persistence error: {:?}", e),
            ApiError::Storage(ref e) => tracing::error!("storage error: {:?}", e),
            _ => {}
        }

        let body = json!({
            "success": false,
            "message": self.to_string(),
        });

        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_failures_map_to_bad_request() {
        assert_eq!(
            ApiError::Validation("missing booking ids".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("customer not found".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict("seat already booked".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InsufficientFunds("wallet too low".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Parse("abc".into()).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn persistence_errors_escalate() {
        let err = ApiError::Persistence(sqlx::Error::RowNotFound);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn parse_error_names_the_offending_token() {
        let msg = ApiError::Parse("9a".into()).to_string();
        assert!(msg.contains("9a"));
    }
}
