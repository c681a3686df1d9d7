//! HTTP error mapping.

use axum::{http::StatusCode, response::IntoResponse, Json};

/// Errors returned by handlers, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    Internal(dai_core::Error),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
}

impl From<dai_core::Error> for ApiError {
    fn from(err: dai_core::Error) -> Self {
        match err {
            e @ dai_core::Error::ArchiveNotFound(_) => ApiError::NotFound(e.to_string()),
            dai_core::Error::AccessDenied(msg) => ApiError::Forbidden(msg),
            dai_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            dai_core::Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Internal(err) => {
                tracing::error!(
                    subsystem = "api",
                    component = "error",
                    error = %err,
                    "Request failed"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn status_of(err: dai_core::Error) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_core_error_status_mapping() {
        assert_eq!(
            status_of(dai_core::Error::ArchiveNotFound(Uuid::nil())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(dai_core::Error::AccessDenied("no".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(dai_core::Error::InvalidInput("empty".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(dai_core::Error::Unauthorized("key".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(dai_core::Error::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
