//! API error type and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use super::task_store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Task {id} not found")]
    NotFound { id: String },

    #[error("Task store failure: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            // Not-found carries no body.
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND.into_response(),
            ApiError::Store(ref err) => {
                tracing::error!("Task store failure: {}", err);
                (
                    self.status_code(),
                    Json(json!({ "error": self.to_string() })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = ApiError::from(StoreError::from(io));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::not_found("abc").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let response = ApiError::Store(StoreError::Io(io)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
