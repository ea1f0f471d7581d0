use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed caller input (checkout id, checkout object).
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// A stored record exists but its payload is not usable.
    #[error("{0}")]
    InvalidRecord(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// A store write could not be applied (e.g. a counter batch targeting a missing product).
    #[error("{0}")]
    Persistence(String),

    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRecord(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::Persistence(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for failures raised by the store rather than by the data.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            AppError::Database(_) | AppError::Pool(_) | AppError::Persistence(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_status_code() {
        let error = AppError::BadRequest("Checkout ID is required".to_string());
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_record_status_code() {
        let error = AppError::InvalidRecord("Invalid Checkout Data Format".to_string());
        assert_eq!(error.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_database_error_is_persistence() {
        let error = AppError::Database(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error.is_persistence());
        assert!(AppError::Persistence("Product P1 not found".into()).is_persistence());
        assert!(!AppError::NotFound("x".into()).is_persistence());
        assert!(!AppError::InvalidRecord("x".into()).is_persistence());
    }

    #[test]
    fn test_message_is_plain_text() {
        let error = AppError::NotFound("No Checkout Found for the provided ID".into());
        assert_eq!(error.to_string(), "No Checkout Found for the provided ID");
    }

    #[tokio::test]
    async fn test_not_found_error_response() {
        let response = AppError::NotFound("Order not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
