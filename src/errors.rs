use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid reference: {0}")]
    InvalidReference(String),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("the requested time is outside opening hours ({hours})")]
    OutsideOpeningHours { hours: String },

    #[error("{0}")]
    SlotConflict(String),

    #[error("{0}")]
    ImmutableBooking(String),

    #[error("booking is already cancelled")]
    AlreadyCancelled,

    #[error("bookings in the past cannot be cancelled")]
    PastBooking,

    #[error("unauthorized")]
    Unauthorized,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::SlotConflict(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidReference(_)
            | AppError::Validation(_)
            | AppError::OutsideOpeningHours { .. }
            | AppError::ImmutableBooking(_)
            | AppError::AlreadyCancelled
            | AppError::PastBooking => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    /// Failures that are not the caller's fault.
    pub fn is_unexpected(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if self.is_unexpected() {
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NotFound("booking 1".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::SlotConflict("taken".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::PastBooking.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::ImmutableBooking("frozen".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert!(AppError::Internal(anyhow::anyhow!("boom")).is_unexpected());
        assert!(!AppError::AlreadyCancelled.is_unexpected());
    }

    #[tokio::test]
    async fn test_internal_errors_do_not_leak_detail() {
        let response = AppError::Internal(anyhow::anyhow!("secret table name")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!text.contains("secret"));
        assert!(text.contains("internal server error"));
    }
}
