use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use derive_more::derive::Display;
use serde_json::json;

use crate::email::SourceError;

pub type AppResult<T> = Result<T, AppError>;
pub type AppJsonResult<T> = AppResult<Json<T>>;

#[derive(Debug, Display)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Internal(anyhow::Error),
    /// The mail source is not authenticated or not reachable. Fatal to a run.
    SourceUnavailable(SourceError),
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal(error)
    }
}

impl From<SourceError> for AppError {
    fn from(error: SourceError) -> Self {
        AppError::SourceUnavailable(error)
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SourceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

// This centralizes all different errors from our app in one place
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            AppError::NotFound(msg) | AppError::BadRequest(msg) => msg,
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                "Internal server error".to_string()
            }
            AppError::SourceUnavailable(e) => {
                tracing::error!("Mail source unavailable: {}", e);
                format!("Mail source unavailable: {}", e)
            }
        };

        (
            status,
            Json(json!({"error": {
                "code": status.as_u16(),
                "message": message
            }})),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_unavailable_is_service_unavailable() {
        let err: AppError = SourceError::NotConfigured.into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_bad_request_keeps_message() {
        let err = AppError::BadRequest("max_results must be positive".to_string());
        assert_eq!(err.to_string(), "max_results must be positive");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
