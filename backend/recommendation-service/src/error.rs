use crate::services::RecommendationError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let code = self.status_code();
        let message = match self {
            AppError::NotFound(msg)
            | AppError::ValidationError(msg)
            | AppError::Authentication(msg)
            | AppError::ServiceUnavailable(msg)
            | AppError::Internal(msg) => msg.clone(),
        };

        HttpResponse::build(code).json(ErrorResponse {
            error: message,
            code: code.as_u16(),
        })
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RecommendationError> for AppError {
    fn from(err: RecommendationError) -> Self {
        match err {
            RecommendationError::UserNotFound(_) => AppError::NotFound(err.to_string()),
            RecommendationError::InvalidQuota { .. } => AppError::ValidationError(err.to_string()),
            // Store details stay in the logs
            RecommendationError::DataSourceUnavailable { pipeline, .. } => {
                AppError::ServiceUnavailable(format!("{pipeline} data source unavailable"))
            }
        }
    }
}
