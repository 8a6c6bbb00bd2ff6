use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorResponse;

/// Failures surfaced by `/scan`. None of them are retried.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Model not loaded")]
    ModelUnavailable,
    #[error("{0}")]
    Preprocessing(String),
    #[error("{0}")]
    Inference(String),
    #[error("{0}")]
    Upload(String),
    #[error("Missing required multipart field 'file'")]
    MissingFile,
}

impl ResponseError for ScanError {
    fn status_code(&self) -> StatusCode {
        match self {
            ScanError::MissingFile => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            detail: self.to_string(),
        })
    }
}
