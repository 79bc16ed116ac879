use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{field} must be {expected} (got {value:?})")]
    InvalidInput {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("model failure: {0}")]
    Model(#[from] anyhow::Error),

    #[error("blocking task failed")]
    Blocking,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Model(_) | ApiError::Blocking => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // The form client takes its failure path on any non-JSON body.
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(format!("Error: {}", self))
    }
}
