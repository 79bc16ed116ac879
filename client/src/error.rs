use thiserror::Error;

/// Everything that can go wrong between pressing submit and rendering.
/// Every variant ends on the same failure path.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("invalid endpoint URL: {0}")]
    Endpoint(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response body is null")]
    NullResponse,
}
