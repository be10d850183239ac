use reqwest::StatusCode;
use std::time::Duration;

// Custom error type for request serving and cache refresh operations
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Server returned status code {0}")]
    UpstreamStatus(StatusCode),

    #[error("No cache entry for this request")]
    NotFound,

    #[error("Cache storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<url::ParseError> for FetchError {
    fn from(err: url::ParseError) -> Self {
        FetchError::InvalidRequest(err.to_string())
    }
}
