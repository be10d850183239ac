use reqwest::StatusCode;

// Custom error type for rate provider requests
#[derive(Debug, thiserror::Error)]
pub enum RateError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned status code {0}")]
    UpstreamStatus(StatusCode),
}
