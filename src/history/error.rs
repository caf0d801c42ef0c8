use crate::climate::error::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Gave up on {url} after {attempts} attempts (last status {status})")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        status: reqwest::StatusCode,
    },

    #[error("Failed to parse JSON payload from {0}")]
    JsonParse(String, #[source] serde_json::Error),

    #[error("No data URL returned for {url}: {description}")]
    MissingDataUrl { url: String, description: String },

    #[error("Invalid year range {start}..={end}")]
    InvalidYearRange { start: i32, end: i32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}
