use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LiveSourceError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse JSON payload from {0}")]
    JsonParse(String, #[source] serde_json::Error),

    #[error("Payload from {source_name} is missing required field '{field}'")]
    MissingField {
        source_name: &'static str,
        field: &'static str,
    },

    #[error("Invalid observation timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("Observation list for station '{0}' is empty")]
    EmptyObservations(String),

    #[error("{0} requires a station id")]
    MissingStationId(&'static str),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("{source_name} did not answer within {timeout:?}")]
    Timeout {
        source_name: &'static str,
        timeout: Duration,
    },
}
