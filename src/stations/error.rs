use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read station catalog '{0}'")]
    CatalogRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse station catalog JSON")]
    JsonParse(#[from] serde_json::Error),

    #[error("Station catalog contains duplicate station id '{0}'")]
    DuplicateId(String),

    #[error("Station '{id}' has invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates {
        id: String,
        latitude: f64,
        longitude: f64,
    },

    #[error("Station catalog is empty")]
    Empty,
}
