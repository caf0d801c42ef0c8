use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read history artifact '{0}'")]
    ArtifactRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse history artifact '{0}'")]
    ArtifactParse(PathBuf, #[source] serde_json::Error),

    #[error("Failed to encode history artifact for station '{0}'")]
    ArtifactEncode(String, #[source] serde_json::Error),

    #[error("Failed to write history artifact '{0}'")]
    ArtifactWrite(PathBuf, #[source] std::io::Error),

    #[error("Historical store is unreachable: {0}")]
    Unreachable(String),
}
