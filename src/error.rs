use crate::climate::error::StoreError;
use crate::config::ConfigError;
use crate::history::error::ImportError;
use crate::live::error::LiveSourceError;
use crate::stations::error::CatalogError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IslasError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    LiveSource(#[from] LiveSourceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine cache directory")]
    CacheDirResolution(#[source] std::io::Error),
}
