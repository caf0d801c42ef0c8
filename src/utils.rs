use crate::error::IslasError;
use chrono::{DateTime, Utc};
use log::info;
use std::io;
use std::path::{Path, PathBuf};

const CACHE_DIR_NAME: &str = "islas_weather_cache";

pub fn get_cache_dir() -> Result<PathBuf, IslasError> {
    dirs::cache_dir()
        .ok_or_else(|| {
            IslasError::CacheDirResolution(io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine system cache directory",
            ))
        })
        .map(|p| p.join(CACHE_DIR_NAME))
}

pub async fn ensure_cache_dir_exists(path: &Path) -> Result<(), IslasError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(IslasError::CacheDirCreation(
                    path.to_path_buf(),
                    io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        "Cache path exists but is not a directory",
                    ),
                ));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating cache directory: {}", path.display());
            tokio::fs::create_dir_all(path)
                .await
                .map_err(|e| IslasError::CacheDirCreation(path.to_path_buf(), e))
        }
        Err(e) => Err(IslasError::CacheDirCreation(path.to_path_buf(), e)),
    }
}

/// Source of "now" for cache ages and climatology date windows.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
