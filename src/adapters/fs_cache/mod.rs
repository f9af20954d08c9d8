// Cache directory adapter - Temp output allocation in a process-owned cache dir

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use crate::domain::errors::*;
use crate::ports::*;

/// Suffix appended to every allocated output name
const NAME_SUFFIX: &str = "-merged";

/// Temp output allocation backed by a cache directory
pub struct CacheDirAdapter {
    cache_dir: PathBuf,
}

impl CacheDirAdapter {
    /// Create adapter rooted at `cache_dir`; the directory is created lazily
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// `<system temp>/mergex`
    pub fn default_cache_dir() -> PathBuf {
        std::env::temp_dir().join("mergex")
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn candidate_path(&self, extension: &str) -> PathBuf {
        let extension = extension.trim_start_matches('.');
        self.cache_dir
            .join(format!("{}{}.{}", Uuid::new_v4(), NAME_SUFFIX, extension))
    }
}

impl Default for CacheDirAdapter {
    fn default() -> Self {
        Self::new(Self::default_cache_dir())
    }
}

#[async_trait]
impl TempFilePort for CacheDirAdapter {
    async fn allocate(&self, extension: &str) -> Result<PathBuf, DomainError> {
        if extension.trim_start_matches('.').is_empty() {
            return Err(DomainError::TempAllocationFailure(
                "Output extension cannot be empty".to_string(),
            ));
        }

        fs::create_dir_all(&self.cache_dir).await.map_err(|e| {
            DomainError::TempAllocationFailure(format!(
                "Failed to create cache directory {}: {}",
                self.cache_dir.display(),
                e
            ))
        })?;

        let path = self.candidate_path(extension);

        // The engine must not find anything at the destination.
        if fs::try_exists(&path).await.unwrap_or(false) {
            fs::remove_file(&path).await.map_err(|e| {
                DomainError::TempAllocationFailure(format!(
                    "Failed to clear existing file {}: {}",
                    path.display(),
                    e
                ))
            })?;
        }

        debug!(path = %path.display(), "Allocated temp output");
        Ok(path)
    }

    async fn discard(&self, path: &Path) -> Result<(), DomainError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::InternalError(format!(
                "Failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn persist(&self, from: &Path, to: &Path) -> Result<(), DomainError> {
        if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                DomainError::InternalError(format!(
                    "Failed to create output directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        if fs::rename(from, to).await.is_ok() {
            return Ok(());
        }

        // Rename fails across filesystems; fall back to copy + delete.
        fs::copy(from, to).await.map_err(|e| {
            DomainError::InternalError(format!(
                "Failed to move {} to {}: {}",
                from.display(),
                to.display(),
                e
            ))
        })?;
        self.discard(from).await
    }
}
