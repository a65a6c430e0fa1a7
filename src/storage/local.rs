//! Local filesystem storage implementation.
//!
//! Keys are paths relative to the storage root. Writes go to a temporary
//! sibling file first and are renamed into place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{AnalysisReport, PageRecord};
use crate::storage::ReportStorage;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(path)
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<String> {
        let bytes = serde_json::to_vec_pretty(value)?;
        let path = self.write_bytes(key, &bytes).await?;
        Ok(path.display().to_string())
    }

    /// Read JSON data, returning None if the file doesn't exist.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match tokio::fs::read(self.path(key)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl ReportStorage for LocalStorage {
    async fn save_report(&self, key: &str, report: &AnalysisReport) -> Result<String> {
        let location = self.write_json(key, report).await?;
        log::info!(
            "Report with {} pages written to {}",
            report.collected_pages,
            location
        );
        Ok(location)
    }

    async fn save_pages(&self, key: &str, pages: &[PageRecord]) -> Result<String> {
        let location = self.write_json(key, pages).await?;
        log::info!("{} page records written to {}", pages.len(), location);
        Ok(location)
    }

    async fn load_report(&self, key: &str) -> Result<Option<AnalysisReport>> {
        self.read_json(key).await
    }
}
