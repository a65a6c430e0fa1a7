//! Storage abstractions for crawl results and analysis reports.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{AnalysisReport, PageRecord};

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for result storage backends.
#[async_trait]
pub trait ReportStorage: Send + Sync {
    /// Persist an analysis report under `key`, returning where it went.
    async fn save_report(&self, key: &str, report: &AnalysisReport) -> Result<String>;

    /// Persist raw page records under `key`, returning where they went.
    async fn save_pages(&self, key: &str, pages: &[PageRecord]) -> Result<String>;

    /// Load a previously saved report, if present.
    async fn load_report(&self, key: &str) -> Result<Option<AnalysisReport>>;
}
