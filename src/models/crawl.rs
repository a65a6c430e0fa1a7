//! Crawl run status and results.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::PageRecord;

/// Lifecycle of a single crawl invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlStatus {
    Running,
    /// Recorded scores reached the cumulative threshold.
    StoppedThreshold,
    /// The frontier ran dry first.
    StoppedExhausted,
    /// Cancelled from outside or out of time.
    StoppedCancelled,
    Done,
}

impl CrawlStatus {
    pub fn is_running(self) -> bool {
        self == Self::Running
    }
}

/// Counters collected while crawling.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlStats {
    /// Pages handed to the renderer
    pub pages_rendered: usize,
    pub render_failures: usize,
    pub invalid_pages: usize,
    /// Targets dropped before rendering (visited, too deep, unusable URL)
    pub targets_skipped: usize,
    pub links_enqueued: usize,
}

/// Everything a crawl produced.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlOutcome {
    /// Recorded pages, highest score first
    pub pages: Vec<PageRecord>,
    pub cumulative_score: u64,
    /// Why the loop ended
    pub stop_reason: CrawlStatus,
    pub stats: CrawlStats,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl CrawlOutcome {
    pub fn elapsed_secs(&self) -> f64 {
        (self.end_time - self.start_time).num_milliseconds() as f64 / 1000.0
    }
}
