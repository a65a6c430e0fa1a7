//! Summaries and the final analysis report.

use serde::{Deserialize, Serialize};

/// Summary text plus the points pulled out of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    pub summary: String,
    pub key_points: Vec<String>,
}

/// Per-page entry of an [`AnalysisReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDetail {
    pub title: String,
    pub url: String,
    pub score: u32,
    pub content_summary: String,
    pub key_points: Vec<String>,
}

/// Result of the full scrape-and-summarize pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub query: String,
    pub source_url: String,
    pub collected_pages: usize,
    pub summary: String,
    pub key_points: Vec<String>,
    pub details: Vec<PageDetail>,
}

impl AnalysisReport {
    pub const NO_CONTENT_SUMMARY: &'static str =
        "No relevant content found. Try different keywords or a different starting URL.";

    /// Report for a crawl that recorded nothing.
    pub fn empty(query: &str, source_url: &str) -> Self {
        Self {
            query: query.to_string(),
            source_url: source_url.to_string(),
            collected_pages: 0,
            summary: Self::NO_CONTENT_SUMMARY.to_string(),
            key_points: Vec::new(),
            details: Vec::new(),
        }
    }
}
