//! Page-level data: frontier entries, rendered pages, and recorded pages.

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// A URL waiting in the frontier together with its link distance from the seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub url: String,
    pub depth: usize,
}

impl CrawlTarget {
    pub fn new(url: impl Into<String>, depth: usize) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// A page as produced by a renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPage {
    /// Document title
    pub title: String,

    /// Full visible body text, used for the validity check
    pub body_text: String,

    /// Main content selected for scoring
    pub content: String,

    /// Renderer's own judgement of whether this is a real page
    pub is_valid: bool,

    /// Raw `href` values in document order
    pub links: Vec<String>,
}

/// What happened when a target was loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// A usable page.
    Fetched(RenderedPage),
    /// The page loaded but looks like an error page or has no body.
    Invalid,
    /// The page could not be loaded at all.
    Failed(FetchError),
}

impl From<std::result::Result<RenderedPage, FetchError>> for RenderOutcome {
    fn from(result: std::result::Result<RenderedPage, FetchError>) -> Self {
        match result {
            Ok(page) if page.is_valid => Self::Fetched(page),
            Ok(_) => Self::Invalid,
            Err(error) => Self::Failed(error),
        }
    }
}

/// A page whose relevance reached the per-page floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    pub content: String,
    pub relevance_score: u32,
}
