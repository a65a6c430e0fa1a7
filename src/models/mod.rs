// src/models/mod.rs

//! Domain models for the crawler application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod crawl;
mod page;
mod report;

// Re-export all public types
pub use config::{Config, CrawlConfig, LlmConfig, RendererConfig};
pub use crawl::{CrawlOutcome, CrawlStats, CrawlStatus};
pub use page::{CrawlTarget, PageRecord, RenderOutcome, RenderedPage};
pub use report::{AnalysisReport, Digest, PageDetail};
