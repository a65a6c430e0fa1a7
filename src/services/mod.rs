//! Service layer for the crawler application.
//!
//! This module contains the business logic for:
//! - Crawl control (`Crawler`) over a `Frontier`
//! - Relevance scoring (`RelevanceScorer`)
//! - Page rendering (`HttpRenderer`, `PageExtractor`)
//! - Keyword extraction and summarization, optionally model-backed

mod crawler;
mod extractor;
mod frontier;
mod keywords;
mod llm;
mod renderer;
mod scorer;
mod summarizer;

pub use crawler::Crawler;
pub use extractor::PageExtractor;
pub use frontier::{Frontier, VisitedSet};
pub use keywords::{HeuristicKeywordExtractor, KeywordExtractor, LlmKeywordExtractor};
pub use llm::{ChatClient, ChatPrompt};
pub use renderer::{HttpContext, HttpRenderer, RenderContext, Renderer};
pub use scorer::{RelevanceScorer, Scorer};
pub use summarizer::{
    ExtractiveSummarizer, LlmSummarizer, Summarizer, chunk_content, extract_key_points,
};
