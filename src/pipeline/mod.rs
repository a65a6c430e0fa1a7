//! Pipeline entry points.
//!
//! - `run_scrape`: Extract keywords and crawl for relevant pages
//! - `run_analysis`: Scrape, then summarize the pages into a report

pub mod analyze;

pub use analyze::{LanguageServices, run_analysis, run_scrape, summarize_pages};
