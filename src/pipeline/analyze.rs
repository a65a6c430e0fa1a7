// src/pipeline/analyze.rs

//! Scrape and analysis pipelines.

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::models::{
    AnalysisReport, Config, CrawlConfig, CrawlOutcome, LlmConfig, PageDetail, PageRecord,
};
use crate::services::{
    ChatClient, Crawler, ExtractiveSummarizer, HeuristicKeywordExtractor, KeywordExtractor,
    LlmKeywordExtractor, LlmSummarizer, Renderer, Summarizer,
};
use crate::utils::log;

/// Keyword extraction and summarization backends.
pub struct LanguageServices {
    pub keywords: Box<dyn KeywordExtractor>,
    pub summarizer: Box<dyn Summarizer>,
}

impl LanguageServices {
    /// Model-backed services when an API key is available, offline ones otherwise.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        match ChatClient::from_env(config)? {
            Some(client) => Ok(Self {
                keywords: Box::new(LlmKeywordExtractor::new(client.clone())),
                summarizer: Box::new(LlmSummarizer::new(client)),
            }),
            None => Ok(Self::offline()),
        }
    }

    pub fn offline() -> Self {
        Self {
            keywords: Box::new(HeuristicKeywordExtractor::new()),
            summarizer: Box::new(ExtractiveSummarizer::default()),
        }
    }
}

/// Extract keywords from `instructions` and crawl from `url`.
pub async fn run_scrape<R: Renderer>(
    renderer: R,
    keywords: &dyn KeywordExtractor,
    config: &CrawlConfig,
    cancel: CancellationToken,
    url: &str,
    instructions: &str,
) -> Result<CrawlOutcome> {
    let keywords = keywords.extract(instructions).await;
    let crawler = Crawler::new(renderer, &keywords, config.clone())?.with_cancellation(cancel);
    let outcome = crawler.run(url).await?;

    if outcome.pages.is_empty() {
        ::log::warn!("No relevant pages meeting score criteria found");
    } else {
        ::log::info!(
            "Scraping completed. Collected {} relevant pages",
            outcome.pages.len()
        );
    }
    Ok(outcome)
}

/// Scrape, summarize every recorded page and synthesize a report.
pub async fn run_analysis<R: Renderer>(
    renderer: R,
    services: &LanguageServices,
    config: &Config,
    cancel: CancellationToken,
    url: &str,
    instructions: &str,
) -> Result<AnalysisReport> {
    log::header("Rufus Analysis");
    ::log::info!("Analyzing {} for: {}", url, instructions);

    log::step(1, 3, "Extracting keywords and crawling");
    let outcome = run_scrape(
        renderer,
        services.keywords.as_ref(),
        &config.crawl,
        cancel,
        url,
        instructions,
    )
    .await?;

    if outcome.pages.is_empty() {
        return Ok(AnalysisReport::empty(instructions, url));
    }

    log::step(2, 3, &format!("Summarizing {} pages", outcome.pages.len()));
    let details = summarize_pages(
        &outcome.pages,
        services.summarizer.as_ref(),
        instructions,
        config.llm.max_concurrent,
    )
    .await;

    log::step(3, 3, "Generating final summary");
    let prompt = format!(
        "Based on the following information from multiple pages about {instructions}, \
         provide a comprehensive analysis and summary:"
    );
    let digest = services
        .summarizer
        .summarize(&combine_details(&details), &prompt)
        .await;

    log::summary(
        "Analysis",
        &[
            ("Pages", details.len().to_string()),
            ("Cumulative score", outcome.cumulative_score.to_string()),
            ("Stop reason", format!("{:?}", outcome.stop_reason)),
            ("Elapsed", format!("{:.1}s", outcome.elapsed_secs())),
        ],
    );

    Ok(AnalysisReport {
        query: instructions.to_string(),
        source_url: url.to_string(),
        collected_pages: details.len(),
        summary: digest.summary,
        key_points: digest.key_points,
        details,
    })
}

/// Summarize pages with bounded concurrency, keeping their order.
pub async fn summarize_pages(
    pages: &[PageRecord],
    summarizer: &dyn Summarizer,
    instructions: &str,
    max_concurrent: usize,
) -> Vec<PageDetail> {
    stream::iter(pages)
        .map(|page| async move {
            ::log::info!(
                "Processing page: {} (score: {})",
                page.url,
                page.relevance_score
            );
            let prompt = format!(
                "Based on the following content from {}, provide a detailed summary about {}",
                page.url, instructions
            );
            let digest = summarizer.summarize(&page.content, &prompt).await;
            PageDetail {
                title: page.title.clone(),
                url: page.url.clone(),
                score: page.relevance_score,
                content_summary: digest.summary,
                key_points: digest.key_points,
            }
        })
        .buffered(max_concurrent.max(1))
        .collect()
        .await
}

/// Join per-page summaries into one attributed text block.
fn combine_details(details: &[PageDetail]) -> String {
    details
        .iter()
        .map(|d| {
            format!(
                "--- From {} ({}) (Score: {}) ---\n{}",
                d.title, d.url, d.score, d.content_summary
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::models::Digest;

    /// Echoes the prompt, finishing later for earlier pages.
    struct SlowEcho;

    #[async_trait]
    impl Summarizer for SlowEcho {
        async fn summarize(&self, content: &str, prompt: &str) -> Digest {
            let delay = 100u64.saturating_sub(content.len() as u64 * 10);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Digest {
                summary: prompt.to_string(),
                key_points: vec![content.to_string()],
            }
        }
    }

    fn record(url: &str, content: &str, score: u32) -> PageRecord {
        PageRecord {
            url: url.into(),
            title: format!("Title {score}"),
            content: content.into(),
            relevance_score: score,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_summarize_pages_preserves_order() {
        let pages = vec![
            record("https://a.com/1", "a", 90),
            record("https://a.com/2", "bbbbb", 80),
            record("https://a.com/3", "ccccccc", 70),
        ];
        let details = summarize_pages(&pages, &SlowEcho, "burgers", 3).await;

        let urls: Vec<&str> = details.iter().map(|d| d.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.com/1", "https://a.com/2", "https://a.com/3"]);
        assert_eq!(
            details[0].content_summary,
            "Based on the following content from https://a.com/1, provide a detailed summary about burgers"
        );
        assert_eq!(details[1].key_points, vec!["bbbbb"]);
        assert_eq!(details[2].score, 70);
    }

    #[test]
    fn test_combine_details_format() {
        let details = vec![
            PageDetail {
                title: "Menu".into(),
                url: "https://a.com/menu".into(),
                score: 90,
                content_summary: "Burgers.".into(),
                key_points: Vec::new(),
            },
            PageDetail {
                title: "".into(),
                url: "https://a.com/x".into(),
                score: 61,
                content_summary: "Fries.".into(),
                key_points: Vec::new(),
            },
        ];
        assert_eq!(
            combine_details(&details),
            "--- From Menu (https://a.com/menu) (Score: 90) ---\nBurgers.\n\n\
             --- From  (https://a.com/x) (Score: 61) ---\nFries."
        );
    }

    #[test]
    fn test_offline_services_without_key() {
        let config = LlmConfig {
            api_key_env: "RUFUS_TEST_UNSET_KEY_VARIABLE".into(),
            ..LlmConfig::default()
        };
        assert!(LanguageServices::from_config(&config).is_ok());
    }
}
