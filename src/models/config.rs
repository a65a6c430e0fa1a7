//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Traversal limits and stopping thresholds
    #[serde(default)]
    pub crawl: CrawlConfig,

    /// HTTP renderer settings
    #[serde(default)]
    pub renderer: RendererConfig,

    /// Chat-completions endpoint used for keywords and summaries
    #[serde(default)]
    pub llm: LlmConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        self.crawl.validate()?;
        if self.renderer.user_agent.trim().is_empty() {
            return Err(AppError::validation("renderer.user_agent is empty"));
        }
        if self.renderer.content_selectors.is_empty() {
            return Err(AppError::validation(
                "renderer.content_selectors must not be empty",
            ));
        }
        if self.llm.chunk_size == 0 {
            return Err(AppError::validation("llm.chunk_size must be > 0"));
        }
        if self.llm.max_concurrent == 0 {
            return Err(AppError::validation("llm.max_concurrent must be > 0"));
        }
        if self.llm.timeout_secs == 0 {
            return Err(AppError::validation("llm.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

/// Traversal limits and the two-threshold stopping policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Deepest link distance from the seed that is still rendered
    #[serde(default = "defaults::max_depth")]
    pub max_depth: usize,

    /// Per-page floor: pages scoring below this are not recorded
    #[serde(default = "defaults::min_score")]
    pub min_score: u32,

    /// Crawl stops once recorded scores add up to this value
    #[serde(default = "defaults::cumulative_score_threshold")]
    pub cumulative_score_threshold: u64,

    /// Timeout for a single page load
    #[serde(default = "defaults::render_timeout")]
    pub render_timeout_secs: u64,

    /// Pause after each page load in milliseconds
    #[serde(default)]
    pub request_delay_ms: u64,

    /// Wall-clock budget for the whole crawl
    #[serde(default)]
    pub max_duration_secs: Option<u64>,
}

impl CrawlConfig {
    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.render_timeout_secs == 0 {
            return Err(AppError::validation("crawl.render_timeout_secs must be > 0"));
        }
        if self.max_duration_secs == Some(0) {
            return Err(AppError::validation("crawl.max_duration_secs must be > 0"));
        }
        Ok(())
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: defaults::max_depth(),
            min_score: defaults::min_score(),
            cumulative_score_threshold: defaults::cumulative_score_threshold(),
            render_timeout_secs: defaults::render_timeout(),
            request_delay_ms: 0,
            max_duration_secs: None,
        }
    }
}

/// HTTP renderer and content extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Redirects followed before a load fails
    #[serde(default = "defaults::max_redirects")]
    pub max_redirects: usize,

    /// Main-content containers, tried in order
    #[serde(default = "defaults::content_selectors")]
    pub content_selectors: Vec<String>,

    /// Page chrome hidden before text extraction
    #[serde(default = "defaults::excluded_selectors")]
    pub excluded_selectors: Vec<String>,

    /// Phrases that mark a short page as an error page
    #[serde(default = "defaults::error_phrases")]
    pub error_phrases: Vec<String>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            max_redirects: defaults::max_redirects(),
            content_selectors: defaults::content_selectors(),
            excluded_selectors: defaults::excluded_selectors(),
            error_phrases: defaults::error_phrases(),
        }
    }
}

/// Chat-completions settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API
    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    #[serde(default = "defaults::model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "defaults::api_key_env")]
    pub api_key_env: String,

    #[serde(default = "defaults::llm_timeout")]
    pub timeout_secs: u64,

    /// Token budget for a summary response
    #[serde(default = "defaults::max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "defaults::temperature")]
    pub temperature: f32,

    /// Largest content chunk sent in one request, in characters
    #[serde(default = "defaults::chunk_size")]
    pub chunk_size: usize,

    /// Pages summarized at the same time
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl LlmConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::api_base(),
            model: defaults::model(),
            api_key_env: defaults::api_key_env(),
            timeout_secs: defaults::llm_timeout(),
            max_tokens: defaults::max_tokens(),
            temperature: defaults::temperature(),
            chunk_size: defaults::chunk_size(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

mod defaults {
    // Crawl defaults
    pub fn max_depth() -> usize {
        2
    }
    pub fn min_score() -> u32 {
        60
    }
    pub fn cumulative_score_threshold() -> u64 {
        600
    }
    pub fn render_timeout() -> u64 {
        45
    }

    // Renderer defaults
    pub fn user_agent() -> String {
        "Rufus Web Scraper 1.0".into()
    }
    pub fn max_redirects() -> usize {
        10
    }
    pub fn content_selectors() -> Vec<String> {
        [
            "main",
            "article",
            "#content",
            ".content",
            "#main-content",
            ".main-content",
            ".post",
            ".entry",
            ".article",
            ".page-content",
            ".entry-content",
            "[role=\"main\"]",
            ".main",
            "#main",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
    pub fn excluded_selectors() -> Vec<String> {
        [
            "nav",
            "footer",
            "header",
            ".menu",
            "#menu",
            ".navigation",
            ".sidebar",
            "#sidebar",
            ".ads",
            ".advertisement",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
    pub fn error_phrases() -> Vec<String> {
        [
            "404",
            "not found",
            "access denied",
            "forbidden",
            "error",
            "unavailable",
            "sorry",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    // LLM defaults
    pub fn api_base() -> String {
        "https://api.openai.com/v1".into()
    }
    pub fn model() -> String {
        "gpt-4".into()
    }
    pub fn api_key_env() -> String {
        "OPENAI_API_KEY".into()
    }
    pub fn llm_timeout() -> u64 {
        60
    }
    pub fn max_tokens() -> u32 {
        800
    }
    pub fn temperature() -> f32 {
        0.3
    }
    pub fn chunk_size() -> usize {
        4000
    }
    pub fn max_concurrent() -> usize {
        3
    }
}
