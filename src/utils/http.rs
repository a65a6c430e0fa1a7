// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::redirect::Policy;

use crate::error::Result;
use crate::models::{LlmConfig, RendererConfig};

/// Create the HTTP client used for page loads.
///
/// Timeouts are applied per request by the renderer.
pub fn create_page_client(config: &RendererConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .redirect(Policy::limited(config.max_redirects))
        .build()?;
    Ok(client)
}

/// Create the HTTP client used for chat-completions calls.
pub fn create_llm_client(config: &LlmConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Whether a `Content-Type` header value describes an HTML or text document.
pub fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime.is_empty()
        || mime == "text/html"
        || mime == "application/xhtml+xml"
        || mime == "text/plain"
}
