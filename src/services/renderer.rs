// src/services/renderer.rs

//! Page rendering seam.
//!
//! The crawler only talks to a [`Renderer`], which hands out one
//! [`RenderContext`] per crawl. [`HttpRenderer`] is the bundled
//! implementation: it fetches pages over HTTP and extracts text with
//! [`PageExtractor`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use crate::error::{FetchError, Result};
use crate::models::{RenderOutcome, RenderedPage, RendererConfig};
use crate::services::extractor::PageExtractor;
use crate::utils::http::{create_page_client, is_html_content_type};

/// Source of render contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    type Context: RenderContext;

    /// Acquire a context for one crawl.
    ///
    /// Failing here is the only way a crawl can fail as a whole.
    async fn open(&self) -> Result<Self::Context>;
}

/// One crawl's exclusive handle on the renderer.
#[async_trait]
pub trait RenderContext: Send {
    /// Load `url`, giving up after `timeout`.
    async fn load(&mut self, url: &str, timeout: Duration) -> RenderOutcome;

    /// Release the context without awaiting.
    ///
    /// Runs when a crawl is dropped or unwinds before reaching
    /// [`close`](Self::close), so it must not block. Must be idempotent.
    fn release(&mut self);

    /// Release the context at the end of a crawl.
    async fn close(&mut self) {
        self.release();
    }
}

/// Renders pages by fetching their HTML.
///
/// Scripts are not executed, so client-rendered pages yield little text.
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    config: RendererConfig,
    extractor: Arc<PageExtractor>,
}

impl HttpRenderer {
    /// Build a renderer, compiling the configured selectors up front.
    pub fn new(config: RendererConfig) -> Result<Self> {
        let extractor = Arc::new(PageExtractor::new(&config)?);
        Ok(Self { config, extractor })
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    type Context = HttpContext;

    async fn open(&self) -> Result<HttpContext> {
        let client = create_page_client(&self.config)?;
        log::debug!("Opened HTTP render context ({})", self.config.user_agent);
        Ok(HttpContext {
            client: Some(client),
            extractor: Arc::clone(&self.extractor),
        })
    }
}

/// Render context backed by a dedicated HTTP client.
#[derive(Debug)]
pub struct HttpContext {
    client: Option<Client>,
    extractor: Arc<PageExtractor>,
}

impl HttpContext {
    async fn fetch_html(
        client: &Client,
        url: &str,
        timeout: Duration,
    ) -> std::result::Result<String, FetchError> {
        let response = client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !is_html_content_type(content_type) {
            return Err(FetchError::Unsupported {
                url: url.to_string(),
                content_type: content_type.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, timeout, e))
    }
}

#[async_trait]
impl RenderContext for HttpContext {
    async fn load(&mut self, url: &str, timeout: Duration) -> RenderOutcome {
        let Some(client) = &self.client else {
            return RenderOutcome::Failed(FetchError::Network {
                url: url.to_string(),
                message: "render context is closed".into(),
            });
        };

        let result: std::result::Result<RenderedPage, FetchError> =
            Self::fetch_html(client, url, timeout)
                .await
                .map(|html| self.extractor.extract(&html));
        RenderOutcome::from(result)
    }

    fn release(&mut self) {
        if self.client.take().is_some() {
            log::debug!("Closed HTTP render context");
        }
    }
}
