// src/services/crawler.rs

//! Crawl controller.
//!
//! Drives one crawl from a seed URL: pops targets from the [`Frontier`],
//! renders them, scores valid pages and stops once recorded relevance reaches
//! the cumulative threshold or the frontier runs dry.

use chrono::Utc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::models::{
    CrawlConfig, CrawlOutcome, CrawlStats, CrawlStatus, CrawlTarget, PageRecord, RenderOutcome,
    RenderedPage,
};
use crate::services::frontier::{Frontier, VisitedSet};
use crate::services::renderer::{RenderContext, Renderer};
use crate::services::scorer::{RelevanceScorer, Scorer};
use crate::utils::url::{OriginContext, absolutize_seed, normalize};

/// Mutable state of a single crawl, owned by one [`Crawler::run`] call.
#[derive(Debug)]
struct CrawlState {
    frontier: Frontier,
    visited: VisitedSet,
    records: Vec<PageRecord>,
    cumulative_score: u64,
    status: CrawlStatus,
    stats: CrawlStats,
}

impl CrawlState {
    fn new(seed: &str) -> Self {
        Self {
            frontier: Frontier::seeded(seed),
            visited: VisitedSet::new(),
            records: Vec::new(),
            cumulative_score: 0,
            status: CrawlStatus::Running,
            stats: CrawlStats::default(),
        }
    }
}

/// Owns a crawl's render context and releases it if the crawl never
/// reaches [`ContextGuard::close`], e.g. because its future was dropped.
struct ContextGuard<C: RenderContext> {
    context: C,
    closed: bool,
}

impl<C: RenderContext> ContextGuard<C> {
    fn new(context: C) -> Self {
        Self {
            context,
            closed: false,
        }
    }

    async fn close(&mut self) {
        self.context.close().await;
        self.closed = true;
    }
}

impl<C: RenderContext> Drop for ContextGuard<C> {
    fn drop(&mut self) {
        if !self.closed {
            log::warn!("Crawl ended early, releasing render context");
            self.context.release();
        }
    }
}

/// Score-bounded breadth-first crawler.
pub struct Crawler<R, S = RelevanceScorer> {
    renderer: R,
    scorer: S,
    config: CrawlConfig,
    cancel: CancellationToken,
}

impl<R: Renderer> Crawler<R, RelevanceScorer> {
    /// Build a crawler that scores pages against `keywords`.
    pub fn new<I, K>(renderer: R, keywords: I, config: CrawlConfig) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let scorer = RelevanceScorer::new(keywords)?;
        Ok(Self::with_scorer(renderer, scorer, config))
    }
}

impl<R: Renderer, S: Scorer> Crawler<R, S> {
    pub fn with_scorer(renderer: R, scorer: S, config: CrawlConfig) -> Self {
        Self {
            renderer,
            scorer,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop the crawl between pages once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this crawler's runs.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Crawl from `start_url` and return the recorded pages, best first.
    pub async fn crawl(&self, start_url: &str) -> Result<Vec<PageRecord>> {
        Ok(self.run(start_url).await?.pages)
    }

    /// Crawl from `start_url` and return everything the run produced.
    ///
    /// Fails only if the seed has no usable origin or the renderer cannot
    /// be opened. Page-level failures are logged and skipped.
    pub async fn run(&self, start_url: &str) -> Result<CrawlOutcome> {
        let start_time = Utc::now();
        let seed = absolutize_seed(start_url);
        let origin = OriginContext::from_seed(&seed)?;

        log::info!(
            "Crawling {} (max depth {}, min score {}, threshold {})",
            seed,
            self.config.max_depth,
            self.config.min_score,
            self.config.cumulative_score_threshold
        );

        let mut guard = ContextGuard::new(self.renderer.open().await?);
        let mut state = CrawlState::new(&seed);
        self.drive(&mut guard.context, &mut state, &origin).await;
        guard.close().await;

        // Stable, so equal scores keep discovery order
        state
            .records
            .sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));

        log::info!(
            "Crawl finished ({:?}): {} pages recorded, cumulative score {}, {} rendered",
            state.status,
            state.records.len(),
            state.cumulative_score,
            state.stats.pages_rendered
        );

        Ok(CrawlOutcome {
            pages: state.records,
            cumulative_score: state.cumulative_score,
            stop_reason: state.status,
            stats: state.stats,
            start_time,
            end_time: Utc::now(),
        })
    }

    async fn drive(
        &self,
        context: &mut R::Context,
        state: &mut CrawlState,
        origin: &OriginContext,
    ) {
        let deadline = self.config.max_duration().map(|d| Instant::now() + d);

        while state.status.is_running() {
            if self.cancel.is_cancelled() || deadline.is_some_and(|d| Instant::now() >= d) {
                log::warn!("Crawl cancelled with {} targets left", state.frontier.len());
                state.status = CrawlStatus::StoppedCancelled;
                break;
            }

            let Some(target) = state.frontier.pop() else {
                state.status = CrawlStatus::StoppedExhausted;
                break;
            };

            let Some(url) = self.admit(&target, state, origin) else {
                state.stats.targets_skipped += 1;
                continue;
            };

            state.stats.pages_rendered += 1;
            match context.load(&url, self.config.render_timeout()).await {
                RenderOutcome::Fetched(page) => {
                    self.handle_page(&url, target.depth, page, state, origin)
                }
                RenderOutcome::Invalid => {
                    state.stats.invalid_pages += 1;
                    log::debug!("Invalid page, not expanding: {}", url);
                }
                RenderOutcome::Failed(error) => {
                    state.stats.render_failures += 1;
                    log::warn!("Render failed: {}", error);
                }
            }

            let delay = self.config.request_delay();
            if state.status.is_running() && !delay.is_zero() {
                let wake = Instant::now() + delay;
                let wake = deadline.map_or(wake, |d| wake.min(d));
                tokio::select! {
                    _ = tokio::time::sleep_until(wake) => {}
                    _ = self.cancel.cancelled() => {}
                }
            }
        }
    }

    /// Decide whether `target` gets rendered; marks it visited if so.
    fn admit(
        &self,
        target: &CrawlTarget,
        state: &mut CrawlState,
        origin: &OriginContext,
    ) -> Option<String> {
        if target.depth > self.config.max_depth {
            log::debug!("Too deep ({}): {}", target.depth, target.url);
            return None;
        }
        let Some(url) = normalize(&target.url, origin) else {
            log::debug!("Unusable URL: {}", target.url);
            return None;
        };
        if !state.visited.insert(url.clone()) {
            log::debug!("Already visited: {}", url);
            return None;
        }
        Some(url)
    }

    fn handle_page(
        &self,
        url: &str,
        depth: usize,
        page: RenderedPage,
        state: &mut CrawlState,
        origin: &OriginContext,
    ) {
        let score = self.scorer.score(&page.content);

        if score >= self.config.min_score {
            state.cumulative_score += u64::from(score);
            log::info!(
                "[{}] {} (depth {}, cumulative {}/{})",
                score,
                url,
                depth,
                state.cumulative_score,
                self.config.cumulative_score_threshold
            );
            state.records.push(PageRecord {
                url: url.to_string(),
                title: page.title,
                content: page.content,
                relevance_score: score,
            });

            if state.cumulative_score >= self.config.cumulative_score_threshold {
                log::info!("Cumulative score threshold reached");
                state.status = CrawlStatus::StoppedThreshold;
                return;
            }
        } else {
            log::debug!("[{}] {} below minimum score", score, url);
        }

        if depth < self.config.max_depth {
            let added = state
                .frontier
                .enqueue_links(&page.links, depth + 1, origin, &state.visited);
            state.stats.links_enqueued += added;
            log::debug!("Queued {} links from {}", added, url);
        }
    }
}
