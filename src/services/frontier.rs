// src/services/frontier.rs

//! FIFO crawl frontier with same-origin-first insertion.

use std::collections::{HashSet, VecDeque};

use crate::models::CrawlTarget;
use crate::utils::url::{OriginContext, normalize};

/// Normalized URLs that have been handed to the renderer.
pub type VisitedSet = HashSet<String>;

/// Work queue of `(url, depth)` pairs.
///
/// Pop order is strictly FIFO. Links found on one page are appended as a
/// batch, same-origin links ahead of the rest; batches from earlier pages are
/// never overtaken.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<CrawlTarget>,
}

impl Frontier {
    /// A frontier holding only the seed at depth 0.
    pub fn seeded(seed: impl Into<String>) -> Self {
        let mut frontier = Self::default();
        frontier.push(CrawlTarget::new(seed, 0));
        frontier
    }

    pub fn push(&mut self, target: CrawlTarget) {
        self.queue.push_back(target);
    }

    pub fn pop(&mut self) -> Option<CrawlTarget> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Enqueue the links of one page at `depth`.
    ///
    /// Links are normalized against `origin`; unusable ones, repeats within
    /// the batch and already visited URLs are dropped. Returns the number of
    /// targets added.
    pub fn enqueue_links<I, S>(
        &mut self,
        links: I,
        depth: usize,
        origin: &OriginContext,
        visited: &VisitedSet,
    ) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let (same_origin, other): (Vec<String>, Vec<String>) = links
            .into_iter()
            .filter_map(|href| normalize(href.as_ref(), origin))
            .filter(|url| !visited.contains(url) && seen.insert(url.clone()))
            .partition(|url| origin.is_same_origin(url));

        let added = same_origin.len() + other.len();
        self.queue.extend(
            same_origin
                .into_iter()
                .chain(other)
                .map(|url| CrawlTarget::new(url, depth)),
        );
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> OriginContext {
        OriginContext::from_seed("https://a.com").unwrap()
    }

    fn drain(frontier: &mut Frontier) -> Vec<String> {
        std::iter::from_fn(|| frontier.pop()).map(|t| t.url).collect()
    }

    #[test]
    fn test_seeded_frontier() {
        let mut frontier = Frontier::seeded("https://a.com");
        assert_eq!(frontier.len(), 1);
        assert_eq!(frontier.pop(), Some(CrawlTarget::new("https://a.com", 0)));
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_same_origin_first_within_page() {
        let mut frontier = Frontier::default();
        let added = frontier.enqueue_links(
            ["https://ext.org/1", "/menu", "https://ext.org/2", "about"],
            1,
            &origin(),
            &VisitedSet::new(),
        );

        assert_eq!(added, 4);
        assert_eq!(
            drain(&mut frontier),
            vec![
                "https://a.com/menu",
                "https://a.com/about",
                "https://ext.org/1",
                "https://ext.org/2",
            ]
        );
    }

    #[test]
    fn test_batches_keep_fifo_order_between_pages() {
        let origin = origin();
        let visited = VisitedSet::new();
        let mut frontier = Frontier::default();
        frontier.enqueue_links(["https://ext.org/first"], 1, &origin, &visited);
        frontier.enqueue_links(["/second"], 1, &origin, &visited);

        // An earlier cross-origin link is not overtaken by a later same-origin one
        assert_eq!(
            drain(&mut frontier),
            vec!["https://ext.org/first", "https://a.com/second"]
        );
    }

    #[test]
    fn test_drops_visited_invalid_and_repeated_links() {
        let mut visited = VisitedSet::new();
        visited.insert("https://a.com/seen".to_string());

        let mut frontier = Frontier::default();
        let added = frontier.enqueue_links(
            ["/seen", "#top", "mailto:a@a.com", "/new", "/new", ""],
            2,
            &origin(),
            &visited,
        );

        assert_eq!(added, 1);
        assert_eq!(frontier.pop(), Some(CrawlTarget::new("https://a.com/new", 2)));
        assert!(frontier.is_empty());
    }
}
