//! FIFO crawl frontier with visited/queued bookkeeping
//!
//! URLs are keyed by their normalized string form. A URL is handed out at most
//! once: it is rejected on push if it was already visited or is still queued,
//! and `pop_next` skips anything already visited.

use std::collections::{HashSet, VecDeque};
use url::Url;

#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<Url>,
    queued: HashSet<String>,
    visited: HashSet<String>,
}

impl Frontier {
    /// Creates a frontier holding only the seed
    pub fn new(seed: Url) -> Self {
        let mut frontier = Self::default();
        frontier.push(seed);
        frontier
    }

    /// Enqueues a URL at the tail
    ///
    /// # Returns
    ///
    /// * `true` - The URL was new and is now queued
    /// * `false` - The URL was already visited or queued
    pub fn push(&mut self, url: Url) -> bool {
        let key = url.as_str();
        if self.visited.contains(key) || self.queued.contains(key) {
            return false;
        }
        self.queued.insert(key.to_string());
        self.queue.push_back(url);
        true
    }

    /// Pops the head of the queue and marks it visited
    pub fn pop_next(&mut self) -> Option<Url> {
        while let Some(url) = self.queue.pop_front() {
            self.queued.remove(url.as_str());
            if self.visited.insert(url.as_str().to_string()) {
                return Some(url);
            }
        }
        None
    }

    /// Number of URLs waiting to be visited
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of URLs handed out so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse(&format!("https://example.gov{}", path)).unwrap()
    }

    #[test]
    fn test_fifo_order() {
        let mut frontier = Frontier::new(url("/"));
        frontier.push(url("/a"));
        frontier.push(url("/b"));

        assert_eq!(frontier.pop_next(), Some(url("/")));
        assert_eq!(frontier.pop_next(), Some(url("/a")));
        assert_eq!(frontier.pop_next(), Some(url("/b")));
        assert_eq!(frontier.pop_next(), None);
    }

    #[test]
    fn test_rejects_queued_duplicate() {
        let mut frontier = Frontier::new(url("/"));
        assert!(frontier.push(url("/a")));
        assert!(!frontier.push(url("/a")));
        assert_eq!(frontier.len(), 2);
    }

    #[test]
    fn test_rejects_visited_url() {
        let mut frontier = Frontier::new(url("/"));
        frontier.pop_next();
        assert!(frontier.is_visited(&url("/")));
        assert!(!frontier.push(url("/")));
        assert!(frontier.is_empty());
        assert_eq!(frontier.visited_count(), 1);
    }
}
