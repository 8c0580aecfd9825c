//! Crawl coordination - the breadth-first crawl loop
//!
//! Starting from the seed, the loop pops the frontier head, fetches and
//! extracts it, appends its URL-tagged text to the aggregate and enqueues the
//! same-origin links it has not seen yet. It stops when:
//! - the frontier is exhausted
//! - the page cap or the time cap is reached
//! - the cancellation token fires (checked at every frontier pop)
//!
//! A failed fetch is logged and recorded; it never aborts the crawl.

use crate::config::SiteConfig;
use crate::crawler::extractor::Page;
use crate::crawler::fetcher::Fetch;
use crate::crawler::frontier::Frontier;
use crate::url::seed_and_origin;
use crate::UrlError;
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Safety caps for one crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlLimits {
    /// Maximum number of URLs dequeued
    pub max_pages: usize,
    /// Maximum elapsed time before the crawl stops dequeuing
    pub max_duration: Duration,
    /// Pause between two fetches
    pub request_delay: Duration,
}

impl CrawlLimits {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            max_duration: Duration::from_secs(config.max_duration_secs),
            request_delay: Duration::from_millis(config.request_delay_ms),
        }
    }
}

impl Default for CrawlLimits {
    fn default() -> Self {
        Self {
            max_pages: 500,
            max_duration: Duration::from_secs(600),
            request_delay: Duration::ZERO,
        }
    }
}

/// Why a crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every reachable same-origin page was visited
    Exhausted,
    PageLimit,
    TimeLimit,
    Cancelled,
    /// Not crawled in this process; loaded from a stored snapshot
    Restored,
}

impl StopReason {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Exhausted => "exhausted",
            Self::PageLimit => "page_limit",
            Self::TimeLimit => "time_limit",
            Self::Cancelled => "cancelled",
            Self::Restored => "restored",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "exhausted" => Some(Self::Exhausted),
            "page_limit" => Some(Self::PageLimit),
            "time_limit" => Some(Self::TimeLimit),
            "cancelled" => Some(Self::Cancelled),
            "restored" => Some(Self::Restored),
            _ => None,
        }
    }
}

/// A page that was dequeued but could not be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlFailure {
    pub url: String,
    pub reason: String,
}

/// Everything one crawl produced
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlResult {
    pub seed: String,
    /// URL-tagged page texts in visit order
    pub aggregated_text: String,
    /// Every dequeued URL, once each, in visit order
    pub visited: Vec<String>,
    pub failures: Vec<CrawlFailure>,
    pub stop: StopReason,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlResult {
    /// Rebuilds a result from stored parts
    pub fn restored(
        seed: String,
        aggregated_text: String,
        visited: Vec<String>,
        refreshed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            seed,
            aggregated_text,
            visited,
            failures: Vec::new(),
            stop: StopReason::Restored,
            started_at: refreshed_at,
            finished_at: refreshed_at,
        }
    }

    pub fn pages_visited(&self) -> usize {
        self.visited.len()
    }

    /// Pages whose text made it into the aggregate
    pub fn pages_extracted(&self) -> usize {
        self.visited.len() - self.failures.len()
    }

    pub fn is_exhaustive(&self) -> bool {
        self.stop == StopReason::Exhausted
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Header placed in front of each page's text in the aggregate
pub fn section_header(url: &str) -> String {
    format!("\n\nContent from {}:\n", url)
}

/// Crawls the seed's origin breadth-first
///
/// # Arguments
///
/// * `seed` - URL the crawl starts from; its origin bounds the crawl
/// * `fetcher` - Source of markup
/// * `limits` - Page/time caps and politeness delay
/// * `cancel` - Checked before every dequeue and raced against each fetch
///
/// # Returns
///
/// * `Ok(CrawlResult)` - The crawl ran (possibly stopped early, see `stop`)
/// * `Err(UrlError)` - The seed is not a crawlable http(s) URL
///
/// # Example
///
/// ```no_run
/// use site_chat::config::HttpConfig;
/// use site_chat::crawler::{crawl, CrawlLimits, HttpFetcher};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = HttpFetcher::new(&HttpConfig::default())?;
/// let result = crawl(
///     "https://energy.maryland.gov/Pages/default.aspx",
///     &fetcher,
///     &CrawlLimits::default(),
///     &CancellationToken::new(),
/// )
/// .await?;
/// println!("Visited {} pages", result.pages_visited());
/// # Ok(())
/// # }
/// ```
pub async fn crawl<F>(
    seed: &str,
    fetcher: &F,
    limits: &CrawlLimits,
    cancel: &CancellationToken,
) -> Result<CrawlResult, UrlError>
where
    F: Fetch + ?Sized,
{
    let (seed, origin) = seed_and_origin(seed)?;
    tracing::info!("Starting crawl of {} from {}", origin, seed);

    let started_at = Utc::now();
    let start = Instant::now();

    let mut frontier = Frontier::new(seed.clone());
    let mut visited: Vec<String> = Vec::new();
    let mut aggregated_text = String::new();
    let mut failures = Vec::new();

    let stop = loop {
        if frontier.is_empty() {
            break StopReason::Exhausted;
        }

        if cancel.is_cancelled() {
            tracing::info!("Crawl cancelled after {} pages", visited.len());
            break StopReason::Cancelled;
        }

        if visited.len() >= limits.max_pages {
            tracing::warn!(
                "Page cap of {} reached with {} URLs still queued",
                limits.max_pages,
                frontier.len()
            );
            break StopReason::PageLimit;
        }

        if start.elapsed() >= limits.max_duration {
            tracing::warn!(
                "Time cap of {:?} reached with {} URLs still queued",
                limits.max_duration,
                frontier.len()
            );
            break StopReason::TimeLimit;
        }

        if !visited.is_empty() && !limits.request_delay.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => break StopReason::Cancelled,
                _ = tokio::time::sleep(limits.request_delay) => {}
            }
        }

        let Some(url) = frontier.pop_next() else {
            break StopReason::Exhausted;
        };
        tracing::debug!("Fetching {} ({} queued)", url, frontier.len());

        let fetched = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Crawl cancelled while fetching {}", url);
                break StopReason::Cancelled;
            }
            result = fetcher.fetch(&url) => result,
        };
        // An abandoned fetch leaves no trace in the result
        visited.push(url.to_string());

        match fetched {
            Ok(markup) => {
                let page = Page::from_markup(url, &markup, &origin);
                append_page(&mut aggregated_text, &page);

                let mut discovered = 0;
                for link in page.outbound_links {
                    if frontier.push(link) {
                        discovered += 1;
                    }
                }
                tracing::debug!("{}: {} new links", page.url, discovered);
            }
            Err(e) => {
                tracing::warn!("Skipping {}: {}", url, e);
                failures.push(CrawlFailure {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
        }

        if visited.len() % 25 == 0 {
            tracing::info!(
                "Progress: {} pages visited, {} queued, {} failed, {:.1}s elapsed",
                visited.len(),
                frontier.len(),
                failures.len(),
                start.elapsed().as_secs_f64()
            );
        }
    };

    tracing::info!(
        "Crawl finished ({}): {} pages visited, {} failed, {} chars of text in {:?}",
        stop.to_db_string(),
        visited.len(),
        failures.len(),
        aggregated_text.len(),
        start.elapsed()
    );

    Ok(CrawlResult {
        seed: seed.to_string(),
        aggregated_text,
        visited,
        failures,
        stop,
        started_at,
        finished_at: Utc::now(),
    })
}

fn append_page(aggregate: &mut String, page: &Page) {
    aggregate.push_str(&section_header(page.url.as_str()));
    aggregate.push_str(&page.text);
}
