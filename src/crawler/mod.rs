//! Crawler module for acquiring site content
//!
//! This module contains the content acquisition pipeline:
//! - HTTP fetching with typed failures and optional retries
//! - HTML extraction of paragraph text and same-origin links
//! - The FIFO frontier with visited/queued deduplication
//! - The breadth-first crawl loop with page/time caps and cancellation

mod coordinator;
mod extractor;
mod fetcher;
mod frontier;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::{
    crawl, section_header, CrawlFailure, CrawlLimits, CrawlResult, StopReason,
};
pub use extractor::{extract, Page};
pub use fetcher::{build_http_client, fetch_url, Fetch, FetchError, HttpFetcher};
pub use frontier::Frontier;
