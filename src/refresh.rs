//! Re-scraping the site
//!
//! `Refresher::refresh` always crawls (the crawl cache is bypassed), then
//! replaces the memoized crawl and the stored snapshot with the new result.
//! `Refresher::spawn_periodic` runs that on a timer until cancelled.
//!
//! A crawl that was cancelled is partial and is never stored. Storage failures
//! are logged; the fresh result is still returned and cached.
//!
//! The seed is normalized once here. The crawl cache, the snapshot table and
//! the run history are all keyed by that normalized form.

use crate::cache::{Fingerprint, MemoCache};
use crate::crawler::{crawl, CrawlLimits, CrawlResult, Fetch, StopReason};
use crate::llm::Dispatch;
use crate::storage::{RunOutcome, Snapshot, SnapshotStore, SqliteStorage};
use crate::url::seed_and_origin;
use crate::UrlError;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Everything a refresh needs, shared with the session through `Arc`s
pub struct Refresher {
    seed: String,
    limits: CrawlLimits,
    config_hash: String,
    fetcher: Arc<dyn Fetch>,
    crawl_cache: Arc<MemoCache<CrawlResult>>,
    response_cache: Arc<MemoCache<Dispatch>>,
    store: Arc<Mutex<SqliteStorage>>,
}

impl Refresher {
    /// Builds a refresher for `seed`
    ///
    /// # Errors
    ///
    /// `UrlError` if the seed is not a crawlable http(s) URL
    pub fn new(
        seed: &str,
        limits: CrawlLimits,
        config_hash: String,
        fetcher: Arc<dyn Fetch>,
        crawl_cache: Arc<MemoCache<CrawlResult>>,
        response_cache: Arc<MemoCache<Dispatch>>,
        store: Arc<Mutex<SqliteStorage>>,
    ) -> Result<Self, UrlError> {
        let (seed, _) = seed_and_origin(seed)?;
        Ok(Self {
            seed: seed.to_string(),
            limits,
            config_hash,
            fetcher,
            crawl_cache,
            response_cache,
            store,
        })
    }

    /// The normalized seed URL
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Crawls the site now and publishes the result
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - The new crawl (possibly cut short, see `stop`)
    /// * `Err(UrlError)` - The seed URL is not crawlable
    pub async fn refresh(&self, cancel: &CancellationToken) -> Result<CrawlResult, UrlError> {
        let result = self.crawl_and_persist(cancel).await?;
        if result.stop != StopReason::Cancelled {
            self.crawl_cache
                .insert(Fingerprint::for_crawl(&self.seed), result.clone());
            tracing::info!(
                "Refreshed {}: {} pages visited, {} skipped ({})",
                self.seed,
                result.pages_visited(),
                result.failures.len(),
                result.stop.to_db_string()
            );
        }
        Ok(result)
    }

    /// Crawls, records the run and stores the snapshot
    ///
    /// Answers memoized for the previous content are dropped once new content
    /// exists. The crawl cache is left to the caller.
    pub(crate) async fn crawl_and_persist(
        &self,
        cancel: &CancellationToken,
    ) -> Result<CrawlResult, UrlError> {
        let run_id = self.with_store(|store| store.start_run(&self.seed, &self.config_hash));

        let result = match crawl(&self.seed, self.fetcher.as_ref(), &self.limits, cancel).await {
            Ok(result) => result,
            Err(e) => {
                if let Some(run_id) = run_id {
                    self.with_store(|store| store.fail_run(run_id, &e.to_string()));
                }
                return Err(e);
            }
        };

        if let Some(run_id) = run_id {
            let outcome = RunOutcome::from_crawl(&result);
            self.with_store(|store| store.finish_run(run_id, &outcome));
        }

        if result.stop == StopReason::Cancelled {
            tracing::warn!(
                "Crawl of {} was cancelled after {} pages; keeping the previous content",
                self.seed,
                result.pages_visited()
            );
        } else {
            let snapshot = Snapshot::from_crawl(&result);
            self.with_store(|store| store.save_snapshot(&snapshot));
            self.response_cache.clear();
        }

        Ok(result)
    }

    /// Starts the timer-driven refresh loop
    ///
    /// The first refresh happens one full `interval` after the call. The loop
    /// ends when `cancel` fires; an in-flight crawl sees the same token.
    pub fn spawn_periodic(
        self: Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval() fires immediately; the startup content is already fresh
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                tracing::info!("Periodic refresh of {}", self.seed);
                if let Err(e) = self.refresh(&cancel).await {
                    tracing::error!("Periodic refresh failed: {}", e);
                }
            }

            tracing::debug!("Periodic refresh task stopped");
        })
    }

    /// Runs a storage call, logging instead of propagating its error
    fn with_store<T, F>(&self, op: F) -> Option<T>
    where
        F: FnOnce(&mut SqliteStorage) -> crate::storage::StorageResult<T>,
    {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        match op(&mut store) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Snapshot store error: {}", e);
                None
            }
        }
    }
}
