//! Request/response handlers behind the UI
//!
//! A `Session` owns the explicit cache handles, the snapshot store and the
//! model backend. The UI calls its handlers and prints what they return:
//! - `ask` answers one message against the site content
//! - `refresh` re-crawls now
//! - `visited_urls` lists the indexed URLs
//! - `status` reports on the content without crawling
//!
//! Content is resolved in this order: the memoized crawl, then a stored
//! snapshot younger than the cache TTL, then a new crawl. Memoized answers
//! are dropped whenever the content they were built from is replaced.

use crate::cache::{CacheEntry, Fingerprint, MemoCache};
use crate::chunker::chunk;
use crate::config::Config;
use crate::crawler::{CrawlLimits, CrawlResult, Fetch, HttpFetcher, StopReason};
use crate::llm::{build_backend, respond, Dispatch, LanguageModel};
use crate::output::StatusReport;
use crate::refresh::Refresher;
use crate::storage::{open_storage, Snapshot, SnapshotStore, SqliteStorage};
use crate::SiteChatError;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Refresh runs listed in a status report
const STATUS_RUNS: usize = 5;

/// What the UI shows for one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub response: String,
    /// Partial answer or missing content; shown next to the response
    pub warning: Option<String>,
    pub pages_indexed: usize,
}

/// One user's conversation with one site
pub struct Session {
    seed: String,
    max_chunk_size: usize,
    refresh_enabled: bool,
    refresh_interval: std::time::Duration,
    model: Arc<dyn LanguageModel>,
    crawl_cache: Arc<MemoCache<CrawlResult>>,
    response_cache: Arc<MemoCache<Dispatch>>,
    store: Arc<Mutex<SqliteStorage>>,
    refresher: Arc<Refresher>,
    cancel: CancellationToken,
}

impl Session {
    /// Builds a session with the production fetcher, backend and database
    ///
    /// # Errors
    ///
    /// Fails on a missing credential, an unbuildable HTTP client or an
    /// unopenable database.
    pub fn from_config(config: &Config, config_hash: String) -> Result<Self, SiteChatError> {
        let api_key = config.api_key()?;
        let model: Arc<dyn LanguageModel> = Arc::from(build_backend(&config.model, api_key)?);
        let fetcher: Arc<dyn Fetch> = Arc::new(HttpFetcher::new(&config.http)?);
        let store = open_storage(Path::new(&config.storage.database_path))?;

        Self::with_components(config, config_hash, fetcher, model, store)
    }

    /// Builds a session from explicit collaborators
    ///
    /// # Errors
    ///
    /// Fails when the configured seed is not a crawlable URL.
    pub fn with_components(
        config: &Config,
        config_hash: String,
        fetcher: Arc<dyn Fetch>,
        model: Arc<dyn LanguageModel>,
        store: SqliteStorage,
    ) -> Result<Self, SiteChatError> {
        let ttl = config.cache_ttl();
        let crawl_cache = Arc::new(MemoCache::new(ttl));
        let response_cache = Arc::new(MemoCache::new(ttl));
        let store = Arc::new(Mutex::new(store));

        let refresher = Arc::new(Refresher::new(
            &config.site.seed_url,
            CrawlLimits::from_config(&config.site),
            config_hash,
            fetcher,
            Arc::clone(&crawl_cache),
            Arc::clone(&response_cache),
            Arc::clone(&store),
        )?);

        Ok(Self {
            seed: refresher.seed().to_string(),
            max_chunk_size: config.model.max_chunk_size,
            refresh_enabled: config.refresh.enabled,
            refresh_interval: config.refresh_interval(),
            model,
            crawl_cache,
            response_cache,
            store,
            refresher,
            cancel: CancellationToken::new(),
        })
    }

    /// The normalized seed URL
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Token that stops in-flight crawls, dispatches and the refresh task
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn crawl_cache(&self) -> Arc<MemoCache<CrawlResult>> {
        Arc::clone(&self.crawl_cache)
    }

    pub fn response_cache(&self) -> Arc<MemoCache<Dispatch>> {
        Arc::clone(&self.response_cache)
    }

    /// Starts the periodic refresh if it is enabled
    pub fn spawn_refresh_task(&self) -> Option<JoinHandle<()>> {
        if !self.refresh_enabled {
            return None;
        }
        tracing::info!(
            "Background refresh every {} hours",
            self.refresh_interval.as_secs() / 3600
        );
        Some(
            Arc::clone(&self.refresher)
                .spawn_periodic(self.refresh_interval, self.cancel.clone()),
        )
    }

    /// The site content, crawling only if nothing fresh is available
    pub async fn context(&self) -> Result<CrawlResult, SiteChatError> {
        let fingerprint = Fingerprint::for_crawl(&self.seed);

        if self.crawl_cache.get(&fingerprint).is_none() {
            self.restore_snapshot(&fingerprint);
        }

        let refresher = &self.refresher;
        let cancel = &self.cancel;
        self.crawl_cache
            .get_or_compute(fingerprint, || async move {
                let result = refresher.crawl_and_persist(cancel).await?;
                if result.stop == StopReason::Cancelled {
                    return Err(SiteChatError::Cancelled);
                }
                Ok(result)
            })
            .await
    }

    /// Answers one user message against the site content
    pub async fn ask(&self, message: &str) -> Result<ChatReply, SiteChatError> {
        let context = self.context().await?;
        let chunks = chunk(&context.aggregated_text, self.max_chunk_size)?;
        tracing::debug!(
            "Answering with {} chunks of context from {} pages",
            chunks.len(),
            context.pages_visited()
        );

        let fingerprint =
            Fingerprint::for_response(self.model.name(), message, &context.aggregated_text);
        let model = self.model.as_ref();
        let cancel = &self.cancel;
        let dispatch = self
            .response_cache
            .get_or_compute(fingerprint, || async move {
                let dispatch = respond(model, message, &chunks, cancel).await;
                // Only complete answers are memoized
                if dispatch.is_complete() {
                    Ok(dispatch)
                } else {
                    Err(dispatch)
                }
            })
            .await
            .unwrap_or_else(|partial| partial);

        Ok(ChatReply {
            response: dispatch.text,
            warning: dispatch.warning,
            pages_indexed: context.pages_visited(),
        })
    }

    /// Re-crawls the site now, replacing the cached and stored content
    pub async fn refresh(&self) -> Result<CrawlResult, SiteChatError> {
        let result = self.refresher.refresh(&self.cancel).await?;
        if result.stop == StopReason::Cancelled {
            return Err(SiteChatError::Cancelled);
        }
        Ok(result)
    }

    /// URLs the current content was built from, in visit order
    pub async fn visited_urls(&self) -> Result<Vec<String>, SiteChatError> {
        Ok(self.context().await?.visited)
    }

    /// The content already available (memoized or stored), without crawling
    pub fn current_content(&self) -> Option<CrawlResult> {
        let fingerprint = Fingerprint::for_crawl(&self.seed);
        if let Some(result) = self.crawl_cache.get(&fingerprint) {
            return Some(result);
        }
        self.load_snapshot().map(Snapshot::into_crawl_result)
    }

    /// Reports on the current content and recent refreshes
    pub fn status(&self) -> Result<StatusReport, SiteChatError> {
        let content = self.current_content();
        let runs = self.lock_store().recent_runs(STATUS_RUNS)?;
        Ok(StatusReport::new(
            &self.seed,
            content.as_ref(),
            self.response_cache.len(),
            runs,
        ))
    }

    /// Loads a fresh stored snapshot into the crawl cache
    fn restore_snapshot(&self, fingerprint: &Fingerprint) {
        let Some(snapshot) = self.load_snapshot() else {
            return;
        };

        if !snapshot.is_fresh(self.crawl_cache.ttl()) {
            tracing::info!(
                "Stored snapshot from {} is older than the cache TTL; re-crawling",
                snapshot.refreshed_at
            );
            return;
        }

        tracing::info!(
            "Using stored snapshot from {} ({} URLs)",
            snapshot.refreshed_at,
            snapshot.visited_urls.len()
        );
        let refreshed_at = snapshot.refreshed_at;
        let mut entry = CacheEntry::new(fingerprint.clone(), snapshot.into_crawl_result());
        entry.created_at = refreshed_at;
        self.crawl_cache.insert_entry(entry);
        self.response_cache.clear();
    }

    fn load_snapshot(&self) -> Option<Snapshot> {
        match self.lock_store().load_latest_snapshot(&self.seed) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Could not read stored snapshot: {}", e);
                None
            }
        }
    }

    fn lock_store(&self) -> std::sync::MutexGuard<'_, SqliteStorage> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
