//! site-chat: ask questions about a website
//!
//! This crate crawls a single site, collects its paragraph text, splits it into
//! bounded chunks and hands those chunks to a hosted language model as context
//! for answering user questions.

pub mod cache;
pub mod chunker;
pub mod config;
pub mod crawler;
pub mod llm;
pub mod output;
pub mod refresh;
pub mod session;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for site-chat operations
#[derive(Debug, Error)]
pub enum SiteChatError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Model backend error: {0}")]
    Backend(#[from] llm::BackendError),

    #[error("Chunking error: {0}")]
    Chunk(#[from] chunker::ChunkError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Configuration-specific errors
///
/// These are the only errors that are fatal to a session.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for site-chat operations
pub type Result<T> = std::result::Result<T, SiteChatError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use cache::{Fingerprint, MemoCache};
pub use chunker::{chunk, Chunk};
pub use config::Config;
pub use crawler::{crawl, CrawlLimits, CrawlResult, Page};
pub use llm::{respond, Dispatch, LanguageModel};
pub use refresh::Refresher;
pub use session::{ChatReply, Session};
pub use storage::{Snapshot, SnapshotStore, SqliteStorage};
pub use url::Origin;
