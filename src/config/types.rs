use serde::Deserialize;

/// Main configuration structure for site-chat
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub http: HttpConfig,
    pub model: ModelConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

/// The site to crawl and the crawl's safety caps
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// URL the crawl starts from; its origin bounds the crawl
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Maximum number of pages visited by one crawl
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Maximum wall-clock time for one crawl (seconds)
    #[serde(rename = "max-duration-secs", default = "default_max_duration_secs")]
    pub max_duration_secs: u64,

    /// Pause between two fetches (milliseconds)
    #[serde(rename = "request-delay-ms", default)]
    pub request_delay_ms: u64,
}

/// HTTP client settings used by the fetcher
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connect timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Extra attempts for 5xx responses and timeouts
    #[serde(rename = "max-retries", default)]
    pub max_retries: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_retries: 0,
        }
    }
}

/// Which hosted model answers questions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gemini,
    #[serde(alias = "openai-compatible")]
    OpenAi,
}

/// Language model backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub provider: Provider,

    /// Model identifier, e.g. "gemini-pro"
    pub name: String,

    /// Name of the environment variable holding the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Base URL override for the backend API
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Maximum characters of context sent with one prompt
    #[serde(rename = "max-chunk-size", default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout for model calls (seconds)
    #[serde(rename = "timeout-secs", default = "default_model_timeout_secs")]
    pub timeout_secs: u64,
}

/// Memo cache settings
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Entry lifetime in hours; 0 keeps entries forever
    #[serde(rename = "ttl-hours", default = "default_ttl_hours")]
    pub ttl_hours: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
        }
    }
}

/// Snapshot database settings
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Periodic re-crawl settings
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(rename = "interval-hours", default = "default_ttl_hours")]
    pub interval_hours: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_hours: default_ttl_hours(),
        }
    }
}

fn default_max_pages() -> usize {
    500
}

fn default_max_duration_secs() -> u64 {
    600
}

fn default_user_agent() -> String {
    format!("site-chat/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_chunk_size() -> usize {
    30_000
}

fn default_temperature() -> f32 {
    0.2
}

fn default_model_timeout_secs() -> u64 {
    60
}

// Monthly
fn default_ttl_hours() -> u64 {
    24 * 30
}

fn default_database_path() -> String {
    "./site-chat.db".to_string()
}

fn default_true() -> bool {
    true
}
