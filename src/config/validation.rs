use crate::config::types::{
    CacheConfig, Config, HttpConfig, ModelConfig, RefreshConfig, SiteConfig, StorageConfig,
};
use crate::ConfigError;
use url::Url;

/// Longest allowed gap between two background refreshes (ten years)
pub const MAX_REFRESH_INTERVAL_HOURS: u64 = 24 * 365 * 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_http_config(&config.http)?;
    validate_model_config(&config.model)?;
    validate_cache_config(&config.cache)?;
    validate_storage_config(&config.storage)?;
    validate_refresh_config(&config.refresh)?;
    Ok(())
}

/// Validates the seed URL and crawl caps
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    if config.seed_url.trim().is_empty() {
        return Err(ConfigError::Validation("seed_url cannot be empty".to_string()));
    }

    let url = Url::parse(&config.seed_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", config.seed_url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use http or https",
            config.seed_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            config.seed_url
        )));
    }

    // Both caps are required: the site's link graph may be huge or cyclic
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.max_duration_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "max_duration_secs must be >= 1, got {}",
            config.max_duration_secs
        )));
    }

    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 || config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "HTTP timeouts must be >= 1s, got timeout={}s connect={}s",
            config.timeout_secs, config.connect_timeout_secs
        )));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be between 0 and 10, got {}",
            config.max_retries
        )));
    }

    Ok(())
}

fn validate_model_config(config: &ModelConfig) -> Result<(), ConfigError> {
    if config.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "model name cannot be empty".to_string(),
        ));
    }

    if config.api_key_env.trim().is_empty() {
        return Err(ConfigError::Validation(
            "api_key_env cannot be empty".to_string(),
        ));
    }

    if let Some(endpoint) = &config.endpoint {
        Url::parse(endpoint).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid model endpoint '{}': {}", endpoint, e))
        })?;
    }

    if config.max_chunk_size < 1 {
        return Err(ConfigError::Validation(format!(
            "max_chunk_size must be >= 1, got {}",
            config.max_chunk_size
        )));
    }

    if !(0.0..=2.0).contains(&config.temperature) {
        return Err(ConfigError::Validation(format!(
            "temperature must be between 0.0 and 2.0, got {}",
            config.temperature
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "model timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    // 0 means "never expire"; anything past ten years is almost certainly a typo
    if config.ttl_hours > 24 * 365 * 10 {
        return Err(ConfigError::Validation(format!(
            "ttl_hours is unreasonably large: {}",
            config.ttl_hours
        )));
    }
    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_refresh_config(config: &RefreshConfig) -> Result<(), ConfigError> {
    if config.enabled && config.interval_hours < 1 {
        return Err(ConfigError::Validation(
            "refresh interval_hours must be >= 1 when refresh is enabled".to_string(),
        ));
    }
    if config.interval_hours > MAX_REFRESH_INTERVAL_HOURS {
        return Err(ConfigError::Validation(format!(
            "refresh interval_hours is unreasonably large: {}",
            config.interval_hours
        )));
    }
    Ok(())
}
