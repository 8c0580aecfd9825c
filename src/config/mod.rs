//! Configuration module for site-chat
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and looking up the model credential from the environment.
//!
//! # Example
//!
//! ```no_run
//! use site_chat::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("site-chat.toml")).unwrap();
//! println!("Crawling from: {}", config.site.seed_url);
//! ```

mod parser;
mod types;
mod validation;

use crate::ConfigError;
use std::time::Duration;

// Re-export types
pub use types::{
    CacheConfig, Config, HttpConfig, ModelConfig, Provider, RefreshConfig, SiteConfig,
    StorageConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;

impl Config {
    /// Reads the model API key from the environment variable named in `[model]`
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The trimmed key
    /// * `Err(ConfigError::MissingCredential)` - The variable is unset or blank
    pub fn api_key(&self) -> Result<String, ConfigError> {
        read_credential(&self.model.api_key_env)
    }

    /// Cache entry lifetime, or `None` when entries never expire
    pub fn cache_ttl(&self) -> Option<chrono::Duration> {
        match self.cache.ttl_hours {
            0 => None,
            hours => Some(chrono::Duration::hours(hours as i64)),
        }
    }

    /// Interval between two background refreshes
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_hours.saturating_mul(3600))
    }
}

fn read_credential(var: &str) -> Result<String, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::MissingCredential(var.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential() {
        let result = read_credential("SITE_CHAT_TEST_SURELY_UNSET_VARIABLE");
        assert!(matches!(result, Err(ConfigError::MissingCredential(_))));
    }

    #[test]
    fn test_present_credential_is_trimmed() {
        std::env::set_var("SITE_CHAT_TEST_KEY_PRESENT", "  secret-key \n");
        assert_eq!(
            read_credential("SITE_CHAT_TEST_KEY_PRESENT").unwrap(),
            "secret-key"
        );
    }

    #[test]
    fn test_blank_credential_is_missing() {
        std::env::set_var("SITE_CHAT_TEST_KEY_BLANK", "   ");
        assert!(read_credential("SITE_CHAT_TEST_KEY_BLANK").is_err());
    }
}
