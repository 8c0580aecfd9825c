//! Language model access
//!
//! This module contains:
//! - The `LanguageModel` capability and `BackendError`
//! - Gemini and OpenAI-compatible HTTP backends
//! - The prompt dispatcher that answers a message chunk by chunk

mod backend;
mod dispatcher;
mod gemini;
mod openai;

pub use backend::{BackendError, LanguageModel};
pub use dispatcher::{build_prompt, respond, Dispatch};
pub use gemini::GeminiBackend;
pub use openai::OpenAiBackend;

use crate::config::{ModelConfig, Provider};
use std::time::Duration;

/// Builds the backend selected by `[model] provider`
///
/// # Arguments
///
/// * `config` - The `[model]` section
/// * `api_key` - Credential supplied by the caller (see `Config::api_key`)
pub fn build_backend(
    config: &ModelConfig,
    api_key: String,
) -> Result<Box<dyn LanguageModel>, reqwest::Error> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let backend: Box<dyn LanguageModel> = match config.provider {
        Provider::Gemini => Box::new(GeminiBackend::new(
            api_key,
            config.name.clone(),
            config.endpoint.clone(),
            config.temperature,
            timeout,
        )?),
        Provider::OpenAi => Box::new(OpenAiBackend::new(
            api_key,
            config.name.clone(),
            config.endpoint.clone(),
            config.temperature,
            timeout,
        )?),
    };
    Ok(backend)
}
