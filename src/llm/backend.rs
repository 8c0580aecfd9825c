use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

/// Why a model call failed
///
/// Non-fatal at the chunk level: the dispatcher stops and returns what it has.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("{backend} rejected the credentials (HTTP {status})")]
    Auth { backend: &'static str, status: u16 },

    #[error("{backend} rate limit reached")]
    RateLimited { backend: &'static str },

    #[error("{backend} returned HTTP {status}: {body}")]
    Status {
        backend: &'static str,
        status: u16,
        body: String,
    },

    #[error("Malformed response from {backend}: {message}")]
    Malformed {
        backend: &'static str,
        message: String,
    },

    #[error("Request to {backend} failed: {message}")]
    Transport {
        backend: &'static str,
        message: String,
    },

    #[error("Model call cancelled")]
    Cancelled,
}

/// A hosted model that turns a prompt into text
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier; part of response cache fingerprints
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, BackendError>;
}

/// Longest error body kept in a `BackendError::Status`
const MAX_ERROR_BODY: usize = 500;

/// Maps a non-success status to the matching error variant
pub(crate) fn status_error(backend: &'static str, status: StatusCode, body: String) -> BackendError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Auth {
            backend,
            status: status.as_u16(),
        },
        StatusCode::TOO_MANY_REQUESTS => BackendError::RateLimited { backend },
        _ => BackendError::Status {
            backend,
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY).collect(),
        },
    }
}

pub(crate) fn transport_error(backend: &'static str, e: reqwest::Error) -> BackendError {
    BackendError::Transport {
        backend,
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(
            status_error("gemini", StatusCode::UNAUTHORIZED, String::new()),
            BackendError::Auth { status: 401, .. }
        ));
        assert!(matches!(
            status_error("gemini", StatusCode::FORBIDDEN, String::new()),
            BackendError::Auth { status: 403, .. }
        ));
        assert!(matches!(
            status_error("gemini", StatusCode::TOO_MANY_REQUESTS, String::new()),
            BackendError::RateLimited { .. }
        ));
        assert!(matches!(
            status_error("gemini", StatusCode::BAD_GATEWAY, "oops".to_string()),
            BackendError::Status { status: 502, .. }
        ));
    }

    #[test]
    fn test_long_bodies_truncated() {
        let body = "x".repeat(5000);
        match status_error("openai", StatusCode::INTERNAL_SERVER_ERROR, body) {
            BackendError::Status { body, .. } => assert_eq!(body.len(), MAX_ERROR_BODY),
            other => panic!("unexpected {:?}", other),
        }
    }
}
