//! Google Generative Language (`generateContent`) backend

use crate::llm::backend::{status_error, transport_error, BackendError, LanguageModel};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BACKEND: &str = "gemini";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiBackend {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
}

impl GeminiBackend {
    pub fn new(
        api_key: String,
        model: String,
        endpoint: Option<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
                .trim_end_matches('/')
                .to_string(),
            model,
            api_key,
            temperature,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }
}

#[async_trait]
impl LanguageModel for GeminiBackend {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(BACKEND, e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(status_error(BACKEND, status, text));
        }

        let parsed: GenerateResponse = resp.json().await.map_err(|e| BackendError::Malformed {
            backend: BACKEND,
            message: e.to_string(),
        })?;

        parsed.into_text()
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Result<String, BackendError> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);
        let content = self
            .candidates
            .into_iter()
            .find_map(|c| c.content)
            .ok_or_else(|| BackendError::Malformed {
                backend: BACKEND,
                message: match block_reason {
                    Some(reason) => format!("prompt blocked: {}", reason),
                    None => "no candidates in response".to_string(),
                },
            })?;

        Ok(content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(server: &MockServer) -> GeminiBackend {
        GeminiBackend::new(
            "test-key".to_string(),
            "gemini-pro".to_string(),
            Some(server.uri()),
            0.2,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_generate_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-pro:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "Context: c\n\nUser: q"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "Hello "}, {"text": "there"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = backend(&server)
            .generate("Context: c\n\nUser: q")
            .await
            .unwrap();
        assert_eq!(text, "Hello there");
    }

    #[tokio::test]
    async fn test_generate_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let err = backend(&server).generate("q").await.unwrap_err();
        assert!(matches!(err, BackendError::Auth { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_generate_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = backend(&server).generate("q").await.unwrap_err();
        assert_eq!(err, BackendError::RateLimited { backend: "gemini" });
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let err = backend(&server).generate("q").await.unwrap_err();
        match err {
            BackendError::Malformed { message, .. } => assert!(message.contains("SAFETY")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_garbage_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = backend(&server).generate("q").await.unwrap_err();
        assert!(matches!(err, BackendError::Malformed { .. }));
    }
}
