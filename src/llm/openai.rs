//! OpenAI-compatible chat completions backend

use crate::llm::backend::{status_error, transport_error, BackendError, LanguageModel};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BACKEND: &str = "openai";
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com";

const SYSTEM_PROMPT: &str = "You answer questions about a website using the context \
    provided with each question. If the context does not contain the answer, say so.";

pub struct OpenAiBackend {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
}

impl OpenAiBackend {
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
}

#[async_trait]
impl LanguageModel for OpenAiBackend {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", self.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).map_err(|_| BackendError::Auth {
                backend: BACKEND,
                status: 0,
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let resp = self
            .client
            .post(format!("{}/v1/chat/completions", self.endpoint))
            .headers(headers)
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

        let parsed: ChatResponse = resp.json().await.map_err(|e| BackendError::Malformed {
            backend: BACKEND,
            message: e.to_string(),
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| BackendError::Malformed {
                backend: BACKEND,
                message: "no choices in response".to_string(),
            })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(server: &MockServer) -> OpenAiBackend {
        OpenAiBackend::new(
            "sk-test".to_string(),
            "gpt-4o-mini".to_string(),
            Some(format!("{}/", server.uri())),
            0.0,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_generate_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Forty-two."}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = backend(&server).generate("question").await.unwrap();
        assert_eq!(text, "Forty-two.");
    }

    #[tokio::test]
    async fn test_empty_choices_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = backend(&server).generate("q").await.unwrap_err();
        assert!(matches!(err, BackendError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = backend(&server).generate("q").await.unwrap_err();
        assert_eq!(
            err,
            BackendError::Status {
                backend: "openai",
                status: 500,
                body: "upstream down".to_string()
            }
        );
    }
}
