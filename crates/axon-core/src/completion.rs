//! Completion client: one non-streamed chat completion per call against an
//! OpenAI-compatible `/chat/completions` endpoint.
//!
//! API key: `AXON__COMPLETION_API_KEY`, falling back to `OPENAI_API_KEY` / `OPENROUTER_API_KEY`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::AxonConfig;
use crate::error::{AxonError, AxonResult};

/// Seam between the responder and the hosted model.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Single text completion. `system` is sent as a dedicated system message when present.
    async fn complete(&self, system: Option<&str>, prompt: &str) -> AxonResult<String>;
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

pub struct ChatCompletionClient {
    api_key: Option<String>,
    base_url: String,
    model: String,
    temperature: Option<f32>,
    client: reqwest::Client,
}

impl ChatCompletionClient {
    pub fn new(api_key: Option<String>, base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_key: api_key
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: "gpt-4o".to_string(),
            temperature: None,
            client,
        }
    }

    pub fn from_config(cfg: &AxonConfig) -> Self {
        let mut this = Self::new(
            cfg.completion_api_key.clone(),
            &cfg.completion_base_url,
            Duration::from_secs(cfg.completion_timeout_secs),
        )
        .with_model(&cfg.completion_model);
        this.temperature = cfg.completion_temperature;
        this
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    fn request_body(&self, system: Option<&str>, prompt: &str) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        });
        ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl CompletionClient for ChatCompletionClient {
    async fn complete(&self, system: Option<&str>, prompt: &str) -> AxonResult<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(AxonError::Completion(
                "no completion API key configured".to_string(),
            ));
        };

        let url = format!("{}/chat/completions", self.base_url);
        let res = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.request_body(system, prompt))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AxonError::Completion(format!(
                "completion API error {}: {}",
                status, body
            )));
        }

        let parsed: ChatResponse = res.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AxonError::Completion("completion returned no choices".to_string()))
    }
}
