//! External text-analysis service client
//!
//! The service accepts a text prompt and returns free-form text that is
//! expected, but not guaranteed, to embed one JSON document. This module
//! only moves text; parsing lives in the emotion extractor.
//!
//! Consecutive calls are spaced by a fixed minimum interval. No request
//! timeout is set here; batch callers wrap whole items in their own guard.

use async_trait::async_trait;
use moodreads_common::config::AnalysisConfig;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const USER_AGENT: &str = "MoodReads/0.1.0";

/// Text-analysis transport errors
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Service returned a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Service returned a body we could not read
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Service asked us to slow down (HTTP 429)
    #[error("Rate limited")]
    RateLimited,
}

/// One completion request
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Black-box text analysis: prompt in, free-form text out
#[async_trait]
pub trait TextAnalysisService: Send + Sync {
    /// Service name for logging
    fn name(&self) -> &str;

    async fn complete(&self, request: &AnalysisRequest) -> Result<String, LlmError>;
}

/// Fixed minimum delay between consecutive calls
pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Analysis service rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic Messages API client
pub struct AnthropicClient {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    rate_limiter: RateLimiter,
}

impl AnthropicClient {
    /// Create a client from analysis settings and a resolved API key
    pub fn new(config: &AnalysisConfig, api_key: impl Into<String>) -> Result<Self, LlmError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
            rate_limiter: RateLimiter::new(config.min_call_interval_ms),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextAnalysisService for AnthropicClient {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: &AnalysisRequest) -> Result<String, LlmError> {
        self.rate_limiter.wait().await;

        let url = format!("{}/v1/messages", self.base_url);
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: &request.system,
            messages: vec![RequestMessage {
                role: "user",
                content: &request.prompt,
            }],
        };

        tracing::debug!(model = %self.model, prompt_len = request.prompt.len(), "Calling analysis service");

        let response = self
            .http_client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();

        if status.as_u16() == 429 {
            return Err(LlmError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let text = join_text_blocks(&parsed);
        if text.is_empty() {
            return Err(LlmError::InvalidResponse(
                "Response contained no text blocks".to_string(),
            ));
        }

        Ok(text)
    }
}

fn join_text_blocks(response: &MessagesResponse) -> String {
    response
        .content
        .iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text.as_deref())
        .collect::<Vec<_>>()
        .join("\n")
}
