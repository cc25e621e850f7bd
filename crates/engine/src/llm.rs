// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! LLM completion backend, consumed by the prompt assembler to turn a
//! grounded prompt into a response string.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{EngineError, EngineResult};

/// A service that completes a prompt with a free-text response.
#[async_trait::async_trait]
pub trait LlmBackend: Send + Sync {
    /// Complete `prompt`, returning the model's response text.
    async fn complete(&self, prompt: &str) -> EngineResult<String>;
}

/// Connection details for an OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API endpoint, e.g. `https://api.openai.com/v1`.
    pub endpoint: String,
    /// API key. Supports `${ENV_VAR}` expansion, as in `stratum-embed`.
    pub api_key: Option<String>,
    /// Chat completion model name.
    pub model: String,
    /// Request timeout, in seconds.
    pub timeout_secs: u64,
    /// Maximum retries for a failed request.
    pub max_retries: usize,
    /// Delay between retries, in milliseconds.
    pub retry_delay_ms: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 60,
            max_retries: 1,
            retry_delay_ms: 500,
        }
    }
}

impl LlmConfig {
    /// Build a configuration pointed at OpenAI's chat completions API.
    pub fn openai(api_key: String) -> Self {
        Self {
            api_key: Some(api_key),
            ..Default::default()
        }
    }

    fn resolved_api_key(&self) -> Option<String> {
        let key = self.api_key.as_ref()?;
        if let Some(var_name) = key.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
            std::env::var(var_name).ok()
        } else {
            Some(key.clone())
        }
    }
}

/// An `LlmBackend` talking to an OpenAI-compatible chat completions API.
pub struct OpenAiLlmBackend {
    client: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiLlmBackend {
    /// Build a backend from `config`.
    pub fn new(config: LlmConfig) -> EngineResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EngineError::Custom(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait::async_trait]
impl LlmBackend for OpenAiLlmBackend {
    async fn complete(&self, prompt: &str) -> EngineResult<String> {
        let api_key = self
            .config
            .resolved_api_key()
            .ok_or_else(|| EngineError::InvalidInput("LLM API key not configured".into()))?;

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
        };

        let url = format!("{}/chat/completions", self.config.endpoint);
        let mut retries = 0;

        loop {
            let response = self
                .client
                .post(&url)
                .header("Authorization", format!("Bearer {api_key}"))
                .header("Content-Type", "application/json")
                .json(&request)
                .send()
                .await
                .map_err(|e| EngineError::Transient(e.to_string()))?;

            let status = response.status();
            let body = response.text().await.map_err(|e| EngineError::Transient(e.to_string()))?;

            if status.is_success() {
                let parsed: ChatResponse =
                    serde_json::from_str(&body).map_err(|e| EngineError::Transient(format!("failed to parse LLM response: {e}")))?;
                return parsed
                    .choices
                    .into_iter()
                    .next()
                    .map(|c| c.message.content.trim().to_string())
                    .ok_or_else(|| EngineError::Transient("LLM response contained no choices".into()));
            }

            if (status.is_server_error() || status.as_u16() == 429) && retries < self.config.max_retries {
                retries += 1;
                warn!(status = %status, attempt = retries, "LLM call failed, retrying");
                tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms as u64)).await;
                continue;
            }

            return Err(EngineError::Transient(format!("LLM HTTP error: {status}")));
        }
    }
}

/// A fixed-response `LlmBackend` for tests and offline operation.
#[derive(Debug, Clone)]
pub struct StubLlmBackend {
    response: String,
}

impl StubLlmBackend {
    /// Always answer with `response`.
    pub fn new(response: impl Into<String>) -> Self {
        Self { response: response.into() }
    }

    /// Echo the prompt back, prefixed, so tests can assert on what context
    /// reached the LLM.
    pub fn echo() -> Self {
        Self::new(String::new())
    }
}

#[async_trait::async_trait]
impl LlmBackend for StubLlmBackend {
    async fn complete(&self, prompt: &str) -> EngineResult<String> {
        if self.response.is_empty() {
            Ok(prompt.to_string())
        } else {
            Ok(self.response.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_backend_returns_fixed_response() {
        let backend = StubLlmBackend::new("the answer is 42");
        assert_eq!(backend.complete("anything").await.unwrap(), "the answer is 42");
    }

    #[tokio::test]
    async fn test_stub_echo_returns_prompt() {
        let backend = StubLlmBackend::echo();
        assert_eq!(backend.complete("hello").await.unwrap(), "hello");
    }

    #[test]
    fn test_llm_config_env_var_expansion() {
        std::env::set_var("TEST_LLM_API_KEY", "sk-resolved");
        let config = LlmConfig {
            api_key: Some("${TEST_LLM_API_KEY}".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolved_api_key(), Some("sk-resolved".to_string()));
        std::env::remove_var("TEST_LLM_API_KEY");
    }
}
