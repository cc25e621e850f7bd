// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! OpenAI API embedding backend.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::{BackendType, EmbeddingBackend};
use crate::config::ApiConfig;
use crate::error::{EmbedError, Result};

/// OpenAI API embedding backend.
#[derive(Clone)]
pub struct OpenAiEmbeddingBackend {
    client: reqwest::Client,
    config: ApiConfig,
    dimension: usize,
}

impl OpenAiEmbeddingBackend {
    /// Create a new OpenAI embedding backend.
    pub fn new(config: ApiConfig) -> Result<Self> {
        config.validate()?;

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbedError::HttpClientError(e.to_string()))?;

        let dimension = Self::get_model_dimension(&config.model);

        Ok(Self { client, config, dimension })
    }

    fn get_model_dimension(model: &str) -> usize {
        match model {
            "text-embedding-3-small" => 1536,
            "text-embedding-3-large" => 3072,
            "text-embedding-ada-002" => 1536,
            _ => 1536,
        }
    }

    fn get_api_key(&self) -> Result<String> {
        self.config
            .get_api_key()?
            .ok_or_else(|| EmbedError::ApiError("API key not provided".to_string()))
    }
}

#[async_trait::async_trait]
impl EmbeddingBackend for OpenAiEmbeddingBackend {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(EmbedError::EmptyInput);
        }

        let request = EmbeddingRequest {
            input: text.to_string(),
            model: self.config.model.clone(),
            encoding_format: Some("float".to_string()),
        };

        let api_key = self.get_api_key()?;
        self.send_request(&request, &api_key)
            .await
            .map_err(|e| EmbedError::api_error(format!("failed to get embedding: {e}")))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        for text in texts {
            if text.trim().is_empty() {
                return Err(EmbedError::EmptyInput);
            }
        }

        let texts: Vec<String> = texts.iter().map(|t| t.trim().to_string()).collect();
        let request = EmbeddingRequestBatch {
            input: texts,
            model: self.config.model.clone(),
            encoding_format: Some("float".to_string()),
        };

        let api_key = self.get_api_key()?;
        self.send_request_batch(&request, &api_key)
            .await
            .map_err(|e| EmbedError::api_error(format!("failed to get batch embeddings: {e}")))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn backend_type(&self) -> BackendType {
        BackendType::OpenAi
    }
}

impl OpenAiEmbeddingBackend {
    async fn send_request(&self, request: &EmbeddingRequest, api_key: &str) -> Result<Vec<f32>> {
        let url = format!("{}/embeddings", self.config.endpoint);
        let mut retries = 0;

        loop {
            let response = self
                .client
                .post(&url)
                .header("Authorization", format!("Bearer {api_key}"))
                .header("Content-Type", "application/json")
                .json(request)
                .send()
                .await
                .map_err(|e| EmbedError::HttpClientError(e.to_string()))?;

            let status = response.status();
            let body = response.text().await.map_err(|e| EmbedError::HttpClientError(e.to_string()))?;

            if status.is_success() {
                let parsed: EmbeddingResponse =
                    serde_json::from_str(&body).map_err(|e| EmbedError::ResponseParseError(e.to_string()))?;
                return Ok(parsed.data.into_iter().next().map(|d| d.embedding).unwrap_or_default());
            }

            if (status.is_server_error() || status.as_u16() == 429) && retries < self.config.max_retries {
                retries += 1;
                tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms as u64)).await;
                continue;
            }

            return Err(EmbedError::ApiError(format!("HTTP error: {status}")));
        }
    }

    async fn send_request_batch(&self, request: &EmbeddingRequestBatch, api_key: &str) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.config.endpoint);
        let mut retries = 0;

        loop {
            let response = self
                .client
                .post(&url)
                .header("Authorization", format!("Bearer {api_key}"))
                .header("Content-Type", "application/json")
                .json(request)
                .send()
                .await
                .map_err(|e| EmbedError::HttpClientError(e.to_string()))?;

            let status = response.status();
            let body = response.text().await.map_err(|e| EmbedError::HttpClientError(e.to_string()))?;

            if status.is_success() {
                let parsed: BatchEmbeddingResponse =
                    serde_json::from_str(&body).map_err(|e| EmbedError::ResponseParseError(e.to_string()))?;
                let mut data = parsed.data;
                data.sort_by_key(|d| d.index);
                return Ok(data.into_iter().map(|d| d.embedding).collect());
            }

            if (status.is_server_error() || status.as_u16() == 429) && retries < self.config.max_retries {
                retries += 1;
                tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms as u64)).await;
                continue;
            }

            return Err(EmbedError::ApiError(format!("HTTP error: {status}")));
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    input: String,
    model: String,
    encoding_format: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequestBatch {
    input: Vec<String>,
    model: String,
    encoding_format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct BatchEmbeddingResponse {
    data: Vec<EmbeddingDataWithIndex>,
}

#[derive(Debug, Deserialize, Clone)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDataWithIndex {
    embedding: Vec<f32>,
    index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_model_dimension() {
        assert_eq!(OpenAiEmbeddingBackend::get_model_dimension("text-embedding-3-small"), 1536);
        assert_eq!(OpenAiEmbeddingBackend::get_model_dimension("text-embedding-3-large"), 3072);
        assert_eq!(OpenAiEmbeddingBackend::get_model_dimension("unknown"), 1536);
    }

    #[test]
    fn test_openai_backend_creation() {
        let config = ApiConfig::openai("sk-test-key".to_string());
        let backend = OpenAiEmbeddingBackend::new(config).unwrap();
        assert_eq!(backend.dimension(), 1536);
        assert_eq!(backend.backend_type(), BackendType::OpenAi);
    }

    #[test]
    fn test_openai_backend_creation_invalid_config() {
        let config = ApiConfig { endpoint: String::new(), ..Default::default() };
        assert!(OpenAiEmbeddingBackend::new(config).is_err());
    }
}
