// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Configuration structures for the embedding module.

use serde::{Deserialize, Serialize};

use crate::backend::BackendType;
use crate::error::{EmbedError, Result as EmbedResult};

/// API-based embedding configuration, shared by the OpenAI and Ollama
/// backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API endpoint URL.
    pub endpoint: String,
    /// API key (optional for local APIs like Ollama).
    pub api_key: Option<String>,
    /// Model name to use.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum retries for failed requests.
    pub max_retries: usize,
    /// Retry delay in milliseconds.
    pub retry_delay_ms: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "text-embedding-3-small".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl ApiConfig {
    /// Create an OpenAI configuration.
    pub fn openai(api_key: String) -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: Some(api_key),
            model: "text-embedding-3-small".to_string(),
            ..Default::default()
        }
    }

    /// Create an Ollama configuration.
    pub fn ollama() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            api_key: None,
            model: "nomic-embed-text".to_string(),
            timeout_secs: 60,
            ..Default::default()
        }
    }

    /// Resolve the API key, expanding an `${ENV_VAR}` placeholder.
    pub fn get_api_key(&self) -> EmbedResult<Option<String>> {
        if let Some(key) = &self.api_key {
            if key.starts_with("${") && key.ends_with('}') {
                let var_name = &key[2..key.len() - 1];
                Ok(std::env::var(var_name).ok())
            } else {
                Ok(Some(key.clone()))
            }
        } else {
            Ok(None)
        }
    }

    /// Validate the API configuration.
    pub fn validate(&self) -> EmbedResult<()> {
        if self.endpoint.is_empty() {
            return Err(EmbedError::invalid_config("API endpoint cannot be empty"));
        }
        if let Err(e) = url::Url::parse(&self.endpoint) {
            return Err(EmbedError::invalid_config(format!("invalid API endpoint URL: {e}")));
        }
        if self.model.is_empty() {
            return Err(EmbedError::invalid_config("model name cannot be empty"));
        }
        Ok(())
    }
}

/// Complete embedding service configuration.
///
/// `batch_size` and `cache_ttl_secs` match the reference pipeline's
/// defaults: batches of 32 texts per remote call, cached embeddings expire
/// after 24 hours.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedderConfig {
    /// Which provider to talk to.
    pub backend: BackendType,
    /// API configuration for the chosen backend.
    pub api: ApiConfig,
    /// Embedding dimension (overrides the model default when non-zero).
    pub dimension_override: usize,
    /// Enable the MD5-keyed embedding cache.
    pub cache_enabled: bool,
    /// Cache entry time-to-live, in seconds.
    pub cache_ttl_secs: u64,
    /// Maximum number of texts sent to the backend per remote call.
    pub batch_size: usize,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            backend: BackendType::default(),
            api: ApiConfig::default(),
            dimension_override: 0,
            cache_enabled: true,
            cache_ttl_secs: 24 * 60 * 60,
            batch_size: 32,
        }
    }
}

impl EmbedderConfig {
    /// Create an OpenAI-backed configuration.
    pub fn openai(api_key: String) -> Self {
        Self {
            backend: BackendType::OpenAi,
            api: ApiConfig::openai(api_key),
            ..Default::default()
        }
    }

    /// Create an Ollama-backed configuration.
    pub fn ollama() -> Self {
        Self {
            backend: BackendType::Ollama,
            api: ApiConfig::ollama(),
            ..Default::default()
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> EmbedResult<()> {
        self.api.validate()?;
        if self.batch_size == 0 {
            return Err(EmbedError::invalid_config("batch_size must be > 0"));
        }
        Ok(())
    }

    /// The expected embedding dimension: the override if set, else the
    /// model's known default.
    pub fn dimension(&self) -> usize {
        if self.dimension_override > 0 {
            return self.dimension_override;
        }
        match self.backend {
            BackendType::OpenAi => match self.api.model.as_str() {
                "text-embedding-3-small" => 1536,
                "text-embedding-3-large" => 3072,
                "text-embedding-ada-002" => 1536,
                _ => 1536,
            },
            BackendType::Ollama => match self.api.model.as_str() {
                "nomic-embed-text" => 768,
                "mxbai-embed-large" => 1024,
                "all-minilm" => 384,
                _ => 768,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EmbedderConfig::default();
        assert_eq!(config.backend, BackendType::OpenAi);
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.cache_ttl_secs, 86400);
    }

    #[test]
    fn test_ollama_config() {
        let config = EmbedderConfig::ollama();
        assert_eq!(config.backend, BackendType::Ollama);
        assert_eq!(config.api.endpoint, "http://localhost:11434");
    }

    #[test]
    fn test_api_config_env_var() {
        std::env::set_var("TEST_EMBED_API_KEY", "env-key-123");
        let config = ApiConfig {
            api_key: Some("${TEST_EMBED_API_KEY}".to_string()),
            ..Default::default()
        };
        assert_eq!(config.get_api_key().unwrap(), Some("env-key-123".to_string()));
        std::env::remove_var("TEST_EMBED_API_KEY");
    }

    #[test]
    fn test_dimension() {
        let mut config = EmbedderConfig::openai("test".to_string());
        assert_eq!(config.dimension(), 1536);
        config.api.model = "text-embedding-3-large".to_string();
        assert_eq!(config.dimension(), 3072);
        config.dimension_override = 512;
        assert_eq!(config.dimension(), 512);
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let config = EmbedderConfig { batch_size: 0, ..EmbedderConfig::openai("k".to_string()) };
        assert!(config.validate().is_err());
    }
}
