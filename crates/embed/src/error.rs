// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Error types for the embedding module.

/// Embedding module error type.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    /// API request error.
    #[error("API error: {0}")]
    ApiError(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP client error.
    #[error("HTTP client error: {0}")]
    HttpClientError(String),

    /// Response parsing error.
    #[error("failed to parse response: {0}")]
    ResponseParseError(String),

    /// Empty input provided.
    #[error("empty input provided")]
    EmptyInput,

    /// Embedding generation failed.
    #[error("embedding generation failed: {0}")]
    EmbeddingFailed(String),
}

impl EmbedError {
    /// Create an API error.
    pub fn api_error(msg: impl Into<String>) -> Self {
        Self::ApiError(msg.into())
    }

    /// Create an invalid config error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbedError>;
