// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Embedding backend abstraction.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Which remote embedding provider a backend talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendType {
    /// OpenAI's embeddings API.
    #[default]
    OpenAi,
    /// A local Ollama server.
    Ollama,
}

/// A source of text embeddings.
///
/// Implementations never see the embedding cache or batching logic — those
/// live one layer up, in `EmbeddingService`.
#[async_trait::async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Embed a single piece of text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts, preserving input order in the output.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// The embedding dimension this backend produces.
    fn dimension(&self) -> usize;

    /// Which provider this backend talks to.
    fn backend_type(&self) -> BackendType;
}

/// Dispatches to one of the concrete backend implementations without the
/// cost of a trait object, so `EmbeddingService` can hold it by value.
#[derive(Clone)]
pub enum AnyBackend {
    OpenAi(crate::openai::OpenAiEmbeddingBackend),
    Ollama(crate::ollama::OllamaEmbeddingBackend),
}

#[async_trait::async_trait]
impl EmbeddingBackend for AnyBackend {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        match self {
            Self::OpenAi(b) => b.embed(text).await,
            Self::Ollama(b) => b.embed(text).await,
        }
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        match self {
            Self::OpenAi(b) => b.embed_batch(texts).await,
            Self::Ollama(b) => b.embed_batch(texts).await,
        }
    }

    fn dimension(&self) -> usize {
        match self {
            Self::OpenAi(b) => b.dimension(),
            Self::Ollama(b) => b.dimension(),
        }
    }

    fn backend_type(&self) -> BackendType {
        match self {
            Self::OpenAi(_) => BackendType::OpenAi,
            Self::Ollama(_) => BackendType::Ollama,
        }
    }
}
