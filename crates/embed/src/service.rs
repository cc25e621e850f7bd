// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Batch embedding service: fronts an `EmbeddingBackend` with the
//! MD5-keyed, TTL'd embedding cache described for the Sheet RAG pipeline.

use std::sync::Arc;
use std::time::Instant;

use stratum_cache::{keyed_digest, Cache};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::backend::{AnyBackend, BackendType, EmbeddingBackend};
use crate::config::EmbedderConfig;
use crate::error::{EmbedError, Result};
use crate::openai::OpenAiEmbeddingBackend;
use crate::ollama::OllamaEmbeddingBackend;

/// Running counters for an `EmbeddingService`, exposed for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingStats {
    /// Total number of texts embedded (cache hits and misses combined).
    pub total_embeddings: usize,
    /// Number of remote batch calls issued.
    pub total_batch_requests: usize,
    /// Approximate token count processed, counted by whitespace split.
    pub total_tokens: usize,
    /// Running average remote-call latency, in milliseconds.
    pub avg_time_ms: f64,
    /// Number of cache hits across the service's lifetime.
    pub cache_hits: usize,
}

impl EmbeddingStats {
    fn record_hit(&mut self) {
        self.total_embeddings += 1;
        self.cache_hits += 1;
    }

    fn record_remote(&mut self, texts: &[String], elapsed_ms: f64) {
        let n_before = self.total_embeddings as f64;
        self.total_embeddings += texts.len();
        self.total_tokens += texts.iter().map(|t| t.split_whitespace().count()).sum::<usize>();
        self.total_batch_requests += 1;
        let n_after = self.total_embeddings as f64;
        self.avg_time_ms = (self.avg_time_ms * n_before + elapsed_ms) / n_after;
    }

    /// Fraction of embeddings served from cache.
    pub fn cache_hit_rate(&self) -> f64 {
        if self.total_embeddings == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.total_embeddings as f64
        }
    }
}

fn encode_vector(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn decode_vector(bytes: &[u8]) -> Option<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    )
}

/// Obtains embedding vectors for text, amortizing remote request cost
/// across an MD5-keyed cache and batching cache misses to the backend.
///
/// Caching is best-effort: a cache read/write failure degrades to a direct
/// fetch rather than failing the call (§4.6 of the design).
#[derive(Clone)]
pub struct EmbeddingService {
    backend: Arc<AnyBackend>,
    cache: Arc<dyn Cache>,
    config: EmbedderConfig,
    stats: Arc<RwLock<EmbeddingStats>>,
}

impl EmbeddingService {
    /// Build a service from configuration, talking to the configured
    /// backend and caching through `cache`.
    pub fn new(config: EmbedderConfig, cache: Arc<dyn Cache>) -> Result<Self> {
        config.validate()?;

        let backend = match config.backend {
            BackendType::OpenAi => AnyBackend::OpenAi(OpenAiEmbeddingBackend::new(config.api.clone())?),
            BackendType::Ollama => AnyBackend::Ollama(OllamaEmbeddingBackend::new(config.api.clone())?),
        };

        Ok(Self {
            backend: Arc::new(backend),
            cache,
            config,
            stats: Arc::new(RwLock::new(EmbeddingStats::default())),
        })
    }

    fn cache_key(text: &str) -> String {
        keyed_digest("emb", text)
    }

    async fn cache_get(&self, text: &str) -> Option<Vec<f32>> {
        if !self.config.cache_enabled {
            return None;
        }
        match self.cache.get(&Self::cache_key(text)).await {
            Ok(Some(bytes)) => decode_vector(&bytes),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "embedding cache unavailable, falling back to direct fetch");
                None
            }
        }
    }

    async fn cache_put(&self, text: &str, vector: &[f32]) {
        if !self.config.cache_enabled {
            return;
        }
        if let Err(e) = self
            .cache
            .set(&Self::cache_key(text), encode_vector(vector), self.config.cache_ttl_secs)
            .await
        {
            warn!(error = %e, "failed to populate embedding cache");
        }
    }

    /// Embed a single piece of text, probing the cache first.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(std::slice::from_ref(&text.to_string())).await?;
        embeddings.into_iter().next().ok_or(EmbedError::EmptyInput)
    }

    /// Embed `texts`, returning `result[i]` for `texts[i]`.
    ///
    /// Internally: probe the cache for every input, submit the misses to
    /// the backend in groups of at most `batch_size`, and populate the
    /// cache with the freshly fetched vectors. A remote failure on one
    /// batch fails the whole call; no partial cache write occurs for that
    /// batch.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        for text in texts {
            if text.trim().is_empty() {
                return Err(EmbedError::EmptyInput);
            }
        }

        let mut results: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        let mut miss_texts = Vec::new();
        let mut miss_indices = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            match self.cache_get(text).await {
                Some(vector) => {
                    self.stats.write().await.record_hit();
                    results.push(Some(vector));
                }
                None => {
                    results.push(None);
                    miss_texts.push(text.clone());
                    miss_indices.push(i);
                }
            }
        }

        if !miss_texts.is_empty() {
            debug!(misses = miss_texts.len(), batch_size = self.config.batch_size, "fetching embeddings");
            for (chunk_indices, chunk_texts) in miss_indices
                .chunks(self.config.batch_size)
                .zip(miss_texts.chunks(self.config.batch_size))
            {
                let start = Instant::now();
                let vectors = self.fetch_with_retry(chunk_texts).await?;
                let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

                for (idx, (text, vector)) in chunk_indices.iter().zip(chunk_texts.iter().zip(vectors.into_iter())) {
                    self.cache_put(text, &vector).await;
                    results[*idx] = Some(vector);
                }

                self.stats.write().await.record_remote(chunk_texts, elapsed_ms);
            }
        }

        results
            .into_iter()
            .map(|r| r.ok_or_else(|| EmbedError::EmbeddingFailed("missing result slot".into())))
            .collect()
    }

    async fn fetch_with_retry(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        match self.backend.embed_batch(texts).await {
            Ok(v) => Ok(v),
            Err(first_err) => {
                warn!(error = %first_err, "embedding backend call failed, retrying once");
                self.backend.embed_batch(texts).await.map_err(|second_err| {
                    warn!(error = %second_err, "embedding backend retry failed");
                    second_err
                })
            }
        }
    }

    /// The embedding dimension the backend produces.
    pub fn dimension(&self) -> usize {
        self.backend.dimension()
    }

    /// Which provider the service is configured against.
    pub fn backend_type(&self) -> BackendType {
        self.backend.backend_type()
    }

    /// Snapshot of the service's running counters.
    pub async fn stats(&self) -> EmbeddingStats {
        self.stats.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratum_cache::InMemoryCache;

    fn config() -> EmbedderConfig {
        EmbedderConfig::openai("sk-test".to_string())
    }

    #[test]
    fn test_vector_encode_round_trip() {
        let v = vec![1.0_f32, -2.5, 0.0, 3.25];
        let bytes = encode_vector(&v);
        assert_eq!(decode_vector(&bytes).unwrap(), v);
    }

    #[test]
    fn test_decode_rejects_misaligned_bytes() {
        assert_eq!(decode_vector(&[1, 2, 3]), None);
    }

    #[tokio::test]
    async fn test_service_creation() {
        let service = EmbeddingService::new(config(), Arc::new(InMemoryCache::new())).unwrap();
        assert_eq!(service.backend_type(), BackendType::OpenAi);
        assert_eq!(service.dimension(), 1536);
    }

    #[tokio::test]
    async fn test_embed_batch_empty() {
        let service = EmbeddingService::new(config(), Arc::new(InMemoryCache::new())).unwrap();
        assert!(service.embed_batch(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_embed_batch_rejects_blank_input() {
        let service = EmbeddingService::new(config(), Arc::new(InMemoryCache::new())).unwrap();
        let err = service.embed_batch(&["  ".to_string()]).await.unwrap_err();
        assert!(matches!(err, EmbedError::EmptyInput));
    }

    #[tokio::test]
    async fn test_cache_hit_served_without_backend_call() {
        let cache = Arc::new(InMemoryCache::new());
        let service = EmbeddingService::new(config(), cache.clone()).unwrap();

        let key = EmbeddingService::cache_key("cached text");
        cache.set(&key, encode_vector(&vec![0.1; 1536]), 60).await.unwrap();

        let result = service.embed("cached text").await.unwrap();
        assert_eq!(result, vec![0.1; 1536]);
        assert_eq!(service.stats().await.cache_hits, 1);
    }
}
