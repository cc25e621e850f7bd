// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

use stratum_chunking::ChunkingConfig;
use stratum_core::Level;
use stratum_embed::EmbedderConfig;

use crate::error::{EngineError, EngineResult};

/// Construction-time configuration for a `SheetRagEngine`.
///
/// Mirrors the recognized configuration options: `batch_size` lives on
/// `embedder`, `sheet_rag_layers` is `layers`, and `cross_validation_threshold`
/// / `cross_validation_min_layers` are `validator_threshold` /
/// `validator_min_layers`.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Chunker configuration.
    pub chunking: ChunkingConfig,
    /// Embedding backend and batching/caching configuration.
    pub embedder: EmbedderConfig,
    /// Subset of levels to populate and search. Defaults to all four.
    pub layers: Vec<Level>,
    /// Minimum adjusted similarity for a chunk to count as support.
    pub validator_threshold: f32,
    /// Minimum `layer_coverage` for a validated primary to survive.
    pub validator_min_layers: usize,
    /// Root directory reported in `stats()`. Opaque to the engine itself;
    /// collections are in-memory regardless of this value.
    pub persist_dir: String,
    /// Time-to-live for cached query results, in seconds.
    pub query_cache_ttl_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            embedder: EmbedderConfig::default(),
            layers: Level::ALL.to_vec(),
            validator_threshold: 0.5,
            validator_min_layers: 2,
            persist_dir: "./sheet_rag_data".to_string(),
            query_cache_ttl_secs: 3600,
        }
    }
}

impl EngineConfig {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the chunker configuration.
    pub fn with_chunking(mut self, chunking: ChunkingConfig) -> Self {
        self.chunking = chunking;
        self
    }

    /// Override the embedder configuration.
    pub fn with_embedder(mut self, embedder: EmbedderConfig) -> Self {
        self.embedder = embedder;
        self
    }

    /// Restrict ingestion and retrieval to a subset of levels.
    pub fn with_layers(mut self, layers: Vec<Level>) -> Self {
        self.layers = layers;
        self
    }

    /// Override the validator's support threshold.
    pub fn with_validator_threshold(mut self, threshold: f32) -> Self {
        self.validator_threshold = threshold;
        self
    }

    /// Override the validator's minimum layer coverage.
    pub fn with_validator_min_layers(mut self, min_layers: usize) -> Self {
        self.validator_min_layers = min_layers;
        self
    }

    /// Override the root directory reported in `stats()`.
    pub fn with_persist_dir(mut self, persist_dir: impl Into<String>) -> Self {
        self.persist_dir = persist_dir.into();
        self
    }

    /// Override the query-result cache TTL.
    pub fn with_query_cache_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.query_cache_ttl_secs = ttl_secs;
        self
    }

    /// Validate the configuration, including collaborator sub-configs.
    pub fn validate(&self) -> EngineResult<()> {
        self.chunking.validate()?;
        self.embedder.validate()?;
        if self.layers.is_empty() {
            return Err(EngineError::InvalidInput("at least one layer must be enabled".into()));
        }
        if self.validator_threshold < 0.0 || self.validator_threshold > 1.0 {
            return Err(EngineError::InvalidInput("validator_threshold must be in [0, 1]".into()));
        }
        if self.validator_min_layers == 0 {
            return Err(EngineError::InvalidInput("validator_min_layers must be > 0".into()));
        }
        Ok(())
    }
}
