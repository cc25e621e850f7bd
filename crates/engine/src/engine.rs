// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! The Sheet RAG engine: wires the chunker, multi-layer store, embedder,
//! cross-layer validator, query-result cache, and LLM backend into the
//! `ingest`/`query`/`stats`/`clear_*` surface.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stratum_cache::Cache;
use stratum_chunking::HierarchicalChunker;
use stratum_core::{ChunkNode, Level};
use stratum_embed::EmbeddingService;
use stratum_validate::{CrossLayerValidator, ScoredChunk, ValidatedResult};
use stratum_vector::{MultiLayerStore, SearchResult};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::document::Document;
use crate::error::{EngineError, EngineResult};
use crate::llm::LlmBackend;
use crate::prompt::{build_prompt, format_sources, Source};

const NO_CONTEXT_RESPONSE: &str = "I couldn't find relevant information to answer your question with sufficient confidence.";
const EMPTY_INDEX_RESPONSE: &str = "The Sheet RAG index is empty. Please ingest some papers first.";

/// Diagnostic summary of how cross-layer validation shaped a query's
/// context, present whenever `use_cross_validation` was requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    /// Total retrieval candidates across all searched layers.
    pub total_candidates: usize,
    /// Number of chunks that survived bidirectional validation.
    pub validated_count: usize,
    /// Set when validation returned nothing and the paragraph layer was
    /// used directly instead.
    pub fallback_used: bool,
}

/// The answer to one `query` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Generated answer text, or one of the fixed messages for an empty
    /// index / no grounded context / an LLM failure.
    pub response: String,
    /// Context chunks the response was grounded on, in citation order.
    pub sources: Vec<Source>,
    /// Validation diagnostics, present only when cross-validation ran.
    pub validation: Option<ValidationSummary>,
}

/// Per-level chunk counts and collection names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerStats {
    /// Number of chunks currently indexed at this level.
    pub chunk_count: usize,
    /// Backing collection name, `sheet_rag_<level>`.
    pub collection_name: String,
}

/// A snapshot of the store's contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Per-level breakdown.
    pub layers: BTreeMap<Level, LayerStats>,
    /// Sum of `layers[*].chunk_count`.
    pub total_chunks: usize,
    /// The configured persistence directory (reported, not read from disk;
    /// collections are in-memory regardless of this value).
    pub persist_dir: String,
}

/// Multi-granularity retrieval-augmented-generation engine over ingested
/// paper text.
pub struct SheetRagEngine {
    chunker: HierarchicalChunker,
    store: MultiLayerStore,
    embedder: EmbeddingService,
    validator: CrossLayerValidator,
    cache: Arc<dyn Cache>,
    llm: Arc<dyn LlmBackend>,
    config: EngineConfig,
}

impl SheetRagEngine {
    /// Build an engine from `config`, backed by `cache` (shared between the
    /// embedding cache and the query-result cache) and `llm`.
    pub fn new(config: EngineConfig, cache: Arc<dyn Cache>, llm: Arc<dyn LlmBackend>) -> EngineResult<Self> {
        config.validate()?;

        let chunker = HierarchicalChunker::new(config.chunking.clone());
        let embedder = EmbeddingService::new(config.embedder.clone(), cache.clone())?;
        let store = MultiLayerStore::new(embedder.dimension());
        let validator = CrossLayerValidator::new()
            .with_support_threshold(config.validator_threshold)
            .with_min_layers(config.validator_min_layers);
        validator.validate_config()?;

        Ok(Self {
            chunker,
            store,
            embedder,
            validator,
            cache,
            llm,
            config,
        })
    }

    fn enabled_layers(&self) -> &[Level] {
        &self.config.layers
    }

    /// Chunk, embed, and index every document in `documents`.
    ///
    /// Returns the total number of chunks written across all layers. A
    /// transient embedding failure aborts the whole call; chunks already
    /// written for earlier layers of the same call remain indexed (no
    /// cross-layer transaction).
    pub async fn ingest(&self, documents: &[Document]) -> EngineResult<usize> {
        if documents.is_empty() {
            return Err(EngineError::InvalidInput("no documents supplied".into()));
        }

        let pairs: Vec<(&str, &BTreeMap<String, serde_json::Value>)> =
            documents.iter().map(|d| (d.text.as_str(), &d.metadata)).collect();
        let chunked = self.chunker.chunk_documents(pairs);

        let mut total = 0usize;
        for &level in self.enabled_layers() {
            let chunks = chunked.chunks_at(level);
            if chunks.is_empty() {
                continue;
            }
            let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;
            self.store.add_chunks(level, chunks, embeddings).await?;
            total += chunks.len();
        }

        info!(documents = documents.len(), chunks = total, "ingested documents");
        Ok(total)
    }

    async fn total_chunks(&self) -> EngineResult<usize> {
        Ok(self.store.stats().await?.values().sum())
    }

    fn cache_key(query_text: &str, top_k: usize, use_cross_validation: bool) -> String {
        format!("sheet_rag:{}:{}:{}", query_text, top_k, use_cross_validation)
    }

    async fn cached_response(&self, key: &str) -> Option<QueryResponse> {
        match self.cache.get(key).await {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "query cache unavailable, querying live");
                None
            }
        }
    }

    async fn cache_response(&self, key: &str, response: &QueryResponse) {
        let Ok(bytes) = serde_json::to_vec(response) else {
            return;
        };
        if let Err(e) = self.cache.set(key, bytes, self.config.query_cache_ttl_secs).await {
            warn!(error = %e, "failed to populate query cache");
        }
    }

    async fn retrieve_layers(&self, query_embedding: &[f32], top_k: usize) -> EngineResult<BTreeMap<Level, Vec<ScoredChunk>>> {
        let mut layer_results = BTreeMap::new();
        for &level in self.enabled_layers() {
            let hits = self.store.retrieve(level, query_embedding, top_k).await?;
            let scored = hits.into_iter().map(|r| search_result_to_scored_at(r, level)).collect();
            layer_results.insert(level, scored);
        }
        Ok(layer_results)
    }

    /// Answer `query_text`, grounding the response in up to `top_k` context
    /// chunks. When `use_cross_validation` is set, candidates are first
    /// passed through bidirectional cross-layer validation, falling back to
    /// the paragraph layer if validation finds nothing.
    pub async fn query(&self, query_text: &str, top_k: usize, use_cross_validation: bool) -> EngineResult<QueryResponse> {
        if query_text.trim().is_empty() {
            return Err(EngineError::InvalidInput("query text must not be empty".into()));
        }
        if top_k == 0 {
            return Err(EngineError::InvalidInput("top_k must be greater than zero".into()));
        }

        if self.total_chunks().await? == 0 {
            return Ok(QueryResponse {
                response: EMPTY_INDEX_RESPONSE.to_string(),
                sources: Vec::new(),
                validation: None,
            });
        }

        let cache_key = Self::cache_key(query_text, top_k, use_cross_validation);
        if let Some(cached) = self.cached_response(&cache_key).await {
            return Ok(cached);
        }

        let query_embedding = self.embedder.embed(query_text).await?;
        let layer_results = self.retrieve_layers(&query_embedding, top_k).await?;

        let total_candidates: usize = layer_results.values().map(|v| v.len()).sum();

        let (context_chunks, validated, validation_summary): (Vec<ScoredChunk>, Vec<ValidatedResult>, Option<ValidationSummary>) =
            if use_cross_validation {
                let validated = self.validator.validate_bidirectional(&layer_results, None);
                if !validated.is_empty() {
                    let context: Vec<ScoredChunk> = validated.iter().take(top_k).map(|v| v.primary_chunk.clone()).collect();
                    let summary = ValidationSummary {
                        total_candidates,
                        validated_count: validated.len(),
                        fallback_used: false,
                    };
                    (context, validated, Some(summary))
                } else {
                    let fallback = layer_results.get(&Level::Paragraph).cloned().unwrap_or_default();
                    let context: Vec<ScoredChunk> = fallback.into_iter().take(top_k).collect();
                    let summary = ValidationSummary {
                        total_candidates,
                        validated_count: 0,
                        fallback_used: true,
                    };
                    (context, Vec::new(), Some(summary))
                }
            } else {
                let paragraph = layer_results.get(&Level::Paragraph).cloned().unwrap_or_default();
                let context: Vec<ScoredChunk> = paragraph.into_iter().take(top_k).collect();
                (context, Vec::new(), None)
            };

        let response_text = if context_chunks.is_empty() {
            NO_CONTEXT_RESPONSE.to_string()
        } else {
            let prompt = build_prompt(query_text, &context_chunks);
            match self.llm.complete(&prompt).await {
                Ok(text) => text,
                Err(e) => format!("Error generating response: {e}"),
            }
        };

        let sources = if context_chunks.is_empty() {
            Vec::new()
        } else {
            format_sources(&context_chunks, &validated)
        };

        let response = QueryResponse {
            response: response_text,
            sources,
            validation: validation_summary,
        };

        self.cache_response(&cache_key, &response).await;
        Ok(response)
    }

    /// Snapshot of chunk counts, per level and in total.
    pub async fn stats(&self) -> EngineResult<Stats> {
        let counts = self.store.stats().await?;
        let mut layers = BTreeMap::new();
        let mut total_chunks = 0usize;
        for (level, count) in counts {
            total_chunks += count;
            layers.insert(
                level,
                LayerStats {
                    chunk_count: count,
                    collection_name: MultiLayerStore::collection_name(level),
                },
            );
        }
        Ok(Stats {
            layers,
            total_chunks,
            persist_dir: self.config.persist_dir.clone(),
        })
    }

    /// Remove every chunk at every level.
    pub async fn clear_all(&self) -> EngineResult<()> {
        self.store.clear_all().await?;
        Ok(())
    }

    /// Remove every chunk at `level`, leaving the other layers intact.
    pub async fn clear_layer(&self, level: Level) -> EngineResult<()> {
        self.store.clear_layer(level).await?;
        Ok(())
    }
}

fn search_result_to_scored_at(result: SearchResult, level: Level) -> ScoredChunk {
    let mut chunk = ChunkNode::new(level, 0, result.text);
    chunk.id = result.id;
    chunk.parent_id = result.parent_id;
    chunk.children_ids = result.children_ids;
    chunk.metadata = result.metadata;
    ScoredChunk::new(chunk, result.score)
}
