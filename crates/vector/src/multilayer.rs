// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

use std::collections::BTreeMap;
use std::sync::Arc;

use stratum_core::{ChunkNode, Level};
use tracing::info;

use crate::index::{MemoryVectorIndex, SearchResult, VectorIndex, VectorRecord};
use crate::{VectorError, VectorResult};

/// Collection-name prefix shared by every layer's backing index, mirroring
/// `sheet_rag_<level>` naming so the four layers never collide.
pub const COLLECTION_PREFIX: &str = "sheet_rag";

/// Four independent vector indices, one per granularity level.
///
/// This is the multi-layer front-end described for the Sheet RAG pipeline:
/// every `add_chunks`/`retrieve` call is scoped to a single `Level` and
/// never touches the other three indices.
pub struct MultiLayerStore {
    dimension: usize,
    indices: BTreeMap<Level, Arc<dyn VectorIndex>>,
}

impl MultiLayerStore {
    /// Create a store with one fresh in-memory index per level, all sized
    /// for `dimension`-length embeddings.
    pub fn new(dimension: usize) -> Self {
        let mut indices: BTreeMap<Level, Arc<dyn VectorIndex>> = BTreeMap::new();
        for level in Level::ALL {
            indices.insert(level, Arc::new(MemoryVectorIndex::new(dimension)));
        }
        Self { dimension, indices }
    }

    /// The collection name backing `level`, e.g. `"sheet_rag_sentence"`.
    pub fn collection_name(level: Level) -> String {
        format!("{}_{}", COLLECTION_PREFIX, level.as_str())
    }

    fn index(&self, level: Level) -> VectorResult<&Arc<dyn VectorIndex>> {
        self.indices
            .get(&level)
            .ok_or_else(|| VectorError::LayerNotFound(Self::collection_name(level)))
    }

    /// Embed and index `chunks` at `level`. `embeddings[i]` must correspond
    /// to `chunks[i]`; mismatched lengths are a caller error surfaced as
    /// `VectorError::Custom`.
    pub async fn add_chunks(&self, level: Level, chunks: &[ChunkNode], embeddings: Vec<Vec<f32>>) -> VectorResult<()> {
        if chunks.len() != embeddings.len() {
            return Err(VectorError::Custom(format!(
                "chunk/embedding count mismatch: {} chunks, {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }
        if chunks.is_empty() {
            return Ok(());
        }

        let records = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, vector)| VectorRecord {
                id: chunk.id.clone(),
                vector,
                text: chunk.text.clone(),
                metadata: chunk.metadata.clone(),
                parent_id: chunk.parent_id.clone(),
                children_ids: chunk.children_ids.clone(),
            })
            .collect::<Vec<_>>();

        let index = self.index(level)?;
        index.insert_batch(records).await?;
        info!(level = %level, count = chunks.len(), "indexed chunks");
        Ok(())
    }

    /// Retrieve the top `k` nearest neighbors of `query` within `level`.
    pub async fn retrieve(&self, level: Level, query: &[f32], k: usize) -> VectorResult<Vec<SearchResult>> {
        if query.len() != self.dimension {
            return Err(VectorError::InvalidDimension {
                expected: self.dimension,
                found: query.len(),
            });
        }
        self.index(level)?.search(query, k).await
    }

    /// Number of chunks indexed at `level`.
    pub async fn count(&self, level: Level) -> VectorResult<usize> {
        self.index(level)?.count().await
    }

    /// Number of chunks indexed at every level, keyed by level.
    pub async fn stats(&self) -> VectorResult<BTreeMap<Level, usize>> {
        let mut stats = BTreeMap::new();
        for level in Level::ALL {
            stats.insert(level, self.count(level).await?);
        }
        Ok(stats)
    }

    /// Remove every chunk at `level`, leaving the other three layers intact.
    pub async fn clear_layer(&self, level: Level) -> VectorResult<()> {
        self.index(level)?.clear().await
    }

    /// Remove every chunk at every level.
    pub async fn clear_all(&self) -> VectorResult<()> {
        for level in Level::ALL {
            self.clear_layer(level).await?;
        }
        Ok(())
    }

    /// The embedding dimension every layer was created with.
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}
