// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{VectorError, VectorResult};

/// A single embedded record held by a vector index: the embedding plus the
/// source chunk's text and metadata, so a search hit can be turned directly
/// into a retrieval result without a second lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub text: String,
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// Id of the chunk one level up the hierarchy, if any.
    pub parent_id: Option<String>,
    /// Ids of the chunks one level down the hierarchy.
    pub children_ids: Vec<String>,
}

/// Result of a vector search operation.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Chunk id.
    pub id: String,
    /// Similarity score (0.0 - 1.0, higher is better).
    pub score: f32,
    /// The chunk's source text.
    pub text: String,
    /// The chunk's metadata.
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// Id of the chunk one level up the hierarchy, if any.
    pub parent_id: Option<String>,
    /// Ids of the chunks one level down the hierarchy.
    pub children_ids: Vec<String>,
}

/// Abstract vector index interface.
///
/// One index holds the embeddings for a single granularity level; a
/// `MultiLayerStore` owns one per level.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or overwrite a single record.
    async fn insert(&self, record: VectorRecord) -> VectorResult<()>;

    /// Insert or overwrite multiple records.
    async fn insert_batch(&self, records: Vec<VectorRecord>) -> VectorResult<()>;

    /// Search for the k nearest neighbors of `query`.
    async fn search(&self, query: &[f32], k: usize) -> VectorResult<Vec<SearchResult>>;

    /// Remove a record by id. Removing an absent id is not an error.
    async fn remove(&self, id: &str) -> VectorResult<()>;

    /// Total number of records held.
    async fn count(&self) -> VectorResult<usize>;

    /// Remove every record.
    async fn clear(&self) -> VectorResult<()>;

    /// The embedding dimension this index was created with.
    fn dimension(&self) -> usize;

    /// Whether the index is ready to serve queries.
    fn is_ready(&self) -> bool {
        true
    }
}

/// In-memory vector index backed by a `HashMap` under a read-write lock.
#[derive(Clone, Debug)]
pub struct MemoryVectorIndex {
    dimension: usize,
    records: Arc<RwLock<HashMap<String, VectorRecord>>>,
}

impl MemoryVectorIndex {
    /// Create a new in-memory vector index for embeddings of `dimension`.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let mut dot_product = 0.0;
        let mut norm_a = 0.0;
        let mut norm_b = 0.0;

        for i in 0..a.len() {
            dot_product += a[i] * b[i];
            norm_a += a[i] * a[i];
            norm_b += b[i] * b[i];
        }

        let denom = norm_a.sqrt() * norm_b.sqrt();
        if denom > 0.0 {
            dot_product / denom
        } else {
            0.0
        }
    }
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    async fn insert(&self, record: VectorRecord) -> VectorResult<()> {
        if record.vector.len() != self.dimension {
            return Err(VectorError::InvalidDimension {
                expected: self.dimension,
                found: record.vector.len(),
            });
        }
        let mut records = self.records.write().await;
        records.insert(record.id.clone(), record);
        Ok(())
    }

    async fn insert_batch(&self, batch: Vec<VectorRecord>) -> VectorResult<()> {
        for record in &batch {
            if record.vector.len() != self.dimension {
                return Err(VectorError::InvalidDimension {
                    expected: self.dimension,
                    found: record.vector.len(),
                });
            }
        }
        let mut records = self.records.write().await;
        for record in batch {
            records.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn search(&self, query: &[f32], k: usize) -> VectorResult<Vec<SearchResult>> {
        if query.len() != self.dimension {
            return Err(VectorError::InvalidDimension {
                expected: self.dimension,
                found: query.len(),
            });
        }

        let records = self.records.read().await;
        let mut results: Vec<SearchResult> = records
            .values()
            .map(|record| SearchResult {
                id: record.id.clone(),
                score: Self::cosine_similarity(query, &record.vector).clamp(0.0, 1.0),
                text: record.text.clone(),
                metadata: record.metadata.clone(),
                parent_id: record.parent_id.clone(),
                children_ids: record.children_ids.clone(),
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        results.truncate(k);
        Ok(results)
    }

    async fn remove(&self, id: &str) -> VectorResult<()> {
        let mut records = self.records.write().await;
        records.remove(id);
        Ok(())
    }

    async fn count(&self) -> VectorResult<usize> {
        let records = self.records.read().await;
        Ok(records.len())
    }

    async fn clear(&self) -> VectorResult<()> {
        let mut records = self.records.write().await;
        records.clear();
        Ok(())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
