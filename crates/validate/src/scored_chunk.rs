// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

use stratum_core::ChunkNode;

/// A `ChunkNode` decorated with a retrieval score, valid only for the
/// lifetime of a single query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    /// The underlying chunk.
    pub chunk: ChunkNode,
    /// Similarity score in `[0, 1]`, as reported by the retriever that
    /// produced this chunk.
    pub score: f32,
}

impl ScoredChunk {
    /// Pair a chunk with its retrieval score, clamping the score to `[0, 1]`.
    pub fn new(chunk: ChunkNode, score: f32) -> Self {
        Self {
            chunk,
            score: score.clamp(0.0, 1.0),
        }
    }
}
