// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Level;

/// Deterministic id for a chunk at `level` with ordinal `index`, derived
/// from the first 50 characters of its text.
///
/// `id = "<level>_" + first_12_hex(md5("<level>:<index>:<text[..50]>"))`.
/// Two invocations on byte-identical input always produce the same id.
pub fn generate_chunk_id(level: Level, index: usize, text: &str) -> String {
    let prefix_len = text.char_indices().nth(50).map(|(i, _)| i).unwrap_or(text.len());
    let hash_input = format!("{}:{}:{}", level.as_str(), index, &text[..prefix_len]);
    let digest = format!("{:x}", md5::compute(hash_input.as_bytes()));
    format!("{}_{}", level.as_str(), &digest[..12])
}

/// A chunk of source text at a single granularity level, with links to its
/// parent (one level coarser) and children (one level finer).
///
/// Parent and child references are plain ids into a shared arena, never
/// owning pointers, so the parent/child relationship can be cyclic in
/// concept without ever being materialized as an actual reference cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkNode {
    pub id: String,
    pub text: String,
    pub level: Level,
    pub parent_id: Option<String>,
    pub children_ids: Vec<String>,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ChunkNode {
    /// Create a new chunk, deriving its id from `level`, `index`, and `text`.
    pub fn new(level: Level, index: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        let id = generate_chunk_id(level, index, &text);
        Self {
            id,
            text,
            level,
            parent_id: None,
            children_ids: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn extend_metadata(mut self, metadata: &BTreeMap<String, serde_json::Value>) -> Self {
        for (k, v) in metadata {
            self.metadata.entry(k.clone()).or_insert_with(|| v.clone());
        }
        self
    }

    /// Record a child id, keeping insertion order (callers append as
    /// children are created, never reorder).
    pub fn push_child(&mut self, child_id: impl Into<String>) {
        self.children_ids.push(child_id.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_id() {
        let a = generate_chunk_id(Level::Sentence, 0, "The cat sat on the mat.");
        let b = generate_chunk_id(Level::Sentence, 0, "The cat sat on the mat.");
        assert_eq!(a, b);
        assert!(a.starts_with("sentence_"));
        assert_eq!(a.len(), "sentence_".len() + 12);
    }

    #[test]
    fn test_id_varies_by_index_and_level() {
        let a = generate_chunk_id(Level::Sentence, 0, "same text");
        let b = generate_chunk_id(Level::Sentence, 1, "same text");
        let c = generate_chunk_id(Level::Paragraph, 0, "same text");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_chunk_builder() {
        let chunk = ChunkNode::new(Level::Paragraph, 0, "Hello world")
            .with_parent("section_abc")
            .with_metadata("paragraph_index", 0);
        assert_eq!(chunk.parent_id.as_deref(), Some("section_abc"));
        assert_eq!(chunk.metadata.get("paragraph_index"), Some(&serde_json::json!(0)));
    }
}
