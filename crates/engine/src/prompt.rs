// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Prompt assembly and source formatting for a single query.
//!
//! Both functions here are pure: no I/O, no async, so they're exercised
//! directly by unit tests without an engine instance.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use stratum_core::Level;
use stratum_validate::{ScoredChunk, ValidatedResult};

const SOURCE_TEXT_TRUNCATE_LEN: usize = 500;
const DEDUP_PREFIX_LEN: usize = 50;

/// Per-chunk validation detail attached to a `Source` when the chunk
/// survived cross-layer validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceValidation {
    /// Combined confidence, in `[0, 1]`.
    pub confidence: f32,
    /// Number of granularities whose evidence supported this chunk.
    pub layer_coverage: usize,
    /// Which levels supplied that evidence.
    pub supporting_layers: Vec<Level>,
}

/// One piece of context shown to the caller alongside the response text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Source text, truncated to 500 characters with a trailing `"..."`
    /// marker when longer.
    pub text: String,
    /// Granularity this chunk was retrieved at.
    pub level: Level,
    /// Retrieval score.
    pub score: f32,
    /// Chunk id, stable across queries for the same ingested text.
    pub chunk_id: String,
    /// Chunk metadata, excluding `chunk_id`/`parent_id` (redundant with the
    /// dedicated fields above).
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// Cross-layer validation detail, present only when validation ran and
    /// this chunk was one of its outputs.
    pub validation: Option<SourceValidation>,
}

fn truncate_source_text(text: &str) -> String {
    if text.chars().count() > SOURCE_TEXT_TRUNCATE_LEN {
        let cut = text.char_indices().nth(SOURCE_TEXT_TRUNCATE_LEN).map(|(i, _)| i).unwrap_or(text.len());
        format!("{}...", &text[..cut])
    } else {
        text.to_string()
    }
}

fn is_duplicate(text: &str, seen: &[String]) -> bool {
    let prefix: String = text.chars().take(DEDUP_PREFIX_LEN).collect();
    seen.iter().any(|s| {
        text.contains(s.as_str())
            || s.contains(text)
            || (text.chars().count() > DEDUP_PREFIX_LEN && s.starts_with(&prefix))
    })
}

/// Build the validation-detail lookup keyed by chunk id.
fn validation_map(validated: &[ValidatedResult]) -> HashMap<String, SourceValidation> {
    validated
        .iter()
        .map(|v| {
            (
                v.primary_chunk.chunk.id.clone(),
                SourceValidation {
                    confidence: v.confidence_score,
                    layer_coverage: v.layer_coverage,
                    supporting_layers: v.supporting_chunks.keys().copied().collect(),
                },
            )
        })
        .collect()
}

/// Deduplicate `chunks` (dropping any whose text is a substring of, or
/// contains, an earlier kept chunk's text, or whose first 50 characters
/// repeat an earlier kept chunk's) and format the survivors as `Source`s,
/// attaching validation detail where `validated` covers them.
pub fn format_sources(chunks: &[ScoredChunk], validated: &[ValidatedResult]) -> Vec<Source> {
    let val_map = validation_map(validated);
    let mut seen_texts: Vec<String> = Vec::new();
    let mut sources = Vec::new();

    for scored in chunks {
        let text = &scored.chunk.text;
        if is_duplicate(text, &seen_texts) {
            continue;
        }
        seen_texts.push(text.clone());

        let mut metadata = scored.chunk.metadata.clone();
        metadata.remove("chunk_id");
        metadata.remove("parent_id");

        sources.push(Source {
            text: truncate_source_text(text),
            level: scored.chunk.level,
            score: scored.score,
            chunk_id: scored.chunk.id.clone(),
            metadata,
            validation: val_map.get(&scored.chunk.id).cloned(),
        });
    }

    sources
}

/// Fixed instruction template the response prompt is assembled from,
/// verbatim.
const PROMPT_TEMPLATE: &str = "Based on the following validated research paper excerpts, provide a **detailed and comprehensive** answer to the question.\n\nInstructions:\n1. **Be Detailed**: Do not give short summaries. Explain concepts in depth using the provided context.\n2. **Cite Sources**: When using information from a specific source, cite it using its ID (e.g., \"[Source 1]\", \"[Source 2]\").\n3. **No Hallucinations**: Only use information that appears in the provided context. If the context doesn't contain enough information to fully answer the question, say so clearly.\n4. **Admit Uncertainty**: If different sources contradict each other or if the answer is unclear, explain the ambiguity.\n\nContext:\n{context}\n\nQuestion: {query_text}\n\nDetailed Answer:";

/// Assemble the context block from `chunks` in order — `chunks[i]` becomes
/// `[Source i+1 - <level>]` — and splice it into the fixed instruction
/// template alongside `query_text`.
pub fn build_prompt(query_text: &str, chunks: &[ScoredChunk]) -> String {
    let context = chunks
        .iter()
        .enumerate()
        .map(|(i, scored)| format!("[Source {} - {}]\n{}", i + 1, scored.chunk.level, scored.chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    PROMPT_TEMPLATE.replace("{context}", &context).replace("{query_text}", query_text)
}
