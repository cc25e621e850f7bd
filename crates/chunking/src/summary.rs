// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

/// A raw summary chunk's text plus its ordinal index, before being turned
/// into a `ChunkNode`.
pub struct RawSummaryChunk {
    pub text: String,
    pub chunk_index: usize,
}

/// Produce the document-level summary chunks.
///
/// If `text` fits within `target_size` characters it becomes a single
/// chunk. Otherwise it is split into overlapping word-windows:
/// `words_per_chunk = target_size / 5`, `overlap_words = words_per_chunk / 4`.
pub fn create_summary_chunks(text: &str, target_size: usize) -> Vec<RawSummaryChunk> {
    if text.chars().count() <= target_size {
        return vec![RawSummaryChunk { text: text.to_string(), chunk_index: 0 }];
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let words_per_chunk = (target_size / 5).max(1);
    let overlap_words = words_per_chunk / 4;

    let mut chunks = Vec::new();
    let mut start = 0usize;
    let mut index = 0usize;

    while start < words.len() {
        let end = (start + words_per_chunk).min(words.len());
        let chunk_text = words[start..end].join(" ");
        chunks.push(RawSummaryChunk { text: chunk_text, chunk_index: index });

        start = if end < words.len() { end.saturating_sub(overlap_words) } else { words.len() };
        index += 1;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_document_single_chunk() {
        let chunks = create_summary_chunks("Short text.", 4000);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_index, 0);
    }

    #[test]
    fn test_long_document_overlapping_chunks() {
        let words: Vec<String> = (0..2000).map(|i| format!("word{}", i)).collect();
        let text = words.join(" ");
        let chunks = create_summary_chunks(&text, 4000);
        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
        }
    }

    #[test]
    fn test_loop_terminates_on_tiny_target() {
        let text = "a b c d e f g h i j k l m n o p q r s t";
        let chunks = create_summary_chunks(text, 1);
        assert!(!chunks.is_empty());
    }
}
