// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

use std::collections::BTreeMap;

use stratum_core::{ChunkNode, Level};
use tracing::debug;

use crate::config::ChunkingConfig;
use crate::paragraphs::split_into_paragraphs;
use crate::sections::split_into_sections;
use crate::sentences::split_into_sentences;
use crate::summary::create_summary_chunks;

/// The four aligned chunk sets produced from one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkedDocument {
    pub sentences: Vec<ChunkNode>,
    pub paragraphs: Vec<ChunkNode>,
    pub sections: Vec<ChunkNode>,
    pub summaries: Vec<ChunkNode>,
}

impl ChunkedDocument {
    pub fn chunks_at(&self, level: Level) -> &[ChunkNode] {
        match level {
            Level::Sentence => &self.sentences,
            Level::Paragraph => &self.paragraphs,
            Level::Section => &self.sections,
            Level::Summary => &self.summaries,
        }
    }

    pub fn total_len(&self) -> usize {
        self.sentences.len() + self.paragraphs.len() + self.sections.len() + self.summaries.len()
    }

    fn extend(&mut self, other: ChunkedDocument) {
        self.sentences.extend(other.sentences);
        self.paragraphs.extend(other.paragraphs);
        self.sections.extend(other.sections);
        self.summaries.extend(other.summaries);
    }
}

/// Splits one input document into four aligned sets of `ChunkNode`s,
/// building the parent/child tree as it goes.
///
/// Stateless and re-entrant: every method takes `&self`, so one chunker can
/// be shared across concurrent ingestion calls.
#[derive(Debug, Clone)]
pub struct HierarchicalChunker {
    config: ChunkingConfig,
}

impl HierarchicalChunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Chunk one document at all four granularity levels.
    ///
    /// Empty input yields zero chunks at every level; this is not an error.
    pub fn chunk_document(&self, text: &str, doc_metadata: &BTreeMap<String, serde_json::Value>) -> ChunkedDocument {
        if text.trim().is_empty() {
            return ChunkedDocument::default();
        }

        let mut result = ChunkedDocument::default();

        // Level 4: summaries, built first so sections can reference the
        // first summary chunk's id as their parent.
        let raw_summaries = create_summary_chunks(text, self.config.summary.target_size);
        for raw in &raw_summaries {
            let chunk = ChunkNode::new(Level::Summary, raw.chunk_index, raw.text.clone())
                .extend_metadata(doc_metadata)
                .with_metadata("chunk_index", raw.chunk_index);
            result.summaries.push(chunk);
        }
        let summary_parent_id = result.summaries.first().map(|s| s.id.clone());

        // Level 3: sections.
        let raw_sections = split_into_sections(text);
        for (idx, raw) in raw_sections.iter().enumerate() {
            let section_text = format!("{}\n\n{}", raw.title, raw.content);
            let mut chunk = ChunkNode::new(Level::Section, idx, section_text)
                .extend_metadata(doc_metadata)
                .with_metadata("section_title", raw.title.clone())
                .with_metadata("section_index", idx);
            if let Some(parent) = &summary_parent_id {
                chunk = chunk.with_parent(parent.clone());
            }
            result.sections.push(chunk);
        }

        // Level 2: paragraphs, nested under each section.
        let mut para_idx = 0usize;
        for section_idx in 0..result.sections.len() {
            let section_title = result.sections[section_idx]
                .metadata
                .get("section_title")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let paragraphs = split_into_paragraphs(&result.sections[section_idx].text);
            for para in paragraphs {
                if para.chars().count() < self.config.min_paragraph_len {
                    continue;
                }
                let section_id = result.sections[section_idx].id.clone();
                let chunk = ChunkNode::new(Level::Paragraph, para_idx, para)
                    .extend_metadata(doc_metadata)
                    .with_parent(section_id)
                    .with_metadata("paragraph_index", para_idx)
                    .with_metadata("parent_section", section_title.clone());
                result.sections[section_idx].push_child(chunk.id.clone());
                result.paragraphs.push(chunk);
                para_idx += 1;
            }
        }

        // Level 1: sentences, nested under each paragraph.
        let mut sent_idx = 0usize;
        for para_idx in 0..result.paragraphs.len() {
            let sentences = split_into_sentences(&result.paragraphs[para_idx].text);
            for sent in sentences {
                if sent.chars().count() < self.config.min_sentence_len {
                    continue;
                }
                let paragraph_id = result.paragraphs[para_idx].id.clone();
                let chunk = ChunkNode::new(Level::Sentence, sent_idx, sent)
                    .extend_metadata(doc_metadata)
                    .with_parent(paragraph_id.clone())
                    .with_metadata("sentence_index", sent_idx)
                    .with_metadata("parent_paragraph", paragraph_id);
                result.paragraphs[para_idx].push_child(chunk.id.clone());
                result.sentences.push(chunk);
                sent_idx += 1;
            }
        }

        debug!(
            sentences = result.sentences.len(),
            paragraphs = result.paragraphs.len(),
            sections = result.sections.len(),
            summaries = result.summaries.len(),
            "chunked document"
        );

        result
    }

    /// Chunk multiple documents, concatenating their results per level.
    pub fn chunk_documents<'a>(
        &self,
        documents: impl IntoIterator<Item = (&'a str, &'a BTreeMap<String, serde_json::Value>)>,
    ) -> ChunkedDocument {
        let mut combined = ChunkedDocument::default();
        for (text, metadata) in documents {
            combined.extend(self.chunk_document(text, metadata));
        }
        combined
    }
}

impl Default for HierarchicalChunker {
    fn default() -> Self {
        Self::new(ChunkingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_metadata() -> BTreeMap<String, serde_json::Value> {
        BTreeMap::new()
    }

    #[test]
    fn test_empty_document_yields_no_chunks() {
        let chunker = HierarchicalChunker::default();
        let result = chunker.chunk_document("", &empty_metadata());
        assert_eq!(result.total_len(), 0);
    }

    #[test]
    fn test_single_short_document_scenario() {
        let chunker = HierarchicalChunker::default();
        let text = "Introduction\n\nThe cat sat on the mat. It was warm.\n\nThe dog barked loudly.";
        let result = chunker.chunk_document(text, &empty_metadata());

        assert_eq!(result.summaries.len(), 1);
        assert_eq!(result.sections.len(), 1);
        assert_eq!(result.sections[0].metadata.get("section_title").unwrap(), "Introduction");
        assert_eq!(result.paragraphs.len(), 1);
        assert_eq!(result.sentences.len(), 2);

        for sentence in &result.sentences {
            let parent_id = sentence.parent_id.as_ref().unwrap();
            assert!(result.paragraphs.iter().any(|p| &p.id == parent_id));
        }
    }

    #[test]
    fn test_parent_child_invariant() {
        let chunker = HierarchicalChunker::default();
        let text = "Introduction\n\nThe cat sat on the mat. It was warm.\n\nThe dog barked loudly enough to wake everyone.";
        let result = chunker.chunk_document(text, &empty_metadata());

        for sentence in &result.sentences {
            let parent = result
                .paragraphs
                .iter()
                .find(|p| Some(&p.id) == sentence.parent_id.as_ref())
                .expect("sentence parent must exist");
            assert!(parent.children_ids.contains(&sentence.id));
        }
        for paragraph in &result.paragraphs {
            let parent = result
                .sections
                .iter()
                .find(|s| Some(&s.id) == paragraph.parent_id.as_ref())
                .expect("paragraph parent must exist");
            assert!(parent.children_ids.contains(&paragraph.id));
        }
    }

    #[test]
    fn test_deterministic_ids() {
        let chunker = HierarchicalChunker::default();
        let text = "Background\n\nSome content spanning a paragraph that is long enough to survive filtering easily.";
        let a = chunker.chunk_document(text, &empty_metadata());
        let b = chunker.chunk_document(text, &empty_metadata());
        assert_eq!(
            a.sentences.iter().map(|c| &c.id).collect::<Vec<_>>(),
            b.sentences.iter().map(|c| &c.id).collect::<Vec<_>>()
        );
        assert_eq!(
            a.sections.iter().map(|c| &c.id).collect::<Vec<_>>(),
            b.sections.iter().map(|c| &c.id).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_no_paragraphs_still_yields_section_and_summary() {
        let chunker = HierarchicalChunker::default();
        // Content survives as a section but is too short to pass the
        // paragraph floor (30 chars).
        let text = "Notes\n\nToo short.";
        let result = chunker.chunk_document(text, &empty_metadata());
        assert!(!result.sections.is_empty());
        assert!(!result.summaries.is_empty());
        assert!(result.paragraphs.is_empty());
    }
}
