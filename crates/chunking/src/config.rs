// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

use serde::{Deserialize, Serialize};

use crate::error::{ChunkingError, ChunkingResult};

/// Target size and overlap for a single granularity level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Target chunk size, in characters.
    pub target_size: usize,
    /// Overlap between consecutive chunks, in characters (informational for
    /// section/paragraph/sentence; consumed directly by the summary splitter).
    pub overlap: usize,
}

impl LevelConfig {
    pub fn new(target_size: usize, overlap: usize) -> Self {
        Self { target_size, overlap }
    }
}

/// Per-level configuration for the hierarchical chunker.
///
/// Defaults match the reference chunker: sentence 200/0, paragraph 800/100,
/// section 2000/200, summary 4000/0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub sentence: LevelConfig,
    pub paragraph: LevelConfig,
    pub section: LevelConfig,
    pub summary: LevelConfig,

    /// Minimum stripped length for a paragraph to survive filtering.
    pub min_paragraph_len: usize,
    /// Minimum stripped length for a sentence to survive filtering.
    pub min_sentence_len: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            sentence: LevelConfig::new(200, 0),
            paragraph: LevelConfig::new(800, 100),
            section: LevelConfig::new(2000, 200),
            summary: LevelConfig::new(4000, 0),
            min_paragraph_len: 30,
            min_sentence_len: 15,
        }
    }
}

impl ChunkingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sentence(mut self, config: LevelConfig) -> Self {
        self.sentence = config;
        self
    }

    pub fn with_paragraph(mut self, config: LevelConfig) -> Self {
        self.paragraph = config;
        self
    }

    pub fn with_section(mut self, config: LevelConfig) -> Self {
        self.section = config;
        self
    }

    pub fn with_summary(mut self, config: LevelConfig) -> Self {
        self.summary = config;
        self
    }

    pub fn validate(&self) -> ChunkingResult<()> {
        if self.summary.target_size == 0 {
            return Err(ChunkingError::InvalidConfig(
                "summary.target_size must be > 0".into(),
            ));
        }
        if self.min_paragraph_len == 0 || self.min_sentence_len == 0 {
            return Err(ChunkingError::InvalidConfig(
                "minimum length floors must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_spec() {
        let config = ChunkingConfig::default();
        assert_eq!(config.sentence, LevelConfig::new(200, 0));
        assert_eq!(config.paragraph, LevelConfig::new(800, 100));
        assert_eq!(config.section, LevelConfig::new(2000, 200));
        assert_eq!(config.summary, LevelConfig::new(4000, 0));
        assert_eq!(config.min_paragraph_len, 30);
        assert_eq!(config.min_sentence_len, 15);
    }

    #[test]
    fn test_validate_rejects_zero_summary_size() {
        let config = ChunkingConfig::default().with_summary(LevelConfig::new(0, 0));
        assert!(config.validate().is_err());
    }
}
