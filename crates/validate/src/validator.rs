// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

use std::collections::{BTreeMap, HashMap, HashSet};

use stratum_core::Level;
use tracing::debug;

use crate::error::{ValidateError, ValidateResult};
use crate::scored_chunk::ScoredChunk;

/// Diagnostic record of how a `ValidatedResult`'s confidence was derived,
/// kept alongside the result for callers that want to explain a score
/// rather than just consume it.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationDetails {
    /// Adjusted similarity of each supporting level's chunk to the primary.
    pub similarities: BTreeMap<Level, f32>,
    /// The layer weights in effect when this result was scored.
    pub layer_weights_used: BTreeMap<Level, f32>,
    /// The support threshold in effect when this result was scored.
    pub threshold: f32,
}

/// One validated primary chunk, backed by evidence at other granularities.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedResult {
    /// The chunk being validated, at its originating level.
    pub primary_chunk: ScoredChunk,
    /// Best-matching chunk at each other level that cleared the support
    /// threshold, keyed by level.
    pub supporting_chunks: BTreeMap<Level, ScoredChunk>,
    /// Combined confidence in `[0, 1]`.
    pub confidence_score: f32,
    /// `1 + supporting_chunks.len()`.
    pub layer_coverage: usize,
    /// Diagnostic detail behind `confidence_score`.
    pub validation_details: ValidationDetails,
}

fn jaccard_similarity(a: &str, b: &str) -> f32 {
    let tokens = |s: &str| -> HashSet<String> { s.to_lowercase().split_whitespace().map(|t| t.to_string()).collect() };
    let set_a = tokens(a);
    let set_b = tokens(b);
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;
    if denom > 0.0 {
        dot / denom
    } else {
        0.0
    }
}

fn is_structurally_related(p_id: &str, p_parent_id: Option<&str>, q_id: &str, q_children_ids: &[String]) -> bool {
    p_parent_id == Some(q_id) || q_children_ids.iter().any(|c| c == p_id)
}

/// Selects primaries with supporting evidence at multiple granularities and
/// scores them, per the weighted cross-layer confidence formula.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossLayerValidator {
    layer_weights: BTreeMap<Level, f32>,
    support_threshold: f32,
    min_layers: usize,
}

impl Default for CrossLayerValidator {
    fn default() -> Self {
        let mut layer_weights = BTreeMap::new();
        layer_weights.insert(Level::Sentence, 0.30);
        layer_weights.insert(Level::Paragraph, 0.30);
        layer_weights.insert(Level::Section, 0.25);
        layer_weights.insert(Level::Summary, 0.15);
        Self {
            layer_weights,
            support_threshold: 0.5,
            min_layers: 2,
        }
    }
}

impl CrossLayerValidator {
    /// Build a validator with the default layer weights and thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the per-level weighting used in the confidence formula.
    pub fn with_layer_weights(mut self, weights: BTreeMap<Level, f32>) -> Self {
        self.layer_weights = weights;
        self
    }

    /// Override the minimum adjusted similarity for a chunk to count as
    /// support.
    pub fn with_support_threshold(mut self, threshold: f32) -> Self {
        self.support_threshold = threshold;
        self
    }

    /// Override the minimum `layer_coverage` a primary must reach to survive.
    pub fn with_min_layers(mut self, min_layers: usize) -> Self {
        self.min_layers = min_layers;
        self
    }

    /// Reject configurations with negative weights or weights that don't
    /// sum to 1 within floating-point tolerance.
    pub fn validate_config(&self) -> ValidateResult<()> {
        if self.layer_weights.values().any(|&w| w < 0.0) {
            return Err(ValidateError::InvalidConfig("layer weights must be non-negative".into()));
        }
        let sum: f32 = self.layer_weights.values().sum();
        if (sum - 1.0).abs() > 1e-3 {
            return Err(ValidateError::InvalidConfig(format!("layer weights must sum to 1.0, got {sum}")));
        }
        Ok(())
    }

    fn weight(&self, level: Level) -> f32 {
        self.layer_weights.get(&level).copied().unwrap_or(0.0)
    }

    fn find_support(
        &self,
        primary: &ScoredChunk,
        candidates: &[ScoredChunk],
        embeddings: Option<&HashMap<String, Vec<f32>>>,
    ) -> Option<(ScoredChunk, f32)> {
        let mut best: Option<(ScoredChunk, f32)> = None;

        for candidate in candidates {
            let mut sim = match embeddings {
                Some(map) => match (map.get(&primary.chunk.id), map.get(&candidate.chunk.id)) {
                    (Some(a), Some(b)) => cosine_similarity(a, b),
                    _ => jaccard_similarity(&primary.chunk.text, &candidate.chunk.text),
                },
                None => jaccard_similarity(&primary.chunk.text, &candidate.chunk.text),
            };

            if is_structurally_related(
                &primary.chunk.id,
                primary.chunk.parent_id.as_deref(),
                &candidate.chunk.id,
                &candidate.chunk.children_ids,
            ) {
                sim = (sim + 0.2).min(1.0);
            }

            let is_better = match &best {
                Some((_, best_sim)) => sim > *best_sim,
                None => true,
            };
            if is_better {
                best = Some((candidate.clone(), sim));
            }
        }

        best.filter(|(_, sim)| *sim >= self.support_threshold)
    }

    fn confidence(&self, primary: &ScoredChunk, primary_level: Level, support: &BTreeMap<Level, (ScoredChunk, f32)>) -> f32 {
        let mut weighted = self.weight(primary_level) * primary.score;
        let mut total_w = self.weight(primary_level);

        for (level, (chunk, sim)) in support {
            let w = self.weight(*level);
            weighted += w * (0.6 * chunk.score + 0.4 * sim);
            total_w += w;
        }

        let base = if total_w > 0.0 { weighted / total_w } else { 0.0 };
        let bonus = (support.len() as f32 * 0.1).min(0.2);
        (base + bonus).min(1.0)
    }

    /// Validate every chunk retrieved at `primary_level` against the
    /// retrieval results at the other levels, keeping those whose evidence
    /// spans at least `min_layers` granularities.
    pub fn validate(
        &self,
        layer_results: &BTreeMap<Level, Vec<ScoredChunk>>,
        primary_level: Level,
        embeddings: Option<&HashMap<String, Vec<f32>>>,
    ) -> Vec<ValidatedResult> {
        let Some(primaries) = layer_results.get(&primary_level) else {
            return Vec::new();
        };

        let mut results = Vec::new();

        for primary in primaries {
            let mut support: BTreeMap<Level, (ScoredChunk, f32)> = BTreeMap::new();

            for (&level, candidates) in layer_results {
                if level == primary_level {
                    continue;
                }
                if let Some(found) = self.find_support(primary, candidates, embeddings) {
                    support.insert(level, found);
                }
            }

            let layer_coverage = 1 + support.len();
            if layer_coverage < self.min_layers {
                continue;
            }

            let confidence_score = self.confidence(primary, primary_level, &support);

            let mut similarities = BTreeMap::new();
            let mut supporting_chunks = BTreeMap::new();
            for (level, (chunk, sim)) in support {
                similarities.insert(level, sim);
                supporting_chunks.insert(level, chunk);
            }

            results.push(ValidatedResult {
                primary_chunk: primary.clone(),
                supporting_chunks,
                confidence_score,
                layer_coverage,
                validation_details: ValidationDetails {
                    similarities,
                    layer_weights_used: self.layer_weights.clone(),
                    threshold: self.support_threshold,
                },
            });
        }

        results.sort_by(|a, b| {
            b.confidence_score
                .partial_cmp(&a.confidence_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.primary_chunk.score.partial_cmp(&a.primary_chunk.score).unwrap_or(std::cmp::Ordering::Equal))
                .then_with(|| a.primary_chunk.chunk.id.cmp(&b.primary_chunk.chunk.id))
        });

        debug!(primary_level = %primary_level, kept = results.len(), candidates = primaries.len(), "validated layer");
        results
    }

    /// Run `validate` with `sentence`, `paragraph`, and `section` in turn as
    /// the primary level, keeping the first occurrence of each
    /// `primary_chunk.id` and re-sorting the merged set by confidence.
    pub fn validate_bidirectional(
        &self,
        layer_results: &BTreeMap<Level, Vec<ScoredChunk>>,
        embeddings: Option<&HashMap<String, Vec<f32>>>,
    ) -> Vec<ValidatedResult> {
        let mut seen = HashSet::new();
        let mut merged = Vec::new();

        for &primary_level in &Level::BIDIRECTIONAL_PRIMARIES {
            for result in self.validate(layer_results, primary_level, embeddings) {
                if seen.insert(result.primary_chunk.chunk.id.clone()) {
                    merged.push(result);
                }
            }
        }

        merged.sort_by(|a, b| {
            b.confidence_score
                .partial_cmp(&a.confidence_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.primary_chunk.score.partial_cmp(&a.primary_chunk.score).unwrap_or(std::cmp::Ordering::Equal))
                .then_with(|| a.primary_chunk.chunk.id.cmp(&b.primary_chunk.chunk.id))
        });

        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratum_core::ChunkNode;

    fn sc(level: Level, idx: usize, text: &str, score: f32) -> ScoredChunk {
        ScoredChunk::new(ChunkNode::new(level, idx, text), score)
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        CrossLayerValidator::new().validate_config().unwrap();
    }

    #[test]
    fn test_rejects_negative_weight() {
        let mut weights = BTreeMap::new();
        weights.insert(Level::Sentence, -0.1);
        weights.insert(Level::Paragraph, 1.1);
        let validator = CrossLayerValidator::new().with_layer_weights(weights);
        assert!(validator.validate_config().is_err());
    }

    #[test]
    fn test_empty_layer_results_returns_empty() {
        let validator = CrossLayerValidator::new();
        let layer_results = BTreeMap::new();
        assert!(validator.validate(&layer_results, Level::Sentence, None).is_empty());
    }

    #[test]
    fn test_min_layers_filters_unsupported_primary() {
        let mut layer_results = BTreeMap::new();
        layer_results.insert(Level::Sentence, vec![sc(Level::Sentence, 0, "a completely unrelated sentence", 0.9)]);
        layer_results.insert(Level::Paragraph, vec![sc(Level::Paragraph, 0, "totally different content here", 0.8)]);

        let validator = CrossLayerValidator::new().with_min_layers(2);
        assert!(validator.validate(&layer_results, Level::Sentence, None).is_empty());

        let validator = CrossLayerValidator::new().with_min_layers(1);
        let results = validator.validate(&layer_results, Level::Sentence, None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].layer_coverage, 1);
        assert!(results[0].supporting_chunks.is_empty());
    }

    #[test]
    fn test_parent_child_boost_crosses_threshold() {
        let paragraph = ChunkNode::new(Level::Paragraph, 0, "the cat sat on the mat today");
        let sentence = ChunkNode::new(Level::Sentence, 0, "the cat sat there").with_parent(paragraph.id.clone());

        let mut layer_results = BTreeMap::new();
        layer_results.insert(Level::Sentence, vec![ScoredChunk::new(sentence, 0.9)]);
        layer_results.insert(Level::Paragraph, vec![ScoredChunk::new(paragraph, 0.8)]);

        let validator = CrossLayerValidator::new().with_support_threshold(0.5).with_min_layers(1);
        let results = validator.validate(&layer_results, Level::Sentence, None);

        assert_eq!(results.len(), 1);
        assert!(results[0].supporting_chunks.contains_key(&Level::Paragraph));
        assert!(results[0].validation_details.similarities[&Level::Paragraph] >= 0.5);
    }

    #[test]
    fn test_confidence_in_bounds() {
        let paragraph = ChunkNode::new(Level::Paragraph, 0, "shared words across both chunks here");
        let sentence = ChunkNode::new(Level::Sentence, 0, "shared words across both chunks").with_parent(paragraph.id.clone());

        let mut layer_results = BTreeMap::new();
        layer_results.insert(Level::Sentence, vec![ScoredChunk::new(sentence, 1.0)]);
        layer_results.insert(Level::Paragraph, vec![ScoredChunk::new(paragraph, 1.0)]);

        let validator = CrossLayerValidator::new().with_min_layers(1);
        let results = validator.validate(&layer_results, Level::Sentence, None);

        assert_eq!(results.len(), 1);
        assert!(results[0].confidence_score >= 0.0 && results[0].confidence_score <= 1.0);
    }

    #[test]
    fn test_increasing_threshold_shrinks_support() {
        let paragraph = ChunkNode::new(Level::Paragraph, 0, "alpha beta gamma delta epsilon zeta");
        let sentence = ChunkNode::new(Level::Sentence, 0, "alpha beta gamma unrelated words entirely");

        let mut layer_results = BTreeMap::new();
        layer_results.insert(Level::Sentence, vec![ScoredChunk::new(sentence, 0.9)]);
        layer_results.insert(Level::Paragraph, vec![ScoredChunk::new(paragraph, 0.9)]);

        let loose = CrossLayerValidator::new().with_support_threshold(0.01).with_min_layers(1);
        let strict = CrossLayerValidator::new().with_support_threshold(0.99).with_min_layers(1);

        let loose_count = loose.validate(&layer_results, Level::Sentence, None)[0].supporting_chunks.len();
        let strict_results = strict.validate(&layer_results, Level::Sentence, None);
        let strict_count = strict_results.first().map(|r| r.supporting_chunks.len()).unwrap_or(0);

        assert!(strict_count <= loose_count);
    }

    #[test]
    fn test_bidirectional_dedups_shared_primary() {
        let section = ChunkNode::new(Level::Section, 0, "Introduction\n\nparagraph text repeated here");
        let paragraph = ChunkNode::new(Level::Paragraph, 0, "paragraph text repeated here").with_parent(section.id.clone());

        let mut layer_results = BTreeMap::new();
        layer_results.insert(Level::Paragraph, vec![ScoredChunk::new(paragraph, 0.9)]);
        layer_results.insert(Level::Section, vec![ScoredChunk::new(section, 0.9)]);

        let validator = CrossLayerValidator::new().with_min_layers(1);
        let results = validator.validate_bidirectional(&layer_results, None);

        let mut ids: Vec<_> = results.iter().map(|r| r.primary_chunk.chunk.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), results.len());
    }

    #[test]
    fn test_cosine_similarity_used_when_embeddings_present() {
        let a = ChunkNode::new(Level::Sentence, 0, "foo");
        let b = ChunkNode::new(Level::Paragraph, 0, "bar");

        let mut embeddings = HashMap::new();
        embeddings.insert(a.id.clone(), vec![1.0, 0.0]);
        embeddings.insert(b.id.clone(), vec![1.0, 0.0]);

        let mut layer_results = BTreeMap::new();
        layer_results.insert(Level::Sentence, vec![ScoredChunk::new(a, 0.9)]);
        layer_results.insert(Level::Paragraph, vec![ScoredChunk::new(b, 0.8)]);

        let validator = CrossLayerValidator::new().with_support_threshold(0.9).with_min_layers(1);
        let results = validator.validate(&layer_results, Level::Sentence, Some(&embeddings));

        assert_eq!(results.len(), 1);
        assert!(results[0].supporting_chunks.contains_key(&Level::Paragraph));
    }
}
