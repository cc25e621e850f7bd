// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

use once_cell::sync::Lazy;
use regex::Regex;

/// Abbreviations whose trailing dot must not be treated as a sentence
/// boundary.
const ABBREVIATIONS: &[&str] = &["Mr", "Mrs", "Dr", "Prof", "Sr", "Jr", "vs", "etc", "e.g", "i.e"];

const SENTINEL: &str = "\u{0}DOT\u{0}";

static ABBREVIATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let alternation = ABBREVIATIONS
        .iter()
        .map(|a| regex::escape(a))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b({})\.\s", alternation)).unwrap()
});

static SENTENCE_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:[.!?])\s+").unwrap());

/// Split `text` into sentences, protecting known abbreviation dots from
/// being treated as sentence boundaries. Trims each sentence and drops
/// empty results; the caller is responsible for applying the level's
/// minimum-length floor.
pub fn split_into_sentences(text: &str) -> Vec<String> {
    let protected = ABBREVIATION_PATTERN.replace_all(text, |caps: &regex::Captures| {
        format!("{}{} ", &caps[1], SENTINEL)
    });

    let mut sentences = Vec::new();
    let mut last_end = 0;
    for m in SENTENCE_BOUNDARY.find_iter(&protected) {
        sentences.push(&protected[last_end..m.end()]);
        last_end = m.end();
    }
    sentences.push(&protected[last_end..]);

    sentences
        .into_iter()
        .map(|s| s.replace(SENTINEL, "").trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
