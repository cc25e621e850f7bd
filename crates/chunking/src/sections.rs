// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

use once_cell::sync::Lazy;
use regex::Regex;

/// A raw section before it is turned into a `ChunkNode`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSection {
    pub title: String,
    pub content: String,
}

const ACADEMIC_LABELS: &[&str] = &[
    "Abstract",
    "Introduction",
    "Background",
    "Related Work",
    "Methodology",
    "Methods",
    "Experiments",
    "Results",
    "Discussion",
    "Conclusion",
    "References",
    "Acknowledgments",
];

static MARKDOWN_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^#+\s+(.+)$").unwrap());
static NUMBERED_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(\d+\.?\s+[A-Z][^.]+)$").unwrap());
static ALL_CAPS_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Z][A-Z\s]+)$").unwrap());
static ACADEMIC_HEADER: Lazy<Regex> = Lazy::new(|| {
    let alternation = ACADEMIC_LABELS.join("|");
    Regex::new(&format!(r"(?i)^({})s?:?\s*$", alternation)).unwrap()
});

/// Match `line` (already trimmed) against the section-header patterns,
/// returning the captured title when it is a header line.
fn match_header(line: &str) -> Option<String> {
    for pattern in [&*MARKDOWN_HEADER, &*NUMBERED_HEADER, &*ALL_CAPS_HEADER, &*ACADEMIC_HEADER] {
        if let Some(caps) = pattern.captures(line) {
            if let Some(m) = caps.get(1) {
                return Some(m.as_str().to_string());
            }
            return Some(line.to_string());
        }
    }
    None
}

/// Scan `text` line by line and group it into sections by header line.
///
/// A header line closes the current section (if it has any content) and
/// opens a new one titled after the match. Non-header lines accumulate
/// into the current section's content with their newline preserved. A
/// document with no header line at all collapses to a single
/// `"Introduction"` section holding the whole text; a wholly empty input
/// collapses to a single `"Content"` section with empty content.
pub fn split_into_sections(text: &str) -> Vec<RawSection> {
    let mut sections = Vec::new();
    let mut current = RawSection {
        title: "Introduction".to_string(),
        content: String::new(),
    };

    for line in text.split('\n') {
        if let Some(title) = match_header(line.trim()) {
            if !current.content.trim().is_empty() {
                sections.push(current);
            }
            current = RawSection { title, content: String::new() };
        } else {
            current.content.push_str(line);
            current.content.push('\n');
        }
    }

    if !current.content.trim().is_empty() {
        sections.push(current);
    }

    if sections.is_empty() {
        sections.push(RawSection {
            title: "Content".to_string(),
            content: text.to_string(),
        });
    }

    sections
}
