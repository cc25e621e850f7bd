// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

use once_cell::sync::Lazy;
use regex::Regex;

static BLANK_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n").unwrap());

/// Split `text` into paragraphs on one or more blank lines. Trims each
/// paragraph and drops empty results; the caller applies the minimum-length
/// floor.
pub fn split_into_paragraphs(text: &str) -> Vec<String> {
    BLANK_LINE
        .split(text)
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}
