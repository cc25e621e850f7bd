// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

use serde::{Deserialize, Serialize};
use std::fmt;

/// Granularity at which a document is represented.
///
/// Ordered coarsest-last: `Sentence < Paragraph < Section < Summary`. The
/// ordering is used when walking a chunk's parent chain one level at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Sentence,
    Paragraph,
    Section,
    Summary,
}

impl Level {
    /// All levels, ordered fine-to-coarse.
    pub const ALL: [Level; 4] = [Level::Sentence, Level::Paragraph, Level::Section, Level::Summary];

    /// The levels used as a primary level during bidirectional validation,
    /// in iteration order.
    pub const BIDIRECTIONAL_PRIMARIES: [Level; 3] = [Level::Sentence, Level::Paragraph, Level::Section];

    /// The level immediately coarser than this one, if any.
    #[inline]
    pub const fn parent_level(&self) -> Option<Level> {
        match self {
            Level::Sentence => Some(Level::Paragraph),
            Level::Paragraph => Some(Level::Section),
            Level::Section => Some(Level::Summary),
            Level::Summary => None,
        }
    }

    /// Name used for persisted collection names (`sheet_rag_<level>`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Level::Sentence => "sentence",
            Level::Paragraph => "paragraph",
            Level::Section => "section",
            Level::Summary => "summary",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sentence" => Ok(Level::Sentence),
            "paragraph" => Ok(Level::Paragraph),
            "section" => Ok(Level::Section),
            "summary" => Ok(Level::Summary),
            other => Err(format!("unknown level: {}", other)),
        }
    }
}
