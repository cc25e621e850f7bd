// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One paper (or other source text) submitted for ingestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Full source text, chunked at all four granularities.
    pub text: String,
    /// Caller-supplied metadata, merged onto every chunk derived from this
    /// document (existing chunk-level keys win on conflict).
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Document {
    /// Build a document with no metadata.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata key/value pair.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
