// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

/// Vector index errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VectorError {
    /// Layer collection not found.
    #[error("vector layer '{0}' not found")]
    LayerNotFound(String),

    /// Invalid vector dimension.
    #[error("invalid dimension: expected {expected}, found {found}")]
    InvalidDimension { expected: usize, found: usize },

    /// A chunk id was not present in the index it was expected in.
    #[error("chunk id not found: {0}")]
    ChunkNotFound(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Backend error.
    #[error("backend error: {0}")]
    Backend(String),

    /// Custom error.
    #[error("{0}")]
    Custom(String),
}

/// Result type for vector operations.
pub type VectorResult<T> = Result<T, VectorError>;

impl From<serde_json::Error> for VectorError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
