// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

/// Errors surfaced by the Sheet RAG engine.
///
/// Collaborator crates each own their own error type; this is where they
/// converge, per the per-crate error boundary convention.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// A malformed request: empty document text, unknown level name, or a
    /// negative `top_k`. No state change occurs.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A remote collaborator (embedder, LLM, vector store, cache) failed
    /// after its retry budget was exhausted.
    #[error("transient failure: {0}")]
    Transient(String),

    /// An invariant the engine relies on was violated by a collaborator.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// Custom error.
    #[error("{0}")]
    Custom(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

impl From<stratum_core::CoreError> for EngineError {
    fn from(e: stratum_core::CoreError) -> Self {
        Self::InvariantViolation(e.to_string())
    }
}

impl From<stratum_chunking::ChunkingError> for EngineError {
    fn from(e: stratum_chunking::ChunkingError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

impl From<stratum_vector::VectorError> for EngineError {
    fn from(e: stratum_vector::VectorError) -> Self {
        Self::Transient(e.to_string())
    }
}

impl From<stratum_embed::EmbedError> for EngineError {
    fn from(e: stratum_embed::EmbedError) -> Self {
        Self::Transient(e.to_string())
    }
}

impl From<stratum_validate::ValidateError> for EngineError {
    fn from(e: stratum_validate::ValidateError) -> Self {
        Self::Custom(e.to_string())
    }
}
