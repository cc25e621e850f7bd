// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Sheet RAG Engine
//!
//! Wires hierarchical chunking, per-layer vector search, batch embedding,
//! cross-layer validation, and LLM-backed response generation into a single
//! `ingest`/`query` surface over a collection of papers.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod document;
mod engine;
mod error;
mod llm;
mod prompt;

pub use config::EngineConfig;
pub use document::Document;
pub use engine::{LayerStats, QueryResponse, SheetRagEngine, Stats, ValidationSummary};
pub use error::{EngineError, EngineResult};
pub use llm::{LlmBackend, LlmConfig, OpenAiLlmBackend, StubLlmBackend};
pub use prompt::{Source, SourceValidation};

/// Re-exports commonly used types.
pub mod prelude {
    pub use crate::{Document, EngineConfig, EngineError, LlmBackend, QueryResponse, SheetRagEngine};
}
