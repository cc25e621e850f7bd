// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Stratum Batch Embedder + Cache
//!
//! Obtains embedding vectors from a remote embedding provider, amortizing
//! request cost with an MD5-keyed, TTL'd cache. Two remote backends are
//! supported — OpenAI and Ollama — dispatched through `AnyBackend` so the
//! rest of the pipeline depends only on the `EmbeddingBackend` trait. A
//! third, on-device backend is deliberately not carried over from the host
//! `ml` crate: once the embedding service is treated as an external
//! collaborator there is no local inference to perform.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod backend;
mod config;
mod error;
mod ollama;
mod openai;
mod service;

pub use backend::{AnyBackend, BackendType, EmbeddingBackend};
pub use config::{ApiConfig, EmbedderConfig};
pub use error::{EmbedError, Result};
pub use ollama::OllamaEmbeddingBackend;
pub use openai::OpenAiEmbeddingBackend;
pub use service::{EmbeddingService, EmbeddingStats};

/// Re-exports commonly used types.
pub mod prelude {
    pub use crate::{EmbedError, EmbeddingBackend, EmbeddingService};
}
