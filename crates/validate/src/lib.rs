// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Stratum Cross-Layer Validator
//!
//! Given per-level retrieval results for one query, selects primaries that
//! have supporting evidence at two or more distinct granularities and
//! scores them by a weighted combination of retrieval score and
//! cross-layer similarity.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod scored_chunk;
mod validator;

pub use error::{ValidateError, ValidateResult};
pub use scored_chunk::ScoredChunk;
pub use validator::{CrossLayerValidator, ValidatedResult, ValidationDetails};

/// Re-exports commonly used types.
pub mod prelude {
    pub use crate::{CrossLayerValidator, ScoredChunk, ValidateError, ValidatedResult};
}
