// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

use thiserror::Error;

/// Errors raised while chunking a document.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChunkingError {
    #[error("document text must be valid UTF-8 text, got empty byte sequence")]
    InvalidInput,

    #[error("invalid chunking configuration: {0}")]
    InvalidConfig(String),
}

pub type ChunkingResult<T> = Result<T, ChunkingError>;
