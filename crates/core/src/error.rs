// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

use thiserror::Error;

/// Shared error type for core data-model violations.
///
/// Collaborator crates (chunking, vector, embed, validate, engine) define
/// their own error enums and convert into/through this one at their
/// boundaries rather than returning it directly, mirroring how the host
/// codebase keeps one error type per crate.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("unknown level: {0}")]
    UnknownLevel(String),

    #[error("document content is empty")]
    EmptyContent,

    #[error("content too large: {size} bytes (max: {max} bytes)")]
    ContentTooLarge { size: usize, max: usize },

    #[error("invalid confidence value {0}: must be in [0.0, 1.0]")]
    InvalidConfidence(f32),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("{0}")]
    Custom(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
