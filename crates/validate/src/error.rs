// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

/// Cross-layer validator errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidateError {
    /// `layer_weights` did not sum to 1 (within tolerance) or carried a
    /// negative weight.
    #[error("invalid layer weights: {0}")]
    InvalidConfig(String),

    /// Custom error.
    #[error("{0}")]
    Custom(String),
}

/// Result type for validator operations.
pub type ValidateResult<T> = Result<T, ValidateError>;

impl From<stratum_core::CoreError> for ValidateError {
    fn from(e: stratum_core::CoreError) -> Self {
        Self::Custom(e.to_string())
    }
}
