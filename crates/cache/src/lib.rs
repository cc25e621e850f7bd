// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Stratum Cache
//!
//! The key-value cache consumed by the embedding and query layers: a
//! best-effort, string-keyed byte store with a per-entry TTL. This crate
//! ships one implementation, an in-memory store, for tests and standalone
//! operation; a production deployment backs the same `Cache` trait with a
//! remote store instead.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod memory;

pub use memory::InMemoryCache;

use async_trait::async_trait;

/// A best-effort, string-keyed byte store with TTL expiry.
///
/// Implementations must be non-fatal on their own failure: callers treat
/// an `Err` the same as a clean miss and proceed without the cache,
/// per the degraded-mode handling in the engine's failure model.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Fetch a value, or `None` if absent or expired.
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Store `value` under `key`, expiring after `ttl_seconds`.
    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> CacheResult<()>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn del(&self, key: &str) -> CacheResult<()>;
}

/// Cache backend error. Callers degrade rather than propagate this.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CacheError {
    /// The backend is unreachable or otherwise unavailable.
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Build the cache key `"{prefix}:{hex(md5(data))}"` used throughout the
/// pipeline for both the embedding cache (`prefix = "emb"`) and the
/// per-query result cache (`prefix = "sheet_rag"`-style composite keys
/// built by the caller).
pub fn keyed_digest(prefix: &str, data: &str) -> String {
    format!("{}:{:x}", prefix, md5::compute(data.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyed_digest_deterministic() {
        let a = keyed_digest("emb", "hello world");
        let b = keyed_digest("emb", "hello world");
        assert_eq!(a, b);
        assert!(a.starts_with("emb:"));
    }

    #[test]
    fn test_keyed_digest_varies_by_prefix() {
        let a = keyed_digest("emb", "same text");
        let b = keyed_digest("query", "same text");
        assert_ne!(a, b);
    }
}
