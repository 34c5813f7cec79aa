// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Understudy dialogue engine.

use thiserror::Error;

/// The primary error type used across all Understudy adapter traits and core operations.
#[derive(Debug, Error)]
pub enum UnderstudyError {
    /// Configuration errors (invalid TOML, missing required fields, empty corpus).
    #[error("configuration error: {0}")]
    Config(String),

    /// Vector index / backing store errors (database connection, query failure).
    ///
    /// Callers on the conversation path treat this as degraded service:
    /// ledger writes become no-ops and retrieval returns empty results.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Embedding model errors (tokenization, inference, dimension mismatch).
    ///
    /// Unlike storage errors these propagate: a dead embedder is a
    /// configuration-level failure, not a transient hiccup.
    #[error("embedding error: {message}")]
    Embedding {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Generation backend errors (API failure, blocked output, daemon unreachable).
    #[error("backend error: {message}")]
    Backend {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Requested generation backend is not registered.
    #[error("backend not found: {name}")]
    BackendNotFound { name: String },

    /// Adapter health check failed.
    #[error("health check failed for {name}: {source}")]
    HealthCheckFailed {
        name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
