// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Understudy engine.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter in the registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Generation,
    Embedding,
}

// --- Embedding types ---

/// Input to an embedding adapter: one or more texts to vectorize.
#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    pub texts: Vec<String>,
}

impl EmbeddingInput {
    /// Wraps a single text.
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            texts: vec![text.into()],
        }
    }
}

/// Output of an embedding adapter: one vector per input text.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    pub embeddings: Vec<Vec<f32>>,
    pub dimensions: usize,
}

// --- Generation types ---

/// Sampling parameters recognized by all generation backends.
///
/// Backends map these onto their native option names; unsupported
/// options are silently ignored by the backend, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Upper bound on generated tokens.
    pub max_new_tokens: u32,
    /// Sampling randomness; 0 is deterministic.
    pub temperature: f64,
    /// Candidate pool size by count.
    pub top_k: u32,
    /// Candidate pool size by cumulative probability.
    pub top_p: f64,
    /// Penalty applied to already-emitted tokens to discourage loops.
    pub repetition_penalty: f64,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 80,
            temperature: 0.7,
            top_k: 50,
            top_p: 0.9,
            repetition_penalty: 1.2,
        }
    }
}

/// A single generation request: a fully assembled prompt plus sampling knobs.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub params: SamplingParams,
}

/// Raw output of a generation backend, before extraction.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub text: String,
}

/// Capability flags a backend advertises so callers can pick a prompt shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BackendCapabilities {
    /// Backend expects instruction-tuned chat markup rather than a flat
    /// continuation prompt.
    pub chat_markup: bool,
}
