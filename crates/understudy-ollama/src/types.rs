// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama /api/generate and /api/tags wire types.

use serde::{Deserialize, Serialize};

// --- Request types ---

/// A request to the Ollama generate endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    /// Model tag (e.g., "qwen2.5:3b").
    pub model: String,

    /// The fully assembled prompt, chat markup included.
    pub prompt: String,

    /// Skip the daemon's own prompt templating; the prompt already
    /// carries its markup.
    pub raw: bool,

    /// Request a single JSON body instead of an NDJSON stream.
    pub stream: bool,

    /// Model sampling options.
    pub options: GenerateOptions,
}

/// Sampling options in Ollama's native names.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateOptions {
    pub num_predict: u32,
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub repeat_penalty: f64,
}

// --- Response types ---

/// A non-streaming response from the generate endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub model: String,

    /// The generated continuation.
    pub response: String,

    #[serde(default)]
    pub done: bool,

    /// "stop", "length", or "load" on recent daemons; absent on older ones.
    #[serde(default)]
    pub done_reason: Option<String>,

    /// Wall-clock nanoseconds for the whole request.
    #[serde(default)]
    pub total_duration: Option<u64>,

    /// Number of tokens generated.
    #[serde(default)]
    pub eval_count: Option<u32>,
}

/// Response from the tags endpoint listing locally available models.
#[derive(Debug, Clone, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

/// One locally available model.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelTag {
    pub name: String,
}

/// Error envelope returned on non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
}
