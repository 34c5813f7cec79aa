// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gemini generateContent API request/response types.

use serde::{Deserialize, Serialize};

// --- Request types ---

/// A request to the Gemini generateContent endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    /// Conversation contents. A flat continuation prompt is a single
    /// user-role entry with one text part.
    pub contents: Vec<Content>,

    /// Sampling configuration.
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

/// A content entry: a list of parts with an optional role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,

    /// "user" or "model"; omitted for single-turn requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// A single text part within a content entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// Sampling knobs in the wire format the API expects.
///
/// Gemini has no repetition-penalty option; that parameter only applies
/// to local backends.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub max_output_tokens: u32,
}

// --- Response types ---

/// A full response from the generateContent endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    /// Generated candidates. Empty when the prompt itself was filtered.
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    /// Token accounting, absent on some error shapes.
    #[serde(rename = "usageMetadata")]
    pub usage_metadata: Option<UsageMetadata>,
}

/// One generated candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    /// Generated content; absent when the candidate was blocked before
    /// any text was produced.
    pub content: Option<Content>,

    /// "STOP" on success; "SAFETY", "RECITATION", "MAX_TOKENS", etc.
    /// otherwise.
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

impl Candidate {
    /// Concatenated text of all parts, empty when content is absent.
    pub fn text(&self) -> String {
        self.content
            .as_ref()
            .map(|c| {
                c.parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

/// Error envelope returned on non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Error details.
    pub error: ApiErrorDetail,
}

/// Error detail within an API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// Numeric HTTP code echoed in the body.
    #[serde(default)]
    pub code: i32,
    /// Human-readable error message.
    pub message: String,
    /// Canonical status identifier (e.g., "RESOURCE_EXHAUSTED").
    #[serde(default)]
    pub status: String,
}
