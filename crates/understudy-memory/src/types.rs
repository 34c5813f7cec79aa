// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory domain types and vector helpers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One conversational turn persisted to the vector index.
///
/// Entries are append-only: never mutated, never deleted. Recency scoring
/// relies on the stored timestamp, not on row order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// Identifier combining wall-clock millis and store cardinality
    /// (`mem_<millis>_<count>`). Collisions are tolerated, not rejected.
    pub id: String,
    /// Who spoke the line.
    pub speaker: String,
    /// The line itself.
    pub text: String,
    /// Unix timestamp in seconds at write time.
    pub timestamp_secs: f64,
    /// Importance in [0,1]; 0.5 for an ordinary turn.
    pub importance: f64,
    /// Free-form tags attached by the caller.
    pub tags: BTreeMap<String, String>,
}

impl MemoryEntry {
    /// Metadata map stored alongside the document in the index.
    ///
    /// Custom tags are flattened into the map; `speaker`, `timestamp`, and
    /// `importance` are reserved keys and win on collision.
    pub fn index_metadata(&self) -> BTreeMap<String, String> {
        let mut meta = self.tags.clone();
        meta.insert("speaker".to_string(), self.speaker.clone());
        meta.insert("timestamp".to_string(), self.timestamp_secs.to_string());
        meta.insert("importance".to_string(), self.importance.to_string());
        meta
    }
}

/// A retrieved memory with its combined relevance score.
#[derive(Debug, Clone)]
pub struct RankedMemory {
    /// `(1/rank) * (0.6*importance + 0.4*recency)`, higher is better.
    pub score: f64,
    /// Speaker recorded at write time; empty if the entry had none.
    pub speaker: String,
    /// The stored line.
    pub document: String,
    /// Full metadata map as stored.
    pub metadata: BTreeMap<String, String>,
}

/// Convert f32 vector to bytes for SQLite BLOB storage.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert SQLite BLOB back to f32 vector.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes(chunk.try_into().unwrap()))
        .collect()
}

/// Compute cosine similarity between two vectors of equal length.
///
/// A zero vector on either side yields 0.0 rather than NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "vectors must have same length");
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a <= f32::EPSILON || norm_b <= f32::EPSILON {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
