// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic memory for the Understudy dialogue engine.
//!
//! Conversational turns and corpus lines are embedded, stored in a local
//! SQLite vector index, and retrieved under a combined nearness, recency,
//! and importance score.
//!
//! ## Architecture
//!
//! - **VectorIndex**: trait over add/query/count; SQLite implementation
//!   with f32 BLOB embeddings and brute-force cosine search
//! - **MemoryLedger**: append-only writes, best-effort (a store failure
//!   never fails the conversation)
//! - **MemoryRanker**: oversampled candidate pool scored by
//!   `(1/rank) * (0.6*importance + 0.4*recency)`
//! - **OnnxEmbedder** (feature `onnx`): local all-MiniLM-L6-v2 inference
//! - **ModelManager** (feature `onnx`): first-run model download

pub mod index;
pub mod ledger;
pub mod ranker;
pub mod types;

#[cfg(feature = "onnx")]
pub mod embedder;
#[cfg(feature = "onnx")]
pub mod model_manager;

pub use index::{IndexCandidate, IndexEntry, SqliteIndex, VectorIndex};
pub use ledger::{MemoryLedger, DEFAULT_IMPORTANCE};
pub use ranker::{score_candidates, MemoryRanker, DEFAULT_RESULT_COUNT};
pub use types::{blob_to_vec, cosine_similarity, vec_to_blob, MemoryEntry, RankedMemory};

#[cfg(feature = "onnx")]
pub use embedder::OnnxEmbedder;
#[cfg(feature = "onnx")]
pub use model_manager::ModelManager;
