// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Character dialogue corpus for the Understudy dialogue engine.
//!
//! Loads a fixed set of in-character lines from CSV at startup and serves
//! them as few-shot examples, fallback replies, and seed documents for the
//! vector index.
//!
//! ## Architecture
//!
//! - **DialogueSnippet**: one corpus line with speaker/scene/category tags
//! - **loader**: tolerant CSV ingestion (bad rows skipped with a warning)
//! - **CorpusStore**: in-memory lookup by speaker, category, and emotion

pub mod loader;
pub mod store;
pub mod types;

pub use loader::load_corpus;
pub use store::CorpusStore;
pub use types::{CorpusStats, DialogueSnippet};
