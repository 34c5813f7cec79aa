// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock adapters for deterministic Understudy tests.
//!
//! `MockBackend` plays back queued generator output, `MockEmbedder`
//! produces deterministic vectors without a model, and `FailingIndex`
//! errors on everything so degraded-store paths can be exercised.

pub mod failing_index;
pub mod mock_backend;
pub mod mock_embedder;

pub use failing_index::FailingIndex;
pub use mock_backend::MockBackend;
pub use mock_embedder::MockEmbedder;
