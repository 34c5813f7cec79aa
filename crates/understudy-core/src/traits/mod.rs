// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the Understudy plugin architecture.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod embedding;
pub mod generation;

// Re-export all traits at the traits module level for convenience.
pub use adapter::PluginAdapter;
pub use embedding::EmbeddingAdapter;
pub use generation::GenerationAdapter;
