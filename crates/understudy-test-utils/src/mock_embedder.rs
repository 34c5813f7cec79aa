// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock embedding adapter with deterministic, model-free vectors.

use async_trait::async_trait;

use understudy_core::{
    AdapterType, EmbeddingAdapter, EmbeddingInput, EmbeddingOutput, HealthStatus, PluginAdapter,
    UnderstudyError,
};

/// Deterministic embedder for tests.
///
/// Each whitespace token is hashed into one of `dimensions` buckets and
/// the bucket counts form the vector, so identical texts always embed
/// identically and texts sharing words land near each other under cosine
/// distance. No model download, no inference.
pub struct MockEmbedder {
    dimensions: usize,
}

impl MockEmbedder {
    /// Create an embedder producing vectors of the default test dimension.
    pub fn new() -> Self {
        Self { dimensions: 16 }
    }

    /// Create an embedder producing vectors of the given dimension.
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text.to_lowercase().split_whitespace() {
            let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
            for byte in token.bytes() {
                hash ^= u64::from(byte);
                hash = hash.wrapping_mul(0x100_0000_01b3);
            }
            vector[(hash % self.dimensions as u64) as usize] += 1.0;
        }
        vector
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, UnderstudyError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), UnderstudyError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, UnderstudyError> {
        let embeddings = input
            .texts
            .iter()
            .map(|text| self.embed_one(text))
            .collect();
        Ok(EmbeddingOutput {
            embeddings,
            dimensions: self.dimensions,
        })
    }
}
