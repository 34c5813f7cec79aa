// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A vector index that is always unavailable.

use async_trait::async_trait;

use understudy_core::UnderstudyError;
use understudy_memory::{IndexCandidate, IndexEntry, VectorIndex};

/// Vector index whose every operation fails with a storage error.
///
/// Used to verify the degraded-store guarantees: ledger writes must not
/// raise and retrieval must return empty rather than erroring.
pub struct FailingIndex;

fn down() -> UnderstudyError {
    UnderstudyError::Storage {
        source: "index unavailable".into(),
    }
}

#[async_trait]
impl VectorIndex for FailingIndex {
    async fn add(&self, _entries: Vec<IndexEntry>) -> Result<(), UnderstudyError> {
        Err(down())
    }

    async fn query(
        &self,
        _embedding: &[f32],
        _k: usize,
    ) -> Result<Vec<IndexCandidate>, UnderstudyError> {
        Err(down())
    }

    async fn count(&self) -> Result<usize, UnderstudyError> {
        Err(down())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_operation_fails() {
        let index = FailingIndex;
        assert!(index.add(vec![]).await.is_err());
        assert!(index.query(&[1.0], 5).await.is_err());
        assert!(index.count().await.is_err());
    }
}
