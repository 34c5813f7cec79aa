// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only memory ledger.
//!
//! Every conversational turn is embedded and written to the vector index.
//! Writes are best-effort: an index failure is retried once with a reduced
//! entry (no id, no metadata) and then dropped with a warning. Only an
//! embedding failure propagates to the caller.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;
use understudy_core::{EmbeddingAdapter, EmbeddingInput, UnderstudyError};

use crate::index::{IndexEntry, VectorIndex};
use crate::types::MemoryEntry;

/// Importance assigned to an ordinary conversational turn.
pub const DEFAULT_IMPORTANCE: f64 = 0.5;

/// Writes conversational turns into the vector index.
pub struct MemoryLedger {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingAdapter>,
}

impl MemoryLedger {
    /// Creates a ledger over the given index and embedder.
    pub fn new(index: Arc<dyn VectorIndex>, embedder: Arc<dyn EmbeddingAdapter>) -> Self {
        Self { index, embedder }
    }

    /// Record one turn with explicit tags and importance.
    ///
    /// Returns `Err` only when embedding fails; a store failure degrades to
    /// a warning and the turn is dropped.
    pub async fn write(
        &self,
        speaker: &str,
        text: &str,
        tags: BTreeMap<String, String>,
        importance: f64,
    ) -> Result<(), UnderstudyError> {
        let output = self.embedder.embed(EmbeddingInput::single(text)).await?;
        let embedding = output.embeddings.into_iter().next().ok_or_else(|| {
            UnderstudyError::Embedding {
                message: "embedder returned no vectors".to_string(),
                source: None,
            }
        })?;

        // The id folds in the current cardinality; if the store cannot even
        // be counted the add below will fail too, so 0 is good enough.
        let count = match self.index.count().await {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "memory count unavailable, using 0 in id");
                0
            }
        };
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let entry = MemoryEntry {
            id: format!("mem_{}_{count}", now.as_millis()),
            speaker: speaker.to_string(),
            text: text.to_string(),
            timestamp_secs: now.as_secs_f64(),
            importance,
            tags,
        };

        let full = IndexEntry {
            id: Some(entry.id.clone()),
            document: entry.text.clone(),
            metadata: entry.index_metadata(),
            embedding: embedding.clone(),
        };
        if let Err(first) = self.index.add(vec![full]).await {
            warn!(id = %entry.id, error = %first, "memory write failed, retrying without id and metadata");
            let reduced = IndexEntry {
                id: None,
                document: entry.text,
                metadata: BTreeMap::new(),
                embedding,
            };
            if let Err(second) = self.index.add(vec![reduced]).await {
                warn!(error = %second, "memory write dropped after retry");
            }
        }
        Ok(())
    }

    /// Record one ordinary turn: no tags, default importance.
    pub async fn write_turn(&self, speaker: &str, text: &str) -> Result<(), UnderstudyError> {
        self.write(speaker, text, BTreeMap::new(), DEFAULT_IMPORTANCE)
            .await
    }
}
