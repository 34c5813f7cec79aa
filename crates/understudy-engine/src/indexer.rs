// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Corpus indexing.
//!
//! Seeds the vector index from the loaded dialogue corpus so retrieval
//! has lines to draw on before any conversation has happened. Snippets
//! are embedded in batches; unlike ledger writes, a failure here is an
//! error, since indexing runs as an explicit offline step.

use tracing::{debug, info};
use understudy_core::{EmbeddingAdapter, EmbeddingInput, UnderstudyError};
use understudy_corpus::CorpusStore;
use understudy_memory::{IndexEntry, VectorIndex};

/// Snippets embedded per batch.
const BATCH_SIZE: usize = 32;

/// Embed every corpus snippet and add it to the index.
///
/// Snippet importance is fixed at 0.5 and the timestamp is the indexing
/// moment, so corpus lines compete with conversation memories on equal
/// recency footing at first and age out of favor as real memories
/// accumulate. Returns the number of snippets indexed.
pub async fn seed_corpus(
    index: &dyn VectorIndex,
    embedder: &dyn EmbeddingAdapter,
    corpus: &CorpusStore,
) -> Result<usize, UnderstudyError> {
    let now_secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64();

    let mut indexed = 0;
    for batch in corpus.snippets().chunks(BATCH_SIZE) {
        let texts: Vec<String> = batch.iter().map(|s| s.text.clone()).collect();
        let output = embedder.embed(EmbeddingInput { texts }).await?;
        if output.embeddings.len() != batch.len() {
            return Err(UnderstudyError::Embedding {
                message: format!(
                    "embedder returned {} vectors for {} snippets",
                    output.embeddings.len(),
                    batch.len()
                ),
                source: None,
            });
        }

        let entries: Vec<IndexEntry> = batch
            .iter()
            .zip(output.embeddings)
            .map(|(snippet, embedding)| {
                let mut metadata = snippet.index_metadata();
                metadata.insert("timestamp".to_string(), now_secs.to_string());
                metadata.insert("importance".to_string(), "0.5".to_string());
                IndexEntry {
                    id: Some(snippet.id.clone()),
                    document: snippet.text.clone(),
                    metadata,
                    embedding,
                }
            })
            .collect();

        index.add(entries).await?;
        indexed += batch.len();
        debug!(indexed, "corpus batch indexed");
    }

    info!(indexed, "corpus seeded into vector index");
    Ok(indexed)
}
