// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recency/importance re-ranking over nearest-neighbor candidates.
//!
//! The ranker embeds the query, pulls an oversampled candidate pool from
//! the index, and scores each candidate by nearness rank, stored
//! importance, and age. The rank-based base term stands in for
//! backend-calibrated similarity scores, which vary across index
//! implementations.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;
use understudy_core::{EmbeddingAdapter, EmbeddingInput, UnderstudyError};

use crate::index::{IndexCandidate, VectorIndex};
use crate::ledger::DEFAULT_IMPORTANCE;
use crate::types::RankedMemory;

/// Cap on the oversampled candidate pool.
const MAX_CANDIDATE_POOL: usize = 50;

/// Default number of ranked memories returned to the caller.
pub const DEFAULT_RESULT_COUNT: usize = 6;

/// Seconds per day, for age decay.
const SECS_PER_DAY: f64 = 86_400.0;

/// Retrieves and re-ranks memories for a query.
pub struct MemoryRanker {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingAdapter>,
}

impl MemoryRanker {
    /// Creates a ranker over the given index and embedder.
    pub fn new(index: Arc<dyn VectorIndex>, embedder: Arc<dyn EmbeddingAdapter>) -> Self {
        Self { index, embedder }
    }

    /// Retrieve up to `result_count` memories relevant to `query`.
    ///
    /// When `target_speaker` is given, candidates stored under a different
    /// speaker are discarded (case-insensitive). An index failure degrades
    /// to an empty result with a warning; only embedding failures
    /// propagate.
    pub async fn retrieve(
        &self,
        query: &str,
        target_speaker: Option<&str>,
        result_count: usize,
    ) -> Result<Vec<RankedMemory>, UnderstudyError> {
        let output = self.embedder.embed(EmbeddingInput::single(query)).await?;
        let embedding = output.embeddings.into_iter().next().ok_or_else(|| {
            UnderstudyError::Embedding {
                message: "embedder returned no vectors".to_string(),
                source: None,
            }
        })?;

        // Oversample so the speaker filter and re-ranking have room to work.
        let pool = MAX_CANDIDATE_POOL.min(result_count.saturating_mul(5));
        let candidates = match self.index.query(&embedding, pool).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, "memory index unavailable, returning no memories");
                return Ok(vec![]);
            }
        };

        let now_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64();
        let mut ranked = score_candidates(&candidates, target_speaker, now_secs);
        ranked.truncate(result_count);
        Ok(ranked)
    }
}

/// Score candidates by nearness rank, importance, and recency.
///
/// Candidate `i` (0-indexed by nearness over the raw pool, filtered or not)
/// scores `(1/(i+1)) * (0.6*importance + 0.4*recency)` with
/// `recency = 1/(1 + age_days)`. Candidates with empty metadata or
/// unparseable timestamp/importance values are skipped; a missing
/// timestamp counts as written now, a missing importance as 0.5. Negative
/// ages (clock skew) clamp to zero. The result is sorted descending.
pub fn score_candidates(
    candidates: &[IndexCandidate],
    target_speaker: Option<&str>,
    now_secs: f64,
) -> Vec<RankedMemory> {
    let mut ranked = Vec::new();
    for (i, candidate) in candidates.iter().enumerate() {
        if candidate.metadata.is_empty() {
            continue;
        }
        let speaker = candidate
            .metadata
            .get("speaker")
            .cloned()
            .unwrap_or_default();
        // Entries without a recorded speaker pass the filter.
        if let Some(target) = target_speaker
            && !speaker.is_empty()
            && !speaker.eq_ignore_ascii_case(target)
        {
            continue;
        }
        let timestamp = match candidate.metadata.get("timestamp") {
            Some(raw) => match raw.parse::<f64>() {
                Ok(ts) => ts,
                Err(_) => continue,
            },
            None => now_secs,
        };
        let importance = match candidate.metadata.get("importance") {
            Some(raw) => match raw.parse::<f64>() {
                Ok(imp) => imp,
                Err(_) => continue,
            },
            None => DEFAULT_IMPORTANCE,
        };

        let base = 1.0 / (i as f64 + 1.0);
        let age_days = ((now_secs - timestamp) / SECS_PER_DAY).max(0.0);
        let recency = 1.0 / (1.0 + age_days);
        let score = base * (0.6 * importance + 0.4 * recency);

        ranked.push(RankedMemory {
            score,
            speaker,
            document: candidate.document.clone(),
            metadata: candidate.metadata.clone(),
        });
    }
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}
