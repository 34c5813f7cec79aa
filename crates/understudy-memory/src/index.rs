// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector index trait and the SQLite implementation.
//!
//! The index is append-only. Embeddings are stored as little-endian f32
//! BLOBs, metadata as a JSON text column. Queries are brute-force cosine
//! distance over all rows, which is fine at corpus-plus-conversation scale.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use tokio_rusqlite::Connection;
use understudy_core::UnderstudyError;

use crate::types::{blob_to_vec, cosine_similarity, vec_to_blob};

/// Helper to convert tokio_rusqlite errors into UnderstudyError::Storage.
fn storage_err(e: tokio_rusqlite::Error) -> UnderstudyError {
    UnderstudyError::Storage {
        source: Box::new(e),
    }
}

/// One document to insert into the index.
///
/// A missing id is generated by the index at insert time.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub id: Option<String>,
    pub document: String,
    pub metadata: BTreeMap<String, String>,
    pub embedding: Vec<f32>,
}

/// One nearest-neighbor hit, nearest first (ascending distance).
#[derive(Debug, Clone)]
pub struct IndexCandidate {
    pub id: String,
    pub document: String,
    pub metadata: BTreeMap<String, String>,
    /// Cosine distance, `1 - cosine_similarity`, in [0, 2].
    pub distance: f64,
}

/// Append-and-query contract over a similarity index.
///
/// Implementations must return query results ordered by ascending distance
/// and tolerate concurrent appends without corrupting reads.
#[async_trait]
pub trait VectorIndex: Send + Sync + 'static {
    /// Insert entries; ids are generated where absent.
    async fn add(&self, entries: Vec<IndexEntry>) -> Result<(), UnderstudyError>;

    /// Return up to `k` nearest entries to the embedding, nearest first.
    async fn query(
        &self,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<IndexCandidate>, UnderstudyError>;

    /// Number of stored entries.
    async fn count(&self) -> Result<usize, UnderstudyError>;
}

/// SQLite-backed vector index.
///
/// A single tokio-rusqlite connection serializes all access, so appends
/// from one task never corrupt reads from another.
pub struct SqliteIndex {
    conn: Connection,
}

impl SqliteIndex {
    /// Opens (or creates) the index at the given path.
    pub async fn open(path: &Path) -> Result<Self, UnderstudyError> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| storage_err(e.into()))?;
        Self::init_schema(&conn).await?;
        Ok(Self { conn })
    }

    /// Opens an ephemeral in-memory index.
    pub async fn open_in_memory() -> Result<Self, UnderstudyError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| storage_err(e.into()))?;
        Self::init_schema(&conn).await?;
        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<(), UnderstudyError> {
        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;

                 CREATE TABLE IF NOT EXISTS entries (
                     id TEXT PRIMARY KEY NOT NULL,
                     document TEXT NOT NULL,
                     metadata TEXT NOT NULL DEFAULT '{}',
                     embedding BLOB NOT NULL,
                     created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                 );

                 CREATE INDEX IF NOT EXISTS idx_entries_created ON entries(created_at);",
            )?;
            Ok(())
        })
        .await
        .map_err(storage_err)
    }
}

#[async_trait]
impl VectorIndex for SqliteIndex {
    async fn add(&self, entries: Vec<IndexEntry>) -> Result<(), UnderstudyError> {
        if entries.is_empty() {
            return Ok(());
        }
        for entry in &entries {
            if entry.document.is_empty() {
                return Err(UnderstudyError::Internal(
                    "index entry has an empty document".to_string(),
                ));
            }
            if entry.embedding.is_empty() {
                return Err(UnderstudyError::Internal(
                    "index entry has an empty embedding".to_string(),
                ));
            }
        }

        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT OR REPLACE INTO entries (id, document, metadata, embedding) VALUES (?1, ?2, ?3, ?4)",
                    )?;
                    for entry in entries {
                        let id = entry
                            .id
                            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
                        let metadata = serde_json::to_string(&entry.metadata)
                            .unwrap_or_else(|_| "{}".to_string());
                        let embedding = vec_to_blob(&entry.embedding);
                        stmt.execute(rusqlite::params![id, entry.document, metadata, embedding])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    async fn query(
        &self,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<IndexCandidate>, UnderstudyError> {
        if k == 0 {
            return Ok(vec![]);
        }
        let query_vec = embedding.to_vec();
        self.conn
            .call(move |conn| {
                let mut stmt =
                    conn.prepare("SELECT id, document, metadata, embedding FROM entries")?;
                let rows = stmt
                    .query_map([], |row| {
                        let id: String = row.get(0)?;
                        let document: String = row.get(1)?;
                        let metadata_json: String = row.get(2)?;
                        let blob: Vec<u8> = row.get(3)?;
                        Ok((id, document, metadata_json, blob))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;

                let mut candidates: Vec<IndexCandidate> = rows
                    .into_iter()
                    .filter_map(|(id, document, metadata_json, blob)| {
                        let stored = blob_to_vec(&blob);
                        // Rows of a different dimensionality cannot be compared.
                        if stored.len() != query_vec.len() {
                            return None;
                        }
                        let distance =
                            1.0 - f64::from(cosine_similarity(&query_vec, &stored));
                        let metadata =
                            serde_json::from_str(&metadata_json).unwrap_or_default();
                        Some(IndexCandidate {
                            id,
                            document,
                            metadata,
                            distance,
                        })
                    })
                    .collect();

                candidates.sort_by(|a, b| {
                    a.distance
                        .partial_cmp(&b.distance)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                candidates.truncate(k);
                Ok(candidates)
            })
            .await
            .map_err(storage_err)
    }

    async fn count(&self) -> Result<usize, UnderstudyError> {
        self.conn
            .call(|conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
                Ok(count as usize)
            })
            .await
            .map_err(storage_err)
    }
}
