// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tolerant CSV ingestion for the dialogue corpus.
//!
//! Expected header: `speaker,text,scene,category,emotions`. The `emotions`
//! column holds zero or more tags separated by `;`. Rows that fail to parse
//! or carry an empty line of dialogue are skipped with a warning, never an
//! error; only an unreadable file is fatal.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};
use understudy_core::UnderstudyError;

use crate::types::DialogueSnippet;

/// One raw CSV record before normalization.
#[derive(Debug, Deserialize)]
struct RawRow {
    speaker: String,
    text: String,
    #[serde(default)]
    scene: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    emotions: String,
}

/// Load dialogue snippets from a CSV file.
///
/// Tag columns are lowercased so later lookups can compare exactly; the
/// dialogue text keeps its original casing. Ids are assigned in load order
/// as `corpus_<n>` over the rows that survive filtering.
pub fn load_corpus(path: &Path) -> Result<Vec<DialogueSnippet>, UnderstudyError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| {
            UnderstudyError::Config(format!("Failed to read corpus CSV {}: {e}", path.display()))
        })?;

    let mut snippets = Vec::new();
    for (row, result) in reader.deserialize::<RawRow>().enumerate() {
        // Header is row 0 in the file, so report 1-based data rows.
        let line = row + 2;
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!(line, error = %e, "skipping malformed corpus row");
                continue;
            }
        };
        if raw.text.is_empty() {
            debug!(line, "skipping corpus row with empty dialogue text");
            continue;
        }
        if raw.speaker.is_empty() {
            warn!(line, "skipping corpus row with no speaker");
            continue;
        }

        let emotion_tags = raw
            .emotions
            .split(';')
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();

        snippets.push(DialogueSnippet {
            id: format!("corpus_{}", snippets.len()),
            text: raw.text,
            speaker: raw.speaker.to_lowercase(),
            scene: raw.scene.to_lowercase(),
            category: raw.category.to_lowercase(),
            emotion_tags,
        });
    }

    debug!(count = snippets.len(), path = %path.display(), "loaded dialogue corpus");
    Ok(snippets)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_well_formed_rows() {
        let file = write_csv(
            "speaker,text,scene,category,emotions\n\
             Nick,\"Let me think about this.\",Park Row,Investigation,pensive\n\
             Nick,\"Stay sharp.\",Docks,Combat,tense;wary\n",
        );
        let snippets = load_corpus(file.path()).unwrap();
        assert_eq!(snippets.len(), 2);
        assert_eq!(snippets[0].id, "corpus_0");
        assert_eq!(snippets[0].speaker, "nick");
        assert_eq!(snippets[0].scene, "park row");
        assert_eq!(snippets[0].category, "investigation");
        assert_eq!(snippets[0].text, "Let me think about this.");
        assert_eq!(snippets[1].emotion_tags, vec!["tense", "wary"]);
    }

    #[test]
    fn skips_rows_with_empty_text() {
        let file = write_csv(
            "speaker,text,scene,category,emotions\n\
             Nick,,Park Row,Casual,\n\
             Nick,Hello there.,Park Row,Casual,\n",
        );
        let snippets = load_corpus(file.path()).unwrap();
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].text, "Hello there.");
        // Ids are contiguous over kept rows, not file rows.
        assert_eq!(snippets[0].id, "corpus_0");
    }

    #[test]
    fn skips_rows_with_no_speaker() {
        let file = write_csv(
            "speaker,text,scene,category,emotions\n\
             ,Orphaned line.,Park Row,Casual,\n\
             Nick,Kept line.,Park Row,Casual,\n",
        );
        let snippets = load_corpus(file.path()).unwrap();
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].text, "Kept line.");
    }

    #[test]
    fn tolerates_short_rows() {
        let file = write_csv(
            "speaker,text,scene,category,emotions\n\
             Nick,Short row.\n\
             Nick,Full row.,Docks,Combat,tense\n",
        );
        let snippets = load_corpus(file.path()).unwrap();
        assert_eq!(snippets.len(), 2);
        assert_eq!(snippets[0].scene, "");
        assert_eq!(snippets[0].emotion_tags.len(), 0);
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = load_corpus(Path::new("/nonexistent/corpus.csv")).unwrap_err();
        assert!(matches!(err, UnderstudyError::Config(_)));
    }

    #[test]
    fn empty_file_loads_empty() {
        let file = write_csv("speaker,text,scene,category,emotions\n");
        let snippets = load_corpus(file.path()).unwrap();
        assert!(snippets.is_empty());
    }
}
