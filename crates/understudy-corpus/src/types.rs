// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Corpus domain types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single line of character dialogue loaded from the corpus CSV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueSnippet {
    /// Stable identifier, assigned at load time (`corpus_<n>`).
    pub id: String,
    /// The spoken line itself.
    pub text: String,
    /// Character who speaks the line, lowercased.
    pub speaker: String,
    /// Scene or chapter the line comes from, lowercased.
    pub scene: String,
    /// Broad category tag (investigation, combat, casual, ...), lowercased.
    pub category: String,
    /// Emotion tags attached to the line, lowercased.
    pub emotion_tags: Vec<String>,
}

impl DialogueSnippet {
    /// Metadata map used when seeding the vector index.
    ///
    /// Keys mirror the CSV columns; emotion tags are joined with `;`.
    pub fn index_metadata(&self) -> BTreeMap<String, String> {
        let mut meta = BTreeMap::new();
        meta.insert("speaker".to_string(), self.speaker.clone());
        meta.insert("scene".to_string(), self.scene.clone());
        meta.insert("category".to_string(), self.category.clone());
        meta.insert("emotions".to_string(), self.emotion_tags.join(";"));
        meta
    }
}

/// Summary counts over a loaded corpus.
#[derive(Debug, Clone, Serialize)]
pub struct CorpusStats {
    /// Total snippets loaded.
    pub total: usize,
    /// Snippet count per speaker.
    pub speakers: BTreeMap<String, usize>,
    /// Snippet count per category.
    pub categories: BTreeMap<String, usize>,
    /// Number of distinct scenes.
    pub scenes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_snippet() -> DialogueSnippet {
        DialogueSnippet {
            id: "corpus_0".to_string(),
            text: "Stay sharp out there.".to_string(),
            speaker: "nick".to_string(),
            scene: "park row".to_string(),
            category: "combat".to_string(),
            emotion_tags: vec!["tense".to_string(), "wary".to_string()],
        }
    }

    #[test]
    fn index_metadata_carries_all_columns() {
        let meta = make_snippet().index_metadata();
        assert_eq!(meta.get("speaker").map(String::as_str), Some("nick"));
        assert_eq!(meta.get("scene").map(String::as_str), Some("park row"));
        assert_eq!(meta.get("category").map(String::as_str), Some("combat"));
        assert_eq!(meta.get("emotions").map(String::as_str), Some("tense;wary"));
    }

    #[test]
    fn index_metadata_empty_emotions() {
        let mut snippet = make_snippet();
        snippet.emotion_tags.clear();
        let meta = snippet.index_metadata();
        assert_eq!(meta.get("emotions").map(String::as_str), Some(""));
    }
}
