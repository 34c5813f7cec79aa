// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory corpus lookup.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use understudy_core::UnderstudyError;

use crate::loader::load_corpus;
use crate::types::{CorpusStats, DialogueSnippet};

/// Immutable store of character dialogue lines.
///
/// Construction rejects an empty corpus, so fallback selection always has
/// at least one line to hand out.
#[derive(Debug)]
pub struct CorpusStore {
    snippets: Vec<DialogueSnippet>,
}

impl CorpusStore {
    /// Wraps an already-loaded snippet list.
    pub fn new(snippets: Vec<DialogueSnippet>) -> Result<Self, UnderstudyError> {
        if snippets.is_empty() {
            return Err(UnderstudyError::Config(
                "Dialogue corpus is empty; at least one snippet is required".to_string(),
            ));
        }
        Ok(Self { snippets })
    }

    /// Loads the corpus from a CSV file and wraps it.
    pub fn from_csv_path(path: &Path) -> Result<Self, UnderstudyError> {
        Self::new(load_corpus(path)?)
    }

    /// Number of snippets in the corpus.
    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    /// Always false once constructed; kept for the `len` pairing.
    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    /// All snippets in load order, for index seeding.
    pub fn snippets(&self) -> &[DialogueSnippet] {
        &self.snippets
    }

    /// Snippets spoken by `speaker`, or the whole corpus when `None`.
    fn scoped(&self, speaker: Option<&str>) -> Vec<&DialogueSnippet> {
        match speaker {
            Some(name) => {
                let name = name.to_lowercase();
                self.snippets.iter().filter(|s| s.speaker == name).collect()
            }
            None => self.snippets.iter().collect(),
        }
    }

    /// Up to `n` randomly chosen examples, optionally scoped to a speaker.
    pub fn random_examples(&self, speaker: Option<&str>, n: usize) -> Vec<&DialogueSnippet> {
        let scoped = self.scoped(speaker);
        let mut rng = rand::thread_rng();
        scoped.choose_multiple(&mut rng, n).copied().collect()
    }

    /// All snippets tagged with the given category (case-insensitive).
    pub fn examples_by_category(&self, category: &str) -> Vec<&DialogueSnippet> {
        let category = category.to_lowercase();
        self.snippets
            .iter()
            .filter(|s| s.category == category)
            .collect()
    }

    /// All snippets carrying the given emotion tag (case-insensitive).
    pub fn examples_by_emotion(&self, emotion: &str) -> Vec<&DialogueSnippet> {
        let emotion = emotion.to_lowercase();
        self.snippets
            .iter()
            .filter(|s| s.emotion_tags.iter().any(|tag| *tag == emotion))
            .collect()
    }

    /// Case-insensitive substring scan over dialogue text.
    pub fn search(&self, needle: &str) -> Vec<&DialogueSnippet> {
        let needle = needle.to_lowercase();
        self.snippets
            .iter()
            .filter(|s| s.text.to_lowercase().contains(&needle))
            .collect()
    }

    /// Summary counts over the corpus.
    pub fn stats(&self) -> CorpusStats {
        let mut speakers: BTreeMap<String, usize> = BTreeMap::new();
        let mut categories: BTreeMap<String, usize> = BTreeMap::new();
        let mut scenes: BTreeSet<&str> = BTreeSet::new();
        for snippet in &self.snippets {
            *speakers.entry(snippet.speaker.clone()).or_default() += 1;
            *categories.entry(snippet.category.clone()).or_default() += 1;
            if !snippet.scene.is_empty() {
                scenes.insert(&snippet.scene);
            }
        }
        CorpusStats {
            total: self.snippets.len(),
            speakers,
            categories,
            scenes: scenes.len(),
        }
    }

    /// A random corpus line to use as a last-resort reply.
    ///
    /// Prefers the speaker's own lines; falls back to the whole corpus when
    /// the speaker has none.
    pub fn random_fallback(&self, speaker: Option<&str>) -> &str {
        let mut rng = rand::thread_rng();
        if let Some(snippet) = self.scoped(speaker).choose(&mut rng) {
            return &snippet.text;
        }
        // new() guarantees at least one snippet, so this index is in range.
        let idx = rng.gen_range(0..self.snippets.len());
        &self.snippets[idx].text
    }
}
