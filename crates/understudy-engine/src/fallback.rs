// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fallback reply resolution.
//!
//! When generation fails or is rejected by the quality gate, the user
//! still gets an in-character line. Resolution order: the first persona
//! context rule whose keyword matches the query, then a random corpus
//! line in the persona's voice. The corpus is non-empty by construction,
//! so resolution cannot fail.

use std::sync::Arc;

use tracing::debug;
use understudy_config::PersonaProfile;
use understudy_corpus::CorpusStore;

/// Resolves canned or corpus-drawn replies for failed generations.
pub struct FallbackSource {
    persona: Arc<PersonaProfile>,
    corpus: Arc<CorpusStore>,
}

impl FallbackSource {
    /// Create a fallback source over the persona's context rules and the
    /// loaded corpus.
    pub fn new(persona: Arc<PersonaProfile>, corpus: Arc<CorpusStore>) -> Self {
        Self { persona, corpus }
    }

    /// A non-empty in-character line for the given query.
    pub fn resolve(&self, query: &str) -> String {
        let lowered = query.to_lowercase();
        for rule in &self.persona.contexts {
            if rule
                .keywords
                .iter()
                .any(|kw| lowered.contains(&kw.to_lowercase()))
            {
                debug!(context = rule.name, "fallback from context rule");
                return rule.fallback.clone();
            }
        }
        debug!("fallback from corpus draw");
        self.corpus
            .random_fallback(Some(&self.persona.name))
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use understudy_config::ContextRule;
    use understudy_corpus::DialogueSnippet;

    use super::*;

    fn persona() -> Arc<PersonaProfile> {
        Arc::new(PersonaProfile {
            name: "Nick".to_string(),
            summary: "A synth detective.".to_string(),
            example_phrases: vec![],
            default_fallback: "I... don't know what to say.".to_string(),
            contexts: vec![
                ContextRule {
                    name: "investigation".to_string(),
                    keywords: vec!["case".to_string(), "clue".to_string()],
                    fallback: "Let me think about this.".to_string(),
                },
                ContextRule {
                    name: "combat".to_string(),
                    keywords: vec!["danger".to_string()],
                    fallback: "Stay sharp.".to_string(),
                },
            ],
        })
    }

    fn corpus() -> Arc<CorpusStore> {
        Arc::new(
            CorpusStore::new(vec![DialogueSnippet {
                id: "corpus_0".to_string(),
                text: "Another day, another case.".to_string(),
                speaker: "nick".to_string(),
                scene: String::new(),
                category: "casual".to_string(),
                emotion_tags: vec![],
            }])
            .unwrap(),
        )
    }

    #[test]
    fn context_rule_wins_over_corpus() {
        let source = FallbackSource::new(persona(), corpus());
        assert_eq!(
            source.resolve("Any leads on the CASE?"),
            "Let me think about this."
        );
        assert_eq!(source.resolve("we're in danger"), "Stay sharp.");
    }

    #[test]
    fn first_matching_rule_wins() {
        let source = FallbackSource::new(persona(), corpus());
        assert_eq!(
            source.resolve("this case puts us in danger"),
            "Let me think about this."
        );
    }

    #[test]
    fn unmatched_query_draws_from_corpus() {
        let source = FallbackSource::new(persona(), corpus());
        assert_eq!(
            source.resolve("what's the weather like"),
            "Another day, another case."
        );
    }

    #[test]
    fn resolution_is_never_empty() {
        let source = FallbackSource::new(persona(), corpus());
        for query in ["", "case", "gibberish xyzzy", "danger!"] {
            assert!(!source.resolve(query).is_empty());
        }
    }
}
