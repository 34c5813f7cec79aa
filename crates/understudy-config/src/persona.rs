// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persona profile model and loader.
//!
//! A persona is a TOML data file describing the character whose voice the
//! engine must reproduce: identity summary, canned example phrases used as
//! few-shot exemplars, and context rules that map query keywords to canned
//! fallback lines for when generation fails.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::diagnostic::ConfigError;

/// A keyword-triggered context with its canned fallback line.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContextRule {
    /// Context label (e.g. `investigation`, `combat`, `greeting`).
    pub name: String,

    /// Keywords that activate this context, matched case-insensitively
    /// against the user query.
    pub keywords: Vec<String>,

    /// The line substituted when generation fails in this context.
    pub fallback: String,
}

/// A persona profile loaded from a TOML data file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PersonaProfile {
    /// Display name; also the speaker tag on corpus and memory entries.
    pub name: String,

    /// One-paragraph character summary rendered into the prompt header.
    pub summary: String,

    /// Canned utterances injected as few-shot style exemplars.
    #[serde(default)]
    pub example_phrases: Vec<String>,

    /// Last-resort line when no context rule matches and the corpus draw
    /// is unavailable.
    #[serde(default = "default_fallback_line")]
    pub default_fallback: String,

    /// Context rules evaluated in order; first keyword hit wins.
    #[serde(default)]
    pub contexts: Vec<ContextRule>,
}

fn default_fallback_line() -> String {
    "I... don't know what to say.".to_string()
}

impl PersonaProfile {
    /// Returns the canned fallback line for the context the query matches,
    /// or the default fallback when no rule fires.
    pub fn fallback_for(&self, query: &str) -> &str {
        let lowered = query.to_lowercase();
        for rule in &self.contexts {
            if rule
                .keywords
                .iter()
                .any(|kw| lowered.contains(&kw.to_lowercase()))
            {
                return &rule.fallback;
            }
        }
        &self.default_fallback
    }

    /// Returns up to `n` example phrases for few-shot prompting.
    pub fn few_shot(&self, n: usize) -> &[String] {
        &self.example_phrases[..self.example_phrases.len().min(n)]
    }
}

/// Resolve the file path for a persona name under the configured directory.
pub fn persona_path(dir: &str, name: &str) -> PathBuf {
    Path::new(dir).join(format!("{name}.toml"))
}

/// Load a persona profile from a TOML file.
pub fn load_persona(path: &Path) -> Result<PersonaProfile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Validation {
        message: format!("cannot read persona file {}: {e}", path.display()),
    })?;
    parse_persona(&content, &path.display().to_string())
}

/// Parse a persona profile from TOML content.
pub fn parse_persona(content: &str, origin: &str) -> Result<PersonaProfile, ConfigError> {
    let profile: PersonaProfile =
        toml::from_str(content).map_err(|e| ConfigError::Validation {
            message: format!("invalid persona file {origin}: {e}"),
        })?;

    if profile.name.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: format!("persona file {origin}: name must not be empty"),
        });
    }
    if profile.summary.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: format!("persona file {origin}: summary must not be empty"),
        });
    }

    Ok(profile)
}

/// List the persona names (file stems) available in a directory.
///
/// Missing directory yields an empty list, not an error; the active persona
/// failing to load is reported separately at startup.
pub fn list_personas(dir: &str) -> Vec<String> {
    let mut names = Vec::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return names;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("toml")
            && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
        {
            names.push(stem.to_string());
        }
    }
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    const NICK_TOML: &str = r#"
name = "Nick Valentine"
summary = "A synth detective in Diamond City. Cynical but principled, world-weary but compassionate."
example_phrases = [
    "Hell of a game.",
    "No sense brooding over what else you could have done.",
    "You're better at this than I thought you'd be.",
]
default_fallback = "I... don't know what to say."

[[contexts]]
name = "investigation"
keywords = ["case", "clue", "evidence", "murder", "detective"]
fallback = "Let me think about this."

[[contexts]]
name = "combat"
keywords = ["weapon", "fight", "danger", "kill", "threat"]
fallback = "Stay sharp."

[[contexts]]
name = "greeting"
keywords = ["hello", "hi ", "hey"]
fallback = "Hello there."
"#;

    #[test]
    fn parses_full_profile() {
        let profile = parse_persona(NICK_TOML, "<test>").unwrap();
        assert_eq!(profile.name, "Nick Valentine");
        assert_eq!(profile.example_phrases.len(), 3);
        assert_eq!(profile.contexts.len(), 3);
    }

    #[test]
    fn fallback_matches_context_keyword_case_insensitively() {
        let profile = parse_persona(NICK_TOML, "<test>").unwrap();
        assert_eq!(
            profile.fallback_for("Tell me about the MURDER case"),
            "Let me think about this."
        );
        assert_eq!(profile.fallback_for("There's danger ahead"), "Stay sharp.");
    }

    #[test]
    fn fallback_defaults_when_no_rule_fires() {
        let profile = parse_persona(NICK_TOML, "<test>").unwrap();
        assert_eq!(
            profile.fallback_for("what's the weather"),
            "I... don't know what to say."
        );
    }

    #[test]
    fn first_matching_rule_wins() {
        let profile = parse_persona(NICK_TOML, "<test>").unwrap();
        // "case" (investigation) appears before "danger" (combat) in rule order.
        assert_eq!(
            profile.fallback_for("the case puts us in danger"),
            "Let me think about this."
        );
    }

    #[test]
    fn few_shot_caps_at_available_phrases() {
        let profile = parse_persona(NICK_TOML, "<test>").unwrap();
        assert_eq!(profile.few_shot(2).len(), 2);
        assert_eq!(profile.few_shot(10).len(), 3);
    }

    #[test]
    fn empty_name_is_rejected() {
        let result = parse_persona(
            r#"
name = ""
summary = "something"
"#,
            "<test>",
        );
        assert!(result.is_err());
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = parse_persona(
            r#"
name = "Nick"
summary = "something"
backstory = "not a recognized field"
"#,
            "<test>",
        );
        assert!(result.is_err());
    }

    #[test]
    fn list_personas_reads_toml_stems() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("nick.toml"), NICK_TOML).unwrap();
        std::fs::write(dir.path().join("barret.toml"), NICK_TOML).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let names = list_personas(&dir.path().display().to_string());
        assert_eq!(names, vec!["barret", "nick"]);
    }

    #[test]
    fn list_personas_missing_dir_is_empty() {
        assert!(list_personas("/nonexistent/personas").is_empty());
    }
}
