// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw generator output cleanup.
//!
//! Small local models echo prompts, leak role markers, emit control
//! tokens, and degenerate into repetition. Each transform below targets
//! one of those failure modes; [`ResponseExtractor::extract`] runs them
//! in a fixed order and gates the result, so a caller always gets either
//! a clean line or an explicit rejection it can substitute a fallback
//! for.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Bracketed stage directions such as `[smiles]` or `[pauses, looks away]`.
static STAGE_DIRECTIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").unwrap());

/// Characters stripped from both ends of the final reply.
const WRAPPING: &[char] = &[
    '"', '\'', '[', ']', '(', ')', '\u{201c}', '\u{201d}', '\u{2018}', '\u{2019}', ' ',
];

/// Why the quality gate refused an extracted reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Fewer than 5 characters survived cleanup.
    TooShort,
    /// Fewer than 5 distinct characters, the classic repetition loop.
    TooFewDistinct,
    /// No alphabetic character at all.
    NoAlpha,
    /// More than 10 exclamation marks.
    RepeatedPunctuation,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RejectReason::TooShort => "too short",
            RejectReason::TooFewDistinct => "too few distinct characters",
            RejectReason::NoAlpha => "no alphabetic characters",
            RejectReason::RepeatedPunctuation => "repeated punctuation",
        };
        f.write_str(label)
    }
}

/// Outcome of running the extraction pipeline over raw generator output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Cleaned reply that passed the quality gate.
    Accepted(String),
    /// Output failed the gate; the caller should substitute a fallback.
    Rejected { reason: RejectReason },
}

/// Isolate the newly generated continuation from `raw`.
///
/// Echoing backends return the whole prompt followed by the reply, so a
/// verbatim prefix is stripped first. Chat-template backends re-emit
/// their assistant token instead; failing both, the text after the last
/// persona cue is kept. Output with none of those shapes is already a
/// bare continuation and passes through unchanged.
pub fn strip_prompt_echo(raw: &str, prompt: &str, persona_name: &str) -> String {
    if let Some(rest) = raw.strip_prefix(prompt) {
        return rest.to_string();
    }
    for token in ["<|assistant|>", "<|im_start|>assistant"] {
        if let Some(pos) = raw.rfind(token) {
            return raw[pos + token.len()..].to_string();
        }
    }
    if !persona_name.is_empty() {
        let cue = format!("{persona_name}:");
        if let Some(pos) = raw.rfind(&cue) {
            return raw[pos + cue.len()..].to_string();
        }
    }
    raw.to_string()
}

/// Cut the text at the first role-leakage or control marker.
///
/// Markers are turn openers (`User:`, the persona's own cue), special
/// tokens, and a blank line. Remaining single newlines collapse to
/// spaces.
pub fn truncate_at_markers(text: &str, persona_name: &str) -> String {
    let own_cue = format!("{persona_name}:");
    let own_cue_lower = own_cue.to_lowercase();
    let mut markers = vec!["User:", "user:", "</s>", "<|im_end|>", "<|", "###", "\n\n"];
    if !persona_name.is_empty() {
        markers.push(own_cue.as_str());
        markers.push(own_cue_lower.as_str());
    }
    let cut = markers
        .iter()
        .copied()
        .filter_map(|marker| text.find(marker))
        .min()
        .unwrap_or(text.len());
    text[..cut].replace('\n', " ").trim().to_string()
}

/// Remove bracketed stage directions and normalize the spacing they
/// leave behind.
pub fn strip_stage_directions(text: &str) -> String {
    let stripped = STAGE_DIRECTIONS.replace_all(text, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep at most `cap` sentences, restoring the terminal period lost to
/// the split when the text was truncated.
pub fn cap_sentences(text: &str, cap: usize) -> String {
    let cap = cap.max(1);
    let sentences: Vec<&str> = text.split(". ").collect();
    if sentences.len() <= cap {
        return text.to_string();
    }
    let mut capped = sentences[..cap].join(". ");
    if !capped.ends_with('.') {
        capped.push('.');
    }
    capped
}

/// Trim wrapping quote and bracket characters from both ends.
pub fn strip_wrapping_quotes(text: &str) -> String {
    text.trim_matches(WRAPPING).to_string()
}

/// Reject output that is too short, too repetitive, or non-textual.
pub fn quality_gate(text: &str) -> Result<(), RejectReason> {
    if text.chars().count() < 5 {
        return Err(RejectReason::TooShort);
    }
    let distinct: HashSet<char> = text.chars().collect();
    if distinct.len() < 5 {
        return Err(RejectReason::TooFewDistinct);
    }
    if !text.chars().any(|c| c.is_alphabetic()) {
        return Err(RejectReason::NoAlpha);
    }
    if text.chars().filter(|&c| c == '!').count() > 10 {
        return Err(RejectReason::RepeatedPunctuation);
    }
    Ok(())
}

/// Runs the full cleanup pipeline over raw generator output.
#[derive(Debug, Clone)]
pub struct ResponseExtractor {
    sentence_cap: usize,
}

impl ResponseExtractor {
    /// Creates an extractor that keeps at most `sentence_cap` sentences.
    pub fn new(sentence_cap: usize) -> Self {
        Self { sentence_cap }
    }

    /// Extract a clean reply from `raw`, given the prompt that produced
    /// it and the persona the reply should belong to.
    pub fn extract(&self, raw: &str, prompt: &str, persona_name: &str) -> Extraction {
        let text = strip_prompt_echo(raw, prompt, persona_name);
        let text = truncate_at_markers(&text, persona_name);
        let text = strip_stage_directions(&text);
        let text = cap_sentences(&text, self.sentence_cap);
        let text = strip_wrapping_quotes(&text);
        match quality_gate(&text) {
            Ok(()) => Extraction::Accepted(text),
            Err(reason) => Extraction::Rejected { reason },
        }
    }
}
