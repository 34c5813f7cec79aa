// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic prompt assembly.
//!
//! Section order is fixed: persona header, few-shot examples, retrieved
//! memories, recent turns, the user query, and the persona cue. A backend
//! that wants chat markup gets the same sections wrapped in
//! `<|system|>` / `<|user|>` / `<|assistant|>` blocks instead.

use understudy_core::BackendCapabilities;

/// Retrieved memories rendered into the prompt, at most this many.
pub const MEMORY_SLOTS: usize = 3;

/// The persona fields the assembler renders.
#[derive(Debug, Clone, Copy)]
pub struct PersonaView<'a> {
    /// Display name, also the reply cue.
    pub name: &'a str,
    /// One-paragraph character summary.
    pub summary: &'a str,
    /// Canned in-character utterances for the few-shot block.
    pub example_phrases: &'a [String],
}

/// One turn of visible conversation history.
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub speaker: String,
    pub text: String,
}

/// One retrieved memory line for the context section.
#[derive(Debug, Clone)]
pub struct MemoryLine {
    /// Speaker recorded at write time; empty when the entry had none.
    pub speaker: String,
    pub document: String,
}

/// How the assembled sections are rendered for a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStrategy {
    /// Flat continuation prompt ending in the persona cue.
    RawContinuation,
    /// `<|system|>` / `<|user|>` / `<|assistant|>` blocks for
    /// instruction-tuned local models.
    ChatMarkup,
}

impl PromptStrategy {
    /// Pick the strategy a backend's capabilities ask for.
    pub fn for_capabilities(caps: &BackendCapabilities) -> Self {
        if caps.chat_markup {
            PromptStrategy::ChatMarkup
        } else {
            PromptStrategy::RawContinuation
        }
    }
}

/// Renders generation prompts from persona, memories, and history.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    few_shot_count: usize,
    history_window: usize,
}

impl PromptAssembler {
    /// Creates an assembler with the given few-shot and history limits.
    pub fn new(few_shot_count: usize, history_window: usize) -> Self {
        Self {
            few_shot_count,
            history_window,
        }
    }

    /// Assemble the full prompt. Pure: identical inputs yield identical
    /// bytes.
    pub fn assemble(
        &self,
        strategy: PromptStrategy,
        persona: &PersonaView<'_>,
        user_query: &str,
        history: &[ConversationTurn],
        memories: &[MemoryLine],
    ) -> String {
        let sys_inst = format!(
            "You are {}. {}\nYou must respond in character. Keep replies concise (1-3 sentences).",
            persona.name, persona.summary
        );
        let few_block = self.few_shot_block(persona);
        let mem_block = memory_block(memories);
        let hist_block = self.history_block(history);

        match strategy {
            PromptStrategy::RawContinuation => format!(
                "{sys_inst}\n{few_block}\n{mem_block}\n{hist_block}\nUser: {user_query}\n{}:",
                persona.name
            ),
            PromptStrategy::ChatMarkup => format!(
                "<|system|>\n{sys_inst}\n{few_block}\n{mem_block}\n{hist_block}\n</s>\n<|user|>\n{user_query}</s>\n<|assistant|>\n"
            ),
        }
    }

    fn few_shot_block(&self, persona: &PersonaView<'_>) -> String {
        let examples = &persona.example_phrases
            [..self.few_shot_count.min(persona.example_phrases.len())];
        if examples.is_empty() {
            return String::new();
        }
        let mut block = String::from("\nExamples of how you speak:\n");
        for utterance in examples {
            block.push_str(&format!(
                "User: Say something in character\n{}: {utterance}\n\n",
                persona.name
            ));
        }
        block
    }

    fn history_block(&self, history: &[ConversationTurn]) -> String {
        if history.is_empty() {
            return String::new();
        }
        let start = history.len().saturating_sub(self.history_window);
        let mut block = String::from("\nRecent conversation:\n");
        for turn in &history[start..] {
            block.push_str(&format!("{}: {}\n", turn.speaker, turn.text));
        }
        block
    }
}

fn memory_block(memories: &[MemoryLine]) -> String {
    if memories.is_empty() {
        return String::new();
    }
    let mut block = String::from("\nRelevant context from your knowledge:\n");
    for memory in memories.iter().take(MEMORY_SLOTS) {
        let speaker = if memory.speaker.is_empty() {
            "Unknown"
        } else {
            &memory.speaker
        };
        block.push_str(&format!("- {speaker} said: \"{}\"\n", memory.document));
    }
    block
}
