// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly and reply extraction.
//!
//! The assembler renders persona, few-shot examples, retrieved memories,
//! and recent history into a single generation prompt; the extractor is
//! its mirror, carving a clean bounded reply back out of raw generator
//! output. Both are pure: same inputs, same bytes.

pub mod assembler;
pub mod extractor;

pub use assembler::{
    ConversationTurn, MemoryLine, PersonaView, PromptAssembler, PromptStrategy, MEMORY_SLOTS,
};
pub use extractor::{
    cap_sentences, quality_gate, strip_prompt_echo, strip_stage_directions,
    strip_wrapping_quotes, truncate_at_markers, Extraction, RejectReason, ResponseExtractor,
};
