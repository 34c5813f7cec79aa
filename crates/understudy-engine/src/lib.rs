// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end dialogue orchestration for the Understudy engine.
//!
//! One conversation turn runs sequentially: retrieve ranked memories,
//! assemble the prompt for the active backend, generate, extract a clean
//! reply, record both turns in the memory ledger, push them onto the
//! session buffer. Generation and extraction failures degrade to a
//! persona fallback line; the caller always gets a usable reply.
//!
//! ## Components
//!
//! - **DialogueSession**: per-conversation rolling turn buffer
//! - **BackendRegistry**: named generation backends, switchable at runtime
//! - **FallbackSource**: context-keyed canned lines, corpus-drawn last resort
//! - **seed_corpus**: embeds and indexes the dialogue corpus
//! - **DialogueEngine**: the exchange pipeline itself

pub mod engine;
pub mod fallback;
pub mod indexer;
pub mod registry;
pub mod session;

pub use engine::{DialogueEngine, EngineSettings, Reply};
pub use fallback::FallbackSource;
pub use indexer::seed_corpus;
pub use registry::BackendRegistry;
pub use session::{DialogueSession, Turn};
