// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The exchange pipeline.
//!
//! `DialogueEngine::exchange` runs one conversation turn end to end:
//! retrieve ranked memories for the query, assemble the prompt in the
//! shape the active backend wants, generate, extract a clean reply, write
//! both turns to the memory ledger, and push them onto the session
//! buffer. A failed or rejected generation becomes a fallback reply with
//! the diagnostic retained; the caller always receives a usable line.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};
use understudy_config::PersonaProfile;
use understudy_core::{GenerationRequest, SamplingParams, UnderstudyError};
use understudy_memory::{MemoryLedger, MemoryRanker};
use understudy_prompt::{
    Extraction, MemoryLine, PersonaView, PromptAssembler, PromptStrategy, ResponseExtractor,
};

use crate::fallback::FallbackSource;
use crate::registry::BackendRegistry;
use crate::session::DialogueSession;

/// Engine knobs taken from configuration at composition time.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// When false, no retrieval and no ledger writes happen; replies are
    /// generated from the persona and session history alone.
    pub memory_enabled: bool,
    /// Ranked memories requested per exchange.
    pub result_count: usize,
    /// Session turns rendered into the prompt.
    pub history_window: usize,
    /// Sampling knobs forwarded to the backend.
    pub sampling: SamplingParams,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            memory_enabled: true,
            result_count: 6,
            history_window: 4,
            sampling: SamplingParams::default(),
        }
    }
}

/// The reply handed back to the caller after one exchange.
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    /// The in-character line. Never empty.
    pub text: String,
    /// True when the line is a canned or corpus-drawn substitute.
    pub fallback: bool,
    /// Diagnostic message behind a fallback, for logs and debugging.
    pub error: Option<String>,
    /// Name of the backend that served (or failed to serve) the turn.
    pub backend: String,
}

/// Orchestrates retrieval, assembly, generation, extraction, and memory
/// writes for one persona.
pub struct DialogueEngine {
    persona: Arc<PersonaProfile>,
    registry: Arc<BackendRegistry>,
    ranker: MemoryRanker,
    ledger: MemoryLedger,
    assembler: PromptAssembler,
    extractor: ResponseExtractor,
    fallback: FallbackSource,
    settings: EngineSettings,
}

impl DialogueEngine {
    /// Wire up an engine from already-constructed components.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        persona: Arc<PersonaProfile>,
        registry: Arc<BackendRegistry>,
        ranker: MemoryRanker,
        ledger: MemoryLedger,
        assembler: PromptAssembler,
        extractor: ResponseExtractor,
        fallback: FallbackSource,
        settings: EngineSettings,
    ) -> Self {
        Self {
            persona,
            registry,
            ranker,
            ledger,
            assembler,
            extractor,
            fallback,
            settings,
        }
    }

    /// The persona this engine speaks as.
    pub fn persona(&self) -> &PersonaProfile {
        &self.persona
    }

    /// The backend registry, for listing and switching.
    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Run one conversation turn.
    ///
    /// Errors only on configuration-level failures: a dead embedder or an
    /// empty backend registry. Generation and storage failures degrade to
    /// a fallback reply instead.
    pub async fn exchange(
        &self,
        session: &mut DialogueSession,
        user_query: &str,
    ) -> Result<Reply, UnderstudyError> {
        let memories = if self.settings.memory_enabled {
            self.ranker
                .retrieve(user_query, Some(&self.persona.name), self.settings.result_count)
                .await?
        } else {
            vec![]
        };

        let (backend_name, backend) = self.registry.active().await?;
        let strategy = PromptStrategy::for_capabilities(&backend.capabilities());
        let view = PersonaView {
            name: &self.persona.name,
            summary: &self.persona.summary,
            example_phrases: &self.persona.example_phrases,
        };
        let history = session.recent(self.settings.history_window);
        let memory_lines: Vec<MemoryLine> = memories
            .iter()
            .map(|m| MemoryLine {
                speaker: m.speaker.clone(),
                document: m.document.clone(),
            })
            .collect();
        let prompt =
            self.assembler
                .assemble(strategy, &view, user_query, &history, &memory_lines);
        debug!(
            session_id = %session.id(),
            backend = %backend_name,
            ?strategy,
            memories = memory_lines.len(),
            "prompt assembled"
        );

        let request = GenerationRequest {
            prompt: prompt.clone(),
            params: self.settings.sampling,
        };
        let (text, fallback, error) = match backend.generate(request).await {
            Ok(output) => {
                match self.extractor.extract(&output.text, &prompt, &self.persona.name) {
                    Extraction::Accepted(clean) => (clean, false, None),
                    Extraction::Rejected { reason } => {
                        warn!(
                            session_id = %session.id(),
                            backend = %backend_name,
                            %reason,
                            "generated output rejected, substituting fallback"
                        );
                        (
                            self.fallback.resolve(user_query),
                            true,
                            Some(format!("low-quality output: {reason}")),
                        )
                    }
                }
            }
            Err(e) => {
                warn!(
                    session_id = %session.id(),
                    backend = %backend_name,
                    error = %e,
                    "generation failed, substituting fallback"
                );
                (self.fallback.resolve(user_query), true, Some(e.to_string()))
            }
        };

        if self.settings.memory_enabled {
            if let Err(e) = self.ledger.write_turn("user", user_query).await {
                warn!(session_id = %session.id(), error = %e, "user turn not recorded");
            }
            if let Err(e) = self.ledger.write_turn(&self.persona.name, &text).await {
                warn!(session_id = %session.id(), error = %e, "persona turn not recorded");
            }
        }

        session.push_turn("User", user_query);
        session.push_turn(&self.persona.name, &text);

        Ok(Reply {
            text,
            fallback,
            error,
            backend: backend_name,
        })
    }
}
