// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `understudy chat` command implementation.
//!
//! Launches an interactive REPL with a colored prompt and readline
//! history. Builds the full engine stack from configuration, then runs
//! one exchange per line of input. Slash commands surface session and
//! registry operations: history, reset, export, backend switching, and
//! persona listing.

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::info;
use understudy_config::{list_personas, UnderstudyConfig};
use understudy_core::{SamplingParams, UnderstudyError};
use understudy_engine::{
    DialogueEngine, DialogueSession, EngineSettings, FallbackSource, Reply,
};
use understudy_memory::{MemoryLedger, MemoryRanker};
use understudy_prompt::{PromptAssembler, ResponseExtractor};

use crate::setup;

/// Runs the `understudy chat` interactive REPL.
pub async fn run_chat(config: UnderstudyConfig) -> Result<(), UnderstudyError> {
    // Composition root: everything is built here and injected.
    let persona = setup::load_active_persona(&config)?;
    let corpus = setup::load_corpus(&config)?;
    let index = setup::open_index(&config).await?;
    let embedder = setup::build_embedder(&config).await?;
    let registry = setup::build_registry(&config).await?;

    let engine = DialogueEngine::new(
        persona.clone(),
        registry.clone(),
        MemoryRanker::new(index.clone(), embedder.clone()),
        MemoryLedger::new(index, embedder),
        PromptAssembler::new(config.prompt.few_shot_count, config.prompt.history_window),
        ResponseExtractor::new(config.prompt.sentence_cap),
        FallbackSource::new(persona.clone(), corpus),
        EngineSettings {
            memory_enabled: config.memory.enabled,
            result_count: config.memory.result_count,
            history_window: config.prompt.history_window,
            sampling: SamplingParams {
                max_new_tokens: config.sampling.max_new_tokens,
                temperature: config.sampling.temperature,
                top_k: config.sampling.top_k,
                top_p: config.sampling.top_p,
                repetition_penalty: config.sampling.repetition_penalty,
            },
        },
    );

    let mut session = DialogueSession::new(config.engine.history_turns);
    info!(session_id = %session.id(), persona = %persona.name, "chat session started");

    let mut rl = DefaultEditor::new()
        .map_err(|e| UnderstudyError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("understudy chat — {}", persona.name).bold().green());
    println!(
        "Type {} to exit, {} for commands.\n",
        "/quit".yellow(),
        "/help".yellow()
    );

    let prompt = format!("{}> ", "you".cyan());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                if let Some(command) = trimmed.strip_prefix('/') {
                    handle_command(command, &config, &engine, &mut session).await;
                    continue;
                }

                match engine.exchange(&mut session, trimmed).await {
                    Ok(reply) => print_reply(&persona.name, &reply),
                    Err(e) => eprintln!("{}: {e}", "error".red()),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", format!("session {} closed", session.id()).dimmed());
    Ok(())
}

fn print_reply(persona_name: &str, reply: &Reply) {
    println!("{} {}", format!("{persona_name}:").green().bold(), reply.text);
    if reply.fallback {
        let diagnostic = reply.error.as_deref().unwrap_or("unknown cause");
        println!("{}", format!("  (fallback: {diagnostic})").dimmed());
    }
}

/// Dispatch one slash command.
async fn handle_command(
    command: &str,
    config: &UnderstudyConfig,
    engine: &DialogueEngine,
    session: &mut DialogueSession,
) {
    let mut parts = command.split_whitespace();
    match parts.next() {
        Some("help") => {
            println!("/reset             clear the session history");
            println!("/history           show the session transcript");
            println!("/export            write the transcript to a JSON file");
            println!("/backend [name]    show or switch the generation backend");
            println!("/personas          list available persona profiles");
            println!("/quit, /exit       leave the chat");
        }
        Some("reset") => {
            session.reset();
            println!("{}", "session history cleared".dimmed());
        }
        Some("history") => {
            if session.is_empty() {
                println!("{}", "no turns yet".dimmed());
            }
            for turn in session.transcript() {
                println!("{} {}", format!("{}:", turn.speaker).bold(), turn.text);
            }
        }
        Some("export") => match export_transcript(session) {
            Ok(path) => println!("transcript written to {path}"),
            Err(e) => eprintln!("{}: {e}", "error".red()),
        },
        Some("backend") => match parts.next() {
            Some(name) => match engine.registry().switch(name).await {
                Ok(()) => println!("active backend: {name}"),
                Err(e) => eprintln!("{}: {e}", "error".red()),
            },
            None => {
                let active = engine
                    .registry()
                    .active()
                    .await
                    .map(|(name, _)| name)
                    .unwrap_or_else(|_| "<none>".to_string());
                println!("active: {active}");
                println!("registered: {}", engine.registry().list().join(", "));
            }
        },
        Some("personas") => {
            let names = list_personas(&config.persona.dir);
            if names.is_empty() {
                println!("{}", "no persona profiles found".dimmed());
            } else {
                for name in names {
                    if name == config.persona.active {
                        println!("{} {}", name.bold(), "(active)".dimmed());
                    } else {
                        println!("{name}");
                    }
                }
            }
        }
        Some(other) => {
            eprintln!("unknown command: /{other} (try /help)");
        }
        None => {}
    }
}

/// Write the session transcript to a timestamped JSON file in the
/// working directory.
fn export_transcript(session: &DialogueSession) -> Result<String, UnderstudyError> {
    let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
    let path = format!("understudy-session-{stamp}.json");
    let json = serde_json::to_string_pretty(&session.transcript())
        .map_err(|e| UnderstudyError::Internal(format!("transcript serialization failed: {e}")))?;
    std::fs::write(&path, json)
        .map_err(|e| UnderstudyError::Internal(format!("transcript write failed: {e}")))?;
    Ok(path)
}
