// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Understudy dialogue engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Understudy configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UnderstudyConfig {
    /// Engine identity and behavior settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Persona profile settings.
    #[serde(default)]
    pub persona: PersonaConfig,

    /// Dialogue corpus settings.
    #[serde(default)]
    pub corpus: CorpusConfig,

    /// Vector index storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Memory retrieval settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Prompt assembly settings.
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Generation backend selection.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Hosted Gemini backend settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Local Ollama backend settings.
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Sampling parameters passed to generation backends.
    #[serde(default)]
    pub sampling: SamplingConfig,
}

/// Engine identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Number of recent conversation turns each session keeps in its
    /// rolling buffer. Oldest turns drop first.
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            history_turns: default_history_turns(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_history_turns() -> usize {
    8
}

/// Persona profile configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PersonaConfig {
    /// Directory containing persona profile TOML files.
    #[serde(default = "default_persona_dir")]
    pub dir: String,

    /// Name of the persona profile to load at startup (file stem).
    #[serde(default = "default_active_persona")]
    pub active: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            dir: default_persona_dir(),
            active: default_active_persona(),
        }
    }
}

fn default_persona_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("understudy").join("personas"))
        .unwrap_or_else(|| std::path::PathBuf::from("personas"))
        .to_string_lossy()
        .into_owned()
}

fn default_active_persona() -> String {
    "nick".to_string()
}

/// Dialogue corpus configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CorpusConfig {
    /// Path to the CSV file of persona dialogue lines.
    #[serde(default = "default_corpus_path")]
    pub path: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: default_corpus_path(),
        }
    }
}

fn default_corpus_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("understudy").join("corpus.csv"))
        .unwrap_or_else(|| std::path::PathBuf::from("corpus.csv"))
        .to_string_lossy()
        .into_owned()
}

/// Vector index storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file holding the vector index.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("understudy").join("understudy.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("understudy.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Memory retrieval configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Enable the memory system. When false, replies are generated from
    /// the persona and history alone and no ledger writes occur.
    #[serde(default = "default_memory_enabled")]
    pub enabled: bool,

    /// Number of ranked memories a retrieval call returns.
    #[serde(default = "default_result_count")]
    pub result_count: usize,

    /// Name of the embedding model to use.
    #[serde(default = "default_model_name")]
    pub model_name: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_memory_enabled(),
            result_count: default_result_count(),
            model_name: default_model_name(),
        }
    }
}

fn default_memory_enabled() -> bool {
    true
}

fn default_result_count() -> usize {
    6
}

fn default_model_name() -> String {
    "all-MiniLM-L6-v2".to_string()
}

/// Prompt assembly configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PromptConfig {
    /// Number of few-shot example phrases injected into the prompt.
    #[serde(default = "default_few_shot_count")]
    pub few_shot_count: usize,

    /// Number of recent conversation turns rendered into the prompt.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Maximum sentences kept from a generated reply.
    #[serde(default = "default_sentence_cap")]
    pub sentence_cap: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            few_shot_count: default_few_shot_count(),
            history_window: default_history_window(),
            sentence_cap: default_sentence_cap(),
        }
    }
}

fn default_few_shot_count() -> usize {
    3
}

fn default_history_window() -> usize {
    4
}

fn default_sentence_cap() -> usize {
    2
}

/// Generation backend selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Name of the backend active at startup (`gemini` or `ollama`).
    /// Switchable at runtime through the registry.
    #[serde(default = "default_active_backend")]
    pub active: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            active: default_active_backend(),
        }
    }
}

fn default_active_backend() -> String {
    "gemini".to_string()
}

/// Hosted Gemini backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// Gemini API key. `None` requires environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model to request from the generateContent endpoint.
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_gemini_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            timeout_secs: default_gemini_timeout_secs(),
        }
    }
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash-latest".to_string()
}

fn default_gemini_timeout_secs() -> u64 {
    30
}

/// Local Ollama backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OllamaConfig {
    /// Base URL of the local Ollama daemon.
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,

    /// Model tag to generate with.
    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// HTTP request timeout in seconds. Local generation on CPU can be
    /// slow, so this is much higher than the hosted default.
    #[serde(default = "default_ollama_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_base_url(),
            model: default_ollama_model(),
            timeout_secs: default_ollama_timeout_secs(),
        }
    }
}

fn default_ollama_base_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_ollama_model() -> String {
    "qwen2.5:3b".to_string()
}

fn default_ollama_timeout_secs() -> u64 {
    120
}

/// Sampling parameters passed to generation backends.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SamplingConfig {
    /// Upper bound on generated tokens.
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,

    /// Sampling randomness; 0 is deterministic.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Candidate pool size by count.
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Candidate pool size by cumulative probability.
    #[serde(default = "default_top_p")]
    pub top_p: f64,

    /// Penalty applied to already-emitted tokens.
    #[serde(default = "default_repetition_penalty")]
    pub repetition_penalty: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: default_max_new_tokens(),
            temperature: default_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
            repetition_penalty: default_repetition_penalty(),
        }
    }
}

fn default_max_new_tokens() -> u32 {
    80
}

fn default_temperature() -> f64 {
    0.7
}

fn default_top_k() -> u32 {
    50
}

fn default_top_p() -> f64 {
    0.9
}

fn default_repetition_penalty() -> f64 {
    1.2
}
