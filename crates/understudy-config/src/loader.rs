// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./understudy.toml` > `~/.config/understudy/understudy.toml`
//! > `/etc/understudy/understudy.toml` with environment variable overrides via the
//! `UNDERSTUDY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::UnderstudyConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/understudy/understudy.toml` (system-wide)
/// 3. `~/.config/understudy/understudy.toml` (user XDG config)
/// 4. `./understudy.toml` (local directory)
/// 5. `UNDERSTUDY_*` environment variables
pub fn load_config() -> Result<UnderstudyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(UnderstudyConfig::default()))
        .merge(Toml::file("/etc/understudy/understudy.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("understudy/understudy.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("understudy.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<UnderstudyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(UnderstudyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<UnderstudyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(UnderstudyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// CRITICAL: Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `UNDERSTUDY_GEMINI_API_KEY` must
/// map to `gemini.api_key`, not `gemini.api.key`.
fn env_provider() -> Env {
    Env::prefixed("UNDERSTUDY_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: UNDERSTUDY_GEMINI_API_KEY -> "gemini_api_key"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("engine_", "engine.", 1)
            .replacen("persona_", "persona.", 1)
            .replacen("corpus_", "corpus.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("memory_", "memory.", 1)
            .replacen("prompt_", "prompt.", 1)
            .replacen("backend_", "backend.", 1)
            .replacen("gemini_", "gemini.", 1)
            .replacen("ollama_", "ollama.", 1)
            .replacen("sampling_", "sampling.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_any_file() {
        let config = load_config_from_str("").expect("defaults should parse");
        assert_eq!(config.engine.log_level, "info");
        assert_eq!(config.memory.result_count, 6);
        assert_eq!(config.backend.active, "gemini");
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
[backend]
active = "ollama"

[memory]
result_count = 4

[sampling]
temperature = 0.2
"#,
        )
        .expect("valid toml should parse");
        assert_eq!(config.backend.active, "ollama");
        assert_eq!(config.memory.result_count, 4);
        assert!((config.sampling.temperature - 0.2).abs() < f64::EPSILON);
        // Untouched sections keep their defaults.
        assert_eq!(config.prompt.history_window, 4);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = load_config_from_str(
            r#"
[engine]
log_levle = "debug"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn persona_section_parses() {
        let config = load_config_from_str(
            r#"
[persona]
dir = "/opt/personas"
active = "barret"
"#,
        )
        .expect("valid toml should parse");
        assert_eq!(config.persona.dir, "/opt/personas");
        assert_eq!(config.persona.active, "barret");
    }
}
