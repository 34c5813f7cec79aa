// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-empty paths, bounded window sizes, and sane sampling parameters.

use crate::diagnostic::ConfigError;
use crate::model::UnderstudyConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &UnderstudyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate database_path is not empty
    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // Validate corpus path is not empty
    if config.corpus.path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "corpus.path must not be empty".to_string(),
        });
    }

    // Validate persona settings
    if config.persona.dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "persona.dir must not be empty".to_string(),
        });
    }
    if config.persona.active.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "persona.active must not be empty".to_string(),
        });
    }

    // Validate backend selection is non-empty; whether the name is
    // registered is a runtime registry concern.
    if config.backend.active.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "backend.active must not be empty".to_string(),
        });
    }

    // Validate session buffer and prompt window bounds
    if !(1..=32).contains(&config.engine.history_turns) {
        errors.push(ConfigError::Validation {
            message: format!(
                "engine.history_turns must be between 1 and 32, got {}",
                config.engine.history_turns
            ),
        });
    }

    if config.memory.result_count == 0 {
        errors.push(ConfigError::Validation {
            message: "memory.result_count must be at least 1".to_string(),
        });
    }

    if !(1..=5).contains(&config.prompt.few_shot_count) {
        errors.push(ConfigError::Validation {
            message: format!(
                "prompt.few_shot_count must be between 1 and 5, got {}",
                config.prompt.few_shot_count
            ),
        });
    }

    if !(1..=10).contains(&config.prompt.history_window) {
        errors.push(ConfigError::Validation {
            message: format!(
                "prompt.history_window must be between 1 and 10, got {}",
                config.prompt.history_window
            ),
        });
    }

    if !(1..=5).contains(&config.prompt.sentence_cap) {
        errors.push(ConfigError::Validation {
            message: format!(
                "prompt.sentence_cap must be between 1 and 5, got {}",
                config.prompt.sentence_cap
            ),
        });
    }

    // Validate sampling parameters
    if config.sampling.max_new_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "sampling.max_new_tokens must be at least 1".to_string(),
        });
    }

    if config.sampling.temperature < 0.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "sampling.temperature must be non-negative, got {}",
                config.sampling.temperature
            ),
        });
    }

    if !(config.sampling.top_p > 0.0 && config.sampling.top_p <= 1.0) {
        errors.push(ConfigError::Validation {
            message: format!(
                "sampling.top_p must be in (0, 1], got {}",
                config.sampling.top_p
            ),
        });
    }

    if config.sampling.repetition_penalty <= 0.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "sampling.repetition_penalty must be positive, got {}",
                config.sampling.repetition_penalty
            ),
        });
    }

    // Validate backend timeouts
    if config.gemini.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "gemini.timeout_secs must be at least 1".to_string(),
        });
    }
    if config.ollama.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "ollama.timeout_secs must be at least 1".to_string(),
        });
    }
    if config.ollama.base_url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "ollama.base_url must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = UnderstudyConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = UnderstudyConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))));
    }

    #[test]
    fn zero_result_count_fails_validation() {
        let mut config = UnderstudyConfig::default();
        config.memory.result_count = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("result_count"))));
    }

    #[test]
    fn out_of_range_sentence_cap_fails_validation() {
        let mut config = UnderstudyConfig::default();
        config.prompt.sentence_cap = 9;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("sentence_cap"))));
    }

    #[test]
    fn negative_temperature_fails_validation() {
        let mut config = UnderstudyConfig::default();
        config.sampling.temperature = -0.1;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("temperature"))));
    }

    #[test]
    fn multiple_errors_are_all_collected() {
        let mut config = UnderstudyConfig::default();
        config.storage.database_path = "".to_string();
        config.corpus.path = "".to_string();
        config.sampling.top_p = 1.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.len() >= 3);
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = UnderstudyConfig::default();
        config.backend.active = "ollama".to_string();
        config.prompt.few_shot_count = 2;
        config.prompt.history_window = 3;
        config.prompt.sentence_cap = 3;
        assert!(validate_config(&config).is_ok());
    }
}
