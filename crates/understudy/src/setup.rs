// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Composition root helpers.
//!
//! Builds the shared components (index, embedder, corpus, persona,
//! backend registry) from configuration and hands them out as `Arc`s.
//! Nothing here reads process-wide state; every consumer gets its
//! dependencies injected.

use std::path::Path;
use std::sync::Arc;

use tracing::warn;
use understudy_config::{load_persona, persona_path, PersonaProfile, UnderstudyConfig};
use understudy_core::{EmbeddingAdapter, UnderstudyError};
use understudy_corpus::CorpusStore;
use understudy_engine::BackendRegistry;
use understudy_gemini::GeminiBackend;
use understudy_memory::SqliteIndex;
use understudy_ollama::OllamaBackend;

/// Open (or create) the on-disk vector index.
pub async fn open_index(config: &UnderstudyConfig) -> Result<Arc<SqliteIndex>, UnderstudyError> {
    let path = Path::new(&config.storage.database_path);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| UnderstudyError::Storage {
            source: Box::new(e),
        })?;
    }
    Ok(Arc::new(SqliteIndex::open(path).await?))
}

/// Build the embedding adapter, downloading the model on first run.
#[cfg(feature = "onnx")]
pub async fn build_embedder(
    config: &UnderstudyConfig,
) -> Result<Arc<dyn EmbeddingAdapter>, UnderstudyError> {
    use understudy_memory::{ModelManager, OnnxEmbedder};

    let data_dir = Path::new(&config.storage.database_path)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| std::path::PathBuf::from("."));
    let manager = ModelManager::new(data_dir, config.memory.model_name.clone());
    let model_path = manager.ensure_model().await?;
    Ok(Arc::new(OnnxEmbedder::new(&model_path)?))
}

/// Without the `onnx` feature there is no embedder to build; memory and
/// indexing require one, so this is a configuration-level failure.
#[cfg(not(feature = "onnx"))]
pub async fn build_embedder(
    _config: &UnderstudyConfig,
) -> Result<Arc<dyn EmbeddingAdapter>, UnderstudyError> {
    Err(UnderstudyError::Config(
        "embedding support not compiled in; rebuild with the `onnx` feature".to_string(),
    ))
}

/// Load the dialogue corpus from the configured CSV path.
pub fn load_corpus(config: &UnderstudyConfig) -> Result<Arc<CorpusStore>, UnderstudyError> {
    Ok(Arc::new(CorpusStore::from_csv_path(Path::new(
        &config.corpus.path,
    ))?))
}

/// Load the active persona profile.
pub fn load_active_persona(
    config: &UnderstudyConfig,
) -> Result<Arc<PersonaProfile>, UnderstudyError> {
    let path = persona_path(&config.persona.dir, &config.persona.active);
    let profile = load_persona(&path)
        .map_err(|e| UnderstudyError::Config(format!("persona load failed: {e}")))?;
    Ok(Arc::new(profile))
}

/// Register the compiled-in generation backends and activate the
/// configured one.
///
/// A backend that fails to initialize (a missing API key, say) is skipped
/// with a warning; it only becomes fatal when the configured active
/// backend is among the casualties.
pub async fn build_registry(
    config: &UnderstudyConfig,
) -> Result<Arc<BackendRegistry>, UnderstudyError> {
    let mut registry = BackendRegistry::new();

    match GeminiBackend::new(&config.gemini) {
        Ok(backend) => registry.register("gemini", Arc::new(backend)),
        Err(e) => warn!(error = %e, "gemini backend unavailable"),
    }
    match OllamaBackend::new(&config.ollama) {
        Ok(backend) => registry.register("ollama", Arc::new(backend)),
        Err(e) => warn!(error = %e, "ollama backend unavailable"),
    }

    if registry.is_empty() {
        return Err(UnderstudyError::Config(
            "no generation backend could be initialized".to_string(),
        ));
    }

    let registry = Arc::new(registry);
    registry.switch(&config.backend.active).await.map_err(|_| {
        UnderstudyError::Config(format!(
            "configured backend `{}` is not available (registered: {})",
            config.backend.active,
            registry.list().join(", ")
        ))
    })?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_index_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = UnderstudyConfig::default();
        config.storage.database_path = dir
            .path()
            .join("nested/data/understudy.db")
            .display()
            .to_string();

        let index = open_index(&config).await.unwrap();
        assert_eq!(
            understudy_memory::VectorIndex::count(index.as_ref())
                .await
                .unwrap(),
            0
        );
    }

    #[test]
    fn missing_corpus_is_a_config_error() {
        let mut config = UnderstudyConfig::default();
        config.corpus.path = "/nonexistent/corpus.csv".to_string();
        assert!(load_corpus(&config).is_err());
    }

    #[test]
    fn missing_persona_is_a_config_error() {
        let mut config = UnderstudyConfig::default();
        config.persona.dir = "/nonexistent/personas".to_string();
        let err = load_active_persona(&config).unwrap_err();
        assert!(matches!(err, UnderstudyError::Config(_)));
    }
}
