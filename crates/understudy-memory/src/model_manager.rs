// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! First-run download of the embedding model.
//!
//! Fetches the all-MiniLM-L6-v2 INT8 ONNX export and its tokenizer from
//! HuggingFace into the data directory. Subsequent runs find the files on
//! disk and skip the network entirely.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::AsyncWriteExt;
use tracing::info;
use understudy_core::UnderstudyError;

const MODEL_URL: &str =
    "https://huggingface.co/onnx-community/all-MiniLM-L6-v2-ONNX/resolve/main/onnx/model_quantized.onnx";
const TOKENIZER_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/tokenizer.json";

/// Resolves model file paths and downloads them when missing.
pub struct ModelManager {
    data_dir: PathBuf,
    model_name: String,
}

impl ModelManager {
    /// Creates a manager rooted at the given data directory.
    pub fn new(data_dir: PathBuf, model_name: impl Into<String>) -> Self {
        Self {
            data_dir,
            model_name: model_name.into(),
        }
    }

    /// Directory holding the model files.
    pub fn model_dir(&self) -> PathBuf {
        self.data_dir.join("models").join(&self.model_name)
    }

    /// Path to the ONNX model file.
    pub fn model_path(&self) -> PathBuf {
        self.model_dir().join("model.onnx")
    }

    /// Path to the tokenizer.json file.
    pub fn tokenizer_path(&self) -> PathBuf {
        self.model_dir().join("tokenizer.json")
    }

    /// True when both model and tokenizer are on disk.
    pub fn is_model_available(&self) -> bool {
        self.model_path().exists() && self.tokenizer_path().exists()
    }

    /// Ensures the model is on disk, downloading it when missing.
    pub async fn ensure_model(&self) -> Result<PathBuf, UnderstudyError> {
        if self.is_model_available() {
            return Ok(self.model_path());
        }

        info!(model = %self.model_name, "embedding model not found, downloading from HuggingFace");

        let model_dir = self.model_dir();
        tokio::fs::create_dir_all(&model_dir).await.map_err(|e| {
            UnderstudyError::Internal(format!("Failed to create model directory: {e}"))
        })?;

        let files = [("model.onnx", MODEL_URL), ("tokenizer.json", TOKENIZER_URL)];
        for (filename, url) in &files {
            let dest = model_dir.join(filename);
            if dest.exists() {
                continue;
            }
            match download_file(url, &dest, filename).await {
                Ok(size) => info!("Downloaded {filename} ({size} bytes)"),
                Err(e) => {
                    // Drop the partial file so the next run retries cleanly.
                    let _ = tokio::fs::remove_file(&dest).await;
                    return Err(e);
                }
            }
        }

        info!("Embedding model ready at: {}", model_dir.display());
        Ok(self.model_path())
    }
}

/// Stream a URL to a local file with a progress bar.
async fn download_file(url: &str, dest: &Path, label: &str) -> Result<usize, UnderstudyError> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| UnderstudyError::Internal(format!("Failed to download {url}: {e}")))?;

    if !response.status().is_success() {
        return Err(UnderstudyError::Internal(format!(
            "Download failed with status {}: {url}",
            response.status()
        )));
    }

    let bar = match response.content_length() {
        Some(total) => {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::with_template("{msg} {bar:30} {bytes}/{total_bytes}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        }
        None => ProgressBar::new_spinner(),
    };
    bar.set_message(label.to_string());

    let mut file = tokio::fs::File::create(dest).await.map_err(|e| {
        UnderstudyError::Internal(format!("Failed to create {}: {e}", dest.display()))
    })?;

    let mut written = 0usize;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            UnderstudyError::Internal(format!("Failed to read response body from {url}: {e}"))
        })?;
        file.write_all(&chunk).await.map_err(|e| {
            UnderstudyError::Internal(format!("Failed to write {}: {e}", dest.display()))
        })?;
        written += chunk.len();
        bar.inc(chunk.len() as u64);
    }
    file.flush().await.map_err(|e| {
        UnderstudyError::Internal(format!("Failed to flush {}: {e}", dest.display()))
    })?;
    bar.finish_and_clear();

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_path_under_data_dir() {
        let mgr = ModelManager::new(PathBuf::from("/tmp/understudy"), "all-MiniLM-L6-v2");
        assert_eq!(
            mgr.model_path(),
            PathBuf::from("/tmp/understudy/models/all-MiniLM-L6-v2/model.onnx")
        );
    }

    #[test]
    fn tokenizer_path_under_data_dir() {
        let mgr = ModelManager::new(PathBuf::from("/tmp/understudy"), "all-MiniLM-L6-v2");
        assert_eq!(
            mgr.tokenizer_path(),
            PathBuf::from("/tmp/understudy/models/all-MiniLM-L6-v2/tokenizer.json")
        );
    }

    #[test]
    fn model_not_available_when_missing() {
        let mgr = ModelManager::new(PathBuf::from("/nonexistent/path"), "all-MiniLM-L6-v2");
        assert!(!mgr.is_model_available());
    }
}
