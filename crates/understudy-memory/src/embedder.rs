// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local embedding inference with all-MiniLM-L6-v2 via ONNX Runtime.
//!
//! Produces 384-dimensional L2-normalized sentence vectors on CPU. No
//! network access after the model files are on disk.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use ndarray::Array2;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::TensorRef;

use understudy_core::{
    AdapterType, EmbeddingAdapter, EmbeddingInput, EmbeddingOutput, HealthStatus, PluginAdapter,
    UnderstudyError,
};

/// Embedding dimensions for all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

fn embed_err(message: String) -> UnderstudyError {
    UnderstudyError::Embedding {
        message,
        source: None,
    }
}

/// ONNX-based embedding adapter.
///
/// Loads the quantized model and tokenizer from disk; inference runs on a
/// single CPU thread, which is plenty for one query or turn at a time.
pub struct OnnxEmbedder {
    /// ONNX Runtime session (not Send, wrapped in Mutex for safety).
    session: Mutex<Session>,
    tokenizer: tokenizers::Tokenizer,
}

// Safety: Session is accessed through Mutex which provides synchronization.
// The tokenizer is thread-safe for encoding operations.
unsafe impl Send for OnnxEmbedder {}
unsafe impl Sync for OnnxEmbedder {}

impl OnnxEmbedder {
    /// Creates an embedder from `model.onnx`, with `tokenizer.json`
    /// expected beside it.
    pub fn new(model_path: &Path) -> Result<Self, UnderstudyError> {
        let model_dir = model_path
            .parent()
            .ok_or_else(|| UnderstudyError::Internal("Invalid model path".to_string()))?;

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            UnderstudyError::Internal(format!(
                "Failed to load tokenizer from {}: {e}",
                tokenizer_path.display()
            ))
        })?;

        let session = Session::builder()
            .map_err(|e| {
                UnderstudyError::Internal(format!("Failed to create ONNX session builder: {e}"))
            })?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| {
                UnderstudyError::Internal(format!("Failed to set optimization level: {e}"))
            })?
            .with_intra_threads(1)
            .map_err(|e| UnderstudyError::Internal(format!("Failed to set thread count: {e}")))?
            .commit_from_file(model_path)
            .map_err(|e| {
                UnderstudyError::Internal(format!(
                    "Failed to load ONNX model from {}: {e}",
                    model_path.display()
                ))
            })?;

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    /// Embed one text into a 384-dim L2-normalized vector.
    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>, UnderstudyError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| embed_err(format!("Tokenization failed: {e}")))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let token_type_ids: Vec<i64> =
            encoding.get_type_ids().iter().map(|&t| t as i64).collect();
        let seq_len = input_ids.len();

        let to_tensor = |name: &str, values: Vec<i64>| {
            Array2::from_shape_vec((1, seq_len), values)
                .map_err(|e| embed_err(format!("Failed to shape {name} tensor: {e}")))
        };
        let input_ids_array = to_tensor("input_ids", input_ids)?;
        let attention_mask_array = to_tensor("attention_mask", attention_mask.clone())?;
        let token_type_ids_array = to_tensor("token_type_ids", token_type_ids)?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| embed_err(format!("ONNX session lock poisoned: {e}")))?;

        let input_ids_tensor = TensorRef::from_array_view(&input_ids_array)
            .map_err(|e| embed_err(format!("Failed to bind input_ids: {e}")))?;
        let attention_mask_tensor = TensorRef::from_array_view(&attention_mask_array)
            .map_err(|e| embed_err(format!("Failed to bind attention_mask: {e}")))?;
        let token_type_ids_tensor = TensorRef::from_array_view(&token_type_ids_array)
            .map_err(|e| embed_err(format!("Failed to bind token_type_ids: {e}")))?;

        let outputs = session
            .run(ort::inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
                "token_type_ids" => token_type_ids_tensor
            ])
            .map_err(|e| embed_err(format!("ONNX inference failed: {e}")))?;

        // Token embeddings come out as [1, seq_len, hidden].
        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| embed_err(format!("Failed to extract output tensor: {e}")))?;
        let hidden_size = shape[shape.len() - 1] as usize;

        let pooled = mean_pool_with_attention(data, &attention_mask, seq_len, hidden_size);
        Ok(l2_normalize(&pooled))
    }
}

/// Attention-masked mean pooling over token embeddings.
fn mean_pool_with_attention(
    embeddings: &[f32],
    attention_mask: &[i64],
    seq_len: usize,
    hidden_size: usize,
) -> Vec<f32> {
    let mut sum = vec![0.0f32; hidden_size];
    let mut count = 0.0f32;

    for i in 0..seq_len {
        if attention_mask[i] > 0 {
            for j in 0..hidden_size {
                sum[j] += embeddings[i * hidden_size + j];
            }
            count += 1.0;
        }
    }

    if count > 0.0 {
        for val in &mut sum {
            *val /= count;
        }
    }

    sum
}

/// L2-normalize a vector; a zero vector is returned unchanged.
fn l2_normalize(vec: &[f32]) -> Vec<f32> {
    let norm: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        vec.iter().map(|v| v / norm).collect()
    } else {
        vec.to_vec()
    }
}

#[async_trait]
impl PluginAdapter for OnnxEmbedder {
    fn name(&self) -> &str {
        "minilm-onnx"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, UnderstudyError> {
        match self.session.lock() {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Session lock poisoned: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), UnderstudyError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for OnnxEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, UnderstudyError> {
        let mut embeddings = Vec::with_capacity(input.texts.len());
        for text in &input.texts {
            embeddings.push(self.embed_text(text)?);
        }
        Ok(EmbeddingOutput {
            embeddings,
            dimensions: EMBEDDING_DIM,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l2_normalize_unit_vector() {
        let n = l2_normalize(&[1.0, 0.0, 0.0]);
        assert!((n[0] - 1.0).abs() < f32::EPSILON);
        assert!(n[1].abs() < f32::EPSILON);
    }

    #[test]
    fn l2_normalize_three_four_five() {
        let n = l2_normalize(&[3.0, 4.0]);
        assert!((n[0] - 0.6).abs() < 0.001);
        assert!((n[1] - 0.8).abs() < 0.001);
        let norm: f32 = n.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[test]
    fn l2_normalize_zero_vector_unchanged() {
        assert_eq!(l2_normalize(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn mean_pool_ignores_padding() {
        // Two tokens, hidden 3; the first is padding.
        let embeddings = [0.0, 0.0, 0.0, 1.0, 2.0, 3.0];
        let result = mean_pool_with_attention(&embeddings, &[0, 1], 2, 3);
        assert_eq!(result, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn mean_pool_averages_real_tokens() {
        let embeddings = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let result = mean_pool_with_attention(&embeddings, &[1, 1, 1], 3, 2);
        assert!((result[0] - 3.0).abs() < f32::EPSILON);
        assert!((result[1] - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn mean_pool_all_padding_is_zero() {
        let embeddings = [1.0, 2.0, 3.0, 4.0];
        let result = mean_pool_with_attention(&embeddings, &[0, 0], 2, 2);
        assert_eq!(result, vec![0.0, 0.0]);
    }

    // OnnxEmbedder::new needs real model files on disk; inference is
    // covered by the first-run integration path, not unit tests.
}
