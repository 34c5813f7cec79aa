// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini generation backend for the Understudy dialogue engine.
//!
//! This crate implements [`GenerationAdapter`] over the Gemini
//! generateContent REST API. Gemini takes a flat continuation prompt,
//! so the backend advertises `chat_markup = false`.

pub mod client;
pub mod types;

use async_trait::async_trait;
use tracing::{debug, info};
use understudy_config::model::GeminiConfig;
use understudy_core::{
    AdapterType, BackendCapabilities, GenerationAdapter, GenerationOutput, GenerationRequest,
    HealthStatus, PluginAdapter, UnderstudyError,
};

use crate::client::GeminiClient;
use crate::types::{Content, GenerateContentRequest, GenerationConfig, Part};

/// Gemini generation backend implementing [`GenerationAdapter`].
///
/// API key resolution order: config -> `GEMINI_API_KEY` env var -> error.
pub struct GeminiBackend {
    client: GeminiClient,
}

impl GeminiBackend {
    /// Creates a new Gemini backend from the given configuration section.
    pub fn new(config: &GeminiConfig) -> Result<Self, UnderstudyError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = GeminiClient::new(
            api_key,
            config.model.clone(),
            std::time::Duration::from_secs(config.timeout_secs),
        )?;

        info!(model = config.model, "Gemini backend initialized");

        Ok(Self { client })
    }

    /// Creates a backend with an existing client (for testing).
    #[cfg(test)]
    fn with_client(client: GeminiClient) -> Self {
        Self { client }
    }
}

/// Converts a core [`GenerationRequest`] to the Gemini wire format.
///
/// The assembled prompt becomes a single user-role content entry;
/// `repetition_penalty` has no Gemini equivalent and is dropped.
fn to_generate_request(request: &GenerationRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: request.prompt.clone(),
            }],
            role: Some("user".into()),
        }],
        generation_config: GenerationConfig {
            temperature: request.params.temperature,
            top_k: request.params.top_k,
            top_p: request.params.top_p,
            max_output_tokens: request.params.max_new_tokens,
        },
    }
}

#[async_trait]
impl PluginAdapter for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generation
    }

    async fn health_check(&self) -> Result<HealthStatus, UnderstudyError> {
        // Verifying the client exists is enough here; a real request
        // would consume quota on every health check.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), UnderstudyError> {
        debug!("Gemini backend shutting down");
        Ok(())
    }
}

#[async_trait]
impl GenerationAdapter for GeminiBackend {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationOutput, UnderstudyError> {
        let api_request = to_generate_request(&request);
        let response = self.client.generate_content(&api_request).await?;

        let candidate =
            response
                .candidates
                .first()
                .ok_or_else(|| UnderstudyError::Backend {
                    message: "no candidates returned; the prompt may have been filtered".into(),
                    source: None,
                })?;

        // Anything other than a clean STOP means the output was blocked
        // or never materialized; the caller substitutes a fallback.
        match candidate.finish_reason.as_deref() {
            Some("STOP") => {}
            other => {
                return Err(UnderstudyError::Backend {
                    message: format!(
                        "generation did not complete (finish reason: {})",
                        other.unwrap_or("none")
                    ),
                    source: None,
                });
            }
        }

        let text = candidate.text();
        if text.trim().is_empty() {
            return Err(UnderstudyError::Backend {
                message: "candidate contained no text".into(),
                source: None,
            });
        }

        debug!(chars = text.len(), "generation response extracted");
        Ok(GenerationOutput { text })
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities { chat_markup: false }
    }
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, UnderstudyError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var("GEMINI_API_KEY").map_err(|_| {
        UnderstudyError::Config(
            "Gemini API key not found. Set gemini.api_key in config or GEMINI_API_KEY environment variable.".into(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use understudy_core::SamplingParams;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_backend(base_url: &str) -> GeminiBackend {
        let client = GeminiClient::new(
            "test-api-key".into(),
            "gemini-1.5-flash-latest".into(),
            Duration::from_secs(5),
        )
        .unwrap()
        .with_base_url(base_url.to_string());
        GeminiBackend::with_client(client)
    }

    fn test_request() -> GenerationRequest {
        GenerationRequest {
            prompt: "You are Nick.\nUser: hello?\nNick:".into(),
            params: SamplingParams::default(),
        }
    }

    #[test]
    fn resolve_api_key_from_config() {
        let result = resolve_api_key(&Some("key-123".into()));
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "key-123");
    }

    #[test]
    fn resolve_api_key_empty_config_falls_back_to_env() {
        let result = resolve_api_key(&Some("".into()));
        // Will fail unless GEMINI_API_KEY is set, which is fine for tests.
        // We just verify it never returns the empty string.
        if result.is_ok() {
            assert!(!result.unwrap().is_empty());
        }
    }

    #[test]
    fn resolve_api_key_none_reports_both_sources() {
        let result = resolve_api_key(&None);
        if result.is_err() {
            let err = result.unwrap_err().to_string();
            assert!(err.contains("GEMINI_API_KEY"), "got: {err}");
        }
    }

    #[test]
    fn request_conversion_maps_sampling_params() {
        let request = GenerationRequest {
            prompt: "Continue this.".into(),
            params: SamplingParams {
                max_new_tokens: 64,
                temperature: 0.5,
                top_k: 40,
                top_p: 0.95,
                repetition_penalty: 1.3,
            },
        };
        let api_req = to_generate_request(&request);
        assert_eq!(api_req.contents.len(), 1);
        assert_eq!(api_req.contents[0].parts[0].text, "Continue this.");
        assert_eq!(api_req.contents[0].role.as_deref(), Some("user"));
        assert_eq!(api_req.generation_config.max_output_tokens, 64);
        assert_eq!(api_req.generation_config.temperature, 0.5);
        assert_eq!(api_req.generation_config.top_k, 40);
        assert_eq!(api_req.generation_config.top_p, 0.95);
    }

    #[tokio::test]
    async fn plugin_adapter_metadata() {
        let server = MockServer::start().await;
        let backend = test_backend(&server.uri());

        assert_eq!(backend.name(), "gemini");
        assert_eq!(backend.version(), semver::Version::new(0, 1, 0));
        assert_eq!(backend.adapter_type(), AdapterType::Generation);
        assert!(!backend.capabilities().chat_markup);
        assert_eq!(backend.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn generate_extracts_candidate_text() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": " Another day, another case."}], "role": "model"},
                "finishReason": "STOP"
            }]
        });
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let backend = test_backend(&server.uri());
        let output = backend.generate(test_request()).await.unwrap();
        assert_eq!(output.text, " Another day, another case.");
    }

    #[tokio::test]
    async fn blocked_generation_is_an_error() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "candidates": [{"finishReason": "SAFETY"}]
        });
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let backend = test_backend(&server.uri());
        let result = backend.generate(test_request()).await;
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("SAFETY"), "got: {err}");
    }

    #[tokio::test]
    async fn empty_candidate_list_is_an_error() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        });
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let backend = test_backend(&server.uri());
        let result = backend.generate(test_request()).await;
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("no candidates"), "got: {err}");
    }

    #[tokio::test]
    async fn blank_candidate_text_is_an_error() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "   "}], "role": "model"},
                "finishReason": "STOP"
            }]
        });
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let backend = test_backend(&server.uri());
        let result = backend.generate(test_request()).await;
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("no text"), "got: {err}");
    }
}
