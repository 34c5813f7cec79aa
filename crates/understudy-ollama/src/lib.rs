// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama local daemon generation backend for the Understudy dialogue
//! engine.
//!
//! This crate implements [`GenerationAdapter`] over the daemon's
//! /api/generate endpoint in raw mode. Local instruction-tuned models
//! respond best to chat markup, so the backend advertises
//! `chat_markup = true` and the daemon's own templating is disabled.

pub mod client;
pub mod types;

use async_trait::async_trait;
use tracing::{debug, info};
use understudy_config::model::OllamaConfig;
use understudy_core::{
    AdapterType, BackendCapabilities, GenerationAdapter, GenerationOutput, GenerationRequest,
    HealthStatus, PluginAdapter, UnderstudyError,
};

use crate::client::OllamaClient;
use crate::types::{GenerateOptions, GenerateRequest};

/// Ollama generation backend implementing [`GenerationAdapter`].
pub struct OllamaBackend {
    client: OllamaClient,
}

impl OllamaBackend {
    /// Creates a new Ollama backend from the given configuration section.
    pub fn new(config: &OllamaConfig) -> Result<Self, UnderstudyError> {
        let client = OllamaClient::new(
            config.base_url.clone(),
            config.model.clone(),
            std::time::Duration::from_secs(config.timeout_secs),
        )?;

        info!(
            base_url = config.base_url,
            model = config.model,
            "Ollama backend initialized"
        );

        Ok(Self { client })
    }

    #[cfg(test)]
    fn with_client(client: OllamaClient) -> Self {
        Self { client }
    }
}

/// Converts a core [`GenerationRequest`] to the daemon wire format.
fn to_generate_request(model: &str, request: &GenerationRequest) -> GenerateRequest {
    GenerateRequest {
        model: model.to_string(),
        prompt: request.prompt.clone(),
        raw: true,
        stream: false,
        options: GenerateOptions {
            num_predict: request.params.max_new_tokens,
            temperature: request.params.temperature,
            top_k: request.params.top_k,
            top_p: request.params.top_p,
            repeat_penalty: request.params.repetition_penalty,
        },
    }
}

#[async_trait]
impl PluginAdapter for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generation
    }

    /// Asks the daemon for its model list. Unreachable daemon is
    /// `Unhealthy`; reachable but missing the configured model is
    /// `Degraded`, since generation will 404 until the model is pulled.
    async fn health_check(&self) -> Result<HealthStatus, UnderstudyError> {
        let tags = match self.client.list_models().await {
            Ok(tags) => tags,
            Err(e) => return Ok(HealthStatus::Unhealthy(e.to_string())),
        };

        let model = self.client.model();
        if tags.models.iter().any(|m| m.name == model) {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded(format!(
                "model {model} not present on daemon; run `ollama pull {model}`"
            )))
        }
    }

    async fn shutdown(&self) -> Result<(), UnderstudyError> {
        debug!("Ollama backend shutting down");
        Ok(())
    }
}

#[async_trait]
impl GenerationAdapter for OllamaBackend {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationOutput, UnderstudyError> {
        let api_request = to_generate_request(self.client.model(), &request);
        let response = self.client.generate(&api_request).await?;

        if response.response.trim().is_empty() {
            return Err(UnderstudyError::Backend {
                message: "daemon returned no text".into(),
                source: None,
            });
        }

        debug!(
            chars = response.response.len(),
            done_reason = ?response.done_reason,
            "generation response extracted"
        );
        Ok(GenerationOutput {
            text: response.response,
        })
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities { chat_markup: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use understudy_core::SamplingParams;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_backend(base_url: &str) -> OllamaBackend {
        let client = OllamaClient::new(
            base_url.to_string(),
            "qwen2.5:3b".into(),
            Duration::from_secs(5),
        )
        .unwrap();
        OllamaBackend::with_client(client)
    }

    fn test_request() -> GenerationRequest {
        GenerationRequest {
            prompt: "<|system|>\nYou are Nick.\n</s>\n<|user|>\nhi</s>\n<|assistant|>\n".into(),
            params: SamplingParams::default(),
        }
    }

    #[test]
    fn request_conversion_maps_sampling_params() {
        let request = GenerationRequest {
            prompt: "Continue.".into(),
            params: SamplingParams {
                max_new_tokens: 64,
                temperature: 0.5,
                top_k: 40,
                top_p: 0.95,
                repetition_penalty: 1.3,
            },
        };
        let api_req = to_generate_request("qwen2.5:3b", &request);
        assert_eq!(api_req.model, "qwen2.5:3b");
        assert_eq!(api_req.prompt, "Continue.");
        assert!(api_req.raw);
        assert!(!api_req.stream);
        assert_eq!(api_req.options.num_predict, 64);
        assert_eq!(api_req.options.temperature, 0.5);
        assert_eq!(api_req.options.top_k, 40);
        assert_eq!(api_req.options.top_p, 0.95);
        assert_eq!(api_req.options.repeat_penalty, 1.3);
    }

    #[tokio::test]
    async fn plugin_adapter_metadata() {
        let server = MockServer::start().await;
        let backend = test_backend(&server.uri());

        assert_eq!(backend.name(), "ollama");
        assert_eq!(backend.version(), semver::Version::new(0, 1, 0));
        assert_eq!(backend.adapter_type(), AdapterType::Generation);
        assert!(backend.capabilities().chat_markup);
    }

    #[tokio::test]
    async fn generate_returns_daemon_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "qwen2.5:3b",
                "raw": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "qwen2.5:3b",
                "response": "Evening. What do you need?",
                "done": true,
                "done_reason": "stop"
            })))
            .mount(&server)
            .await;

        let backend = test_backend(&server.uri());
        let output = backend.generate(test_request()).await.unwrap();
        assert_eq!(output.text, "Evening. What do you need?");
    }

    #[tokio::test]
    async fn blank_response_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "  ",
                "done": true
            })))
            .mount(&server)
            .await;

        let backend = test_backend(&server.uri());
        let result = backend.generate(test_request()).await;
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("no text"), "got: {err}");
    }

    #[tokio::test]
    async fn health_check_healthy_when_model_present() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{"name": "qwen2.5:3b"}, {"name": "llama3.2:1b"}]
            })))
            .mount(&server)
            .await;

        let backend = test_backend(&server.uri());
        assert_eq!(backend.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn health_check_degraded_when_model_missing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{"name": "llama3.2:1b"}]
            })))
            .mount(&server)
            .await;

        let backend = test_backend(&server.uri());
        match backend.health_check().await.unwrap() {
            HealthStatus::Degraded(msg) => {
                assert!(msg.contains("ollama pull"), "got: {msg}")
            }
            other => panic!("expected Degraded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn health_check_unhealthy_when_daemon_unreachable() {
        // Port 1 is never listening.
        let backend = test_backend("http://127.0.0.1:1");
        match backend.health_check().await.unwrap() {
            HealthStatus::Unhealthy(msg) => {
                assert!(msg.contains("unreachable"), "got: {msg}")
            }
            other => panic!("expected Unhealthy, got {other:?}"),
        }
    }
}
