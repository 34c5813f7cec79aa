// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation backend for deterministic testing.
//!
//! `MockBackend` implements `GenerationAdapter` with pre-configured raw
//! outputs, enabling fast, CI-runnable tests without a hosted API or a
//! local model daemon.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use understudy_core::{
    AdapterType, BackendCapabilities, GenerationAdapter, GenerationOutput, GenerationRequest,
    HealthStatus, PluginAdapter, UnderstudyError,
};

/// A mock generation backend that returns pre-configured raw output.
///
/// Responses are popped from a FIFO queue. When the queue is empty, a
/// default "mock reply" text is returned. Every prompt the backend sees
/// is recorded for assertions.
pub struct MockBackend {
    responses: Arc<Mutex<VecDeque<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    capabilities: BackendCapabilities,
    fail: bool,
}

impl MockBackend {
    /// Create a mock backend with an empty response queue.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            capabilities: BackendCapabilities::default(),
            fail: false,
        }
    }

    /// Create a mock backend pre-loaded with the given raw outputs.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            prompts: Arc::new(Mutex::new(Vec::new())),
            capabilities: BackendCapabilities::default(),
            fail: false,
        }
    }

    /// Create a mock backend whose `generate` always fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Override the advertised capability flags.
    pub fn with_capabilities(mut self, capabilities: BackendCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Add a raw output to the end of the queue.
    pub async fn add_response(&self, text: String) {
        self.responses.lock().await.push_back(text);
    }

    /// Prompts this backend has been asked to continue, oldest first.
    pub async fn seen_prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    async fn next_response(&self) -> String {
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock reply".to_string())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockBackend {
    fn name(&self) -> &str {
        "mock-backend"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generation
    }

    async fn health_check(&self) -> Result<HealthStatus, UnderstudyError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), UnderstudyError> {
        Ok(())
    }
}

#[async_trait]
impl GenerationAdapter for MockBackend {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationOutput, UnderstudyError> {
        self.prompts.lock().await.push(request.prompt);
        if self.fail {
            return Err(UnderstudyError::Backend {
                message: "mock backend configured to fail".to_string(),
                source: None,
            });
        }
        Ok(GenerationOutput {
            text: self.next_response().await,
        })
    }

    fn capabilities(&self) -> BackendCapabilities {
        self.capabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> GenerationRequest {
        GenerationRequest {
            prompt: prompt.to_string(),
            params: understudy_core::SamplingParams::default(),
        }
    }

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let backend = MockBackend::new();
        let out = backend.generate(request("hello")).await.unwrap();
        assert_eq!(out.text, "mock reply");
    }

    #[tokio::test]
    async fn queued_responses_returned_in_order() {
        let backend =
            MockBackend::with_responses(vec!["first".to_string(), "second".to_string()]);
        assert_eq!(backend.generate(request("a")).await.unwrap().text, "first");
        assert_eq!(backend.generate(request("b")).await.unwrap().text, "second");
        // Queue exhausted, falls back to default.
        assert_eq!(
            backend.generate(request("c")).await.unwrap().text,
            "mock reply"
        );
    }

    #[tokio::test]
    async fn prompts_are_recorded() {
        let backend = MockBackend::new();
        backend.generate(request("one")).await.unwrap();
        backend.generate(request("two")).await.unwrap();
        assert_eq!(backend.seen_prompts().await, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn failing_backend_errors_but_records_prompt() {
        let backend = MockBackend::failing();
        let err = backend.generate(request("doomed")).await.unwrap_err();
        assert!(matches!(err, UnderstudyError::Backend { .. }));
        assert_eq!(backend.seen_prompts().await, vec!["doomed"]);
    }

    #[tokio::test]
    async fn capabilities_can_be_overridden() {
        let backend = MockBackend::new()
            .with_capabilities(BackendCapabilities { chat_markup: true });
        assert!(backend.capabilities().chat_markup);
    }
}
